/*
 * Copyright (c) Meta Platforms, Inc. and affiliates.
 *
 * This source code is licensed under both the MIT license found in the
 * LICENSE-MIT file in the root directory of this source tree and the Apache
 * License, Version 2.0 found in the LICENSE-APACHE file in the root directory
 * of this source tree.
 */

//! Built-in execution environment for hosts that install nothing.
//!
//! A small fixed task graph (tagged worker threads plus one dedicated main
//! thread fed over channels), a tokio runtime supplying the worker pool and
//! the timer, and plain dedicated threads. Good enough for tools and tests;
//! an engine embedding the library is expected to install its own
//! environment instead.

use std::panic::catch_unwind;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use crossbeam_channel::Receiver;
use crossbeam_channel::Sender;

use crate::graph::register_current_thread;
use crate::graph::ExecutionEnvironment;
use crate::graph::Job;
use crate::graph::TaskGraph;
use crate::graph::ThreadSpawner;
use crate::graph::TickService;
use crate::graph::WorkerPool;
use crate::options::NamedThread;

pub(crate) struct NativeEnvironment;

impl NativeEnvironment {
    pub(crate) fn create() -> ExecutionEnvironment {
        let runtime = Arc::new(NativeRuntime::new());
        ExecutionEnvironment::new(
            Arc::new(NativeTaskGraph::new()),
            runtime.clone(),
            Arc::new(NativeThreadSpawner),
            runtime,
        )
    }
}

fn run_jobs(jobs: Receiver<Job>, thread: NamedThread) {
    register_current_thread(thread);
    for job in jobs {
        // A panicking body loses its own stage; it must not take the worker
        // (and every queued job after it) down as well.
        if catch_unwind(AssertUnwindSafe(job)).is_err() {
            tracing::error!("continuation body panicked");
        }
    }
}

struct NativeTaskGraph {
    any: Sender<Job>,
    main: Sender<Job>,
}

impl NativeTaskGraph {
    fn new() -> NativeTaskGraph {
        let (any, any_jobs) = crossbeam_channel::unbounded::<Job>();
        let (main, main_jobs) = crossbeam_channel::unbounded::<Job>();

        let workers = num_cpus::get().clamp(2, 8);
        for index in 0..workers {
            let jobs = any_jobs.clone();
            thread::Builder::new()
                .name(format!("async-futures-worker-{}", index))
                .spawn(move || run_jobs(jobs, NamedThread::Any))
                .expect("failed to start a task graph worker");
        }
        thread::Builder::new()
            .name("async-futures-main".to_owned())
            .spawn(move || run_jobs(main_jobs, NamedThread::Main))
            .expect("failed to start the main task thread");

        NativeTaskGraph { any, main }
    }
}

impl TaskGraph for NativeTaskGraph {
    fn submit(&self, thread: NamedThread, job: Job) {
        let queue = match thread {
            NamedThread::Any => &self.any,
            NamedThread::Main => &self.main,
        };
        // The receivers live as long as the process; a send only fails during
        // teardown, when dropping the job is the right outcome anyway.
        let _ignored = queue.send(job);
    }
}

/// Worker pool and timer in one: both are views of the owned tokio runtime.
struct NativeRuntime {
    runtime: tokio::runtime::Runtime,
}

impl NativeRuntime {
    fn new() -> NativeRuntime {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(1)
            .thread_name("async-futures-runtime")
            .enable_time()
            .build()
            .expect("failed to start the native runtime");
        NativeRuntime { runtime }
    }
}

impl WorkerPool for NativeRuntime {
    fn add_queued_work(&self, job: Job) {
        self.runtime.spawn_blocking(move || {
            if catch_unwind(AssertUnwindSafe(job)).is_err() {
                tracing::error!("queued work panicked");
            }
        });
    }
}

impl TickService for NativeRuntime {
    fn schedule_once(&self, delay: Duration, job: Job) {
        self.runtime.spawn(async move {
            tokio::time::sleep(delay).await;
            job();
        });
    }
}

struct NativeThreadSpawner;

impl ThreadSpawner for NativeThreadSpawner {
    fn spawn_dedicated(&self, _fork_safe: bool, job: Job) -> Result<(), Job> {
        // std threads are already safe across our supported hosts; the
        // fork-safe flag only matters to environments that distinguish the
        // two spawners. The job goes through a shared slot so a failed spawn
        // can hand it back for the inline fallback.
        let slot = Arc::new(parking_lot::Mutex::new(Some(job)));
        let runner = {
            let slot = slot.clone();
            move || {
                if let Some(job) = slot.lock().take() {
                    job();
                }
            }
        };
        match thread::Builder::new()
            .name("async-futures-dedicated".to_owned())
            .spawn(runner)
        {
            Ok(_handle) => Ok(()),
            Err(e) => {
                tracing::warn!("dedicated thread spawn failed, running inline: {}", e);
                let job = slot
                    .lock()
                    .take()
                    .expect("a thread that never started cannot have taken the job");
                Err(job)
            }
        }
    }
}
