/*
 * Copyright (c) Meta Platforms, Inc. and affiliates.
 *
 * This source code is licensed under both the MIT license found in the
 * LICENSE-MIT file in the root directory of this source tree and the Apache
 * License, Version 2.0 found in the LICENSE-APACHE file in the root directory
 * of this source tree.
 */

//! The execution capabilities the library requires from its host.
//!
//! Scheduling, pooling, and timing are host property: a game engine brings
//! its task graph, a server brings its runtime. The library only depends on
//! the four capability traits below, bundled into an
//! [`ExecutionEnvironment`]. A process that installs nothing gets the
//! built-in native environment the first time any stage is scheduled.

use std::cell::Cell;
use std::sync::Arc;
use std::time::Duration;

use dupe::Dupe;
use once_cell::sync::OnceCell;
use thiserror::Error;

use crate::native::NativeEnvironment;
use crate::options::NamedThread;

/// A unit of work handed to the host. Always a one-shot closure; the library
/// never hands out anything that needs polling.
pub type Job = Box<dyn FnOnce() + Send + 'static>;

/// Named-thread submission. The task graph owns the threads; `Main` must be
/// a single stable thread (the engine's game/main thread), `Any` may be any
/// worker the graph likes.
pub trait TaskGraph: Send + Sync + 'static {
    fn submit(&self, thread: NamedThread, job: Job);
}

/// Queued background work, the host's general-purpose pool.
pub trait WorkerPool: Send + Sync + 'static {
    fn add_queued_work(&self, job: Job);
}

/// Dedicated-thread spawning for long-running bodies. Returns the job when
/// the host cannot spawn (single-threaded platform, forbidden fork state);
/// the caller then runs it inline.
pub trait ThreadSpawner: Send + Sync + 'static {
    fn spawn_dedicated(&self, fork_safe: bool, job: Job) -> Result<(), Job>;
}

/// One-shot timers.
pub trait TickService: Send + Sync + 'static {
    fn schedule_once(&self, delay: Duration, job: Job);
}

/// The bundle of host capabilities stages are scheduled against.
#[derive(Clone, Dupe)]
pub struct ExecutionEnvironment {
    graph: Arc<dyn TaskGraph>,
    pool: Arc<dyn WorkerPool>,
    large_pool: Option<Arc<dyn WorkerPool>>,
    spawner: Arc<dyn ThreadSpawner>,
    ticker: Arc<dyn TickService>,
}

impl ExecutionEnvironment {
    pub fn new(
        graph: Arc<dyn TaskGraph>,
        pool: Arc<dyn WorkerPool>,
        spawner: Arc<dyn ThreadSpawner>,
        ticker: Arc<dyn TickService>,
    ) -> ExecutionEnvironment {
        ExecutionEnvironment {
            graph,
            pool,
            large_pool: None,
            spawner,
            ticker,
        }
    }

    /// Provide a distinct large-job pool. Without one, large-pool
    /// submissions route to the general-purpose pool.
    pub fn with_large_pool(mut self, pool: Arc<dyn WorkerPool>) -> ExecutionEnvironment {
        self.large_pool = Some(pool);
        self
    }

    pub(crate) fn graph(&self) -> &dyn TaskGraph {
        &*self.graph
    }

    pub(crate) fn pool(&self) -> &dyn WorkerPool {
        &*self.pool
    }

    pub(crate) fn large_pool(&self) -> &dyn WorkerPool {
        match &self.large_pool {
            Some(pool) => &**pool,
            None => self.pool(),
        }
    }

    pub(crate) fn spawner(&self) -> &dyn ThreadSpawner {
        &*self.spawner
    }

    pub(crate) fn ticker(&self) -> &dyn TickService {
        &*self.ticker
    }
}

static ENVIRONMENT: OnceCell<ExecutionEnvironment> = OnceCell::new();

#[derive(Debug, Error)]
pub enum EnvironmentError {
    #[error("an execution environment is already installed")]
    AlreadyInstalled,
}

/// Install the process-wide environment. Must happen before the first stage
/// is scheduled; once any environment is in place (installed or defaulted)
/// it stays for the life of the process.
pub fn install(environment: ExecutionEnvironment) -> Result<(), EnvironmentError> {
    ENVIRONMENT
        .set(environment)
        .map_err(|_| EnvironmentError::AlreadyInstalled)
}

pub(crate) fn environment() -> &'static ExecutionEnvironment {
    ENVIRONMENT.get_or_init(NativeEnvironment::create)
}

thread_local! {
    static CURRENT_THREAD: Cell<NamedThread> = Cell::new(NamedThread::Any);
}

/// Tag the calling thread with its task-graph identity. Environment
/// implementations call this once per thread they own; everything untagged
/// reports [`NamedThread::Any`].
pub fn register_current_thread(thread: NamedThread) {
    CURRENT_THREAD.with(|current| current.set(thread));
}

/// The task-graph identity of the calling thread.
pub fn current_thread() -> NamedThread {
    CURRENT_THREAD.with(Cell::get)
}
