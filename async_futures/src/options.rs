/*
 * Copyright (c) Meta Platforms, Inc. and affiliates.
 *
 * This source code is licensed under both the MIT license found in the
 * LICENSE-MIT file in the root directory of this source tree and the Apache
 * License, Version 2.0 found in the LICENSE-APACHE file in the root directory
 * of this source tree.
 */

//! Per-stage scheduling configuration.

use allocative::Allocative;
use dupe::Dupe;

use crate::cancellation::CancellationHandle;

/// Threads with a stable identity the task graph can target. Everything that
/// is not the main thread is `Any`.
#[derive(Copy, Clone, Dupe, Debug, PartialEq, Eq, Hash, Allocative)]
pub enum NamedThread {
    Any,
    Main,
}

/// Which execution bucket a stage's body is submitted to.
#[derive(Copy, Clone, Dupe, Debug, PartialEq, Eq, Hash, Allocative)]
pub enum ExecutionPolicy {
    /// The task graph, on the thread named by the options.
    TaskGraph,
    /// The task graph on the main thread, overriding any named thread.
    TaskGraphMainThread,
    /// A dedicated thread; runs inline when the host cannot spawn.
    Thread,
    /// A dedicated thread via the fork-safe spawner; inline fallback.
    ThreadIfForkSafe,
    /// The general-purpose worker pool; inline fallback.
    ThreadPool,
    /// The large-job worker pool where one exists, otherwise the
    /// general-purpose pool.
    LargeThreadPool,
}

/// Options carried into a single `then`/`spawn` call. Unset fields fall back
/// to defaults: any thread, task-graph execution, no cancellation group.
#[derive(Clone, Dupe, Default, Allocative)]
pub struct TaskOptions {
    thread: Option<NamedThread>,
    execution: Option<ExecutionPolicy>,
    #[allocative(skip)]
    cancellation: Option<CancellationHandle>,
}

impl TaskOptions {
    pub fn new() -> TaskOptions {
        TaskOptions::default()
    }

    pub fn with_thread(mut self, thread: NamedThread) -> TaskOptions {
        self.thread = Some(thread);
        self
    }

    pub fn with_execution(mut self, execution: ExecutionPolicy) -> TaskOptions {
        self.execution = Some(execution);
        self
    }

    pub fn with_cancellation(mut self, handle: CancellationHandle) -> TaskOptions {
        self.cancellation = Some(handle);
        self
    }

    pub fn thread(&self) -> NamedThread {
        self.thread.unwrap_or(NamedThread::Any)
    }

    pub fn execution(&self) -> ExecutionPolicy {
        self.execution.unwrap_or(ExecutionPolicy::TaskGraph)
    }

    pub fn cancellation(&self) -> Option<&CancellationHandle> {
        self.cancellation.as_ref()
    }
}
