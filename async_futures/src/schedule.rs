/*
 * Copyright (c) Meta Platforms, Inc. and affiliates.
 *
 * This source code is licensed under both the MIT license found in the
 * LICENSE-MIT file in the root directory of this source tree and the Apache
 * License, Version 2.0 found in the LICENSE-APACHE file in the root directory
 * of this source tree.
 */

//! Mapping from options to host submission: the scheduling task.
//!
//! Chaining a continuation splits into two phases. Phase one is a cheap
//! subscriber on the predecessor's completion event; all it does is capture
//! the published result and re-submit phase two under the configured
//! execution policy. Phase two runs the uniform dispatch on whatever thread
//! the host picked. The split keeps wait-for-predecessor independent of the
//! chosen execution bucket, and keeps the dispatcher oblivious to both.

use std::sync::Arc;

use crate::continuation::Continuation;
use crate::error::AsyncError;
use crate::future::AsyncFuture;
use crate::graph::environment;
use crate::graph::Job;
use crate::lifetime::LifetimeMonitor;
use crate::options::ExecutionPolicy;
use crate::options::NamedThread;
use crate::options::TaskOptions;
use crate::promise::AsyncPromise;
use crate::result::AsyncResult;
use crate::state::PromiseState;

/// Wire a continuation onto `prev`, returning the future of the new stage.
pub(crate) fn submit<P, U, M, F>(
    prev: &Arc<PromiseState<P>>,
    continuation: F,
    options: TaskOptions,
    monitor: LifetimeMonitor,
) -> AsyncFuture<U>
where
    F: Continuation<P, U, M>,
    P: Clone + Send + Sync + 'static,
    U: Clone + Send + Sync + 'static,
{
    let promise = AsyncPromise::<U>::new();
    let future = promise.future();

    if let Some(handle) = options.cancellation() {
        handle.bind(&promise);
    }

    let thread = options.thread();
    let execution = options.execution();
    let weak_prev = Arc::downgrade(prev);

    prev.subscribe(Box::new(move || {
        // Subscribers only ever run under a live handle: either inline from
        // `subscribe` on an already-complete state, or from the dispatch
        // inside `set`, both of which hold a strong reference.
        let result = weak_prev
            .upgrade()
            .expect("completion dispatched without a live state")
            .get();
        let body: Job = Box::new(move || run_stage(result, &promise, continuation, &monitor));
        submit_body(execution, thread, body);
    }));

    future
}

/// Phase two: the uniform dispatch contract.
fn run_stage<P, U, M, F>(
    result: AsyncResult<P>,
    promise: &AsyncPromise<U>,
    continuation: F,
    monitor: &LifetimeMonitor,
) where
    F: Continuation<P, U, M>,
    P: Clone + Send + Sync + 'static,
    U: Clone + Send + Sync + 'static,
{
    // An earlier cancellation may have published first; the stage is then
    // already final and the user code is skipped entirely.
    if promise.is_set() {
        return;
    }

    let Some(_guard) = monitor.pin() else {
        tracing::debug!("owner expired before continuation ran");
        promise.set_error(AsyncError::lifetime_expired());
        return;
    };

    continuation.run(result, promise);
}

/// Route a stage body to the execution bucket the options named.
fn submit_body(execution: ExecutionPolicy, thread: NamedThread, body: Job) {
    let env = environment();
    match execution {
        ExecutionPolicy::TaskGraph => env.graph().submit(thread, body),
        ExecutionPolicy::TaskGraphMainThread => env.graph().submit(NamedThread::Main, body),
        ExecutionPolicy::Thread => {
            if let Err(body) = env.spawner().spawn_dedicated(false, body) {
                body();
            }
        }
        ExecutionPolicy::ThreadIfForkSafe => {
            if let Err(body) = env.spawner().spawn_dedicated(true, body) {
                body();
            }
        }
        ExecutionPolicy::ThreadPool => env.pool().add_queued_work(body),
        ExecutionPolicy::LargeThreadPool => env.large_pool().add_queued_work(body),
    }
}
