/*
 * Copyright (c) Meta Platforms, Inc. and affiliates.
 *
 * This source code is licensed under both the MIT license found in the
 * LICENSE-MIT file in the root directory of this source tree and the Apache
 * License, Version 2.0 found in the LICENSE-APACHE file in the root directory
 * of this source tree.
 */

//! Consumer-side handle of a promise/future pair.

use std::future::Future;
use std::future::IntoFuture;
use std::pin::Pin;
use std::sync::Arc;
use std::task::Context;
use std::task::Poll;

use allocative::Allocative;
use dupe::Dupe;
use futures::task::AtomicWaker;

use crate::continuation::Continuation;
use crate::lifetime::IntoLifetimeMonitor;
use crate::lifetime::LifetimeMonitor;
use crate::options::TaskOptions;
use crate::promise::AsyncPromise;
use crate::result::AsyncResult;
use crate::schedule;
use crate::state::PromiseState;

/// A handle to a value that a producer will publish later. Clones observe the
/// same completion, and any number of continuations may be chained off one
/// future; stages attached to the same predecessor run in no particular
/// order relative to each other.
#[derive(Allocative)]
pub struct AsyncFuture<T> {
    #[allocative(skip)]
    pub(crate) state: Arc<PromiseState<T>>,
}

impl<T> Clone for AsyncFuture<T> {
    fn clone(&self) -> AsyncFuture<T> {
        AsyncFuture {
            state: self.state.clone(),
        }
    }
}

impl<T> Dupe for AsyncFuture<T> {}

impl<T> AsyncFuture<T>
where
    T: Clone + Send + Sync + 'static,
{
    /// Always true: a future detached from its promise state is not
    /// representable. Kept for parity with promise/future APIs where handles
    /// can be empty.
    pub fn is_valid(&self) -> bool {
        true
    }

    pub fn is_ready(&self) -> bool {
        self.state.is_set()
    }

    /// The final result. Only defined once [`is_ready`](Self::is_ready)
    /// reports true; panics otherwise. Use [`peek`](Self::peek) when
    /// completion is uncertain.
    pub fn get(&self) -> AsyncResult<T> {
        self.state.get()
    }

    pub fn peek(&self) -> Option<AsyncResult<T>> {
        self.state.peek()
    }

    /// Chain a continuation with default options: submitted to the task
    /// graph on any thread, no cancellation group, no lifetime monitor.
    pub fn then<U, M, F>(&self, continuation: F) -> AsyncFuture<U>
    where
        F: Continuation<T, U, M>,
        U: Clone + Send + Sync + 'static,
    {
        self.then_with(continuation, TaskOptions::new())
    }

    /// Chain a continuation under explicit options.
    pub fn then_with<U, M, F>(&self, continuation: F, options: TaskOptions) -> AsyncFuture<U>
    where
        F: Continuation<T, U, M>,
        U: Clone + Send + Sync + 'static,
    {
        schedule::submit(
            &self.state,
            continuation,
            options,
            LifetimeMonitor::untracked(),
        )
    }

    /// Chain a continuation bound to `owner`'s lifetime. If the owner is gone
    /// by the time the stage would run, the continuation is skipped and the
    /// stage fails with the lifetime-expired error.
    pub fn then_bound<U, M, F, O>(&self, owner: O, continuation: F) -> AsyncFuture<U>
    where
        F: Continuation<T, U, M>,
        O: IntoLifetimeMonitor,
        U: Clone + Send + Sync + 'static,
    {
        self.then_bound_with(owner, continuation, TaskOptions::new())
    }

    /// [`then_bound`](Self::then_bound) under explicit options.
    pub fn then_bound_with<U, M, F, O>(
        &self,
        owner: O,
        continuation: F,
        options: TaskOptions,
    ) -> AsyncFuture<U>
    where
        F: Continuation<T, U, M>,
        O: IntoLifetimeMonitor,
        U: Clone + Send + Sync + 'static,
    {
        schedule::submit(&self.state, continuation, options, owner.into_monitor())
    }

    /// Copy this future's final result into `next` as soon as it is known.
    ///
    /// This is the nested-future flattening hook. It deliberately bypasses
    /// the scheduler: the copy runs inline wherever this future publishes and
    /// never consults any options.
    pub(crate) fn forward_to(&self, next: &AsyncPromise<T>) {
        let next = next.dupe();
        let state = Arc::downgrade(&self.state);
        self.state.subscribe(Box::new(move || {
            let state = state
                .upgrade()
                .expect("completion dispatched without a live state");
            next.set(state.get());
        }));
    }
}

impl<T> IntoFuture for AsyncFuture<T>
where
    T: Clone + Send + Sync + 'static,
{
    type Output = AsyncResult<T>;
    type IntoFuture = CompletionObserver<T>;

    fn into_future(self) -> CompletionObserver<T> {
        CompletionObserver {
            state: self.state,
            waker: Arc::new(AtomicWaker::new()),
            subscribed: false,
        }
    }
}

/// Bridge into `std::future`: resolves with the final [`AsyncResult`] once
/// the underlying promise publishes.
pub struct CompletionObserver<T> {
    state: Arc<PromiseState<T>>,
    waker: Arc<AtomicWaker>,
    subscribed: bool,
}

impl<T> Future for CompletionObserver<T>
where
    T: Clone + Send + Sync + 'static,
{
    type Output = AsyncResult<T>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<AsyncResult<T>> {
        let this = &mut *self;
        if let Some(result) = this.state.peek() {
            return Poll::Ready(result);
        }
        this.waker.register(cx.waker());
        if !this.subscribed {
            this.subscribed = true;
            let waker = this.waker.clone();
            this.state.subscribe(Box::new(move || waker.wake()));
        }
        // The publication may have raced the registration above; check again
        // so the wake is never lost.
        match this.state.peek() {
            Some(result) => Poll::Ready(result),
            None => Poll::Pending,
        }
    }
}
