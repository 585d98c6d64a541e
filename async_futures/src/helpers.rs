/*
 * Copyright (c) Meta Platforms, Inc. and affiliates.
 *
 * This source code is licensed under both the MIT license found in the
 * LICENSE-MIT file in the root directory of this source tree and the Apache
 * License, Version 2.0 found in the LICENSE-APACHE file in the root directory
 * of this source tree.
 */

//! Entry points and combinators: ready futures, spawning, `all`, `any`,
//! timed waits.

use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;

use allocative::Allocative;
use dupe::Dupe;
use parking_lot::Mutex;

use crate::continuation::Continuation;
use crate::error::AsyncError;
use crate::future::AsyncFuture;
use crate::graph::environment;
use crate::lifetime::IntoLifetimeMonitor;
use crate::options::TaskOptions;
use crate::promise::AsyncPromise;
use crate::result::AsyncResult;

/// How `all` reacts to a failing child.
#[derive(Copy, Clone, Dupe, Debug, PartialEq, Eq, Allocative)]
pub enum FailMode {
    /// Wait for every child, then report the first error observed (if any).
    Full,
    /// Fire as soon as any child fails. Children still in flight keep
    /// running, their results are discarded.
    Fast,
}

/// A future that already completed with `value`.
pub fn ready<T>(value: T) -> AsyncFuture<T>
where
    T: Clone + Send + Sync + 'static,
{
    ready_result(AsyncResult::value(value))
}

/// A completed unit future, the usual anchor for a spawned chain.
pub fn ready_unit() -> AsyncFuture<()> {
    ready(())
}

/// A future that already completed with `result`, value or error.
pub fn ready_result<T>(result: AsyncResult<T>) -> AsyncFuture<T>
where
    T: Clone + Send + Sync + 'static,
{
    let promise = AsyncPromise::new();
    promise.set(result);
    promise.future()
}

/// A future that already failed with `error`.
pub fn error<T>(error: AsyncError) -> AsyncFuture<T>
where
    T: Clone + Send + Sync + 'static,
{
    ready_result(AsyncResult::error(error))
}

/// A failed future of a new payload type, carrying the error of `result`.
/// Panics if `result` actually holds a value.
pub fn error_from<T, R>(result: &AsyncResult<R>) -> AsyncFuture<T>
where
    T: Clone + Send + Sync + 'static,
{
    error(result.get_error().clone())
}

/// Run `body` asynchronously under default options.
pub fn spawn<U, M, F>(body: F) -> AsyncFuture<U>
where
    F: Continuation<(), U, M>,
    U: Clone + Send + Sync + 'static,
{
    ready_unit().then(body)
}

/// Run `body` asynchronously under `options`.
pub fn spawn_with<U, M, F>(body: F, options: TaskOptions) -> AsyncFuture<U>
where
    F: Continuation<(), U, M>,
    U: Clone + Send + Sync + 'static,
{
    ready_unit().then_with(body, options)
}

/// Run `body` asynchronously, skipped with the lifetime-expired error if
/// `owner` is gone by then.
pub fn spawn_bound<U, M, F, O>(owner: O, body: F) -> AsyncFuture<U>
where
    F: Continuation<(), U, M>,
    O: IntoLifetimeMonitor,
    U: Clone + Send + Sync + 'static,
{
    ready_unit().then_bound(owner, body)
}

/// [`spawn_bound`] under explicit options.
pub fn spawn_bound_with<U, M, F, O>(owner: O, body: F, options: TaskOptions) -> AsyncFuture<U>
where
    F: Continuation<(), U, M>,
    O: IntoLifetimeMonitor,
    U: Clone + Send + Sync + 'static,
{
    ready_unit().then_bound_with(owner, body, options)
}

/// A unit future completing no earlier than `delay` from now, on the host
/// tick service. Not bound to any cancellation group; wrap it in a `then`
/// with options if that is needed.
pub fn wait(delay: Duration) -> AsyncFuture<()> {
    let promise = AsyncPromise::new();
    let future = promise.future();
    environment()
        .ticker()
        .schedule_once(delay, Box::new(move || promise.set_value(())));
    future
}

/// Aggregate `futures` into one future of all their values, in input order.
///
/// An empty input completes immediately with an empty sequence. On failure
/// the output carries the first error observed (completion order, not input
/// order); `mode` picks whether that happens eagerly or only after every
/// child settled.
pub fn all<T>(futures: Vec<AsyncFuture<T>>, mode: FailMode) -> AsyncFuture<Vec<T>>
where
    T: Clone + Send + Sync + 'static,
{
    if futures.is_empty() {
        return ready(Vec::new());
    }

    let count = futures.len();
    let promise = AsyncPromise::<Vec<T>>::new();
    let outer = promise.future();

    let slots: Arc<Mutex<Vec<Option<T>>>> =
        Arc::new(Mutex::new((0..count).map(|_| None).collect()));
    let remaining = Arc::new(AtomicUsize::new(count));
    let first_error: Arc<Mutex<Option<AsyncError>>> = Arc::new(Mutex::new(None));

    for (index, future) in futures.iter().enumerate() {
        let promise = promise.dupe();
        let slots = slots.clone();
        let remaining = remaining.clone();
        let first_error = first_error.clone();

        let _observer = future.then(move |result: AsyncResult<T>| {
            match result.into_inner() {
                Ok(value) => {
                    slots.lock()[index] = Some(value);
                }
                Err(e) => {
                    first_error.lock().get_or_insert_with(|| e.clone());
                    if mode == FailMode::Fast {
                        // First error published wins; the set-once promise
                        // discards the rest.
                        promise.set_error(e);
                    }
                }
            }

            if remaining.fetch_sub(1, Ordering::AcqRel) == 1 {
                match first_error.lock().take() {
                    Some(e) => promise.set_error(e),
                    None => {
                        let values = slots
                            .lock()
                            .iter_mut()
                            .map(|slot| {
                                slot.take().expect("every slot is filled when no child failed")
                            })
                            .collect();
                        promise.set_value(values);
                    }
                }
            }
        });
    }

    outer
}

/// The first completion among `futures`, value or error. An empty input
/// fails with the invalid-argument error.
pub fn any<T>(futures: Vec<AsyncFuture<T>>) -> AsyncFuture<T>
where
    T: Clone + Send + Sync + 'static,
{
    if futures.is_empty() {
        return error(AsyncError::invalid_argument(
            "`any` requires at least one future",
        ));
    }

    let promise = AsyncPromise::<T>::new();
    let outer = promise.future();
    for future in &futures {
        let promise = promise.dupe();
        let _observer = future.then(move |result: AsyncResult<T>| {
            // Every child races to publish; set-once keeps the first.
            promise.set(result);
        });
    }
    outer
}
