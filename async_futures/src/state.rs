/*
 * Copyright (c) Meta Platforms, Inc. and affiliates.
 *
 * This source code is licensed under both the MIT license found in the
 * LICENSE-MIT file in the root directory of this source tree and the Apache
 * License, Version 2.0 found in the LICENSE-APACHE file in the root directory
 * of this source tree.
 */

//! The shared state behind a promise/future pair.

use std::cell::UnsafeCell;
use std::sync::atomic::AtomicBool;
use std::sync::atomic::Ordering;
use std::sync::Arc;

use crate::event::CompletionEvent;
use crate::event::Subscriber;
use crate::result::AsyncResult;

/// Set-once publication cell plus the completion event waiters subscribe to.
///
/// The final result lives in an `UnsafeCell` guarded by atomic state:
/// `claimed` elects the single writer, `value_set` is the publication flag
/// readers acquire before touching the cell, `triggered` records that the
/// completion event has dispatched (strictly after `value_set`).
pub(crate) struct PromiseState<T> {
    claimed: AtomicBool,
    value_set: AtomicBool,
    triggered: AtomicBool,
    value: UnsafeCell<Option<AsyncResult<T>>>,
    completion: CompletionEvent,
}

// The UnsafeCell is written once by the thread that wins the `claimed` CAS
// and read only after `value_set` is observed with acquire ordering. Each
// unsafe block restates the side of that contract it relies on.
unsafe impl<T: Send> Send for PromiseState<T> {}
unsafe impl<T: Send + Sync> Sync for PromiseState<T> {}

impl<T> PromiseState<T>
where
    T: Clone + Send + Sync + 'static,
{
    pub(crate) fn new() -> Arc<PromiseState<T>> {
        Arc::new(PromiseState {
            claimed: AtomicBool::new(false),
            value_set: AtomicBool::new(false),
            triggered: AtomicBool::new(false),
            value: UnsafeCell::new(None),
            completion: CompletionEvent::new(),
        })
    }

    pub(crate) fn is_set(&self) -> bool {
        self.value_set.load(Ordering::Acquire)
    }

    #[cfg(test)]
    pub(crate) fn is_triggered(&self) -> bool {
        self.triggered.load(Ordering::Acquire)
    }

    pub(crate) fn peek(&self) -> Option<AsyncResult<T>> {
        if !self.is_set() {
            return None;
        }
        let value = unsafe {
            // SAFETY: `value_set` was loaded with acquire ordering, so the
            // winning writer's store to the cell is visible and no further
            // writes can happen.
            &*self.value.get()
        };
        Some(
            value
                .as_ref()
                .expect("publication flag set without a stored result")
                .clone(),
        )
    }

    /// The final result. Only defined once the state is set.
    pub(crate) fn get(&self) -> AsyncResult<T> {
        self.peek().expect("result requested before completion")
    }

    /// Publish the result. The first caller wins; later calls are no-ops.
    pub(crate) fn set(&self, result: AsyncResult<T>) {
        if self
            .claimed
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return;
        }
        unsafe {
            // SAFETY: winning the CAS above makes this the only write ever
            // performed on the cell; readers gate on `value_set`.
            *self.value.get() = Some(result);
        }
        self.value_set.store(true, Ordering::Release);
        self.completion.dispatch_subsequents();
        self.triggered.store(true, Ordering::Release);
    }

    pub(crate) fn subscribe(&self, subscriber: Subscriber) {
        self.completion.subscribe(subscriber);
    }
}

impl<T> Drop for PromiseState<T> {
    fn drop(&mut self) {
        if !self.value_set.load(Ordering::Acquire) {
            // Dropping every handle without publishing strands any chained
            // stage forever. That is a caller contract violation, surface it
            // rather than letting the wait become undetectable.
            tracing::warn!(
                "promise state dropped without a result; downstream futures will never complete"
            );
            if !std::thread::panicking() {
                debug_assert!(false, "promise dropped without being set");
            }
        }
    }
}
