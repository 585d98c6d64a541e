/*
 * Copyright (c) Meta Platforms, Inc. and affiliates.
 *
 * This source code is licensed under both the MIT license found in the
 * LICENSE-MIT file in the root directory of this source tree and the Apache
 * License, Version 2.0 found in the LICENSE-APACHE file in the root directory
 * of this source tree.
 */

//! Cancellation groups: best-effort, cooperative, racy by design.
//!
//! Cancelling a group marks every bound promise with the cancelled error.
//! Whether a particular stage observes the cancellation depends on the race
//! with its producer; the set-once rule on promises makes either outcome
//! final. An in-flight body is never interrupted, its publication simply
//! loses to the cancellation that got there first.

use std::mem;
use std::sync::atomic::AtomicBool;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::sync::Weak;

use allocative::Allocative;
use dupe::Dupe;
use parking_lot::Mutex;

use crate::error::AsyncError;
use crate::promise::AsyncPromise;
use crate::result::AsyncResult;
use crate::state::PromiseState;

/// Cancel forwarding into a promise of an erased value type.
pub(crate) trait CancellablePromise: Send + Sync {
    fn cancel(&self);
}

impl<T> CancellablePromise for PromiseState<T>
where
    T: Clone + Send + Sync + 'static,
{
    fn cancel(&self) {
        self.set(AsyncResult::error(AsyncError::cancelled()));
    }
}

pub(crate) struct CancellationState {
    cancelled: AtomicBool,
    /// Weak on purpose: a group must never extend the lifetime of the
    /// promises bound into it.
    bound: Mutex<Vec<Weak<dyn CancellablePromise>>>,
}

impl CancellationState {
    fn new() -> CancellationState {
        CancellationState {
            cancelled: AtomicBool::new(false),
            bound: Mutex::new(Vec::new()),
        }
    }

    fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
        let bound = mem::take(&mut *self.bound.lock());
        if !bound.is_empty() {
            tracing::debug!(promises = bound.len(), "cancelling bound promises");
        }
        for promise in bound {
            if let Some(promise) = promise.upgrade() {
                promise.cancel();
            }
        }
    }

    fn bind(&self, promise: Weak<dyn CancellablePromise>) {
        if !self.cancelled.load(Ordering::SeqCst) {
            self.bound.lock().push(promise.clone());
            // A concurrent cancel may have swept the list between the check
            // and the push. Re-reading the flag closes the window: either the
            // sweep saw our entry, or we see the flag and cancel directly.
            // Cancelling twice is harmless, promises are set-once.
            if !self.cancelled.load(Ordering::SeqCst) {
                return;
            }
        }
        if let Some(promise) = promise.upgrade() {
            promise.cancel();
        }
    }
}

impl Drop for CancellationState {
    fn drop(&mut self) {
        // Releasing the last handle cancels the group, so a group can never
        // silently outlive every holder.
        self.cancel();
    }
}

/// Shared handle over a group of cancellable promises. Cheap to clone;
/// cancellation stays reachable while any clone is held, and dropping the
/// last clone cancels whatever is still bound.
#[derive(Clone, Dupe, Allocative)]
pub struct CancellationHandle {
    #[allocative(skip)]
    state: Arc<CancellationState>,
}

impl CancellationHandle {
    pub fn new() -> CancellationHandle {
        CancellationHandle {
            state: Arc::new(CancellationState::new()),
        }
    }

    /// Bind a promise into the group. If the group is already cancelled the
    /// promise is cancelled on the spot.
    pub fn bind<T>(&self, promise: &AsyncPromise<T>)
    where
        T: Clone + Send + Sync + 'static,
    {
        let strong: Arc<dyn CancellablePromise> = promise.state.clone();
        let weak: Weak<dyn CancellablePromise> = Arc::downgrade(&strong);
        self.state.bind(weak);
    }

    /// Mark every bound promise cancelled. Promises whose producer already
    /// published keep their value; this is the documented race.
    pub fn cancel(&self) {
        self.state.cancel();
    }

    /// A non-owning observer of this group. Use this from closures that the
    /// group itself may end up cancelling, a strong handle captured there
    /// would keep the group alive against its own drop semantics.
    pub fn downgrade(&self) -> WeakCancellationHandle {
        WeakCancellationHandle {
            state: Arc::downgrade(&self.state),
        }
    }
}

impl Default for CancellationHandle {
    fn default() -> CancellationHandle {
        CancellationHandle::new()
    }
}

/// Weak counterpart of [`CancellationHandle`]. Never keeps the group alive.
#[derive(Clone)]
pub struct WeakCancellationHandle {
    state: Weak<CancellationState>,
}

impl Dupe for WeakCancellationHandle {}

impl WeakCancellationHandle {
    /// Recover a strong handle while at least one other holder remains.
    pub fn upgrade(&self) -> Option<CancellationHandle> {
        self.state
            .upgrade()
            .map(|state| CancellationHandle { state })
    }
}
