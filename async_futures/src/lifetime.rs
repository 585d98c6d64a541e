/*
 * Copyright (c) Meta Platforms, Inc. and affiliates.
 *
 * This source code is licensed under both the MIT license found in the
 * LICENSE-MIT file in the root directory of this source tree and the Apache
 * License, Version 2.0 found in the LICENSE-APACHE file in the root directory
 * of this source tree.
 */

//! Weak owner capability that gates continuations on the owner being alive.

use std::any::Any;
use std::sync::Arc;
use std::sync::Weak;

use allocative::Allocative;
use dupe::Dupe;

/// Watches an owner object without keeping it alive. Before a bound
/// continuation runs, the scheduler pins the monitor; a pin failure means the
/// owner is gone and the stage short-circuits with the lifetime-expired
/// error instead of invoking user code.
#[derive(Clone, Allocative)]
pub struct LifetimeMonitor {
    #[allocative(skip)]
    owner: Option<Weak<dyn Any + Send + Sync>>,
}

impl Dupe for LifetimeMonitor {}

impl LifetimeMonitor {
    /// The null monitor: pinning always succeeds. Used by every `then` that
    /// does not name an owner.
    pub fn untracked() -> LifetimeMonitor {
        LifetimeMonitor { owner: None }
    }

    /// Monitor a shared-ownership object. The monitor holds only a weak
    /// reference; the owner's real lifetime stays with its other holders.
    pub fn of_arc<T: Send + Sync + 'static>(owner: &Arc<T>) -> LifetimeMonitor {
        let owner: Arc<dyn Any + Send + Sync> = owner.clone();
        let weak: Weak<dyn Any + Send + Sync> = Arc::downgrade(&owner);
        LifetimeMonitor { owner: Some(weak) }
    }

    /// Monitor through an already-downgraded handle. This is the entry point
    /// for host object systems that mint weak pointers themselves.
    pub fn of_weak<T: Send + Sync + 'static>(owner: Weak<T>) -> LifetimeMonitor {
        let weak: Weak<dyn Any + Send + Sync> = owner;
        LifetimeMonitor { owner: Some(weak) }
    }

    /// Try to keep the owner alive for the duration of one continuation
    /// call. Returns `None` when the owner has been destroyed. The null
    /// monitor always pins.
    pub fn pin(&self) -> Option<LifetimeGuard> {
        match &self.owner {
            None => Some(LifetimeGuard { _owner: None }),
            Some(weak) => weak.upgrade().map(|owner| LifetimeGuard {
                _owner: Some(owner),
            }),
        }
    }
}

/// Strong reference holding the owner alive while a continuation runs.
/// Dropped as soon as the stage body returns.
pub struct LifetimeGuard {
    _owner: Option<Arc<dyn Any + Send + Sync>>,
}

/// Anything acceptable as the owner argument of
/// [`then_bound`](crate::future::AsyncFuture::then_bound). Owners without a
/// weak/strong story simply have no impl, so a monitor for them fails to
/// compile rather than silently degrading to the null monitor.
pub trait IntoLifetimeMonitor {
    fn into_monitor(self) -> LifetimeMonitor;
}

impl<T: Send + Sync + 'static> IntoLifetimeMonitor for &Arc<T> {
    fn into_monitor(self) -> LifetimeMonitor {
        LifetimeMonitor::of_arc(self)
    }
}

impl<T: Send + Sync + 'static> IntoLifetimeMonitor for Weak<T> {
    fn into_monitor(self) -> LifetimeMonitor {
        LifetimeMonitor::of_weak(self)
    }
}

impl IntoLifetimeMonitor for LifetimeMonitor {
    fn into_monitor(self) -> LifetimeMonitor {
        self
    }
}
