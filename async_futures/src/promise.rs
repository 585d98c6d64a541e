/*
 * Copyright (c) Meta Platforms, Inc. and affiliates.
 *
 * This source code is licensed under both the MIT license found in the
 * LICENSE-MIT file in the root directory of this source tree and the Apache
 * License, Version 2.0 found in the LICENSE-APACHE file in the root directory
 * of this source tree.
 */

//! Producer-side handle of a promise/future pair.

use std::sync::Arc;

use allocative::Allocative;
use dupe::Dupe;

use crate::error::AsyncError;
use crate::future::AsyncFuture;
use crate::result::AsyncResult;
use crate::state::PromiseState;

/// The set-once producer handle. Clones share the same underlying state, so
/// any holder may publish; the first publication wins and the rest become
/// no-ops. Whoever owns the promise owns the contract to eventually set it.
#[derive(Allocative)]
pub struct AsyncPromise<T> {
    #[allocative(skip)]
    pub(crate) state: Arc<PromiseState<T>>,
}

impl<T> Clone for AsyncPromise<T> {
    fn clone(&self) -> AsyncPromise<T> {
        AsyncPromise {
            state: self.state.clone(),
        }
    }
}

impl<T> Dupe for AsyncPromise<T> {}

impl<T> AsyncPromise<T>
where
    T: Clone + Send + Sync + 'static,
{
    pub fn new() -> AsyncPromise<T> {
        AsyncPromise {
            state: PromiseState::new(),
        }
    }

    /// The consumer handle sharing this state. May be called any number of
    /// times; every future observes the same completion.
    pub fn future(&self) -> AsyncFuture<T> {
        AsyncFuture {
            state: self.state.dupe(),
        }
    }

    pub fn is_set(&self) -> bool {
        self.state.is_set()
    }

    /// The published result. Panics when called before [`is_set`](Self::is_set)
    /// reports true.
    pub fn get(&self) -> AsyncResult<T> {
        self.state.get()
    }

    pub fn set(&self, result: AsyncResult<T>) {
        self.state.set(result);
    }

    pub fn set_value(&self, value: T) {
        self.set(AsyncResult::value(value));
    }

    pub fn set_error(&self, error: AsyncError) {
        self.set(AsyncResult::error(error));
    }

    pub fn cancel(&self) {
        self.set_error(AsyncError::cancelled());
    }
}

impl<T> Default for AsyncPromise<T>
where
    T: Clone + Send + Sync + 'static,
{
    fn default() -> AsyncPromise<T> {
        AsyncPromise::new()
    }
}
