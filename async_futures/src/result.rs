/*
 * Copyright (c) Meta Platforms, Inc. and affiliates.
 *
 * This source code is licensed under both the MIT license found in the
 * LICENSE-MIT file in the root directory of this source tree and the Apache
 * License, Version 2.0 found in the LICENSE-APACHE file in the root directory
 * of this source tree.
 */

//! The value-or-error sum passed between stages.

use allocative::Allocative;

use crate::error::AsyncError;

/// Outcome of a single stage. Every continuation receives one of these (or
/// its payload) and every stage publishes one into its promise, so failures
/// travel the chain without any out-of-band signalling.
#[derive(Clone, Debug, PartialEq, Eq, Allocative)]
pub enum AsyncResult<T> {
    Value(T),
    Error(AsyncError),
}

impl<T> AsyncResult<T> {
    pub fn value(value: T) -> AsyncResult<T> {
        AsyncResult::Value(value)
    }

    pub fn error(error: AsyncError) -> AsyncResult<T> {
        AsyncResult::Error(error)
    }

    pub fn has_value(&self) -> bool {
        matches!(self, AsyncResult::Value(..))
    }

    pub fn has_error(&self) -> bool {
        matches!(self, AsyncResult::Error(..))
    }

    /// The successful payload. Panics if this result is an error; check
    /// [`has_value`](Self::has_value) first when the state is not known.
    pub fn get(&self) -> &T {
        match self {
            AsyncResult::Value(value) => value,
            AsyncResult::Error(e) => panic!("value requested from a failed result: {}", e),
        }
    }

    /// The error. Panics if this result holds a value.
    pub fn get_error(&self) -> &AsyncError {
        match self {
            AsyncResult::Value(..) => panic!("error requested from a successful result"),
            AsyncResult::Error(e) => e,
        }
    }

    pub fn is_cancelled(&self) -> bool {
        match self {
            AsyncResult::Value(..) => false,
            AsyncResult::Error(e) => e.is_cancelled(),
        }
    }

    pub fn into_inner(self) -> Result<T, AsyncError> {
        match self {
            AsyncResult::Value(value) => Ok(value),
            AsyncResult::Error(e) => Err(e),
        }
    }

    /// Replace a successful payload wholesale, keeping an error untouched.
    /// This is a coercion helper, not a map: the old value is dropped.
    pub fn transform<U>(&self, value: U) -> AsyncResult<U> {
        match self {
            AsyncResult::Value(..) => AsyncResult::Value(value),
            AsyncResult::Error(e) => AsyncResult::Error(e.clone()),
        }
    }

    /// [`transform`](Self::transform) to the unit payload.
    pub fn transform_unit(&self) -> AsyncResult<()> {
        self.transform(())
    }
}

impl<T> From<AsyncError> for AsyncResult<T> {
    fn from(error: AsyncError) -> AsyncResult<T> {
        AsyncResult::Error(error)
    }
}
