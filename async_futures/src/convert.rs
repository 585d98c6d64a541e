/*
 * Copyright (c) Meta Platforms, Inc. and affiliates.
 *
 * This source code is licensed under both the MIT license found in the
 * LICENSE-MIT file in the root directory of this source tree and the Apache
 * License, Version 2.0 found in the LICENSE-APACHE file in the root directory
 * of this source tree.
 */

//! Synchronous counterpart of the continuation dispatcher.
//!
//! [`convert`] applies a callable to an already-complete [`AsyncResult`]
//! under the same shape rules as `then`: value-shaped callables are skipped
//! on error with the error forwarded, result-shaped callables always run and
//! may recover. Use it when a result is in hand and scheduling a stage for a
//! pure transformation would be noise.

use crate::continuation::marker;
use crate::result::AsyncResult;

/// A callable usable as a synchronous conversion `P -> U`. Mirrors
/// [`Continuation`](crate::continuation::Continuation) minus the future
/// output shape, which has no synchronous meaning.
pub trait Conversion<P, U, M> {
    fn apply(self, result: AsyncResult<P>) -> AsyncResult<U>;
}

impl<F, R, U> Conversion<(), U, marker::Nothing> for F
where
    F: FnOnce() -> R,
    R: IntoConverted<U>,
{
    fn apply(self, result: AsyncResult<()>) -> AsyncResult<U> {
        match result.into_inner() {
            Err(e) => AsyncResult::error(e),
            Ok(()) => self().into_converted(),
        }
    }
}

impl<F, R, P, U> Conversion<P, U, marker::Value> for F
where
    F: FnOnce(P) -> R,
    R: IntoConverted<U>,
{
    fn apply(self, result: AsyncResult<P>) -> AsyncResult<U> {
        match result.into_inner() {
            Err(e) => AsyncResult::error(e),
            Ok(value) => self(value).into_converted(),
        }
    }
}

impl<F, R, P, U> Conversion<P, U, marker::Result> for F
where
    F: FnOnce(AsyncResult<P>) -> R,
    R: IntoConverted<U>,
{
    fn apply(self, result: AsyncResult<P>) -> AsyncResult<U> {
        self(result).into_converted()
    }
}

/// Return shapes a conversion may have: a plain value or a full result.
pub trait IntoConverted<U> {
    fn into_converted(self) -> AsyncResult<U>;
}

impl<U> IntoConverted<U> for U {
    fn into_converted(self) -> AsyncResult<U> {
        AsyncResult::value(self)
    }
}

impl<U> IntoConverted<U> for AsyncResult<U> {
    fn into_converted(self) -> AsyncResult<U> {
        self
    }
}

/// Apply `conversion` to `result` under the shape rules above.
pub fn convert<P, U, M, F>(result: AsyncResult<P>, conversion: F) -> AsyncResult<U>
where
    F: Conversion<P, U, M>,
{
    conversion.apply(result)
}
