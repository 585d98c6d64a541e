/*
 * Copyright (c) Meta Platforms, Inc. and affiliates.
 *
 * This source code is licensed under both the MIT license found in the
 * LICENSE-MIT file in the root directory of this source tree and the Apache
 * License, Version 2.0 found in the LICENSE-APACHE file in the root directory
 * of this source tree.
 */

//! Classification and uniform execution of user continuations.
//!
//! A continuation attached with [`then`](crate::future::AsyncFuture::then) may
//! take nothing (only after a unit stage), the predecessor's value, or the
//! predecessor's whole [`AsyncResult`]; it may return a plain value (unit
//! included), an `AsyncResult`, or an `AsyncFuture` that gets flattened into
//! the chain. The input axis is picked by the `M` marker parameter on
//! [`Continuation`], inferred uniquely per callable from its signature. The
//! output axis is picked by [`Publish`], whose three impls cannot overlap: a
//! type can never equal an `AsyncResult`/`AsyncFuture` of itself.
//!
//! Error handling is decided by the input shape alone. A callable that does
//! not name `AsyncResult` in its parameter never sees a failed predecessor;
//! the error is forwarded to the next stage untouched. Naming `AsyncResult`
//! is the opt-in to observe (and possibly recover from) failure.

use crate::future::AsyncFuture;
use crate::promise::AsyncPromise;
use crate::result::AsyncResult;

/// Marker types distinguishing the input shapes a continuation can have.
/// These only steer impl selection and never appear in values.
pub mod marker {
    /// Callable takes no argument. Valid only on a unit predecessor.
    pub struct Nothing;
    /// Callable takes the predecessor's value.
    pub struct Value;
    /// Callable takes the predecessor's full result.
    pub struct Result;
}

/// A callable usable as a stage of type `P -> U`, in any accepted shape.
///
/// `run` implements the uniform dispatch: forward the error without invoking
/// the callable when the shape does not observe results, otherwise invoke and
/// publish whatever shape the callable returned.
pub trait Continuation<P, U, M>: Send + 'static {
    fn run(self, prev: AsyncResult<P>, next: &AsyncPromise<U>);
}

impl<F, R, U> Continuation<(), U, marker::Nothing> for F
where
    F: FnOnce() -> R + Send + 'static,
    R: Publish<U>,
    U: Clone + Send + Sync + 'static,
{
    fn run(self, prev: AsyncResult<()>, next: &AsyncPromise<U>) {
        match prev.into_inner() {
            Err(e) => next.set_error(e),
            Ok(()) => self().publish(next),
        }
    }
}

impl<F, R, P, U> Continuation<P, U, marker::Value> for F
where
    F: FnOnce(P) -> R + Send + 'static,
    R: Publish<U>,
    P: Clone + Send + Sync + 'static,
    U: Clone + Send + Sync + 'static,
{
    fn run(self, prev: AsyncResult<P>, next: &AsyncPromise<U>) {
        match prev.into_inner() {
            Err(e) => next.set_error(e),
            Ok(value) => self(value).publish(next),
        }
    }
}

impl<F, R, P, U> Continuation<P, U, marker::Result> for F
where
    F: FnOnce(AsyncResult<P>) -> R + Send + 'static,
    R: Publish<U>,
    P: Clone + Send + Sync + 'static,
    U: Clone + Send + Sync + 'static,
{
    fn run(self, prev: AsyncResult<P>, next: &AsyncPromise<U>) {
        // The result shape is the error sink: it runs on success and failure
        // both, and is the only shape that can turn an error back into a
        // value.
        self(prev).publish(next)
    }
}

/// Conversion from a continuation's return value into a publication on the
/// next stage's promise.
pub trait Publish<U>: Send + 'static {
    fn publish(self, next: &AsyncPromise<U>);
}

/// A plain value completes the stage successfully. Unit returns land here.
impl<U> Publish<U> for U
where
    U: Clone + Send + Sync + 'static,
{
    fn publish(self, next: &AsyncPromise<U>) {
        next.set_value(self);
    }
}

/// A returned result is published verbatim, value or error.
impl<U> Publish<U> for AsyncResult<U>
where
    U: Clone + Send + Sync + 'static,
{
    fn publish(self, next: &AsyncPromise<U>) {
        next.set(self);
    }
}

/// A returned future is flattened: the stage completes with the inner
/// future's final result, so chained stages never see nested future types.
impl<U> Publish<U> for AsyncFuture<U>
where
    U: Clone + Send + Sync + 'static,
{
    fn publish(self, next: &AsyncPromise<U>) {
        self.forward_to(next);
    }
}
