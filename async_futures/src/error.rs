/*
 * Copyright (c) Meta Platforms, Inc. and affiliates.
 *
 * This source code is licensed under both the MIT license found in the
 * LICENSE-MIT file in the root directory of this source tree and the Apache
 * License, Version 2.0 found in the LICENSE-APACHE file in the root directory
 * of this source tree.
 */

//! The structured error carried by failed stages.

use allocative::Allocative;
use thiserror::Error;

/// Context reserved for errors produced by this library itself.
pub const CONTEXT_FUTURE: u64 = 1;

/// A cancellation group reached the promise before a producer did.
pub const CODE_CANCELLED: u64 = 1;
/// The owner bound to a continuation was destroyed before the stage ran.
pub const CODE_LIFETIME_EXPIRED: u64 = 2;
/// A combinator was invoked with arguments it cannot accept.
pub const CODE_INVALID_ARGUMENT: u64 = 3;

/// The error half of an [`AsyncResult`](crate::result::AsyncResult).
///
/// Identity is the `(context, code)` pair; the message is informational only
/// and never participates in equality. User code is free to mint its own
/// contexts, [`CONTEXT_FUTURE`] is the only one the library reserves.
#[derive(Clone, Debug, Error, Allocative)]
#[error("[{context:#x}:{code:#x}] {message}")]
pub struct AsyncError {
    context: u64,
    code: u64,
    message: String,
}

impl AsyncError {
    pub fn new(context: u64, code: u64, message: impl Into<String>) -> AsyncError {
        AsyncError {
            context,
            code,
            message: message.into(),
        }
    }

    pub fn cancelled() -> AsyncError {
        AsyncError::new(CONTEXT_FUTURE, CODE_CANCELLED, "cancelled")
    }

    pub fn lifetime_expired() -> AsyncError {
        AsyncError::new(CONTEXT_FUTURE, CODE_LIFETIME_EXPIRED, "owner lifetime expired")
    }

    pub fn invalid_argument(message: impl Into<String>) -> AsyncError {
        AsyncError::new(CONTEXT_FUTURE, CODE_INVALID_ARGUMENT, message)
    }

    pub fn context(&self) -> u64 {
        self.context
    }

    pub fn code(&self) -> u64 {
        self.code
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn is_cancelled(&self) -> bool {
        *self == AsyncError::cancelled()
    }
}

impl PartialEq for AsyncError {
    fn eq(&self, other: &AsyncError) -> bool {
        self.context == other.context && self.code == other.code
    }
}

impl Eq for AsyncError {}
