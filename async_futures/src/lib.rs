/*
 * Copyright (c) Meta Platforms, Inc. and affiliates.
 *
 * This source code is licensed under both the MIT license found in the
 * LICENSE-MIT file in the root directory of this source tree and the Apache
 * License, Version 2.0 found in the LICENSE-APACHE file in the root directory
 * of this source tree.
 */

//!
//! Continuation-passing futures over a host task graph.
//!
//! A producer makes an [`AsyncPromise`]; its paired [`AsyncFuture`] is
//! chained through continuations with [`then`](AsyncFuture::then), each stage
//! scheduled when its predecessor publishes, optionally on a named thread or
//! a worker pool, optionally cancellable as a group, optionally gated on an
//! owner object still being alive. Every stage carries an [`AsyncResult`]:
//! a value or a structured [`AsyncError`], so failure flows down the chain
//! without any unwinding.
//!
//! A continuation names the shape it wants. Taking the plain value means
//! errors skip the stage and propagate; taking the whole `AsyncResult` means
//! the stage always runs and may recover. Returning a future flattens into
//! the chain, so nested chains stay one level deep.
//!
//! Example:
//! ```
//! use std::sync::mpsc;
//!
//! use async_futures::spawn;
//! use async_futures::AsyncResult;
//!
//! let (done, observed) = mpsc::channel();
//! spawn(|| 10)
//!     .then(|value: i32| value + 2)
//!     .then(move |result: AsyncResult<i32>| {
//!         done.send(result).unwrap();
//!     });
//!
//! let result = observed.recv().unwrap();
//! assert_eq!(*result.get(), 12);
//! ```
//!
//! Scheduling goes through the capability traits in [`graph`]; install a
//! host environment with [`install`] or let the built-in one start lazily.

pub mod cancellation;
pub mod continuation;
pub mod convert;
pub mod error;
mod event;
pub mod future;
pub mod graph;
pub mod helpers;
pub mod lifetime;
mod native;
pub mod options;
pub mod promise;
pub mod result;
mod schedule;
mod state;
#[cfg(test)]
mod tests;

pub use crate::cancellation::CancellationHandle;
pub use crate::cancellation::WeakCancellationHandle;
pub use crate::continuation::marker;
pub use crate::continuation::Continuation;
pub use crate::continuation::Publish;
pub use crate::convert::convert;
pub use crate::convert::Conversion;
pub use crate::convert::IntoConverted;
pub use crate::error::AsyncError;
pub use crate::error::CODE_CANCELLED;
pub use crate::error::CODE_INVALID_ARGUMENT;
pub use crate::error::CODE_LIFETIME_EXPIRED;
pub use crate::error::CONTEXT_FUTURE;
pub use crate::future::AsyncFuture;
pub use crate::future::CompletionObserver;
pub use crate::graph::current_thread;
pub use crate::graph::install;
pub use crate::graph::register_current_thread;
pub use crate::graph::EnvironmentError;
pub use crate::graph::ExecutionEnvironment;
pub use crate::graph::Job;
pub use crate::graph::TaskGraph;
pub use crate::graph::ThreadSpawner;
pub use crate::graph::TickService;
pub use crate::graph::WorkerPool;
pub use crate::helpers::all;
pub use crate::helpers::any;
pub use crate::helpers::error;
pub use crate::helpers::error_from;
pub use crate::helpers::ready;
pub use crate::helpers::ready_result;
pub use crate::helpers::ready_unit;
pub use crate::helpers::spawn;
pub use crate::helpers::spawn_bound;
pub use crate::helpers::spawn_bound_with;
pub use crate::helpers::spawn_with;
pub use crate::helpers::wait;
pub use crate::helpers::FailMode;
pub use crate::lifetime::IntoLifetimeMonitor;
pub use crate::lifetime::LifetimeGuard;
pub use crate::lifetime::LifetimeMonitor;
pub use crate::options::ExecutionPolicy;
pub use crate::options::NamedThread;
pub use crate::options::TaskOptions;
pub use crate::promise::AsyncPromise;
pub use crate::result::AsyncResult;
