/*
 * Copyright (c) Meta Platforms, Inc. and affiliates.
 *
 * This source code is licensed under both the MIT license found in the
 * LICENSE-MIT file in the root directory of this source tree and the Apache
 * License, Version 2.0 found in the LICENSE-APACHE file in the root directory
 * of this source tree.
 */

mod combined;
mod core_futures;
mod task_helpers;

use std::sync::mpsc;
use std::time::Duration;

use crate::future::AsyncFuture;
use crate::result::AsyncResult;

/// Block the test thread until `future` completes, through an observer stage
/// rather than any library-level wait (the public API has none).
pub(crate) fn wait_for<T>(future: &AsyncFuture<T>) -> AsyncResult<T>
where
    T: Clone + Send + Sync + 'static,
{
    let (done, observed) = mpsc::channel();
    future.then(move |result: AsyncResult<T>| {
        let _ = done.send(result);
    });
    observed
        .recv_timeout(Duration::from_secs(5))
        .expect("future did not complete in time")
}
