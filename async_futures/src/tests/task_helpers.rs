/*
 * Copyright (c) Meta Platforms, Inc. and affiliates.
 *
 * This source code is licensed under both the MIT license found in the
 * LICENSE-MIT file in the root directory of this source tree and the Apache
 * License, Version 2.0 found in the LICENSE-APACHE file in the root directory
 * of this source tree.
 */

use std::time::Duration;
use std::time::Instant;

use crate::error::AsyncError;
use crate::helpers::error;
use crate::helpers::error_from;
use crate::helpers::ready;
use crate::helpers::ready_result;
use crate::helpers::ready_unit;
use crate::helpers::wait;
use crate::result::AsyncResult;
use crate::tests::wait_for;

#[test]
fn test_ready_future_from_value() {
    let future = ready(5);
    assert!(future.is_ready());
    assert_eq!(wait_for(&future), AsyncResult::value(5));
}

#[test]
fn test_ready_future_from_unit() {
    let future = ready_unit();
    assert!(future.is_ready());
    assert_eq!(wait_for(&future), AsyncResult::value(()));
}

#[test]
fn test_ready_future_from_result() {
    let future = ready_result(AsyncResult::value(5));
    assert_eq!(wait_for(&future), AsyncResult::value(5));
}

#[test]
fn test_ready_future_from_error_result() {
    let future = ready_result(AsyncResult::<i32>::error(AsyncError::new(1, 2, "boom")));
    let result = wait_for(&future);
    assert!(result.has_error());
    assert_eq!(result.get_error(), &AsyncError::new(1, 2, "boom"));
}

#[test]
fn test_error_future() {
    let future = error::<i32>(AsyncError::new(1, 2, "made"));
    assert!(future.is_ready());
    let result = wait_for(&future);
    assert!(result.has_error());
    assert!(!result.has_value());
    assert_eq!(result.get_error(), &AsyncError::new(1, 2, "made"));
}

#[test]
fn test_error_future_from_failed_result_of_other_type() {
    let failed = AsyncResult::<i32>::error(AsyncError::new(1, 2, "carried"));
    let future = error_from::<String, i32>(&failed);
    let result = wait_for(&future);
    assert!(result.has_error());
    assert_eq!(result.get_error().message(), "carried");
}

#[test]
fn test_wait_completes_after_the_delay() {
    let start = Instant::now();
    let future = wait(Duration::from_millis(100));
    let result = wait_for(&future);
    let elapsed = start.elapsed();

    assert_eq!(result, AsyncResult::value(()));
    // Only the lower bound is guaranteed, minus scheduling drift.
    assert!(
        elapsed >= Duration::from_millis(70),
        "completed after {:?}",
        elapsed
    );
}
