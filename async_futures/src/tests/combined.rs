/*
 * Copyright (c) Meta Platforms, Inc. and affiliates.
 *
 * This source code is licensed under both the MIT license found in the
 * LICENSE-MIT file in the root directory of this source tree and the Apache
 * License, Version 2.0 found in the LICENSE-APACHE file in the root directory
 * of this source tree.
 */

use std::time::Duration;

use crate::error::AsyncError;
use crate::error::CODE_INVALID_ARGUMENT;
use crate::error::CONTEXT_FUTURE;
use crate::helpers::all;
use crate::helpers::any;
use crate::helpers::error;
use crate::helpers::ready;
use crate::helpers::ready_unit;
use crate::helpers::spawn;
use crate::helpers::FailMode;
use crate::promise::AsyncPromise;
use crate::result::AsyncResult;
use crate::tests::wait_for;

const CONTEXT: u64 = 0x0000dead;
const CODE: u64 = 0xdead0000;

#[test]
fn test_all_success_preserves_input_order() {
    let future = all(vec![ready(1), ready(2), ready(4)], FailMode::Full)
        .then(|values: AsyncResult<Vec<i32>>| values.get().iter().sum::<i32>());
    assert_eq!(wait_for(&future), AsyncResult::value(7));
}

#[test]
fn test_all_orders_by_input_not_completion() {
    let first = AsyncPromise::<i32>::new();
    let second = AsyncPromise::<i32>::new();
    let future = all(
        vec![first.future(), second.future()],
        FailMode::Full,
    );

    // Complete in reverse input order.
    second.set_value(20);
    first.set_value(10);

    let result = wait_for(&future);
    assert_eq!(result, AsyncResult::value(vec![10, 20]));
}

#[test]
fn test_all_full_reports_error() {
    let future = all(
        vec![
            ready_unit(),
            ready_unit(),
            error::<()>(AsyncError::new(CODE, CONTEXT, "Error Message")),
        ],
        FailMode::Full,
    );

    let result = wait_for(&future);
    assert!(result.has_error());
    assert!(!result.has_value());
    assert_eq!(result.get_error().message(), "Error Message");
}

#[test]
fn test_all_fast_fires_on_first_error() {
    let pending = AsyncPromise::<()>::new();
    let future = all(
        vec![
            pending.future(),
            error::<()>(AsyncError::new(CODE, CONTEXT, "fast error")),
        ],
        FailMode::Fast,
    );

    // The pending child never completes before the assertion; fast mode must
    // not wait for it.
    let result = wait_for(&future);
    assert!(result.has_error());
    assert_eq!(result.get_error().message(), "fast error");

    pending.set_value(());
}

#[test]
fn test_all_full_waits_for_every_child() {
    let pending = AsyncPromise::<()>::new();
    let future = all(
        vec![
            pending.future(),
            error::<()>(AsyncError::new(CODE, CONTEXT, "kept")),
        ],
        FailMode::Full,
    );

    assert!(!future.is_ready());
    pending.set_value(());

    let result = wait_for(&future);
    assert!(result.has_error());
    assert_eq!(result.get_error().message(), "kept");
}

#[test]
fn test_all_empty_input_is_ready_immediately() {
    let future = all(Vec::<crate::future::AsyncFuture<i32>>::new(), FailMode::Full);
    assert_eq!(wait_for(&future), AsyncResult::value(Vec::new()));
}

#[test]
fn test_any_first_completion_wins() {
    let first = AsyncPromise::<i32>::new();
    let second = AsyncPromise::<i32>::new();
    let future = any(vec![first.future(), second.future()]);

    let producer = std::thread::spawn(move || {
        first.set_value(1);
        std::thread::sleep(Duration::from_millis(200));
        second.set_value(50);
    });

    assert_eq!(wait_for(&future), AsyncResult::value(1));
    producer.join().unwrap();
}

#[test]
fn test_any_propagates_first_error() {
    let first = AsyncPromise::<i32>::new();
    let second = AsyncPromise::<i32>::new();
    let future = any(vec![first.future(), second.future()]);

    let producer = std::thread::spawn(move || {
        first.set_error(AsyncError::new(CODE, CONTEXT, "Error Message"));
        std::thread::sleep(Duration::from_millis(200));
        second.set_value(1);
    });

    let result = wait_for(&future);
    assert!(result.has_error());
    assert_eq!(result.get_error().message(), "Error Message");
    producer.join().unwrap();
}

#[test]
fn test_any_empty_input_is_invalid() {
    let future = any(Vec::<crate::future::AsyncFuture<i32>>::new());
    let result = wait_for(&future);
    assert!(result.has_error());
    assert_eq!(result.get_error().context(), CONTEXT_FUTURE);
    assert_eq!(result.get_error().code(), CODE_INVALID_ARGUMENT);
}

#[test]
fn test_all_children_may_come_from_spawn() {
    let futures = vec![spawn(|| 1), spawn(|| 2), spawn(|| 3)];
    let future =
        all(futures, FailMode::Full).then(|values: AsyncResult<Vec<i32>>| values.get().len());
    assert_eq!(wait_for(&future), AsyncResult::value(3));
}
