/*
 * Copyright (c) Meta Platforms, Inc. and affiliates.
 *
 * This source code is licensed under both the MIT license found in the
 * LICENSE-MIT file in the root directory of this source tree and the Apache
 * License, Version 2.0 found in the LICENSE-APACHE file in the root directory
 * of this source tree.
 */

use std::sync::atomic::AtomicBool;
use std::sync::atomic::Ordering;
use std::sync::Arc;

use crate::error::AsyncError;
use crate::future::AsyncFuture;
use crate::helpers::ready;
use crate::helpers::ready_unit;
use crate::helpers::spawn;
use crate::promise::AsyncPromise;
use crate::result::AsyncResult;
use crate::tests::wait_for;

const CONTEXT: u64 = 0x0000dead;
const CODE: u64 = 0xdead0000;

fn increment_and_stringify(value: i32) -> AsyncFuture<String> {
    spawn(move || format!("{}", value + 1))
}

#[test]
fn test_set_once_is_observable() {
    let promise = AsyncPromise::new();
    promise.set(AsyncResult::value(1));
    promise.set(AsyncResult::value(2));
    promise.set_error(AsyncError::new(CONTEXT, CODE, ""));
    assert_eq!(wait_for(&promise.future()), AsyncResult::value(1));
}

#[test]
fn test_spawn_then_chain() {
    let future: AsyncFuture<i32> = spawn(|| 10)
        .then(|result: AsyncResult<i32>| *result.get() + 2)
        .then(|result: AsyncResult<i32>| result);
    assert_eq!(wait_for(&future), AsyncResult::value(12));
}

#[test]
fn test_value_chain() {
    let future = ready(1)
        .then(|value: i32| value + 2)
        .then(|value: i32| value * 2);
    assert_eq!(wait_for(&future), AsyncResult::value(6));
}

#[test]
fn test_nothing_to_nothing() {
    let future = ready_unit().then(|| {}).then(|| {});
    assert_eq!(wait_for(&future), AsyncResult::value(()));
}

#[test]
fn test_nothing_to_value() {
    let future = ready_unit().then(|| 5).then(|value: i32| value);
    assert_eq!(wait_for(&future), AsyncResult::value(5));
}

#[test]
fn test_nothing_to_result() {
    let future = ready_unit()
        .then(|| AsyncResult::value(5))
        .then(|value: i32| value);
    assert_eq!(wait_for(&future), AsyncResult::value(5));
}

#[test]
fn test_nothing_to_future() {
    let future = ready_unit()
        .then(|| -> AsyncFuture<i32> { ready(5) })
        .then(|value: i32| value);
    assert_eq!(wait_for(&future), AsyncResult::value(5));
}

#[test]
fn test_value_to_nothing() {
    let observed = Arc::new(AtomicBool::new(false));
    let observed2 = observed.clone();
    let future = ready(5)
        .then(move |value: i32| {
            assert_eq!(value, 5);
            observed2.store(true, Ordering::SeqCst);
        })
        .then(|| {});
    assert_eq!(wait_for(&future), AsyncResult::value(()));
    assert!(observed.load(Ordering::SeqCst));
}

#[test]
fn test_value_to_result() {
    let future = ready(5)
        .then(|value: i32| AsyncResult::value(value + 1))
        .then(|value: i32| value);
    assert_eq!(wait_for(&future), AsyncResult::value(6));
}

#[test]
fn test_value_to_future() {
    let future = ready(5)
        .then(|value: i32| -> AsyncFuture<i32> { ready(value * 3) })
        .then(|value: i32| value);
    assert_eq!(wait_for(&future), AsyncResult::value(15));
}

#[test]
fn test_result_to_nothing() {
    let future = ready(5).then(|_result: AsyncResult<i32>| {}).then(|| true);
    assert_eq!(wait_for(&future), AsyncResult::value(true));
}

#[test]
fn test_result_to_value() {
    let future = ready(5)
        .then(|result: AsyncResult<i32>| *result.get())
        .then(|value: i32| value);
    assert_eq!(wait_for(&future), AsyncResult::value(5));
}

#[test]
fn test_result_to_result() {
    let passthrough: AsyncFuture<i32> = ready(5).then(|result: AsyncResult<i32>| result);
    let future: AsyncFuture<i32> = passthrough.then(|result: AsyncResult<i32>| result);
    assert_eq!(wait_for(&future), AsyncResult::value(5));
}

#[test]
fn test_result_to_future() {
    let future = ready(5)
        .then(|result: AsyncResult<i32>| -> AsyncFuture<i32> { ready(*result.get() + 2) })
        .then(|value: i32| value);
    assert_eq!(wait_for(&future), AsyncResult::value(7));
}

#[test]
fn test_unwrap_spawn_inside_then() {
    let future = ready_unit()
        .then(|| increment_and_stringify(10))
        .then(|value: String| value);
    assert_eq!(wait_for(&future), AsyncResult::value("11".to_owned()));
}

#[test]
fn test_unwrap_result_inside_spawned_future() {
    let future = ready_unit()
        .then(|| -> AsyncFuture<i32> { spawn(|| AsyncResult::value(5)) })
        .then(|value: i32| value);
    assert_eq!(wait_for(&future), AsyncResult::value(5));
}

#[test]
fn test_unwrap_spawn_inside_spawn() {
    let future = spawn(|| increment_and_stringify(20)).then(|value: String| value);
    assert_eq!(wait_for(&future), AsyncResult::value("21".to_owned()));
}

#[test]
fn test_error_received_by_result_stage() {
    let first: AsyncFuture<i32> =
        spawn(|| AsyncResult::<i32>::error(AsyncError::new(CONTEXT, CODE, "Error Message")));
    let result = wait_for(&first);
    assert!(result.has_error());
    assert_eq!(result.get_error().code(), CODE);
    assert_eq!(result.get_error().context(), CONTEXT);
    assert_eq!(result.get_error().message(), "Error Message");
}

#[test]
fn test_value_stage_skipped_on_error() {
    let invoked = Arc::new(AtomicBool::new(false));
    let invoked2 = invoked.clone();

    let first: AsyncFuture<i32> =
        spawn(|| AsyncResult::<i32>::error(AsyncError::new(CONTEXT, CODE, "")));
    let future: AsyncFuture<i32> = first
        .then(move |value: i32| {
            invoked2.store(true, Ordering::SeqCst);
            value
        })
        .then(|result: AsyncResult<i32>| result);

    let result = wait_for(&future);
    assert!(result.has_error());
    assert_eq!(result.get_error().code(), CODE);
    assert!(!invoked.load(Ordering::SeqCst));
}

#[test]
fn test_error_survives_type_change() {
    let first: AsyncFuture<i32> =
        spawn(|| AsyncResult::<i32>::error(AsyncError::new(CONTEXT, CODE, "kept")));
    let future: AsyncFuture<String> = first
        .then(|_value: i32| String::new())
        .then(|result: AsyncResult<String>| result);

    let result = wait_for(&future);
    assert!(result.has_error());
    assert_eq!(result.get_error().context(), CONTEXT);
    assert_eq!(result.get_error().code(), CODE);
    assert_eq!(result.get_error().message(), "kept");
}

#[test]
fn test_result_stage_recovers_error() {
    let first: AsyncFuture<i32> =
        spawn(|| AsyncResult::<i32>::error(AsyncError::new(CONTEXT, CODE, "Error Message")));
    let future = first.then(|result: AsyncResult<i32>| {
        if result.has_error() {
            result.get_error().message().to_owned()
        } else {
            String::new()
        }
    });
    assert_eq!(wait_for(&future), AsyncResult::value("Error Message".to_owned()));
}

#[test]
fn test_sibling_continuations_each_observe_completion() {
    let source = ready(3);
    let doubled = source.then(|value: i32| value * 2);
    let tripled = source.then(|value: i32| value * 3);
    assert_eq!(wait_for(&doubled), AsyncResult::value(6));
    assert_eq!(wait_for(&tripled), AsyncResult::value(9));
}

#[test]
fn test_captured_state_is_visible_downstream() {
    let witness = Arc::new(AtomicBool::new(false));
    let witness2 = witness.clone();
    let future: AsyncFuture<()> = spawn(move || {
        witness2.store(true, Ordering::SeqCst);
    })
    .then(|result: AsyncResult<()>| result);

    assert!(wait_for(&future).has_value());
    assert!(witness.load(Ordering::SeqCst));
}

#[test]
fn test_future_readiness_getters() {
    let promise = AsyncPromise::<i32>::new();
    let future = promise.future();
    assert!(future.is_valid());
    assert!(!future.is_ready());
    assert_eq!(future.peek(), None);

    promise.set_value(4);
    assert!(future.is_ready());
    assert_eq!(future.get(), AsyncResult::value(4));
    assert_eq!(future.peek(), Some(AsyncResult::value(4)));
}
