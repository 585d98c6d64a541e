/*
 * Copyright (c) Meta Platforms, Inc. and affiliates.
 *
 * This source code is licensed under both the MIT license found in the
 * LICENSE-MIT file in the root directory of this source tree and the Apache
 * License, Version 2.0 found in the LICENSE-APACHE file in the root directory
 * of this source tree.
 */

//! One-shot completion events connecting a promise to its waiters.

use parking_lot::Mutex;

pub(crate) type Subscriber = Box<dyn FnOnce() + Send + 'static>;

/// A subscribable signal that fires exactly once.
///
/// Subscribers registered before the dispatch run during it, in registration
/// order; a subscriber registered after the dispatch runs immediately on the
/// registering thread. Dispatching a second time is a no-op.
pub(crate) struct CompletionEvent {
    /// `None` once the event has dispatched and the list was taken.
    subscribers: Mutex<Option<Vec<Subscriber>>>,
}

impl CompletionEvent {
    pub(crate) fn new() -> CompletionEvent {
        CompletionEvent {
            subscribers: Mutex::new(Some(Vec::new())),
        }
    }

    pub(crate) fn subscribe(&self, subscriber: Subscriber) {
        let run_now = {
            let mut subscribers = self.subscribers.lock();
            match subscribers.as_mut() {
                Some(list) => {
                    list.push(subscriber);
                    None
                }
                None => Some(subscriber),
            }
        };
        // Run outside the lock so a subscriber may subscribe in turn.
        if let Some(subscriber) = run_now {
            subscriber();
        }
    }

    pub(crate) fn dispatch_subsequents(&self) {
        let subscribers = self.subscribers.lock().take();
        let Some(subscribers) = subscribers else {
            return;
        };
        for subscriber in subscribers {
            subscriber();
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::AtomicUsize;
    use std::sync::atomic::Ordering;
    use std::sync::Arc;

    use super::*;

    #[test]
    fn test_subscribers_run_on_dispatch() {
        let event = CompletionEvent::new();
        let calls = Arc::new(AtomicUsize::new(0));

        for _ in 0..3 {
            let calls = calls.clone();
            event.subscribe(Box::new(move || {
                calls.fetch_add(1, Ordering::SeqCst);
            }));
        }
        assert_eq!(calls.load(Ordering::SeqCst), 0);

        event.dispatch_subsequents();
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn test_late_subscriber_runs_immediately() {
        let event = CompletionEvent::new();
        event.dispatch_subsequents();

        let calls = Arc::new(AtomicUsize::new(0));
        let calls2 = calls.clone();
        event.subscribe(Box::new(move || {
            calls2.fetch_add(1, Ordering::SeqCst);
        }));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_second_dispatch_is_noop() {
        let event = CompletionEvent::new();
        let calls = Arc::new(AtomicUsize::new(0));
        let calls2 = calls.clone();
        event.subscribe(Box::new(move || {
            calls2.fetch_add(1, Ordering::SeqCst);
        }));

        event.dispatch_subsequents();
        event.dispatch_subsequents();
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
