#![forbid(unsafe_code)]

//! Single-threaded notification channel with RAII unsubscription.
//!
//! A [`Signal<T>`] is what a host object uses to implement its events and
//! its property-change notification. Handlers are fallible: the first
//! handler error stops dispatch and is returned to whoever raised the
//! signal, which is how binding failures surface synchronously.
//!
//! # Architecture
//!
//! `Signal<T>` uses `Rc<RefCell<..>>` for shared ownership. Subscribers are
//! stored as `Weak` callbacks; the matching strong reference lives in the
//! [`Subscription`] guard. Dead entries are pruned lazily on subscribe and
//! emit.
//!
//! # Invariants
//!
//! 1. Subscribers are notified in registration order.
//! 2. Dropping a [`Subscription`] removes the callback before the next emit.
//! 3. `subscriber_count()` counts live subscriptions only.
//! 4. Handlers may subscribe or unsubscribe while a signal is emitting; the
//!    current emit works on a snapshot taken before the first handler runs.

use std::any::Any;
use std::cell::RefCell;
use std::rc::{Rc, Weak};

use crate::error::BindError;

type Callback<T> = dyn Fn(&T) -> Result<(), BindError>;

/// Fallible notification source.
pub struct Signal<T> {
    subscribers: Rc<RefCell<Vec<Weak<Callback<T>>>>>,
}

impl<T> Clone for Signal<T> {
    fn clone(&self) -> Self {
        Self {
            subscribers: Rc::clone(&self.subscribers),
        }
    }
}

impl<T: 'static> Default for Signal<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: 'static> Signal<T> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            subscribers: Rc::new(RefCell::new(Vec::new())),
        }
    }

    /// Register `callback`. It stays registered until the returned guard drops.
    #[must_use = "dropping the subscription unsubscribes immediately"]
    pub fn subscribe(
        &self,
        callback: impl Fn(&T) -> Result<(), BindError> + 'static,
    ) -> Subscription {
        let strong: Rc<Callback<T>> = Rc::new(callback);
        let mut subs = self.subscribers.borrow_mut();
        subs.retain(|weak| weak.strong_count() > 0);
        subs.push(Rc::downgrade(&strong));
        Subscription {
            _callback: Box::new(strong),
        }
    }

    /// Notify every live subscriber, stopping at the first error.
    pub fn emit(&self, payload: &T) -> Result<(), BindError> {
        let snapshot: Vec<Rc<Callback<T>>> = {
            let mut subs = self.subscribers.borrow_mut();
            subs.retain(|weak| weak.strong_count() > 0);
            subs.iter().filter_map(Weak::upgrade).collect()
        };
        for callback in snapshot {
            callback(payload)?;
        }
        Ok(())
    }

    /// Number of live subscriptions.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.subscribers
            .borrow()
            .iter()
            .filter(|weak| weak.strong_count() > 0)
            .count()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.subscriber_count() == 0
    }
}

impl<T> std::fmt::Debug for Signal<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let live = self
            .subscribers
            .borrow()
            .iter()
            .filter(|weak| weak.strong_count() > 0)
            .count();
        f.debug_struct("Signal").field("subscribers", &live).finish()
    }
}

/// RAII guard keeping a signal callback alive.
///
/// Dropping it unsubscribes.
#[must_use = "dropping the subscription unsubscribes immediately"]
pub struct Subscription {
    _callback: Box<dyn Any>,
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ConversionError;
    use std::cell::Cell;

    #[test]
    fn emit_reaches_subscribers_in_order() {
        let signal = Signal::<i32>::new();
        let log = Rc::new(RefCell::new(Vec::new()));

        let l1 = Rc::clone(&log);
        let _a = signal.subscribe(move |v| {
            l1.borrow_mut().push(("a", *v));
            Ok(())
        });
        let l2 = Rc::clone(&log);
        let _b = signal.subscribe(move |v| {
            l2.borrow_mut().push(("b", *v));
            Ok(())
        });

        signal.emit(&7).unwrap();
        assert_eq!(*log.borrow(), vec![("a", 7), ("b", 7)]);
    }

    #[test]
    fn drop_unsubscribes() {
        let signal = Signal::<()>::new();
        let hits = Rc::new(Cell::new(0));
        let h = Rc::clone(&hits);
        let sub = signal.subscribe(move |()| {
            h.set(h.get() + 1);
            Ok(())
        });
        assert_eq!(signal.subscriber_count(), 1);

        signal.emit(&()).unwrap();
        drop(sub);
        signal.emit(&()).unwrap();

        assert_eq!(hits.get(), 1);
        assert_eq!(signal.subscriber_count(), 0);
        assert!(signal.is_empty());
    }

    #[test]
    fn first_error_stops_dispatch() {
        let signal = Signal::<()>::new();
        let reached = Rc::new(Cell::new(false));
        let _fail = signal.subscribe(|()| Err(ConversionError::new("nope").into()));
        let r = Rc::clone(&reached);
        let _after = signal.subscribe(move |()| {
            r.set(true);
            Ok(())
        });

        let err = signal.emit(&()).unwrap_err();
        assert!(err.is_conversion());
        assert!(!reached.get(), "dispatch must stop at the failing handler");
    }

    #[test]
    fn handler_may_subscribe_during_emit() {
        let signal = Signal::<()>::new();
        let held = Rc::new(RefCell::new(Vec::new()));
        let s = signal.clone();
        let h = Rc::clone(&held);
        let _outer = signal.subscribe(move |()| {
            h.borrow_mut().push(s.subscribe(|()| Ok(())));
            Ok(())
        });

        signal.emit(&()).unwrap();
        assert_eq!(signal.subscriber_count(), 2);
    }

    #[test]
    fn debug_reports_live_count() {
        let signal = Signal::<()>::new();
        let _a = signal.subscribe(|()| Ok(()));
        assert_eq!(format!("{signal:?}"), "Signal { subscribers: 1 }");
    }
}
