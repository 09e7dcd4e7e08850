//! Observer registration with automatic unregistration.
//!
//! A [`Signal`] keeps a list of callbacks. [`Signal::subscribe`] hands out a
//! [`Subscription`] and the callback stays registered for exactly as long as
//! that subscription is alive. Dropping the signal first is fine as well, the
//! subscription then simply has nothing left to unregister from.

use parking_lot::Mutex;
use slotmap::{SlotMap, new_key_type};
use std::fmt::{Debug, Formatter};
use std::sync::{Arc, Weak};

new_key_type! { struct SubscriberId; }

type Callback<E> = Arc<dyn Fn(&E) + Send + Sync>;

struct Subscribers<E> {
    callbacks: Mutex<SlotMap<SubscriberId, Callback<E>>>,
}

pub struct Signal<E> {
    inner: Arc<Subscribers<E>>,
}

impl<E: 'static> Signal<E> {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Subscribers {
                callbacks: Mutex::new(SlotMap::with_key()),
            }),
        }
    }

    #[must_use = "the callback is unregistered as soon as the subscription is dropped"]
    pub fn subscribe(&self, callback: impl Fn(&E) + Send + Sync + 'static) -> Subscription {
        let id = self.inner.callbacks.lock().insert(Arc::new(callback));
        let weak: Weak<Subscribers<E>> = Arc::downgrade(&self.inner);

        Subscription {
            unsubscribe: Some(Box::new(move || {
                if let Some(subscribers) = weak.upgrade() {
                    subscribers.callbacks.lock().remove(id);
                }
            })),
        }
    }

    /// Invokes every registered callback.
    ///
    /// Callbacks are collected before invocation, so a callback may subscribe or
    /// drop subscriptions on this signal without deadlocking.
    pub fn emit(&self, event: &E) {
        let callbacks: Vec<Callback<E>> = self.inner.callbacks.lock().values().cloned().collect();
        for callback in callbacks {
            callback(event);
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.inner.callbacks.lock().len()
    }
}

impl<E: 'static> Default for Signal<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> Debug for Signal<E> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Signal")
            .field("subscribers", &self.inner.callbacks.lock().len())
            .finish()
    }
}

/// Keeps a [`Signal`] callback registered until dropped.
pub struct Subscription {
    unsubscribe: Option<Box<dyn FnOnce() + Send + Sync>>,
}

impl Subscription {
    /// Keeps the callback registered for the remaining lifetime of the signal.
    pub fn detach(mut self) {
        self.unsubscribe = None;
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(unsubscribe) = self.unsubscribe.take() {
            unsubscribe();
        }
    }
}

impl Debug for Subscription {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.unsubscribe.is_some())
            .finish()
    }
}
