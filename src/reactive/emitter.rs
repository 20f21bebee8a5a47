//! Typed synchronous pub/sub.
//!
//! Subscribers live in an ordered map keyed by their subscription id, so
//! delivery order is registration order. Emission works on a snapshot of the
//! current subscriber set:
//!   - unsubscribing from inside a callback does not exempt that subscriber
//!     from the round already underway,
//!   - subscribing from inside a callback takes effect from the next round.
//!
//! The internal lock is dropped before any callback runs, so callbacks are
//! free to subscribe, unsubscribe, or emit again.

use std::collections::BTreeMap;
use std::sync::Arc;

use parking_lot::Mutex;

/// Identifies one subscription; pass back to [`EventEmitter::unsubscribe`].
pub type SubscriptionId = u64;

/// Closure type for subscribers.
pub type SubscriberFn<T> = dyn Fn(&T) + Send + Sync;

struct Registry<T> {
    next_id: SubscriptionId,
    subscribers: BTreeMap<SubscriptionId, Arc<SubscriberFn<T>>>,
}

/// Typed synchronous event emitter.
pub struct EventEmitter<T> {
    registry: Mutex<Registry<T>>,
}

impl<T> EventEmitter<T> {
    pub fn new() -> Self {
        Self {
            registry: Mutex::new(Registry {
                next_id: 1,
                subscribers: BTreeMap::new(),
            }),
        }
    }

    /// Register `callback`; it receives every event emitted after this call
    /// returns, in registration order relative to other subscribers.
    pub fn subscribe(&self, callback: impl Fn(&T) + Send + Sync + 'static) -> SubscriptionId {
        let mut registry = self.registry.lock();
        let id = registry.next_id;
        registry.next_id += 1;
        registry.subscribers.insert(id, Arc::new(callback));
        id
    }

    /// Drop the subscription `id`. Unknown ids are ignored, so double
    /// unsubscription is harmless.
    pub fn unsubscribe(&self, id: SubscriptionId) {
        self.registry.lock().subscribers.remove(&id);
    }

    /// Deliver `event` to the subscribers registered at the time of the call.
    pub fn emit(&self, event: &T) {
        let round: Vec<Arc<SubscriberFn<T>>> = {
            let registry = self.registry.lock();
            registry.subscribers.values().cloned().collect()
        };
        for subscriber in round {
            subscriber(event);
        }
    }

    /// Number of live subscriptions.
    pub fn len(&self) -> usize {
        self.registry.lock().subscribers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<T> Default for EventEmitter<T> {
    fn default() -> Self {
        Self::new()
    }
}
