//! OnlineManager — tracks connectivity and notifies on transitions.
//!
//! The embedding application flips the flag from whatever connectivity
//! signal it has (browser events, socket errors, a health probe). The
//! mutation controller subscribes to offline→online transitions to re-enter
//! the resume protocol.

use std::sync::atomic::{AtomicBool, Ordering};

use crate::reactive::{EventEmitter, OnlineEvent, SubscriptionId};

pub struct OnlineManager {
    online: AtomicBool,
    transitions: EventEmitter<OnlineEvent>,
}

impl OnlineManager {
    /// Create a manager with the given initial state. No event is emitted
    /// for the initial state.
    pub fn new(online: bool) -> Self {
        Self {
            online: AtomicBool::new(online),
            transitions: EventEmitter::new(),
        }
    }

    pub fn is_online(&self) -> bool {
        self.online.load(Ordering::SeqCst)
    }

    /// Update connectivity. Emits a transition event only when the state
    /// actually changes, so repeated signals from the platform are cheap.
    pub fn set_online(&self, online: bool) {
        let previous = self.online.swap(online, Ordering::SeqCst);
        if previous != online {
            let event = if online {
                OnlineEvent::Online
            } else {
                OnlineEvent::Offline
            };
            tracing::debug!(?event, "connectivity transition");
            self.transitions.emit(&event);
        }
    }

    /// Register a transition callback. Returns the subscription handle.
    pub fn on_transition(
        &self,
        callback: impl Fn(&OnlineEvent) + Send + Sync + 'static,
    ) -> SubscriptionId {
        self.transitions.subscribe(callback)
    }

    pub fn off_transition(&self, id: SubscriptionId) {
        self.transitions.unsubscribe(id);
    }
}

impl Default for OnlineManager {
    fn default() -> Self {
        Self::new(true)
    }
}
