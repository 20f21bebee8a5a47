//! RecordCache — client-local keyed copies of remote records.
//!
//! One entry per record id, last write wins. The cache is an explicit object
//! owned by whoever constructs the controller, not ambient shared state:
//! the controller writes optimistic values and rollbacks through `put`, the
//! fetcher writes confirmed values, and the UI observes via `subscribe`.
//!
//! No eviction — retention is unbounded for the lifetime of the process,
//! acceptable for the small session-scoped datasets this serves.

use std::collections::HashMap;

use parking_lot::Mutex;

use crate::reactive::{CacheEvent, EventEmitter, SubscriptionId};
use crate::types::{CachedEntry, Freshness, Record};

pub struct RecordCache {
    entries: Mutex<HashMap<String, CachedEntry>>,
    events: EventEmitter<CacheEvent>,
}

impl RecordCache {
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            events: EventEmitter::new(),
        }
    }

    /// The cached entry for `id`, if present.
    pub fn get(&self, id: &str) -> Option<CachedEntry> {
        self.entries.lock().get(id).cloned()
    }

    /// The cached record for `id`, ignoring freshness.
    pub fn record(&self, id: &str) -> Option<Record> {
        self.entries.lock().get(id).map(|e| e.record.clone())
    }

    /// Insert or overwrite the entry for `record.id`.
    ///
    /// Used for confirmed reads (`Fresh`), optimistic writes (`Fresh` — the
    /// optimistic value is what the UI should show), rollbacks, and the
    /// stale placeholders created when resuming into an empty cache.
    pub fn put(&self, record: Record, freshness: Freshness) {
        let id = record.id.clone();
        self.entries
            .lock()
            .insert(id.clone(), CachedEntry { record, freshness });
        self.events.emit(&CacheEvent::Updated { id });
    }

    /// Mark the entry for `id` stale. Returns whether an entry was present.
    pub fn invalidate(&self, id: &str) -> bool {
        let present = {
            let mut entries = self.entries.lock();
            match entries.get_mut(id) {
                Some(entry) => {
                    entry.freshness = Freshness::Stale;
                    true
                }
                None => false,
            }
        };
        if present {
            self.events.emit(&CacheEvent::Invalidated { id: id.to_string() });
        }
        present
    }

    /// Set only the freshness flag, without touching the value or notifying
    /// subscribers. Used by the fetcher to flag in-flight refetches.
    pub(crate) fn mark(&self, id: &str, freshness: Freshness) -> bool {
        let mut entries = self.entries.lock();
        match entries.get_mut(id) {
            Some(entry) => {
                entry.freshness = freshness;
                true
            }
            None => false,
        }
    }

    /// Drop the entry for `id`. Returns whether an entry was present.
    pub fn remove(&self, id: &str) -> bool {
        let removed = self.entries.lock().remove(id).is_some();
        if removed {
            self.events.emit(&CacheEvent::Removed { id: id.to_string() });
        }
        removed
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Observe cache changes — the "current value for id" observable.
    pub fn subscribe(
        &self,
        callback: impl Fn(&CacheEvent) + Send + Sync + 'static,
    ) -> SubscriptionId {
        self.events.subscribe(callback)
    }

    pub fn unsubscribe(&self, id: SubscriptionId) {
        self.events.unsubscribe(id);
    }
}

impl Default for RecordCache {
    fn default() -> Self {
        Self::new()
    }
}
