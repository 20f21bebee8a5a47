//! Durable intent store — the key-value persistence surface that makes
//! pending mutations survive a process restart.
//!
//! Keyed by record id: at most one intent per record, last write wins.
//! Single-writer discipline: only the mutation controller writes here, and
//! the store is read once per resume cycle.

mod memory;
#[cfg(feature = "sqlite")]
mod sqlite;

pub use memory::MemoryIntentStore;
#[cfg(feature = "sqlite")]
pub use sqlite::SqliteIntentStore;

use crate::error::IntentStoreError;
use crate::types::PendingIntent;

/// Persistence surface for pending mutation intents.
///
/// Methods are synchronous; backends are expected to be fast local storage.
/// Implementors must be `Send + Sync` so the store can be shared with
/// spawned resume tasks.
pub trait IntentStore: Send + Sync {
    /// Insert or overwrite the intent for `intent.target_id`.
    fn put(&self, intent: &PendingIntent) -> Result<(), IntentStoreError>;

    /// The stored intent for `target_id`, if any.
    fn get(&self, target_id: &str) -> Result<Option<PendingIntent>, IntentStoreError>;

    /// All stored intents, ordered by `submitted_at` ascending (replay order).
    fn get_all(&self) -> Result<Vec<PendingIntent>, IntentStoreError>;

    /// Remove the intent for `target_id`, but only if its stored
    /// `submitted_at` equals `submitted_at` — a superseding intent written
    /// in the meantime must not be deleted by the resolution of the edit it
    /// replaced. Returns whether a row was removed.
    fn delete(&self, target_id: &str, submitted_at: i64) -> Result<bool, IntentStoreError>;
}
