//! Domain events emitted by the cache, the mutation controller, and the
//! online manager.

use crate::types::MutationStatus;

/// Emitted by `RecordCache` after each write, so subscribers know which
/// record's visible value changed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheEvent {
    /// An entry was inserted or overwritten.
    Updated { id: String },
    /// An entry was marked stale.
    Invalidated { id: String },
    /// An entry was dropped from the cache.
    Removed { id: String },
}

impl CacheEvent {
    /// The record the event refers to.
    pub fn id(&self) -> &str {
        match self {
            Self::Updated { id } => id,
            Self::Invalidated { id } => id,
            Self::Removed { id } => id,
        }
    }
}

/// Emitted by the mutation controller whenever a record's mutation status
/// changes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusEvent {
    pub id: String,
    pub status: MutationStatus,
}

/// Emitted by `OnlineManager` on connectivity transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OnlineEvent {
    Online,
    Offline,
}
