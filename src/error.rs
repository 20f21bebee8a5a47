use thiserror::Error;

// ---------------------------------------------------------------------------
// IntentStoreError
// ---------------------------------------------------------------------------

/// Failure in the durable intent store.
///
/// Persisting an intent is what makes an edit safe across reload, so these
/// are fatal to the submission they occur in: the optimistic write is rolled
/// back immediately rather than left inconsistent with storage.
#[derive(Debug, Error)]
pub enum IntentStoreError {
    #[error("Intent serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    #[cfg(feature = "sqlite")]
    #[error(transparent)]
    Sqlite(#[from] rusqlite::Error),

    #[error("Intent store backend error: {0}")]
    Backend(String),
}

// ---------------------------------------------------------------------------
// MutationError
// ---------------------------------------------------------------------------

/// Errors surfaced by `submit_edit`.
///
/// The offline condition is deliberately absent: an edit that cannot be
/// attempted is parked, not failed, and reported via `SubmitOutcome::Paused`.
#[derive(Debug, Error)]
pub enum MutationError {
    #[error("No cached entry or remote record for id \"{id}\"")]
    NotFound { id: String },

    #[error("Remote store rejected update for \"{id}\" ({status}): {message}")]
    RemoteRejected {
        id: String,
        status: u16,
        message: String,
    },

    #[error(transparent)]
    Storage(#[from] IntentStoreError),
}

// ---------------------------------------------------------------------------
// OutboxError — top-level rollup
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum OutboxError {
    #[error(transparent)]
    Mutation(#[from] MutationError),

    #[error(transparent)]
    Intent(#[from] IntentStoreError),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Convenience alias — the default error type is `OutboxError`.
pub type Result<T, E = OutboxError> = std::result::Result<T, E>;

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
