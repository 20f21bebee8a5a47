//! Core data types: records, cached entries, pending intents, and the wire
//! envelopes returned by the remote store.
//!
//! All payload types derive serde so shapes are validated at the boundary
//! instead of trusted. Record ids are canonically `String` — the remote
//! contract uses string route parameters throughout.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Record
// ---------------------------------------------------------------------------

/// A record owned by the remote store. Clients only ever edit `comment`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub comment: String,
}

/// Listing entry — the list endpoint omits comments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordSummary {
    pub id: String,
    pub title: String,
}

// ---------------------------------------------------------------------------
// Wire envelopes
// ---------------------------------------------------------------------------

/// `GET /records` response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListResponse {
    /// Server clock, unix milliseconds.
    pub timestamp: i64,
    pub records: Vec<RecordSummary>,
}

/// `GET /records/{id}` response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetailResponse {
    pub timestamp: i64,
    pub record: Record,
}

/// `POST /records/{id}` response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateResponse {
    pub message: String,
}

// ---------------------------------------------------------------------------
// Cached entries
// ---------------------------------------------------------------------------

/// Freshness of a cached entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Freshness {
    /// Value reflects the last confirmed read or an optimistic write.
    Fresh,
    /// Value should be refetched before being trusted.
    Stale,
    /// A refetch for this entry is currently in flight.
    Fetching,
}

/// A client-local copy of a record plus its freshness flag.
///
/// Exactly one entry exists per id; last write wins. The visible record is
/// always either the last remote-confirmed value or the optimistic value of
/// a pending intent — never a rollback snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachedEntry {
    pub record: Record,
    pub freshness: Freshness,
}

// ---------------------------------------------------------------------------
// Pending intents
// ---------------------------------------------------------------------------

/// A pending mutation, durable until the remote store acknowledges it.
///
/// At most one intent exists per `target_id` at any time — a newer edit for
/// the same record overwrites the stored intent rather than queueing behind
/// it. `submitted_at` is a strictly monotonic millisecond stamp issued by
/// the controller, so replay order and supersession checks are total.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingIntent {
    pub target_id: String,
    pub proposed_comment: String,
    pub submitted_at: i64,
}

// ---------------------------------------------------------------------------
// Mutation status
// ---------------------------------------------------------------------------

/// Per-record mutation lifecycle state, observable by the UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MutationStatus {
    /// No mutation has been submitted for this record.
    #[default]
    Idle,
    /// An edit was submitted and its remote call is outstanding.
    Pending,
    /// The edit could not be attempted; it is parked until reconnect.
    PausedOffline,
    /// The last edit was acknowledged by the remote store.
    Succeeded,
    /// The last edit was rejected (or could not be persisted) and rolled back.
    Failed,
}
