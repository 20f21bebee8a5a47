//! RemoteStore — the consumed remote record-store contract.
//!
//! The remote store is a black box reachable over HTTP returning JSON:
//!
//! - `GET  /records`           → [`ListResponse`]
//! - `GET  /records/{id}`      → [`DetailResponse`] (404 if absent)
//! - `POST /records/{id}` `{comment}` → [`UpdateResponse`]
//!
//! As with the storage layer, the concrete transport is user-provided —
//! implementations live with the embedding application (or tests), which
//! decode the wire envelopes via serde and map transport-level failures to
//! [`RemoteError`].

use async_trait::async_trait;
use thiserror::Error;

use crate::types::{DetailResponse, ListResponse, UpdateResponse};

/// User-implemented remote record store.
#[async_trait]
pub trait RemoteStore: Send + Sync {
    /// List all records (ids and titles only).
    async fn list(&self) -> Result<ListResponse, RemoteError>;

    /// Fetch one record by id. Absent records surface as
    /// `RemoteError::Rejected { status: 404, .. }`.
    async fn fetch(&self, id: &str) -> Result<DetailResponse, RemoteError>;

    /// Update one record's comment. The server may transform the stored
    /// value (e.g. normalization), so callers must refetch after success
    /// rather than trusting the optimistic value.
    async fn update(&self, id: &str, comment: &str) -> Result<UpdateResponse, RemoteError>;
}

/// Remote call failure.
#[derive(Debug, Clone, Error)]
pub enum RemoteError {
    /// The remote store answered with a non-success response. Not retried.
    #[error("remote rejected ({status}): {message}")]
    Rejected { status: u16, message: String },

    /// The call could not be attempted or completed — the device is offline
    /// or the host is unreachable. This is the parked condition, not an
    /// error: the durable intent stays and is replayed on reconnect.
    #[error("remote unreachable: {0}")]
    Unreachable(String),
}

impl RemoteError {
    pub fn not_found(id: &str) -> Self {
        Self::Rejected {
            status: 404,
            message: format!("Record with id {id} not found"),
        }
    }

    /// Whether this failure parks the mutation instead of failing it.
    pub fn is_offline(&self) -> bool {
        matches!(self, Self::Unreachable(_))
    }
}
