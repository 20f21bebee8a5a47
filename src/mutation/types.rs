//! Controller configuration and result types.

use std::sync::Arc;

use crate::cache::RecordCache;
use crate::intent::IntentStore;
use crate::online::OnlineManager;
use crate::remote::RemoteStore;

/// Configuration for [`MutationController`](super::MutationController).
///
/// The cache is passed in rather than created internally so the embedding
/// application can share it with its read path.
pub struct MutationControllerOptions {
    pub remote: Arc<dyn RemoteStore>,
    pub intents: Arc<dyn IntentStore>,
    pub cache: Arc<RecordCache>,
    pub online: Arc<OnlineManager>,
}

/// How a submission (or a replayed intent) resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// The remote store acknowledged the edit; the cached entry has been
    /// invalidated and refetched. Carries the server's success message.
    Completed(String),
    /// The edit could not be attempted (offline). The intent stays durable
    /// and the cached entry keeps the optimistic value; the resume protocol
    /// will replay it. Not an error.
    Paused,
    /// Another attempt chain for this id is already in flight; it will send
    /// this intent when the stale call resolves. Nothing further to do.
    Superseded,
}

/// Aggregated result of one resume cycle.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResumeReport {
    /// Intents actually driven to a resolution (or parked) this cycle.
    pub replayed: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub parked: usize,
}
