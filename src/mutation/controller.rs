//! MutationController — owns the edit-and-submit lifecycle per record id.
//!
//! `submit_edit` applies the edit to the cache immediately, persists the
//! intent, then drives the remote call; `resume` replays durable intents
//! after a restart or reconnect. Both funnel into the same attempt chain,
//! which holds a per-id in-flight flag so the resume protocol is re-entrant
//! and never issues duplicate remote calls for one intent.
//!
//! Supersession: a new edit for an id with an unresolved attempt overwrites
//! the pending intent (in memory and durably) but inherits the original
//! snapshot, so a later rollback restores the value from before the *first*
//! unresolved edit. Resolutions carry the stamp of the intent they were
//! issued for and finalize nothing if a newer stamp has taken over.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use parking_lot::Mutex;
use tokio::task::JoinSet;

use crate::cache::{Fetcher, RecordCache};
use crate::error::MutationError;
use crate::intent::IntentStore;
use crate::online::OnlineManager;
use crate::reactive::{EventEmitter, OnlineEvent, StatusEvent, SubscriptionId};
use crate::remote::{RemoteError, RemoteStore};
use crate::types::{Freshness, MutationStatus, PendingIntent, Record};

use super::types::{MutationControllerOptions, ResumeReport, SubmitOutcome};

// ============================================================================
// MutationController
// ============================================================================

pub struct MutationController {
    remote: Arc<dyn RemoteStore>,
    intents: Arc<dyn IntentStore>,
    fetcher: Arc<Fetcher>,
    online: Arc<OnlineManager>,
    /// Pre-edit values, kept only while an attempt chain is unresolved.
    snapshots: Mutex<HashMap<String, Record>>,
    /// In-memory mirror of the durable store (write-through).
    pending: Mutex<HashMap<String, PendingIntent>>,
    /// Ids with an outstanding attempt chain.
    in_flight: Mutex<HashSet<String>>,
    statuses: Mutex<HashMap<String, MutationStatus>>,
    status_events: EventEmitter<StatusEvent>,
    /// Last issued submission stamp; stamps are strictly monotonic.
    last_stamp: Mutex<i64>,
}

impl MutationController {
    pub fn new(options: MutationControllerOptions) -> Self {
        let fetcher = Arc::new(Fetcher::new(
            Arc::clone(&options.cache),
            Arc::clone(&options.remote),
        ));
        Self {
            remote: options.remote,
            intents: options.intents,
            fetcher,
            online: options.online,
            snapshots: Mutex::new(HashMap::new()),
            pending: Mutex::new(HashMap::new()),
            in_flight: Mutex::new(HashSet::new()),
            statuses: Mutex::new(HashMap::new()),
            status_events: EventEmitter::new(),
            last_stamp: Mutex::new(0),
        }
    }

    // -----------------------------------------------------------------------
    // Accessors / observables
    // -----------------------------------------------------------------------

    pub fn cache(&self) -> &Arc<RecordCache> {
        self.fetcher.cache()
    }

    pub fn fetcher(&self) -> &Arc<Fetcher> {
        &self.fetcher
    }

    /// Current mutation status for `id` (`Idle` if never submitted).
    pub fn status(&self, id: &str) -> MutationStatus {
        self.statuses.lock().get(id).copied().unwrap_or_default()
    }

    /// Observe status changes — the "mutation status for id" observable.
    pub fn subscribe_status(
        &self,
        callback: impl Fn(&StatusEvent) + Send + Sync + 'static,
    ) -> SubscriptionId {
        self.status_events.subscribe(callback)
    }

    pub fn unsubscribe_status(&self, id: SubscriptionId) {
        self.status_events.unsubscribe(id);
    }

    /// The unresolved intent for `id`, if any.
    pub fn pending_intent(&self, id: &str) -> Option<PendingIntent> {
        self.pending.lock().get(id).cloned()
    }

    // -----------------------------------------------------------------------
    // submit_edit
    // -----------------------------------------------------------------------

    /// Submit an edit of `id`'s comment.
    ///
    /// The optimistic value is visible in the cache and the intent is
    /// durable before this returns control at the first await point. The
    /// offline condition is absorbed into `Ok(SubmitOutcome::Paused)`;
    /// `NotFound`, `RemoteRejected`, and `Storage` failures bubble.
    pub async fn submit_edit(
        &self,
        id: &str,
        new_comment: &str,
    ) -> Result<SubmitOutcome, MutationError> {
        let entry = self
            .cache()
            .get(id)
            .ok_or_else(|| MutationError::NotFound { id: id.to_string() })?;

        // A stale read landing after this point must not overwrite the
        // optimistic value.
        self.fetcher.cancel(id);

        // Snapshot only if no unresolved snapshot exists for this id — a
        // superseding edit inherits the original rollback target instead of
        // snapshotting its predecessor's optimistic value.
        self.snapshots
            .lock()
            .entry(id.to_string())
            .or_insert_with(|| entry.record.clone());

        let optimistic = Record {
            comment: new_comment.to_string(),
            ..entry.record
        };
        self.cache().put(optimistic, Freshness::Fresh);

        let intent = PendingIntent {
            target_id: id.to_string(),
            proposed_comment: new_comment.to_string(),
            submitted_at: self.next_stamp(),
        };

        // Write through to durable storage before attempting the remote
        // call. If this fails the reload guarantee is broken, so the
        // submission fails and the optimistic write is undone immediately.
        if let Err(e) = self.intents.put(&intent) {
            tracing::error!(id, error = %e, "failed to persist intent; rolling back");
            self.abort_submission(id);
            self.set_status(id, MutationStatus::Failed);
            return Err(MutationError::Storage(e));
        }

        self.pending.lock().insert(id.to_string(), intent);
        self.set_status(id, MutationStatus::Pending);

        self.attempt(id).await
    }

    // -----------------------------------------------------------------------
    // Resume protocol
    // -----------------------------------------------------------------------

    /// Replay durable intents: re-apply their optimistic values to the
    /// cache, then drive each one through the normal resolution path.
    ///
    /// Safe to invoke repeatedly and concurrently with itself — ids with an
    /// attempt already in flight are skipped, and intents that stay
    /// unacknowledged (offline again mid-resume) remain durable for the
    /// next cycle. Intents for distinct ids are replayed concurrently;
    /// spawn order follows original submission order.
    pub async fn resume(
        self: &Arc<Self>,
    ) -> Result<ResumeReport, crate::error::IntentStoreError> {
        let loaded = self.intents.get_all()?;
        if loaded.is_empty() {
            return Ok(ResumeReport::default());
        }
        tracing::debug!(count = loaded.len(), "resuming pending mutations");

        // Merge into the in-memory mirror without replacing newer intents
        // submitted since this cycle started.
        {
            let mut pending = self.pending.lock();
            for intent in &loaded {
                match pending.get(&intent.target_id) {
                    Some(current) if current.submitted_at >= intent.submitted_at => {}
                    _ => {
                        pending.insert(intent.target_id.clone(), intent.clone());
                    }
                }
            }
        }

        // Re-apply optimistic values. Idempotent: an entry already holding
        // the proposed comment is left untouched; a missing entry (cache
        // lost on restart) gets a stale placeholder so the title refetches.
        for intent in &loaded {
            match self.cache().record(&intent.target_id) {
                Some(record) => {
                    if record.comment != intent.proposed_comment {
                        self.cache().put(
                            Record {
                                comment: intent.proposed_comment.clone(),
                                ..record
                            },
                            Freshness::Fresh,
                        );
                    }
                }
                None => {
                    self.cache().put(
                        Record {
                            id: intent.target_id.clone(),
                            title: String::new(),
                            comment: intent.proposed_comment.clone(),
                        },
                        Freshness::Stale,
                    );
                }
            }
            self.set_status(&intent.target_id, MutationStatus::Pending);
        }

        let mut tasks = JoinSet::new();
        for intent in loaded {
            let controller = Arc::clone(self);
            tasks.spawn(async move { controller.attempt(&intent.target_id).await });
        }

        let mut report = ResumeReport::default();
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(Ok(SubmitOutcome::Completed(_))) => {
                    report.replayed += 1;
                    report.succeeded += 1;
                }
                Ok(Ok(SubmitOutcome::Paused)) => {
                    report.replayed += 1;
                    report.parked += 1;
                }
                // Already owned by a concurrent attempt chain (or resolved
                // before our task ran) — not replayed by this cycle.
                Ok(Ok(SubmitOutcome::Superseded)) => {}
                Ok(Err(e)) => {
                    tracing::warn!(error = %e, "replayed mutation failed");
                    report.replayed += 1;
                    report.failed += 1;
                }
                Err(join_err) => {
                    tracing::error!(error = %join_err, "resume task panicked");
                    report.replayed += 1;
                    report.failed += 1;
                }
            }
        }
        Ok(report)
    }

    /// Subscribe to the online manager and spawn `resume` on each
    /// offline→online transition. Must be called from within a tokio
    /// runtime; the captured handle is used to spawn the resume task.
    pub fn watch_online(self: &Arc<Self>) -> SubscriptionId {
        let controller = Arc::downgrade(self);
        let handle = tokio::runtime::Handle::current();
        self.online.on_transition(move |event| {
            if *event != OnlineEvent::Online {
                return;
            }
            let Some(controller) = controller.upgrade() else {
                return;
            };
            handle.spawn(async move {
                if let Err(e) = controller.resume().await {
                    tracing::error!(error = %e, "resume after reconnect failed");
                }
            });
        })
    }

    pub fn unwatch_online(&self, id: SubscriptionId) {
        self.online.off_transition(id);
    }

    // -----------------------------------------------------------------------
    // Attempt chain
    // -----------------------------------------------------------------------

    /// Drive the pending intent for `id` to a resolution, unless offline or
    /// another chain already owns the id.
    async fn attempt(&self, id: &str) -> Result<SubmitOutcome, MutationError> {
        if !self.pending.lock().contains_key(id) {
            return Ok(SubmitOutcome::Superseded);
        }

        if !self.online.is_online() {
            tracing::warn!(id, "offline; mutation parked until reconnect");
            self.set_status(id, MutationStatus::PausedOffline);
            return Ok(SubmitOutcome::Paused);
        }

        if !self.in_flight.lock().insert(id.to_string()) {
            // The chain in flight re-checks pending after each resolution
            // and will pick this intent up in submission order.
            return Ok(SubmitOutcome::Superseded);
        }

        let mut result = self.drive(id).await;
        loop {
            self.in_flight.lock().remove(id);
            // Close the window where a superseding edit arrived after the
            // chain resolved but before the flight flag cleared.
            let parked = matches!(result, Ok(SubmitOutcome::Paused));
            if !parked
                && self.pending.lock().contains_key(id)
                && self.online.is_online()
                && self.in_flight.lock().insert(id.to_string())
            {
                result = self.drive(id).await;
                continue;
            }
            return result;
        }
    }

    /// Send the newest pending intent for `id` until one resolves as
    /// current. Stale resolutions (the intent was superseded mid-flight)
    /// finalize nothing and loop to send the replacement.
    async fn drive(&self, id: &str) -> Result<SubmitOutcome, MutationError> {
        loop {
            let Some(intent) = self.pending.lock().get(id).cloned() else {
                return Ok(SubmitOutcome::Superseded);
            };

            match self.remote.update(id, &intent.proposed_comment).await {
                Ok(ack) => {
                    let Some(_snapshot) = self.resolve_if_current(&intent) else {
                        continue;
                    };
                    // Snapshot (if any) discarded. Drop the durable intent, then
                    // reconcile with server-confirmed state — the server
                    // may transform the stored value.
                    self.delete_intent(&intent);
                    self.cache().invalidate(id);
                    if let Err(e) = self.fetcher.refresh(id).await {
                        // Entry stays stale; a later refresh reconciles.
                        tracing::debug!(id, error = %e, "post-update refetch failed");
                    }
                    self.set_status(id, MutationStatus::Succeeded);
                    return Ok(SubmitOutcome::Completed(ack.message));
                }
                Err(RemoteError::Unreachable(reason)) => {
                    // Parked, not failed: the intent stays durable and the
                    // cache keeps the optimistic value.
                    tracing::warn!(id, %reason, "remote unreachable; mutation parked");
                    self.set_status(id, MutationStatus::PausedOffline);
                    return Ok(SubmitOutcome::Paused);
                }
                Err(RemoteError::Rejected { status, message }) => {
                    let Some(snapshot) = self.resolve_if_current(&intent) else {
                        // Stale rejection for a superseded intent — the
                        // replacement decides the outcome.
                        continue;
                    };
                    match snapshot {
                        Some(record) => self.cache().put(record, Freshness::Fresh),
                        // No pre-edit snapshot survives a restart; reconcile
                        // the rolled-back entry from the server instead.
                        None => {
                            self.cache().invalidate(id);
                            if let Err(e) = self.fetcher.refresh(id).await {
                                tracing::debug!(id, error = %e, "rollback refetch failed");
                            }
                        }
                    }
                    self.delete_intent(&intent);
                    self.set_status(id, MutationStatus::Failed);
                    return Err(MutationError::RemoteRejected {
                        id: id.to_string(),
                        status,
                        message,
                    });
                }
            }
        }
    }

    // -----------------------------------------------------------------------
    // Internal helpers
    // -----------------------------------------------------------------------

    /// If `intent` is still the pending intent for its id, remove it and its
    /// snapshot atomically and return `Some(snapshot)` — the snapshot itself
    /// may be absent (intents replayed after a restart never had one).
    /// Returns `None` when the intent was superseded, in which case the
    /// resolution must be discarded.
    fn resolve_if_current(&self, intent: &PendingIntent) -> Option<Option<Record>> {
        let mut pending = self.pending.lock();
        match pending.get(&intent.target_id) {
            Some(current) if current.submitted_at == intent.submitted_at => {
                pending.remove(&intent.target_id);
                Some(self.snapshots.lock().remove(&intent.target_id))
            }
            _ => None,
        }
    }

    /// Remove the durable intent matching `intent`'s stamp. A failure here
    /// leaves a resolved intent on disk; it will be replayed on the next
    /// resume cycle, which is harmless (same comment re-applied) and better
    /// than losing one, so it is only logged.
    fn delete_intent(&self, intent: &PendingIntent) {
        if let Err(e) = self.intents.delete(&intent.target_id, intent.submitted_at) {
            tracing::warn!(
                id = intent.target_id.as_str(),
                error = %e,
                "failed to delete resolved intent"
            );
        }
    }

    /// Undo an optimistic write whose intent could not be persisted:
    /// restore the snapshot, drop the pending mirror entry, and best-effort
    /// delete whatever intent the store holds for this id.
    fn abort_submission(&self, id: &str) {
        if let Some(previous) = self.pending.lock().remove(id) {
            self.delete_intent(&previous);
        }
        if let Some(snapshot) = self.snapshots.lock().remove(id) {
            self.cache().put(snapshot, Freshness::Fresh);
        }
    }

    fn set_status(&self, id: &str, status: MutationStatus) {
        let changed = {
            let mut statuses = self.statuses.lock();
            statuses.insert(id.to_string(), status) != Some(status)
        };
        if changed {
            self.status_events.emit(&StatusEvent {
                id: id.to_string(),
                status,
            });
        }
    }

    /// Strictly monotonic millisecond stamp, so two edits in the same
    /// millisecond still have a total submission order.
    fn next_stamp(&self) -> i64 {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as i64)
            .unwrap_or(0);
        let mut last = self.last_stamp.lock();
        let stamp = now.max(*last + 1);
        *last = stamp;
        stamp
    }
}
