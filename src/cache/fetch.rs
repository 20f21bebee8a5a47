//! Fetcher — refresh coordination for the record cache.
//!
//! Each id carries a generation counter. A refetch captures the generation
//! before calling the remote store and only writes its result back if the
//! generation is unchanged when the call returns. `cancel` bumps the
//! generation, which is how an edit submission prevents a stale in-flight
//! read from overwriting its optimistic write.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::cache::RecordCache;
use crate::remote::{RemoteError, RemoteStore};
use crate::types::{CachedEntry, Freshness, Record};

pub struct Fetcher {
    cache: Arc<RecordCache>,
    remote: Arc<dyn RemoteStore>,
    generations: Mutex<HashMap<String, u64>>,
}

impl Fetcher {
    pub fn new(cache: Arc<RecordCache>, remote: Arc<dyn RemoteStore>) -> Self {
        Self {
            cache,
            remote,
            generations: Mutex::new(HashMap::new()),
        }
    }

    pub fn cache(&self) -> &Arc<RecordCache> {
        &self.cache
    }

    /// Cancel any in-flight read for `id`. The read itself keeps running,
    /// but its result is dropped instead of written to the cache.
    pub fn cancel(&self, id: &str) {
        let mut generations = self.generations.lock();
        *generations.entry(id.to_string()).or_insert(0) += 1;
    }

    fn generation(&self, id: &str) -> u64 {
        *self.generations.lock().get(id).unwrap_or(&0)
    }

    /// Serve `id` from the cache, or fetch it from the remote store and
    /// cache it. A cached entry is returned regardless of freshness — stale
    /// reads are refreshed via [`Fetcher::refresh`], not here.
    pub async fn get_or_fetch(&self, id: &str) -> Result<CachedEntry, RemoteError> {
        if let Some(entry) = self.cache.get(id) {
            return Ok(entry);
        }
        match self.refresh(id).await? {
            Some(record) => Ok(CachedEntry {
                record,
                freshness: Freshness::Fresh,
            }),
            // Cancelled mid-fetch by an edit; the optimistic entry is
            // authoritative now.
            None => self.cache.get(id).ok_or_else(|| RemoteError::not_found(id)),
        }
    }

    /// Refetch `id` from the remote store.
    ///
    /// Returns `Ok(Some(record))` when the confirmed value was written to
    /// the cache, `Ok(None)` when the read was cancelled while in flight.
    /// A 404 removes the cached entry before surfacing the rejection, so a
    /// record deleted server-side does not linger locally.
    pub async fn refresh(&self, id: &str) -> Result<Option<Record>, RemoteError> {
        let generation = self.generation(id);
        self.cache.mark(id, Freshness::Fetching);

        let outcome = self.remote.fetch(id).await;

        if self.generation(id) != generation {
            // Cancelled: a later write owns the entry now.
            tracing::debug!(id, "dropping cancelled refetch result");
            return Ok(None);
        }

        match outcome {
            Ok(detail) => {
                let record = detail.record;
                self.cache.put(record.clone(), Freshness::Fresh);
                Ok(Some(record))
            }
            Err(err @ RemoteError::Rejected { status: 404, .. }) => {
                self.cache.remove(id);
                Err(err)
            }
            Err(err) => {
                // Leave the value in place but flag it for a later retry.
                self.cache.mark(id, Freshness::Stale);
                Err(err)
            }
        }
    }
}
