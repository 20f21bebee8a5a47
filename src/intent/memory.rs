//! In-memory intent store — no durability across restarts. Useful for tests
//! and for embeddings that wire their own persistence underneath.

use std::collections::HashMap;

use parking_lot::Mutex;

use crate::error::IntentStoreError;
use crate::types::PendingIntent;

use super::IntentStore;

#[derive(Default)]
pub struct MemoryIntentStore {
    intents: Mutex<HashMap<String, PendingIntent>>,
}

impl MemoryIntentStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl IntentStore for MemoryIntentStore {
    fn put(&self, intent: &PendingIntent) -> Result<(), IntentStoreError> {
        self.intents
            .lock()
            .insert(intent.target_id.clone(), intent.clone());
        Ok(())
    }

    fn get(&self, target_id: &str) -> Result<Option<PendingIntent>, IntentStoreError> {
        Ok(self.intents.lock().get(target_id).cloned())
    }

    fn get_all(&self) -> Result<Vec<PendingIntent>, IntentStoreError> {
        let mut all: Vec<PendingIntent> = self.intents.lock().values().cloned().collect();
        all.sort_by_key(|i| i.submitted_at);
        Ok(all)
    }

    fn delete(&self, target_id: &str, submitted_at: i64) -> Result<bool, IntentStoreError> {
        let mut intents = self.intents.lock();
        match intents.get(target_id) {
            Some(stored) if stored.submitted_at == submitted_at => {
                intents.remove(target_id);
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}
