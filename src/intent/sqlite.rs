//! SQLite-backed intent store.
//!
//! The on-device durable storage behind the "safe across reload" guarantee.
//! Uses rusqlite (bundled) with WAL and a busy timeout; the connection is
//! behind a `parking_lot::Mutex` since every operation is a single statement.

use parking_lot::Mutex;
use rusqlite::{params, Connection, OptionalExtension};

use crate::error::IntentStoreError;
use crate::types::PendingIntent;

use super::IntentStore;

pub struct SqliteIntentStore {
    conn: Mutex<Connection>,
}

impl SqliteIntentStore {
    /// Open a file-backed store, creating the schema if needed.
    pub fn open(path: &str) -> Result<Self, IntentStoreError> {
        Self::from_connection(Connection::open(path)?)
    }

    /// Open an in-memory store (useful for tests; not durable).
    pub fn open_in_memory() -> Result<Self, IntentStoreError> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> Result<Self, IntentStoreError> {
        conn.execute_batch(
            "PRAGMA journal_mode=WAL;
             PRAGMA synchronous=NORMAL;
             PRAGMA busy_timeout=5000;
             CREATE TABLE IF NOT EXISTS intents (
                 target_id        TEXT PRIMARY KEY,
                 proposed_comment TEXT NOT NULL,
                 submitted_at     INTEGER NOT NULL
             );",
        )?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn row_to_intent(row: &rusqlite::Row<'_>) -> rusqlite::Result<PendingIntent> {
        Ok(PendingIntent {
            target_id: row.get(0)?,
            proposed_comment: row.get(1)?,
            submitted_at: row.get(2)?,
        })
    }
}

impl IntentStore for SqliteIntentStore {
    fn put(&self, intent: &PendingIntent) -> Result<(), IntentStoreError> {
        let conn = self.conn.lock();
        conn.execute(
            "INSERT INTO intents (target_id, proposed_comment, submitted_at)
             VALUES (?1, ?2, ?3)
             ON CONFLICT(target_id) DO UPDATE SET
                 proposed_comment = excluded.proposed_comment,
                 submitted_at = excluded.submitted_at",
            params![intent.target_id, intent.proposed_comment, intent.submitted_at],
        )?;
        Ok(())
    }

    fn get(&self, target_id: &str) -> Result<Option<PendingIntent>, IntentStoreError> {
        let conn = self.conn.lock();
        let intent = conn
            .query_row(
                "SELECT target_id, proposed_comment, submitted_at
                 FROM intents WHERE target_id = ?1",
                params![target_id],
                Self::row_to_intent,
            )
            .optional()?;
        Ok(intent)
    }

    fn get_all(&self) -> Result<Vec<PendingIntent>, IntentStoreError> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare(
            "SELECT target_id, proposed_comment, submitted_at
             FROM intents ORDER BY submitted_at ASC",
        )?;
        let rows = stmt.query_map([], Self::row_to_intent)?;
        let mut all = Vec::new();
        for row in rows {
            all.push(row?);
        }
        Ok(all)
    }

    fn delete(&self, target_id: &str, submitted_at: i64) -> Result<bool, IntentStoreError> {
        let conn = self.conn.lock();
        let removed = conn.execute(
            "DELETE FROM intents WHERE target_id = ?1 AND submitted_at = ?2",
            params![target_id, submitted_at],
        )?;
        Ok(removed > 0)
    }
}
