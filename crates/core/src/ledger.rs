// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! SQLite-backed dedup ledger.
//!
//! The ledger records every message that has already been processed so a
//! re-fetch never notifies twice. Identity is the (body, received_at)
//! pair - see [`crate::message::Message::dedup_key`]. Entries are
//! terminal: nothing updates or deletes them.
//!
//! Overlapping sync runs share one ledger, so the uniqueness guarantee
//! lives in the schema (`PRIMARY KEY (body, received_at)`) rather than in
//! caller-side locking; `insert` uses `INSERT OR IGNORE` and a lost race
//! is indistinguishable from a successful insert.

use std::path::Path;
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};

use crate::error::{Error, Result};
use crate::message::Message;

/// SQL schema for the dedup ledger.
pub const SCHEMA: &str = r#"
-- Processed messages, keyed by dedup identity
CREATE TABLE IF NOT EXISTS messages (
    body TEXT NOT NULL,
    received_at TEXT NOT NULL,
    server_id INTEGER NOT NULL,
    title TEXT,
    inserted_at TEXT NOT NULL,
    PRIMARY KEY (body, received_at)
);

CREATE INDEX IF NOT EXISTS idx_messages_server_id ON messages(server_id);
"#;

/// Capability interface over the dedup ledger.
///
/// `Send + Sync` because concurrent pipeline runs share one instance.
pub trait Ledger: Send + Sync {
    /// Returns true if a message with this (body, received_at) identity
    /// has already been processed.
    fn exists(&self, body: &str, received_at: DateTime<Utc>) -> Result<bool>;

    /// Records a processed message. Inserting an identity that is already
    /// present is a no-op, never an error.
    fn insert(&self, message: &Message) -> Result<()>;
}

/// SQLite implementation of [`Ledger`].
pub struct SqliteLedger {
    conn: Mutex<Connection>,
}

impl SqliteLedger {
    /// Opens (creating if needed) the ledger database at the given path.
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)?;
        conn.execute_batch(SCHEMA)?;
        Ok(SqliteLedger {
            conn: Mutex::new(conn),
        })
    }

    /// Number of recorded messages.
    pub fn len(&self) -> Result<usize> {
        let conn = self.lock()?;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM messages", [], |row| row.get(0))?;
        Ok(usize::try_from(count).unwrap_or(0))
    }

    /// Returns true if no messages have been recorded.
    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| Error::Ledger("connection lock poisoned".to_string()))
    }
}

impl Ledger for SqliteLedger {
    fn exists(&self, body: &str, received_at: DateTime<Utc>) -> Result<bool> {
        let conn = self.lock()?;
        let found = conn
            .query_row(
                "SELECT 1 FROM messages WHERE body = ?1 AND received_at = ?2",
                params![body, received_at.to_rfc3339()],
                |_| Ok(()),
            )
            .optional()?;
        Ok(found.is_some())
    }

    fn insert(&self, message: &Message) -> Result<()> {
        let conn = self.lock()?;
        conn.execute(
            "INSERT OR IGNORE INTO messages (body, received_at, server_id, title, inserted_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                message.message,
                message.date.to_rfc3339(),
                message.id,
                message.title,
                Utc::now().to_rfc3339(),
            ],
        )?;
        Ok(())
    }
}

#[cfg(test)]
#[path = "ledger_tests.rs"]
mod tests;
