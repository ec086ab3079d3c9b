// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! SQLite-backed persistent command queue.
//!
//! The [`PersistentQueue`] is the single source of truth for what needs
//! synchronizing. Every operation is a short, self-contained transaction on
//! one long-lived connection; WAL mode plus a busy timeout let the producer
//! side and the worker side hold separate handles on the same database.
//!
//! Status transitions are guarded in SQL (`WHERE status IN (...)`), so an
//! entry can never jump straight from `pending` to `done` no matter how the
//! methods are called.

use std::path::Path;
use std::time::Duration;

use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{params, Connection, OptionalExtension};

use crate::entry::{CommandType, EntryStatus, Metadata, QueueEntry};
use crate::error::{Error, Result};

/// SQL schema for the command queue database.
pub const SCHEMA: &str = r#"
-- Durable queue of commands awaiting remote synchronization.
-- AUTOINCREMENT keeps ids strictly increasing and never reused, even
-- across deletes and process restarts.
CREATE TABLE IF NOT EXISTS command_queue (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    queued_at TEXT NOT NULL,
    command_type TEXT NOT NULL,
    command_text TEXT NOT NULL,
    target_device TEXT,
    retry_count INTEGER NOT NULL DEFAULT 0,
    last_retry_at TEXT,
    status TEXT NOT NULL DEFAULT 'pending',
    error_message TEXT,
    metadata TEXT NOT NULL DEFAULT '{}'
);

-- Indexes for the two secondary access patterns: by status and FIFO order.
CREATE INDEX IF NOT EXISTS idx_queue_status ON command_queue(status);
CREATE INDEX IF NOT EXISTS idx_queue_queued_at ON command_queue(queued_at);
"#;

const SELECT_COLUMNS: &str = "id, queued_at, command_type, command_text, target_device, \
     retry_count, last_retry_at, status, error_message, metadata";

/// Parse a string value from the database, returning a rusqlite error on parse failure.
fn parse_db<T: std::str::FromStr>(
    value: &str,
    column: &str,
) -> std::result::Result<T, rusqlite::Error> {
    value.parse().map_err(|_| {
        rusqlite::Error::FromSqlConversionFailure(
            0,
            rusqlite::types::Type::Text,
            Box::new(Error::CorruptedData(format!(
                "invalid value '{value}' in column '{column}'"
            ))),
        )
    })
}

/// Parse an RFC3339 timestamp from the database.
fn parse_timestamp(
    value: &str,
    column: &str,
) -> std::result::Result<DateTime<Utc>, rusqlite::Error> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| {
            rusqlite::Error::FromSqlConversionFailure(
                0,
                rusqlite::types::Type::Text,
                Box::new(Error::CorruptedData(format!(
                    "invalid timestamp '{value}' in column '{column}'"
                ))),
            )
        })
}

/// Parse the metadata JSON blob from the database.
fn parse_metadata(value: &str) -> std::result::Result<Metadata, rusqlite::Error> {
    serde_json::from_str(value).map_err(|_| {
        rusqlite::Error::FromSqlConversionFailure(
            0,
            rusqlite::types::Type::Text,
            Box::new(Error::CorruptedData(format!("invalid metadata '{value}'"))),
        )
    })
}

/// Format a timestamp for storage.
///
/// Fixed-width micros keep the stored format lexicographically ordered, so
/// SQL string comparison on timestamp columns matches chronological order.
fn timestamp(dt: DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Point-in-time aggregate view of the queue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueueStatus {
    /// Entries awaiting dispatch.
    pub pending: u64,
    /// Entries whose last dispatch attempt failed.
    pub failed: u64,
    /// Successfully synchronized entries still inside the retention window.
    pub done: u64,
    /// Enqueue time of the newest `done` entry, if any sync has succeeded.
    pub last_sync: Option<DateTime<Utc>>,
}

/// Durable FIFO store of queue entries with a guarded status state machine.
pub struct PersistentQueue {
    conn: Connection,
}

impl PersistentQueue {
    /// Open a queue database at the given path, creating it if needed.
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            if !parent.exists() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let conn = Connection::open(path)?;

        // WAL mode plus busy timeout so producer and worker handles coexist
        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA busy_timeout = 5000;",
        )?;

        conn.execute_batch(SCHEMA)?;
        tracing::debug!(path = %path.display(), "command queue opened");
        Ok(PersistentQueue { conn })
    }

    /// Open an in-memory queue (for testing).
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(SCHEMA)?;
        Ok(PersistentQueue { conn })
    }

    /// Add a command to the queue, returning its assigned id.
    ///
    /// The entry is durably recorded in status `pending` before this returns.
    /// `device_route` commands must carry a target device.
    pub fn enqueue(
        &self,
        command: &str,
        command_type: CommandType,
        target_device: Option<&str>,
        metadata: Option<Metadata>,
    ) -> Result<i64> {
        if command_type == CommandType::DeviceRoute && target_device.is_none() {
            return Err(Error::MissingTargetDevice);
        }

        let metadata_json = serde_json::to_string(&metadata.unwrap_or_default())?;
        self.conn.execute(
            "INSERT INTO command_queue (queued_at, command_type, command_text, target_device, metadata)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                timestamp(Utc::now()),
                command_type.as_str(),
                command,
                target_device,
                metadata_json,
            ],
        )?;
        let id = self.conn.last_insert_rowid();

        tracing::info!(id, command_type = %command_type, "queued command");
        Ok(id)
    }

    /// Get pending entries in FIFO order, up to `limit`.
    ///
    /// Read-only: no state changes. Only `pending` entries are ever eligible
    /// for dispatch.
    pub fn dequeue_eligible(&self, limit: usize) -> Result<Vec<QueueEntry>> {
        let sql = format!(
            "SELECT {SELECT_COLUMNS} FROM command_queue
             WHERE status = 'pending'
             ORDER BY queued_at ASC, id ASC
             LIMIT ?1"
        );
        let mut stmt = self.conn.prepare(&sql)?;

        let limit_i64 = i64::try_from(limit).unwrap_or(i64::MAX);
        let entries = stmt
            .query_map(params![limit_i64], map_entry)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(entries)
    }

    /// Get a single entry by id.
    pub fn get_entry(&self, id: i64) -> Result<QueueEntry> {
        let sql = format!("SELECT {SELECT_COLUMNS} FROM command_queue WHERE id = ?1");
        let entry = self
            .conn
            .query_row(&sql, params![id], map_entry)
            .optional()?;

        entry.ok_or(Error::EntryNotFound(id))
    }

    /// List entries, optionally filtered by status, in FIFO order.
    pub fn list(&self, status: Option<EntryStatus>) -> Result<Vec<QueueEntry>> {
        let sql = match status {
            Some(_) => format!(
                "SELECT {SELECT_COLUMNS} FROM command_queue
                 WHERE status = ?1 ORDER BY queued_at ASC, id ASC"
            ),
            None => format!(
                "SELECT {SELECT_COLUMNS} FROM command_queue ORDER BY queued_at ASC, id ASC"
            ),
        };
        let mut stmt = self.conn.prepare(&sql)?;

        let entries = match status {
            Some(s) => stmt
                .query_map(params![s.as_str()], map_entry)?
                .collect::<std::result::Result<Vec<_>, _>>()?,
            None => stmt
                .query_map([], map_entry)?
                .collect::<std::result::Result<Vec<_>, _>>()?,
        };

        Ok(entries)
    }

    /// Mark an entry as currently being dispatched.
    ///
    /// Transition `pending|failed -> syncing`, stamping `last_retry_at`.
    /// Safe to call on an entry already `syncing` (the stamp is refreshed);
    /// a `done` entry is left untouched.
    pub fn mark_syncing(&self, id: i64) -> Result<()> {
        let affected = self.conn.execute(
            "UPDATE command_queue
             SET status = 'syncing', last_retry_at = ?1
             WHERE id = ?2 AND status IN ('pending', 'failed', 'syncing')",
            params![timestamp(Utc::now()), id],
        )?;

        if affected == 0 {
            self.ensure_exists(id)?;
        }
        Ok(())
    }

    /// Mark an entry as successfully synchronized.
    ///
    /// Terminal transition `syncing -> done`. Idempotent: marking a `done`
    /// entry again is a no-op.
    pub fn mark_done(&self, id: i64) -> Result<()> {
        let affected = self.conn.execute(
            "UPDATE command_queue
             SET status = 'done'
             WHERE id = ?1 AND status IN ('syncing', 'done')",
            params![id],
        )?;

        if affected == 0 {
            self.ensure_exists(id)?;
        }
        tracing::info!(id, "command synced successfully");
        Ok(())
    }

    /// Mark a dispatch attempt as failed.
    ///
    /// Transition `syncing -> failed`: increments `retry_count`, records the
    /// error, and stamps `last_retry_at`.
    pub fn mark_failed(&self, id: i64, error: &str) -> Result<()> {
        let affected = self.conn.execute(
            "UPDATE command_queue
             SET status = 'failed',
                 retry_count = retry_count + 1,
                 error_message = ?1,
                 last_retry_at = ?2
             WHERE id = ?3 AND status = 'syncing'",
            params![error, timestamp(Utc::now()), id],
        )?;

        if affected == 0 {
            self.ensure_exists(id)?;
        }
        tracing::warn!(id, error, "command sync failed");
        Ok(())
    }

    /// Explicitly return a failed entry to eligibility (`failed -> pending`).
    ///
    /// The worker never retries `failed` entries on its own; this is the
    /// caller-driven requeue path. `retry_count` is preserved.
    pub fn requeue_failed(&self, id: i64) -> Result<()> {
        let affected = self.conn.execute(
            "UPDATE command_queue
             SET status = 'pending'
             WHERE id = ?1 AND status = 'failed'",
            params![id],
        )?;

        if affected == 0 {
            let entry = self.get_entry(id)?;
            return Err(Error::NotRequeueable {
                id,
                status: entry.status.to_string(),
            });
        }

        tracing::info!(id, "requeued failed command");
        Ok(())
    }

    /// Reset entries stuck in `syncing` longer than `timeout` back to `pending`.
    ///
    /// This is the crash-recovery sweep: the only mechanism that returns an
    /// entry to eligibility after a dispatch attempt began but never
    /// completed. Returns the number of entries reclaimed.
    pub fn reset_stale_syncing(&self, timeout: Duration) -> Result<usize> {
        let cutoff = timestamp(Utc::now() - timeout);
        let reclaimed = self.conn.execute(
            "UPDATE command_queue
             SET status = 'pending'
             WHERE status = 'syncing'
               AND last_retry_at < ?1",
            params![cutoff],
        )?;

        if reclaimed > 0 {
            tracing::warn!(reclaimed, "reset stale syncing entries to pending");
        }
        Ok(reclaimed)
    }

    /// Get queue statistics: per-status counts and the last sync timestamp.
    pub fn status(&self) -> Result<QueueStatus> {
        let mut stmt = self.conn.prepare(
            "SELECT status, COUNT(*) FROM command_queue GROUP BY status",
        )?;
        let counts = stmt
            .query_map([], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?))
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        let mut status = QueueStatus {
            pending: 0,
            failed: 0,
            done: 0,
            last_sync: None,
        };
        for (name, count) in counts {
            let count = u64::try_from(count).unwrap_or(0);
            match name.as_str() {
                "pending" => status.pending = count,
                "failed" => status.failed = count,
                "done" => status.done = count,
                _ => {}
            }
        }

        let last_sync: Option<String> = self.conn.query_row(
            "SELECT MAX(queued_at) FROM command_queue WHERE status = 'done'",
            [],
            |row| row.get(0),
        )?;
        if let Some(raw) = last_sync {
            status.last_sync = Some(
                DateTime::parse_from_rfc3339(&raw)
                    .map(|dt| dt.with_timezone(&Utc))
                    .map_err(|_| {
                        Error::CorruptedData(format!("invalid timestamp '{raw}' in column 'queued_at'"))
                    })?,
            );
        }

        Ok(status)
    }

    /// Delete `done` entries older than the retention window, in days.
    ///
    /// Entries in any other status are preserved regardless of age. Returns
    /// the number of entries deleted.
    pub fn purge_older_than(&self, days: u32) -> Result<usize> {
        let cutoff = timestamp(Utc::now() - Duration::from_secs(u64::from(days) * 86_400));
        let deleted = self.conn.execute(
            "DELETE FROM command_queue
             WHERE status = 'done'
               AND queued_at < ?1",
            params![cutoff],
        )?;

        if deleted > 0 {
            tracing::info!(deleted, "purged old queue entries");
        }
        Ok(deleted)
    }

    /// Error with [`Error::EntryNotFound`] if no row has the given id.
    fn ensure_exists(&self, id: i64) -> Result<()> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM command_queue WHERE id = ?1",
            params![id],
            |row| row.get(0),
        )?;
        if count == 0 {
            return Err(Error::EntryNotFound(id));
        }
        Ok(())
    }
}

/// Map a database row to a [`QueueEntry`].
fn map_entry(row: &rusqlite::Row<'_>) -> std::result::Result<QueueEntry, rusqlite::Error> {
    let queued_str: String = row.get(1)?;
    let type_str: String = row.get(2)?;
    let retry_raw: i64 = row.get(5)?;
    let last_retry_str: Option<String> = row.get(6)?;
    let status_str: String = row.get(7)?;
    let metadata_str: String = row.get(9)?;

    let last_retry_at = match last_retry_str {
        Some(s) => Some(parse_timestamp(&s, "last_retry_at")?),
        None => None,
    };

    Ok(QueueEntry {
        id: row.get(0)?,
        queued_at: parse_timestamp(&queued_str, "queued_at")?,
        command_type: parse_db(&type_str, "command_type")?,
        command_text: row.get(3)?,
        target_device: row.get(4)?,
        retry_count: u32::try_from(retry_raw).unwrap_or(0),
        last_retry_at,
        status: parse_db(&status_str, "status")?,
        error_message: row.get(8)?,
        metadata: parse_metadata(&metadata_str)?,
    })
}

#[cfg(test)]
#[path = "queue_tests.rs"]
mod tests;
