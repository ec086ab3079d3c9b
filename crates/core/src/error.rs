// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Error types for rq-core operations.

use thiserror::Error;

/// All possible errors that can occur in rq-core operations.
#[derive(Debug, Error)]
pub enum Error {
    #[error("queue entry not found: #{0}")]
    EntryNotFound(i64),

    #[error("invalid command type: '{0}'\n  hint: valid types are: meta, shell, device_route")]
    InvalidCommandType(String),

    #[error("invalid entry status: '{0}'\n  hint: valid statuses are: pending, syncing, done, failed")]
    InvalidStatus(String),

    #[error("device_route commands require a target device")]
    MissingTargetDevice,

    #[error("entry #{id} is {status}, not failed; only failed entries can be requeued")]
    NotRequeueable { id: i64, status: String },

    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("corrupted data: {0}")]
    CorruptedData(String),
}

/// A specialized Result type for rq-core operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
