// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Core queue entry types.
//!
//! This module contains the fundamental data types: QueueEntry, CommandType,
//! and EntryStatus.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};

/// Opaque key/value context attached to a queue entry (priority, validation
/// tier, etc.). Stored as JSON and passed through unmodified.
pub type Metadata = serde_json::Map<String, serde_json::Value>;

/// Classification of queued commands by the remote operation that delivers them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommandType {
    /// Meta-command that needs the remote service (e.g., history sync).
    Meta,
    /// Shell command logged to remote history for roaming.
    Shell,
    /// Command routed to another device through the remote service.
    DeviceRoute,
}

impl CommandType {
    /// Returns the string representation used in storage and display.
    pub fn as_str(&self) -> &'static str {
        match self {
            CommandType::Meta => "meta",
            CommandType::Shell => "shell",
            CommandType::DeviceRoute => "device_route",
        }
    }
}

impl fmt::Display for CommandType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for CommandType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "meta" => Ok(CommandType::Meta),
            "shell" => Ok(CommandType::Shell),
            "device_route" | "device-route" => Ok(CommandType::DeviceRoute),
            _ => Err(Error::InvalidCommandType(s.to_string())),
        }
    }
}

/// Synchronization state of a queue entry.
///
/// Legal transitions: `pending -> syncing -> done` and
/// `syncing -> failed`. The stale-syncing sweep is the only automatic path
/// back (`syncing -> pending`); `failed -> pending` requires an explicit
/// requeue by a caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryStatus {
    /// Awaiting dispatch. Initial state for new entries.
    Pending,
    /// A dispatch attempt is in flight.
    Syncing,
    /// Successfully delivered. Terminal; purged after the retention window.
    Done,
    /// Last dispatch attempt failed. Terminal unless explicitly requeued.
    Failed,
}

impl EntryStatus {
    /// Returns the string representation used in storage and display.
    pub fn as_str(&self) -> &'static str {
        match self {
            EntryStatus::Pending => "pending",
            EntryStatus::Syncing => "syncing",
            EntryStatus::Done => "done",
            EntryStatus::Failed => "failed",
        }
    }

    /// Returns true if the worker will never pick this entry up again on its own.
    pub fn is_terminal(&self) -> bool {
        matches!(self, EntryStatus::Done | EntryStatus::Failed)
    }
}

impl fmt::Display for EntryStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for EntryStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "pending" => Ok(EntryStatus::Pending),
            "syncing" => Ok(EntryStatus::Syncing),
            "done" => Ok(EntryStatus::Done),
            "failed" => Ok(EntryStatus::Failed),
            _ => Err(Error::InvalidStatus(s.to_string())),
        }
    }
}

/// One durable record representing a command awaiting remote synchronization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueueEntry {
    /// Unique, monotonically increasing id assigned at enqueue time.
    pub id: i64,
    /// When the entry was enqueued; defines FIFO ordering.
    pub queued_at: DateTime<Utc>,
    /// Which remote operation dispatches this entry.
    pub command_type: CommandType,
    /// Opaque command payload to replay remotely.
    pub command_text: String,
    /// Routing hint, required only for `device_route` entries.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_device: Option<String>,
    /// Number of failed dispatch attempts. Never reset.
    pub retry_count: u32,
    /// When the entry last entered `syncing` or `failed`; drives the
    /// stale-syncing sweep.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_retry_at: Option<DateTime<Utc>>,
    /// Current synchronization state.
    pub status: EntryStatus,
    /// Last captured failure reason, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    /// Caller-supplied context, passed through unmodified.
    #[serde(default, skip_serializing_if = "Metadata::is_empty")]
    pub metadata: Metadata,
}

#[cfg(test)]
#[path = "entry_tests.rs"]
mod tests;
