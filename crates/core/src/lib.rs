// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! rq-core - durable offline command queue with background sync.
//!
//! This crate provides the synchronization engine for the `relayq` CLI:
//! a SQLite-backed FIFO queue of commands awaiting remote delivery, and a
//! background worker that drains it whenever the remote service is reachable.
//!
//! # Main Components
//!
//! - [`PersistentQueue`] - SQLite-backed store of [`QueueEntry`] rows with a
//!   guarded status state machine
//! - [`SyncWorker`] - background thread that probes availability, dispatches
//!   batches, and backs off exponentially on failure
//! - [`RemoteClient`] - the seam for the external remote service client
//! - [`Error`] - error types for all operations

mod entry;
mod error;
mod queue;
mod remote;
mod worker;

pub use entry::{CommandType, EntryStatus, Metadata, QueueEntry};
pub use error::{Error, Result};
pub use queue::{PersistentQueue, QueueStatus};
pub use remote::{RemoteClient, RemoteError, RemoteResult};
pub use worker::{SyncWorker, WorkerConfig};
