// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use thiserror::Error;

/// All possible errors that can occur in the rqcli library.
///
/// Errors provide user-friendly messages with hints for common issues.
#[derive(Debug, Error)]
pub enum Error {
    #[error("not initialized: run 'relayq init' first")]
    NotInitialized,

    #[error("already initialized at {0}")]
    AlreadyInitialized(String),

    #[error("config error: {0}")]
    Config(String),

    #[error("invalid metadata '{0}'\n  hint: metadata takes the form key=value")]
    InvalidMetadata(String),

    #[error("sync worker already running (lock held on {0})")]
    WorkerAlreadyRunning(String),

    #[error(transparent)]
    Core(#[from] rq_core::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
