// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Remote service abstraction.
//!
//! The actual remote client lives outside this crate; the engine only
//! consumes this trait. A mock implementation is all the worker tests need.

use thiserror::Error;

/// Error raised by a remote dispatch operation.
#[derive(Debug, Clone, Error)]
#[error("{0}")]
pub struct RemoteError(String);

impl RemoteError {
    /// Create a remote error with the given reason.
    pub fn new(reason: impl Into<String>) -> Self {
        RemoteError(reason.into())
    }
}

/// Result of a remote dispatch operation.
///
/// `Ok(false)` means the remote reported failure; `Err` means the operation
/// itself could not be carried out. The worker treats both as a dispatch
/// failure for the entry concerned.
pub type RemoteResult = std::result::Result<bool, RemoteError>;

/// Client for the remote service the queue synchronizes against.
///
/// All operations are expected to complete within seconds; any internal
/// timeout is the implementation's responsibility.
pub trait RemoteClient: Send + Sync {
    /// Probe whether the remote service is reachable.
    ///
    /// Infallible by signature: implementations absorb their own errors and
    /// report them as unavailability.
    fn is_available(&self) -> bool;

    /// Route a command to another device.
    fn route_command(&self, target_device: &str, command: &str) -> RemoteResult;

    /// Execute a meta-command on the remote service.
    fn execute_cloud_meta(&self, command: &str) -> RemoteResult;

    /// Record a shell command in the remote history.
    fn log_command_history(&self, command: &str) -> RemoteResult;
}
