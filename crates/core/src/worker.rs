// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Background sync worker.
//!
//! One long-lived thread polls remote availability and drains batches of
//! pending entries through the queue, recording each outcome per entry.
//! The loop backs off exponentially after iterations with no successful
//! dispatch, and recovers entries stranded in `syncing` by a prior crash
//! before every iteration.
//!
//! Exactly one worker instance must run against a given queue: dispatch is
//! a "dequeue then mark" two-step, which concurrent workers could race.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Condvar, Mutex};
use std::thread;
use std::time::{Duration, Instant};

use crate::entry::{CommandType, QueueEntry};
use crate::error::Result;
use crate::queue::PersistentQueue;
use crate::remote::{RemoteClient, RemoteError, RemoteResult};

/// Callback invoked with the count of successfully synced entries.
pub type SyncCallback = dyn Fn(usize) + Send + Sync;

/// Tuning knobs for the sync worker.
#[derive(Debug, Clone)]
pub struct WorkerConfig {
    /// Base wait between loop iterations and availability checks.
    pub poll_interval: Duration,
    /// Upper bound on the exponential backoff wait.
    pub max_backoff: Duration,
    /// Maximum entries dispatched per batch pass.
    pub batch_size: usize,
    /// How long an entry may sit in `syncing` before the sweep reclaims it.
    pub stale_timeout: Duration,
    /// How long `stop` waits for the thread to exit before detaching.
    pub stop_timeout: Duration,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        WorkerConfig {
            poll_interval: Duration::from_secs(30),
            max_backoff: Duration::from_secs(300),
            batch_size: 10,
            stale_timeout: Duration::from_secs(300),
            stop_timeout: Duration::from_secs(5),
        }
    }
}

/// Cooperative stop flag with a cancellable wait.
struct StopSignal {
    stop: Mutex<bool>,
    cv: Condvar,
}

impl StopSignal {
    fn new() -> Self {
        StopSignal {
            stop: Mutex::new(false),
            cv: Condvar::new(),
        }
    }

    fn request_stop(&self) {
        let mut stop = match self.stop.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        *stop = true;
        self.cv.notify_all();
    }

    fn stop_requested(&self) -> bool {
        self.stop.lock().map(|guard| *guard).unwrap_or(true)
    }

    /// Sleep for up to `timeout`, waking early on stop. Returns true if stop
    /// was requested.
    fn wait(&self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        let mut stop = match self.stop.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        while !*stop {
            let now = Instant::now();
            if now >= deadline {
                return false;
            }
            let result = self.cv.wait_timeout(stop, deadline - now);
            stop = match result {
                Ok((guard, _)) => guard,
                Err(_) => return true,
            };
        }
        true
    }
}

/// Background worker that syncs queued commands when the remote is available.
pub struct SyncWorker<R: RemoteClient + 'static> {
    db_path: PathBuf,
    remote: Arc<R>,
    config: WorkerConfig,
    signal: Option<Arc<StopSignal>>,
    handle: Option<thread::JoinHandle<()>>,
    on_sync_complete: Option<Arc<SyncCallback>>,
}

impl<R: RemoteClient + 'static> SyncWorker<R> {
    /// Create a worker for the queue at `db_path`, dispatching through `remote`.
    pub fn new(db_path: impl Into<PathBuf>, remote: Arc<R>, config: WorkerConfig) -> Self {
        let worker = SyncWorker {
            db_path: db_path.into(),
            remote,
            config,
            signal: None,
            handle: None,
            on_sync_complete: None,
        };
        tracing::debug!(
            poll_interval_secs = worker.config.poll_interval.as_secs(),
            "sync worker initialized"
        );
        worker
    }

    /// Register a callback fired with the synced count after each non-empty
    /// successful batch (for UI notification). Must be set before `start`.
    pub fn on_sync_complete(&mut self, callback: impl Fn(usize) + Send + Sync + 'static) {
        self.on_sync_complete = Some(Arc::new(callback));
    }

    /// Returns true if the background thread is currently running.
    pub fn is_running(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }

    /// Start the background sync thread. Calling while already running is a
    /// logged no-op.
    pub fn start(&mut self) {
        if self.is_running() {
            tracing::warn!("sync worker already running");
            return;
        }

        let signal = Arc::new(StopSignal::new());
        let db_path = self.db_path.clone();
        let remote = Arc::clone(&self.remote);
        let config = self.config.clone();
        let callback = self.on_sync_complete.clone();
        let thread_signal = Arc::clone(&signal);

        self.signal = Some(signal);
        self.handle = Some(thread::spawn(move || {
            run_loop(&db_path, remote.as_ref(), &config, &thread_signal, callback);
        }));
        tracing::info!("sync worker started");
    }

    /// Request a stop and wait (bounded by the stop timeout) for the thread
    /// to exit. An in-flight dispatch is allowed to finish; if it overruns
    /// the timeout the thread is detached and exits at the next iteration
    /// boundary.
    pub fn stop(&mut self) {
        let Some(handle) = self.handle.take() else {
            return;
        };
        if let Some(signal) = self.signal.take() {
            signal.request_stop();
        }

        let deadline = Instant::now() + self.config.stop_timeout;
        while !handle.is_finished() && Instant::now() < deadline {
            thread::sleep(Duration::from_millis(10));
        }

        if handle.is_finished() {
            let _ = handle.join();
            tracing::info!("sync worker stopped");
        } else {
            tracing::warn!("sync worker did not stop within timeout; detaching");
        }
    }

    /// Run one batch pass immediately, without checking availability first.
    ///
    /// For the explicit "sync now" action: dispatch is attempted even if the
    /// remote is offline, in which case each attempt fails individually and
    /// is recorded on its entry. Never errors; returns the number of entries
    /// successfully synced (0 on any storage problem, which is logged).
    pub fn force_sync(&self) -> usize {
        tracing::info!("force sync requested");
        let queue = match PersistentQueue::open(&self.db_path) {
            Ok(queue) => queue,
            Err(e) => {
                tracing::error!("force sync could not open queue: {e}");
                return 0;
            }
        };

        match sync_batch(&queue, self.remote.as_ref(), self.config.batch_size) {
            Ok(synced) => synced,
            Err(e) => {
                tracing::error!("force sync failed: {e}");
                0
            }
        }
    }
}

/// Outcome of one loop iteration.
enum Iteration {
    /// Remote unreachable; wait the plain poll interval.
    Unavailable,
    /// Batch pass ran; count of successful dispatches.
    Synced(usize),
    /// Storage error during sweep or batch; counts as a failed iteration.
    Error(crate::error::Error),
}

/// Main background loop with exponential backoff.
fn run_loop<R: RemoteClient>(
    db_path: &Path,
    remote: &R,
    config: &WorkerConfig,
    signal: &StopSignal,
    on_sync_complete: Option<Arc<SyncCallback>>,
) {
    let queue = match PersistentQueue::open(db_path) {
        Ok(queue) => queue,
        Err(e) => {
            tracing::error!("sync worker could not open queue: {e}");
            return;
        }
    };

    let mut consecutive_failures: u32 = 0;

    while !signal.stop_requested() {
        match run_iteration(&queue, remote, config) {
            Iteration::Unavailable => {
                // Plain poll interval while offline; backoff only applies to
                // iterations that actually attempted a batch.
                if signal.wait(config.poll_interval) {
                    break;
                }
                continue;
            }
            Iteration::Synced(synced) if synced > 0 => {
                consecutive_failures = 0;
                tracing::info!(synced, "successfully synced commands");
                if let Some(callback) = &on_sync_complete {
                    callback(synced);
                }
            }
            Iteration::Synced(_) => {
                consecutive_failures = consecutive_failures.saturating_add(1);
            }
            Iteration::Error(e) => {
                tracing::error!("sync iteration failed: {e}");
                consecutive_failures = consecutive_failures.saturating_add(1);
            }
        }

        let wait = backoff_delay(config.poll_interval, consecutive_failures, config.max_backoff);
        if signal.wait(wait) {
            break;
        }
    }

    tracing::debug!("sync worker loop exited");
}

/// One iteration: crash-recovery sweep, availability probe, batch pass.
fn run_iteration<R: RemoteClient>(
    queue: &PersistentQueue,
    remote: &R,
    config: &WorkerConfig,
) -> Iteration {
    // Recover entries stranded in 'syncing' by a prior crash
    if let Err(e) = queue.reset_stale_syncing(config.stale_timeout) {
        return Iteration::Error(e);
    }

    if !remote.is_available() {
        return Iteration::Unavailable;
    }

    match sync_batch(queue, remote, config.batch_size) {
        Ok(synced) => Iteration::Synced(synced),
        Err(e) => Iteration::Error(e),
    }
}

/// Dispatch up to `batch_size` pending entries, independently per entry.
///
/// One entry's failure never prevents processing of the rest of the batch.
/// Returns the number of entries successfully synced.
pub(crate) fn sync_batch<R: RemoteClient + ?Sized>(
    queue: &PersistentQueue,
    remote: &R,
    batch_size: usize,
) -> Result<usize> {
    let pending = queue.dequeue_eligible(batch_size)?;
    let mut synced = 0;

    for entry in pending {
        if let Err(e) = queue.mark_syncing(entry.id) {
            tracing::error!("could not claim entry #{}: {e}", entry.id);
            continue;
        }

        match dispatch(&entry, remote) {
            Ok(true) => {
                if let Err(e) = queue.mark_done(entry.id) {
                    // The stale sweep will reclaim it; dispatch is idempotent
                    tracing::error!("could not record success for #{}: {e}", entry.id);
                }
                synced += 1;
            }
            Ok(false) => record_failure(queue, entry.id, "remote dispatch returned false"),
            Err(e) => record_failure(queue, entry.id, &e.to_string()),
        }
    }

    Ok(synced)
}

fn record_failure(queue: &PersistentQueue, id: i64, reason: &str) {
    if let Err(e) = queue.mark_failed(id, reason) {
        tracing::error!("could not record failure for #{id}: {e}");
    }
}

/// Dispatch one entry through the remote operation selected by its type.
fn dispatch<R: RemoteClient + ?Sized>(entry: &QueueEntry, remote: &R) -> RemoteResult {
    match entry.command_type {
        CommandType::DeviceRoute => match entry.target_device.as_deref() {
            Some(target) => remote.route_command(target, &entry.command_text),
            None => Err(RemoteError::new("device_route entry has no target device")),
        },
        CommandType::Meta => remote.execute_cloud_meta(&entry.command_text),
        CommandType::Shell => remote.log_command_history(&entry.command_text),
    }
}

/// Wait before the next iteration: `min(base * 2^failures, cap)`.
pub(crate) fn backoff_delay(base: Duration, consecutive_failures: u32, cap: Duration) -> Duration {
    let factor = 2u32.saturating_pow(consecutive_failures);
    base.saturating_mul(factor).min(cap)
}

#[cfg(test)]
#[path = "worker_tests.rs"]
mod tests;
