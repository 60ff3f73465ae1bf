//! Periodic background decrypt task.
//!
//! Stand-in for the host's background scheduler: runs the same detection
//! logic as the foreground monitor on a coarse interval (never finer than the
//! 15-minute host minimum). It has no access to the in-memory active key, so
//! it selects the most recently used persisted key and falls back to the
//! configured default. Each run reports a tri-state result; every failure is
//! caught at the task boundary and mapped to [`TaskResult::Failed`] — the
//! loop itself never deregisters.
//!
//! The persisted marker is shared with the foreground monitor, so whichever
//! trigger processes a tagged payload first suppresses the other.

use crate::detect::{CheckOutcome, DetectionPipeline};
use safesay_core::settings::MIN_BACKGROUND_INTERVAL_SECS;
use safesay_core::storage::load_key_history;
use safesay_core::store::StateStore;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{watch, Notify};
use tracing::{info, warn};

/// Result contract reported to the host scheduler after each run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskResult {
    NewData,
    NoData,
    Failed,
}

pub struct BackgroundTask {
    pipeline: Arc<DetectionPipeline>,
    store: Arc<dyn StateStore>,
    default_key: String,
}

impl BackgroundTask {
    pub fn new(
        pipeline: Arc<DetectionPipeline>,
        store: Arc<dyn StateStore>,
        default_key: String,
    ) -> Self {
        Self {
            pipeline,
            store,
            default_key,
        }
    }

    /// One scheduled run. Never panics the loop: the pipeline absorbs its own
    /// failures and an unrunnable check surfaces as `Failed`.
    pub fn run_once(&self) -> TaskResult {
        let key = load_key_history(self.store.as_ref())
            .most_recent()
            .map(str::to_string)
            .unwrap_or_else(|| self.default_key.clone());

        match self.pipeline.check_and_decrypt(&key) {
            CheckOutcome::Decrypted { .. } => TaskResult::NewData,
            CheckOutcome::Failed => TaskResult::Failed,
            CheckOutcome::Duplicate
            | CheckOutcome::Untagged
            | CheckOutcome::Empty
            | CheckOutcome::Busy => TaskResult::NoData,
        }
    }
}

/// Handle returned to the caller so it can force a run or deregister.
pub struct BackgroundHandle {
    /// Notify to run ahead of the next scheduled slot.
    pub wake: Arc<Notify>,
    /// Send `true` to deregister the task.
    pub shutdown_tx: watch::Sender<bool>,
}

/// Clamp a requested interval to the host scheduler's minimum granularity.
pub fn effective_interval(requested: Duration) -> Duration {
    let min = Duration::from_secs(MIN_BACKGROUND_INTERVAL_SECS);
    if requested < min {
        warn!(
            requested_secs = requested.as_secs(),
            "background interval below host minimum, clamping"
        );
        min
    } else {
        requested
    }
}

/// Spawn the background task loop. Returns a `JoinHandle` and a
/// `BackgroundHandle` for control.
pub fn spawn_background_task(
    task: Arc<BackgroundTask>,
    requested_interval: Duration,
) -> (tokio::task::JoinHandle<()>, BackgroundHandle) {
    let interval = effective_interval(requested_interval);
    let wake = Arc::new(Notify::new());
    let (shutdown_tx, mut shutdown_rx) = watch::channel(false);

    let wake_clone = wake.clone();

    let handle = tokio::spawn(async move {
        info!(
            interval_secs = interval.as_secs(),
            "background task registered"
        );

        loop {
            tokio::select! {
                _ = tokio::time::sleep(interval) => {}
                _ = wake_clone.notified() => {
                    info!("background task woken early");
                }
                _ = shutdown_rx.changed() => {
                    if *shutdown_rx.borrow() {
                        info!("background task deregistered");
                        return;
                    }
                }
            }

            // Check shutdown again after wakeup.
            if *shutdown_rx.borrow() {
                return;
            }

            let result = task.run_once();
            info!(result = ?result, "background check finished");
        }
    });

    (handle, BackgroundHandle { wake, shutdown_tx })
}
