//! Foreground clipboard monitor loop.
//!
//! Two independent triggers share one check: a fixed-interval tick (2 seconds
//! by default) and the app-activation signal. Both funnel into the detection
//! pipeline, whose single-flight guard collapses a near-simultaneous pair
//! into a single check. The loop runs one immediate check at startup, then
//! returns to idle after every check regardless of outcome, and exits
//! deterministically when the shutdown channel flips — no periodic work
//! survives teardown.

use crate::detect::DetectionPipeline;
use crate::lifecycle::AppState;
use crate::service_state::ServiceState;
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, watch, Notify};
use tracing::{debug, info, warn};

/// Handle returned to the caller so it can trigger an early check or shut
/// the loop down.
pub struct MonitorHandle {
    /// Notify to run a check ahead of the next tick.
    pub wake: Arc<Notify>,
    /// Send `true` to shut down.
    pub shutdown_tx: watch::Sender<bool>,
}

/// Spawn the monitor as a tokio task. Returns a `JoinHandle` and a
/// `MonitorHandle` for control.
pub fn spawn_monitor(
    pipeline: Arc<DetectionPipeline>,
    state: Arc<Mutex<ServiceState>>,
    interval: Duration,
    mut activation_rx: broadcast::Receiver<AppState>,
) -> (tokio::task::JoinHandle<()>, MonitorHandle) {
    let wake = Arc::new(Notify::new());
    let (shutdown_tx, mut shutdown_rx) = watch::channel(false);

    let wake_clone = wake.clone();

    let handle = tokio::spawn(async move {
        info!(
            interval_secs = interval.as_secs(),
            "clipboard monitor started"
        );

        // first check before the first tick
        run_check(&pipeline, &state);

        let mut lifecycle_open = true;
        loop {
            tokio::select! {
                _ = tokio::time::sleep(interval) => {}
                event = activation_rx.recv(), if lifecycle_open => {
                    match event {
                        Ok(AppState::Active) => {
                            debug!("app activated, checking clipboard");
                        }
                        Ok(_) => continue,
                        Err(broadcast::error::RecvError::Lagged(n)) => {
                            warn!(missed = n, "activation events lagged");
                            continue;
                        }
                        Err(broadcast::error::RecvError::Closed) => {
                            debug!("lifecycle channel closed");
                            lifecycle_open = false;
                            continue;
                        }
                    }
                }
                _ = wake_clone.notified() => {
                    debug!("monitor woken early");
                }
                _ = shutdown_rx.changed() => {
                    if *shutdown_rx.borrow() {
                        info!("clipboard monitor shutting down");
                        return;
                    }
                }
            }

            // Check shutdown again after wakeup.
            if *shutdown_rx.borrow() {
                return;
            }

            run_check(&pipeline, &state);
        }
    });

    (handle, MonitorHandle { wake, shutdown_tx })
}

fn run_check(pipeline: &DetectionPipeline, state: &Mutex<ServiceState>) {
    let key = state.lock().active_key.clone();
    let outcome = pipeline.check_and_decrypt(&key);
    debug!(outcome = outcome.label(), "clipboard check finished");
}
