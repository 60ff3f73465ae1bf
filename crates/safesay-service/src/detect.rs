//! Shared clipboard detection pipeline.
//!
//! Both the foreground monitor and the background task funnel through
//! [`DetectionPipeline::check_and_decrypt`]. One check: read the clipboard,
//! normalize line endings, require the wire tag, dedup against the persisted
//! marker, decrypt, persist the marker, notify. Every failure is absorbed and
//! logged here; nothing propagates to the trigger.
//!
//! Checks are single-flight: an atomic in-flight flag turns a concurrent
//! trigger into a no-op, so two near-simultaneous triggers cannot emit
//! duplicate notifications. That flag is also what serializes the marker
//! read-then-write — the store itself offers no compare-and-swap.

use crate::dispatch::NotificationDispatcher;
use crate::service_state::ServiceState;
use parking_lot::Mutex;
use safesay_core::cipher::{normalize_line_endings, transform, Direction};
use safesay_core::clipboard::ClipboardService;
use safesay_core::storage::{load_marker, save_marker};
use safesay_core::store::StateStore;
use safesay_core::tag;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, warn};

/// What a single check did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckOutcome {
    /// New tagged content was decrypted and dispatched.
    Decrypted { plaintext: String },
    /// Content matched the persisted marker; already handled.
    Duplicate,
    /// Clipboard content carries no wire tag.
    Untagged,
    /// Clipboard is empty.
    Empty,
    /// Another check was already in flight; this trigger was a no-op.
    Busy,
    /// The check could not run (clipboard or store failure); cycle skipped.
    Failed,
}

impl CheckOutcome {
    pub fn label(&self) -> &'static str {
        match self {
            CheckOutcome::Decrypted { .. } => "decrypted",
            CheckOutcome::Duplicate => "duplicate",
            CheckOutcome::Untagged => "untagged",
            CheckOutcome::Empty => "empty",
            CheckOutcome::Busy => "busy",
            CheckOutcome::Failed => "failed",
        }
    }
}

pub struct DetectionPipeline {
    clipboard: Arc<dyn ClipboardService>,
    store: Arc<dyn StateStore>,
    dispatcher: NotificationDispatcher,
    state: Arc<Mutex<ServiceState>>,
    in_flight: AtomicBool,
}

/// Clears the in-flight flag when the check leaves scope, on every path.
struct InFlightGuard<'a>(&'a AtomicBool);

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl DetectionPipeline {
    pub fn new(
        clipboard: Arc<dyn ClipboardService>,
        store: Arc<dyn StateStore>,
        dispatcher: NotificationDispatcher,
        state: Arc<Mutex<ServiceState>>,
    ) -> Self {
        Self {
            clipboard,
            store,
            dispatcher,
            state,
            in_flight: AtomicBool::new(false),
        }
    }

    /// Run one detection cycle with `key`. Idempotent for unchanged clipboard
    /// content and safely re-entrant; never returns an error.
    pub fn check_and_decrypt(&self, key: &str) -> CheckOutcome {
        if self
            .in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            debug!("check already in flight, trigger ignored");
            return CheckOutcome::Busy;
        }
        let _guard = InFlightGuard(&self.in_flight);
        self.run_check(key)
    }

    fn run_check(&self, key: &str) -> CheckOutcome {
        let raw = match self.clipboard.read() {
            Ok(raw) => raw,
            Err(err) => {
                warn!(error = %err, "clipboard read failed, skipping cycle");
                return CheckOutcome::Failed;
            }
        };
        let content = normalize_line_endings(&raw);
        if content.is_empty() {
            return CheckOutcome::Empty;
        }

        let cipher_text = match tag::unwrap(&content) {
            Some(cipher_text) => cipher_text,
            None => return CheckOutcome::Untagged,
        };

        let marker = match load_marker(self.store.as_ref()) {
            Ok(marker) => marker,
            Err(err) => {
                warn!(error = %err, "marker unavailable, skipping cycle");
                return CheckOutcome::Failed;
            }
        };
        if marker.as_deref() == Some(content.as_ref()) {
            return CheckOutcome::Duplicate;
        }

        let plaintext = transform(cipher_text, key, Direction::Decrypt);
        self.state.lock().record_decrypt(cipher_text, &plaintext);

        // persist the full tagged string, not just the ciphertext
        if let Err(err) = save_marker(self.store.as_ref(), &content) {
            warn!(error = %err, "marker write failed, a duplicate notification is possible");
        }

        self.dispatcher.dispatch(&plaintext);
        CheckOutcome::Decrypted { plaintext }
    }
}
