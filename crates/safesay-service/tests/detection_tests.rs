//! Integration tests for the detection pipeline and its persisted state.
//!
//! Tests cover:
//!  1. Tagged clipboard → decrypt + notify + marker persisted
//!  2. Dedup idempotence (second identical check is silent)
//!  3. Untagged content never auto-decrypts
//!  4. Clipboard denial skips the cycle and recovers
//!  5. Background task tri-state result contract
//!  6. Background key selection (history MRU, else default)
//!  7. Marker sharing between foreground and background checks
//!  8. Notification truncation at the preview limit
//!  9. CRLF clipboard content normalizes before decrypt and dedup
//! 10. Single-flight guard turns a concurrent trigger into a no-op

use parking_lot::Mutex;
use safesay_core::cipher::{transform, Direction};
use safesay_core::clipboard::{ClipboardError, ClipboardService, MemoryClipboard};
use safesay_core::history::KeyHistory;
use safesay_core::notify::Notifier;
use safesay_core::storage::{load_marker, save_key_history};
use safesay_core::store::MemoryStore;
use safesay_core::tag;
use safesay_service::background::{BackgroundTask, TaskResult};
use safesay_service::detect::{CheckOutcome, DetectionPipeline};
use safesay_service::dispatch::NotificationDispatcher;
use safesay_service::service_state::ServiceState;
use std::sync::Arc;
use std::time::Duration;

/// Notifier that records every delivery as a `(title, body)` pair.
#[derive(Default)]
struct RecordingNotifier {
    sent: Mutex<Vec<(String, String)>>,
}

impl RecordingNotifier {
    fn count(&self) -> usize {
        self.sent.lock().len()
    }

    fn last_body(&self) -> Option<String> {
        self.sent.lock().last().map(|(_, body)| body.clone())
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, title: &str, body: &str, _payload: serde_json::Value) -> anyhow::Result<()> {
        self.sent.lock().push((title.to_string(), body.to_string()));
        Ok(())
    }
}

struct Fixture {
    clipboard: Arc<MemoryClipboard>,
    store: Arc<MemoryStore>,
    notifier: Arc<RecordingNotifier>,
    state: Arc<Mutex<ServiceState>>,
    pipeline: Arc<DetectionPipeline>,
}

fn fixture_with_preview_limit(limit: usize) -> Fixture {
    let clipboard = Arc::new(MemoryClipboard::new());
    let store = Arc::new(MemoryStore::new());
    let notifier = Arc::new(RecordingNotifier::default());
    let state = Arc::new(Mutex::new(ServiceState::new(
        store.clone(),
        KeyHistory::new(),
    )));
    let dispatcher = NotificationDispatcher::new(notifier.clone(), limit);
    let pipeline = Arc::new(DetectionPipeline::new(
        clipboard.clone(),
        store.clone(),
        dispatcher,
        state.clone(),
    ));
    Fixture {
        clipboard,
        store,
        notifier,
        state,
        pipeline,
    }
}

fn fixture() -> Fixture {
    fixture_with_preview_limit(100)
}

fn tagged(plain: &str, key: &str) -> String {
    tag::wrap(&transform(plain, key, Direction::Encrypt))
}

// ─── Test 1: Tagged clipboard → decrypt + notify + marker ───────────────────

#[test]
fn tagged_content_is_decrypted_and_marked() {
    let f = fixture();
    let wire = tagged("meet at noon", "safety");
    f.clipboard.set_contents(&wire);

    let outcome = f.pipeline.check_and_decrypt("safety");
    assert_eq!(
        outcome,
        CheckOutcome::Decrypted {
            plaintext: "meet at noon".to_string()
        }
    );
    assert_eq!(f.notifier.count(), 1);
    assert_eq!(f.notifier.last_body().as_deref(), Some("meet at noon"));

    // marker holds the full tagged string, not just the ciphertext
    assert_eq!(load_marker(f.store.as_ref()).unwrap().as_deref(), Some(wire.as_str()));

    let state = f.state.lock();
    assert_eq!(state.plaintext, "meet at noon");
    assert_eq!(tag::wrap(&state.ciphertext), wire);
}

// ─── Test 2: Dedup idempotence ──────────────────────────────────────────────

#[test]
fn second_check_with_unchanged_clipboard_is_silent() {
    let f = fixture();
    f.clipboard.set_contents(&tagged("once", "safety"));

    assert!(matches!(
        f.pipeline.check_and_decrypt("safety"),
        CheckOutcome::Decrypted { .. }
    ));
    assert_eq!(f.pipeline.check_and_decrypt("safety"), CheckOutcome::Duplicate);
    assert_eq!(f.pipeline.check_and_decrypt("safety"), CheckOutcome::Duplicate);
    assert_eq!(f.notifier.count(), 1);
}

// ─── Test 3: Untagged content is left alone ─────────────────────────────────

#[test]
fn untagged_content_is_never_decrypted() {
    let f = fixture();
    f.clipboard.set_contents("just some copied text");

    assert_eq!(f.pipeline.check_and_decrypt("safety"), CheckOutcome::Untagged);
    assert_eq!(f.notifier.count(), 0);
    assert_eq!(load_marker(f.store.as_ref()).unwrap(), None);

    f.clipboard.set_contents("");
    assert_eq!(f.pipeline.check_and_decrypt("safety"), CheckOutcome::Empty);
    assert_eq!(f.notifier.count(), 0);
}

// ─── Test 4: Clipboard denial skips the cycle and recovers ──────────────────

#[test]
fn clipboard_denial_skips_cycle_without_crashing() {
    let f = fixture();
    let wire = tagged("private", "safety");
    f.clipboard.set_contents(&wire);
    f.clipboard.set_denied(true);

    assert_eq!(f.pipeline.check_and_decrypt("safety"), CheckOutcome::Failed);
    assert_eq!(f.notifier.count(), 0);
    assert_eq!(load_marker(f.store.as_ref()).unwrap(), None);

    // permission restored: the next cycle picks the payload up
    f.clipboard.set_denied(false);
    assert!(matches!(
        f.pipeline.check_and_decrypt("safety"),
        CheckOutcome::Decrypted { .. }
    ));
    assert_eq!(f.notifier.count(), 1);
}

// ─── Test 5: Background tri-state contract ──────────────────────────────────

#[test]
fn background_task_maps_outcomes_to_tri_state_results() {
    let f = fixture();
    let task = BackgroundTask::new(f.pipeline.clone(), f.store.clone(), "safety".to_string());

    // empty clipboard
    assert_eq!(task.run_once(), TaskResult::NoData);

    // fresh tagged payload
    f.clipboard.set_contents(&tagged("wake up", "safety"));
    assert_eq!(task.run_once(), TaskResult::NewData);

    // unchanged payload
    assert_eq!(task.run_once(), TaskResult::NoData);

    // clipboard failure maps to Failed, and the task survives it
    f.clipboard.set_denied(true);
    assert_eq!(task.run_once(), TaskResult::Failed);
    f.clipboard.set_denied(false);
    assert_eq!(task.run_once(), TaskResult::NoData);
}

// ─── Test 6: Background key selection ───────────────────────────────────────

#[test]
fn background_task_uses_most_recent_key_else_default() {
    let f = fixture();
    let task = BackgroundTask::new(f.pipeline.clone(), f.store.clone(), "safety".to_string());

    // no history: the configured default key decrypts
    f.clipboard.set_contents(&tagged("default path", "safety"));
    assert_eq!(task.run_once(), TaskResult::NewData);
    assert_eq!(f.notifier.last_body().as_deref(), Some("default path"));

    // with history: the most recently used key wins
    let mut history = KeyHistory::new();
    history.touch("safety");
    history.touch("стая");
    save_key_history(f.store.as_ref(), &history).unwrap();

    f.clipboard.set_contents(&tagged("history path", "стая"));
    assert_eq!(task.run_once(), TaskResult::NewData);
    assert_eq!(f.notifier.last_body().as_deref(), Some("history path"));
}

// ─── Test 7: Marker sharing between foreground and background ───────────────

#[test]
fn first_processor_suppresses_the_other() {
    let f = fixture();
    let task = BackgroundTask::new(f.pipeline.clone(), f.store.clone(), "safety".to_string());
    f.clipboard.set_contents(&tagged("only once", "safety"));

    // foreground wins the race; the background run sees the shared marker
    assert!(matches!(
        f.pipeline.check_and_decrypt("safety"),
        CheckOutcome::Decrypted { .. }
    ));
    assert_eq!(task.run_once(), TaskResult::NoData);
    assert_eq!(f.notifier.count(), 1);

    // and the other way around for the next payload
    f.clipboard.set_contents(&tagged("again once", "safety"));
    assert_eq!(task.run_once(), TaskResult::NewData);
    assert_eq!(f.pipeline.check_and_decrypt("safety"), CheckOutcome::Duplicate);
    assert_eq!(f.notifier.count(), 2);
}

// ─── Test 8: Notification truncation ────────────────────────────────────────

#[test]
fn notification_body_truncates_at_preview_limit() {
    let f = fixture_with_preview_limit(10);
    let plain = "abcdefghijklmnop";
    f.clipboard.set_contents(&tagged(plain, "safety"));

    assert!(matches!(
        f.pipeline.check_and_decrypt("safety"),
        CheckOutcome::Decrypted { .. }
    ));
    assert_eq!(f.notifier.last_body().as_deref(), Some("abcdefghij..."));
    // display state keeps the untruncated plaintext
    assert_eq!(f.state.lock().plaintext, plain);
}

// ─── Test 9: CRLF normalization before decrypt and dedup ────────────────────

#[test]
fn crlf_clipboard_content_normalizes_before_decrypt() {
    let f = fixture();
    let plain = "line one\nline two";
    let wire = tagged(plain, "safety");
    // a Windows transport rewrote the newline inside the ciphertext
    let mangled = wire.replace('\n', "\r\n");
    f.clipboard.set_contents(&mangled);

    assert_eq!(
        f.pipeline.check_and_decrypt("safety"),
        CheckOutcome::Decrypted {
            plaintext: plain.to_string()
        }
    );
    // the marker stores the normalized form, so the mangled copy dedups too
    assert_eq!(load_marker(f.store.as_ref()).unwrap().as_deref(), Some(wire.as_str()));
    assert_eq!(f.pipeline.check_and_decrypt("safety"), CheckOutcome::Duplicate);
    assert_eq!(f.notifier.count(), 1);
}

// ─── Test 10: Single-flight guard ───────────────────────────────────────────

/// Clipboard whose reads park on a gate the test controls, to hold a check
/// in flight deliberately.
struct GatedClipboard {
    gate: std::sync::Mutex<()>,
    contents: String,
    entered: std::sync::atomic::AtomicBool,
}

impl ClipboardService for GatedClipboard {
    fn read(&self) -> Result<String, ClipboardError> {
        self.entered
            .store(true, std::sync::atomic::Ordering::SeqCst);
        let _hold = self.gate.lock().unwrap();
        Ok(self.contents.clone())
    }

    fn write(&self, _text: &str) -> Result<(), ClipboardError> {
        Ok(())
    }
}

#[test]
fn concurrent_trigger_during_check_is_a_no_op() {
    let clipboard = Arc::new(GatedClipboard {
        gate: std::sync::Mutex::new(()),
        contents: tagged("racy", "safety"),
        entered: std::sync::atomic::AtomicBool::new(false),
    });
    let store = Arc::new(MemoryStore::new());
    let notifier = Arc::new(RecordingNotifier::default());
    let state = Arc::new(Mutex::new(ServiceState::new(
        store.clone(),
        KeyHistory::new(),
    )));
    let pipeline = Arc::new(DetectionPipeline::new(
        clipboard.clone(),
        store,
        NotificationDispatcher::new(notifier.clone(), 100),
        state,
    ));

    // hold the gate so the first check blocks inside the clipboard read
    let hold = clipboard.gate.lock().unwrap();
    let racing = {
        let pipeline = pipeline.clone();
        std::thread::spawn(move || pipeline.check_and_decrypt("safety"))
    };
    while !clipboard.entered.load(std::sync::atomic::Ordering::SeqCst) {
        std::thread::sleep(Duration::from_millis(1));
    }

    // second trigger while the first is in flight
    assert_eq!(pipeline.check_and_decrypt("safety"), CheckOutcome::Busy);

    drop(hold);
    assert!(matches!(
        racing.join().unwrap(),
        CheckOutcome::Decrypted { .. }
    ));
    assert_eq!(notifier.count(), 1);

    // the guard releases: a later check runs normally
    assert_eq!(pipeline.check_and_decrypt("safety"), CheckOutcome::Duplicate);
}
