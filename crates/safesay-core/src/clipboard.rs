use parking_lot::RwLock;
use std::sync::atomic::{AtomicBool, Ordering};
use thiserror::Error;

/// Clipboard access failure. `Denied` is the recoverable, user-notifiable
/// case (browser-style permission refusal); `Unavailable` covers host
/// trouble. Neither is fatal to the detection loop — a failed read skips the
/// cycle.
#[derive(Debug, Error)]
pub enum ClipboardError {
    #[error("clipboard access denied")]
    Denied,
    #[error("clipboard unavailable: {0}")]
    Unavailable(String),
}

/// Host clipboard contract: plain text read/write.
///
/// An empty clipboard reads as an empty string, not an error.
pub trait ClipboardService: Send + Sync {
    fn read(&self) -> Result<String, ClipboardError>;
    fn write(&self, text: &str) -> Result<(), ClipboardError>;
}

/// In-memory clipboard for tests and headless sessions. Reads can be made to
/// fail to exercise the permission-denied path.
#[derive(Default)]
pub struct MemoryClipboard {
    contents: RwLock<String>,
    deny: AtomicBool,
}

impl MemoryClipboard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_contents(text: &str) -> Self {
        let clipboard = Self::default();
        *clipboard.contents.write() = text.to_string();
        clipboard
    }

    pub fn set_contents(&self, text: &str) {
        *self.contents.write() = text.to_string();
    }

    pub fn set_denied(&self, deny: bool) {
        self.deny.store(deny, Ordering::SeqCst);
    }
}

impl ClipboardService for MemoryClipboard {
    fn read(&self) -> Result<String, ClipboardError> {
        if self.deny.load(Ordering::SeqCst) {
            return Err(ClipboardError::Denied);
        }
        Ok(self.contents.read().clone())
    }

    fn write(&self, text: &str) -> Result<(), ClipboardError> {
        if self.deny.load(Ordering::SeqCst) {
            return Err(ClipboardError::Denied);
        }
        *self.contents.write() = text.to_string();
        Ok(())
    }
}
