//! `arboard`-backed host clipboard.

use parking_lot::Mutex;
use safesay_core::clipboard::{ClipboardError, ClipboardService};

pub struct SystemClipboard {
    // arboard's handle wants &mut for both directions
    inner: Mutex<arboard::Clipboard>,
}

impl SystemClipboard {
    pub fn new() -> Result<Self, ClipboardError> {
        let inner = arboard::Clipboard::new().map_err(map_err)?;
        Ok(Self {
            inner: Mutex::new(inner),
        })
    }
}

impl ClipboardService for SystemClipboard {
    fn read(&self) -> Result<String, ClipboardError> {
        match self.inner.lock().get_text() {
            Ok(text) => Ok(text),
            // an empty clipboard is empty content, not a failure
            Err(arboard::Error::ContentNotAvailable) => Ok(String::new()),
            Err(err) => Err(map_err(err)),
        }
    }

    fn write(&self, text: &str) -> Result<(), ClipboardError> {
        self.inner
            .lock()
            .set_text(text.to_string())
            .map_err(map_err)
    }
}

fn map_err(err: arboard::Error) -> ClipboardError {
    match err {
        arboard::Error::ClipboardNotSupported => {
            ClipboardError::Unavailable("clipboard not supported on this host".into())
        }
        arboard::Error::ClipboardOccupied => {
            ClipboardError::Unavailable("clipboard occupied by another process".into())
        }
        other => ClipboardError::Unavailable(other.to_string()),
    }
}
