use safesay_core::notify::Notifier;
use serde_json::json;
use std::sync::Arc;
use tracing::{info, warn};

/// Notification title shown for every decrypt event.
pub const DECRYPTED_TITLE: &str = "🔓 Decrypted message";

const ELLIPSIS: &str = "...";

/// Formats and emits the decrypt notification. Side effect only: delivery is
/// immediate, and a delivery failure is logged and swallowed — never fatal to
/// the detection pipeline.
pub struct NotificationDispatcher {
    notifier: Arc<dyn Notifier>,
    preview_limit: usize,
}

impl NotificationDispatcher {
    pub fn new(notifier: Arc<dyn Notifier>, preview_limit: usize) -> Self {
        Self {
            notifier,
            preview_limit,
        }
    }

    pub fn dispatch(&self, plaintext: &str) {
        let body = preview(plaintext, self.preview_limit);
        let payload = json!({ "decryptedText": plaintext });
        if let Err(err) = self.notifier.notify(DECRYPTED_TITLE, &body, payload) {
            warn!(error = %err, "notification delivery failed");
        }
    }
}

/// Notifier backend that writes to the log. Stands in for hosts without a
/// notification daemon.
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, title: &str, body: &str, _payload: serde_json::Value) -> anyhow::Result<()> {
        info!(%title, %body, "notification");
        Ok(())
    }
}

/// Truncate to `limit` scalar values with a trailing ellipsis marker.
fn preview(text: &str, limit: usize) -> String {
    if text.chars().count() <= limit {
        return text.to_string();
    }
    let mut out: String = text.chars().take(limit).collect();
    out.push_str(ELLIPSIS);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preview_truncates_on_scalar_values_not_bytes() {
        assert_eq!(preview("short", 100), "short");
        assert_eq!(preview("abcdefgh", 5), "abcde...");
        // multi-byte scalars count as one each
        assert_eq!(preview("密密密密", 2), "密密...");
    }

    #[test]
    fn preview_at_exact_limit_is_untouched() {
        assert_eq!(preview("12345", 5), "12345");
    }
}
