use serde::{Deserialize, Serialize};

/// Host schedulers refuse shorter background intervals than this.
pub const MIN_BACKGROUND_INTERVAL_SECS: u64 = 15 * 60;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitorSettings {
    /// Foreground clipboard poll interval.
    pub poll_interval_secs: u64,
    /// Requested background check interval; clamped to
    /// [`MIN_BACKGROUND_INTERVAL_SECS`] at registration.
    pub background_interval_secs: u64,
    /// Key the background task falls back to when the history is empty.
    pub default_key: String,
    /// Notification body limit in scalar values before truncation.
    pub notification_preview_limit: usize,
}

impl Default for MonitorSettings {
    fn default() -> Self {
        Self {
            poll_interval_secs: 2,
            background_interval_secs: MIN_BACKGROUND_INTERVAL_SECS,
            default_key: "safety".into(),
            notification_preview_limit: 100,
        }
    }
}

impl MonitorSettings {
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.poll_interval_secs == 0 {
            anyhow::bail!("Poll interval must be at least 1 second");
        }
        if self.default_key.is_empty() {
            anyhow::bail!("Default key must not be empty");
        }
        if self.notification_preview_limit == 0 {
            anyhow::bail!("Notification preview limit must be at least 1");
        }
        Ok(())
    }
}
