use chrono::{DateTime, Utc};
use safesay_core::history::KeyHistory;
use safesay_core::storage::save_key_history;
use safesay_core::store::StateStore;
use std::sync::Arc;
use tracing::warn;

/// In-memory session state: the active key plus the plaintext/ciphertext
/// pair last shown. Shared behind `Arc<Mutex<_>>` between the monitor loop
/// and the detection pipeline.
pub struct ServiceState {
    pub active_key: String,
    pub plaintext: String,
    pub ciphertext: String,
    pub history: KeyHistory,
    pub last_decrypt_at: Option<DateTime<Utc>>,
    store: Arc<dyn StateStore>,
}

impl ServiceState {
    pub fn new(store: Arc<dyn StateStore>, history: KeyHistory) -> Self {
        Self {
            active_key: String::new(),
            plaintext: String::new(),
            ciphertext: String::new(),
            history,
            last_decrypt_at: None,
            store,
        }
    }

    /// Make `key` the active key and move it to the front of the persisted
    /// history. A history write failure costs only persistence, not the
    /// session.
    pub fn set_active_key(&mut self, key: &str) {
        self.active_key = key.to_string();
        self.history.touch(key);
        if let Err(err) = save_key_history(self.store.as_ref(), &self.history) {
            warn!(error = %err, "key history write failed");
        }
    }

    /// Record a decrypt event for display.
    pub fn record_decrypt(&mut self, ciphertext: &str, plaintext: &str) {
        self.ciphertext = ciphertext.to_string();
        self.plaintext = plaintext.to_string();
        self.last_decrypt_at = Some(Utc::now());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use safesay_core::storage::load_key_history;
    use safesay_core::store::MemoryStore;

    #[test]
    fn set_active_key_persists_history() {
        let store = Arc::new(MemoryStore::new());
        let mut state = ServiceState::new(store.clone(), KeyHistory::new());
        state.set_active_key("safety");
        state.set_active_key("other");

        let persisted = load_key_history(store.as_ref());
        assert_eq!(persisted.most_recent(), Some("other"));
        assert_eq!(persisted.len(), 2);
    }

    #[test]
    fn record_decrypt_updates_display_pair() {
        let store = Arc::new(MemoryStore::new());
        let mut state = ServiceState::new(store, KeyHistory::new());
        state.record_decrypt("2", "0");
        assert_eq!(state.ciphertext, "2");
        assert_eq!(state.plaintext, "0");
        assert!(state.last_decrypt_at.is_some());
    }
}
