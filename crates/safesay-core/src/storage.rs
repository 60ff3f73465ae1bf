use crate::history::KeyHistory;
use crate::settings::MonitorSettings;
use crate::store::StateStore;
use tracing::warn;

/// Store key for the persisted key history (JSON array, newest first).
pub const KEY_HISTORY: &str = "KEY_HISTORY";
/// Store key for the last-processed tagged clipboard string.
pub const LAST_CLIPBOARD: &str = "LAST_CLIPBOARD";

const SETTINGS_KEY: &str = "safesay.settings";

/// Load the key history. Malformed or unreadable state decodes as an empty
/// history rather than an error.
pub fn load_key_history(store: &dyn StateStore) -> KeyHistory {
    match store.get(KEY_HISTORY) {
        Ok(Some(raw)) => match serde_json::from_str(&raw) {
            Ok(history) => history,
            Err(err) => {
                warn!(error = %err, "key history unreadable, starting empty");
                KeyHistory::new()
            }
        },
        Ok(None) => KeyHistory::new(),
        Err(err) => {
            warn!(error = %err, "key history unavailable, starting empty");
            KeyHistory::new()
        }
    }
}

pub fn save_key_history(store: &dyn StateStore, history: &KeyHistory) -> anyhow::Result<()> {
    store.set(KEY_HISTORY, &serde_json::to_string(history)?)
}

/// The marker is the full tagged string last handled by the detection
/// pipeline, used purely for deduplication.
pub fn load_marker(store: &dyn StateStore) -> anyhow::Result<Option<String>> {
    store.get(LAST_CLIPBOARD)
}

pub fn save_marker(store: &dyn StateStore, marker: &str) -> anyhow::Result<()> {
    store.set(LAST_CLIPBOARD, marker)
}

pub fn load_settings(store: &dyn StateStore) -> anyhow::Result<MonitorSettings> {
    if let Some(raw) = store.get(SETTINGS_KEY)? {
        Ok(serde_json::from_str(&raw)?)
    } else {
        Ok(MonitorSettings::default())
    }
}

pub fn save_settings(store: &dyn StateStore, settings: &MonitorSettings) -> anyhow::Result<()> {
    store.set(SETTINGS_KEY, &serde_json::to_string(settings)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    #[test]
    fn history_round_trip() {
        let store = MemoryStore::new();
        let mut history = KeyHistory::new();
        history.touch("safety");
        history.touch("秘密");
        save_key_history(&store, &history).unwrap();
        assert_eq!(load_key_history(&store), history);
    }

    #[test]
    fn malformed_history_decodes_as_empty() {
        let store = MemoryStore::new();
        store.set(KEY_HISTORY, "{broken").unwrap();
        assert!(load_key_history(&store).is_empty());

        store.set(KEY_HISTORY, r#"{"not":"an array"}"#).unwrap();
        assert!(load_key_history(&store).is_empty());
    }

    #[test]
    fn marker_round_trip() {
        let store = MemoryStore::new();
        assert_eq!(load_marker(&store).unwrap(), None);
        save_marker(&store, "safe-say:xyz").unwrap();
        assert_eq!(load_marker(&store).unwrap().as_deref(), Some("safe-say:xyz"));
    }

    #[test]
    fn settings_default_on_missing() {
        let store = MemoryStore::new();
        let settings = load_settings(&store).unwrap();
        assert_eq!(settings.poll_interval_secs, 2);

        let mut changed = settings;
        changed.default_key = "other".into();
        save_settings(&store, &changed).unwrap();
        assert_eq!(load_settings(&store).unwrap().default_key, "other");
    }
}
