use serde::{Deserialize, Serialize};

/// Ordered, duplicate-free key history, most recently used first.
///
/// Persisted as a plain JSON array of strings; unbounded. Empty keys are
/// ignored on insert — a key is always a non-empty sequence of scalar values.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct KeyHistory(Vec<String>);

impl KeyHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a use of `key`: moved to the front if already present,
    /// inserted at the front otherwise.
    pub fn touch(&mut self, key: &str) {
        if key.is_empty() {
            return;
        }
        self.0.retain(|k| k != key);
        self.0.insert(0, key.to_string());
    }

    /// Remove `key` from the history. Returns whether it was present.
    pub fn remove(&mut self, key: &str) -> bool {
        let before = self.0.len();
        self.0.retain(|k| k != key);
        self.0.len() != before
    }

    pub fn most_recent(&self) -> Option<&str> {
        self.0.first().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
