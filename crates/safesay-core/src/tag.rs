//! Wire marker for clipboard payloads.
//!
//! Ciphertext leaving the app is prefixed with `safe-say:` so the detection
//! pipeline can recognize it; untagged clipboard content is never touched.
//! The prefix is not escaped if it occurs inside plaintext — the format is
//! fixed for compatibility with existing payloads.

/// Literal ASCII marker prefix.
pub const TAG_PREFIX: &str = "safe-say:";

/// Prefix `cipher_text` with the wire marker.
pub fn wrap(cipher_text: &str) -> String {
    format!("{TAG_PREFIX}{cipher_text}")
}

/// Strip the marker, returning the ciphertext. `None` unless `raw` starts
/// with the exact prefix; surrounding whitespace is not trimmed.
pub fn unwrap(raw: &str) -> Option<&str> {
    raw.strip_prefix(TAG_PREFIX)
}

/// Prefix-tolerant variant for paste flows: tagged input loses the marker,
/// anything else passes through untouched.
pub fn strip(raw: &str) -> &str {
    unwrap(raw).unwrap_or(raw)
}
