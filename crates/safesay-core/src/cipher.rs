//! Positional substitution cipher over an ordered Unicode range table.
//!
//! Each scalar value is rotated within the first table interval that contains
//! it, by `key_shift(key) + position`, negated for decryption. Scalar values
//! outside every interval pass through unchanged, so the transform is total:
//! there is no invalid input and no error path. Position means the index in
//! the decoded scalar-value sequence, never a byte offset, which is what makes
//! decrypt invert encrypt exactly — including outside the Basic Multilingual
//! Plane.
//!
//! Callers must run [`normalize_line_endings`] over the text before both
//! encryption and decryption; a `\r\n` / `\n` mismatch changes the sequence
//! length and silently breaks the round trip.

use std::borrow::Cow;

/// Inclusive codepoint interval treated as one cyclic alphabet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Range {
    pub start: u32,
    pub end: u32,
}

/// Ordered range table, checked top to bottom; the first interval containing
/// a codepoint wins. The order is part of the wire format and must not be
/// rearranged.
#[rustfmt::skip]
pub const RANGES: [Range; 11] = [
    Range { start: 0x30,   end: 0x39   }, // digits, must stay first
    Range { start: 0x41,   end: 0x5a   }, // A-Z
    Range { start: 0x61,   end: 0x7a   }, // a-z
    Range { start: 0x4e00, end: 0x9fff }, // CJK Unified Ideographs
    Range { start: 0x3040, end: 0x309f }, // Hiragana
    Range { start: 0x30a0, end: 0x30ff }, // Katakana
    Range { start: 0xac00, end: 0xd7af }, // Hangul Syllables
    Range { start: 0x21,   end: 0x2f   }, // ASCII punctuation ! .. /
    Range { start: 0x3a,   end: 0x40   }, // ASCII punctuation : .. @
    Range { start: 0x5b,   end: 0x60   }, // ASCII punctuation [ .. `
    Range { start: 0x7b,   end: 0x7e   }, // ASCII punctuation { .. ~
];

/// Transform direction. Decryption applies the same shift with the opposite
/// sign.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Encrypt,
    Decrypt,
}

/// Base shift derived from a key: the sum of its Unicode scalar values.
///
/// Computed in `i64` — the per-character maximum is `0x10FFFF`, so overflow
/// would need a key of roughly 2^43 characters. Pure function of the key;
/// recomputed on every transform, never cached across keys.
pub fn key_shift(key: &str) -> i64 {
    key.chars().map(|c| i64::from(c as u32)).sum()
}

fn shift_scalar(c: char, shift: i64) -> char {
    let code = c as u32;
    for r in &RANGES {
        if code >= r.start && code <= r.end {
            let size = i64::from(r.end - r.start + 1);
            let offset = (i64::from(code - r.start) + shift).rem_euclid(size);
            // every table interval lies inside the scalar-value space
            return char::from_u32(r.start + offset as u32).unwrap();
        }
    }
    c
}

/// Apply the positional substitution cipher to `text` with `key`.
///
/// The i-th scalar value (0-indexed) is shifted by `±(key_shift(key) + i)`
/// using Euclidean modulo within its matched range. Empty text yields an
/// empty result.
pub fn transform(text: &str, key: &str, direction: Direction) -> String {
    let base = key_shift(key);
    let sign = match direction {
        Direction::Encrypt => 1,
        Direction::Decrypt => -1,
    };
    text.chars()
        .enumerate()
        .map(|(i, c)| shift_scalar(c, sign * (base + i as i64)))
        .collect()
}

/// Normalize `\r\n` and bare `\r` to `\n`.
///
/// Borrowed passthrough when the text contains no carriage returns.
pub fn normalize_line_endings(text: &str) -> Cow<'_, str> {
    if !text.contains('\r') {
        return Cow::Borrowed(text);
    }
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '\r' {
            if chars.peek() == Some(&'\n') {
                chars.next();
            }
            out.push('\n');
        } else {
            out.push(c);
        }
    }
    Cow::Owned(out)
}
