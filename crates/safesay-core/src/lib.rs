//! SafeSay core: a reversible, key-dependent text obfuscation engine and the
//! contracts behind its clipboard auto-decrypt pipeline.
//!
//! The cipher is a positional substitution over ordered Unicode range tables
//! ([`cipher`]); output travels tagged with a `safe-say:` marker ([`tag`]).
//! Detection state — the key history and the last-processed clipboard marker
//! — lives behind the [`store::StateStore`] contract. The clipboard and
//! notification hosts are abstract ([`clipboard`], [`notify`]); the service
//! crate provides the real backends.
//!
//! This is deliberately not a cryptographically secure cipher: the transform
//! semantics are fixed for compatibility with existing tagged payloads.
//!
//! # Examples
//!
//! ```
//! use safesay_core::cipher::{transform, Direction};
//! use safesay_core::tag;
//!
//! let cipher = transform("meet at noon", "safety", Direction::Encrypt);
//! let wire = tag::wrap(&cipher);
//!
//! let cipher_back = tag::unwrap(&wire).unwrap();
//! let plain = transform(cipher_back, "safety", Direction::Decrypt);
//! assert_eq!(plain, "meet at noon");
//! ```

pub mod cipher;
pub mod clipboard;
pub mod history;
pub mod notify;
pub mod paths;
pub mod settings;
pub mod storage;
pub mod store;
pub mod tag;
