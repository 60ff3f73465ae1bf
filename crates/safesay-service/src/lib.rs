//! SafeSay clipboard auto-decrypt service.
//!
//! The binary entrypoint in `main.rs` wires these modules together; they are
//! exported here for integration tests and embedding.

pub mod background;
pub mod capability;
pub mod clipboard_sys;
pub mod detect;
pub mod dispatch;
pub mod lifecycle;
pub mod monitor;
pub mod service_state;
