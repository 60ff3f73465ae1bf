use serde_json::Value;

/// Host notification contract: immediate delivery of a titled message with a
/// structured payload. Delivery failure is the caller's to log; it must never
/// take down the detection pipeline.
pub trait Notifier: Send + Sync {
    fn notify(&self, title: &str, body: &str, payload: Value) -> anyhow::Result<()>;
}

/// Discards every notification. Used by the clipboard-only capability, where
/// the host has no notification surface.
pub struct NullNotifier;

impl Notifier for NullNotifier {
    fn notify(&self, _title: &str, _body: &str, _payload: Value) -> anyhow::Result<()> {
        Ok(())
    }
}
