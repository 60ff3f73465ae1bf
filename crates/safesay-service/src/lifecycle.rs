use tokio::sync::broadcast;

/// Application lifecycle states the host reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppState {
    Active,
    Background,
}

/// Fan-out for host lifecycle transitions. The monitor subscribes and treats
/// every `Active` transition as a clipboard-check trigger.
pub struct AppLifecycle {
    tx: broadcast::Sender<AppState>,
}

impl AppLifecycle {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(16);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<AppState> {
        self.tx.subscribe()
    }

    /// Report a transition. A send with no live subscribers is a no-op.
    pub fn signal(&self, state: AppState) {
        let _ = self.tx.send(state);
    }
}

impl Default for AppLifecycle {
    fn default() -> Self {
        Self::new()
    }
}
