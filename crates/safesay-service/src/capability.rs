/// Host capability profile, selected once at startup instead of scattering
/// platform checks through the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    /// Clipboard, notifications, and the background task.
    Full,
    /// Clipboard polling only (browser-style host): no notification surface,
    /// no background scheduler. The monitor still runs and updates the
    /// display state.
    ClipboardOnly,
}

impl Capability {
    pub fn notifications(self) -> bool {
        matches!(self, Capability::Full)
    }

    pub fn background(self) -> bool {
        matches!(self, Capability::Full)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clipboard_only_disables_notifications_and_background() {
        assert!(Capability::Full.notifications());
        assert!(Capability::Full.background());
        assert!(!Capability::ClipboardOnly.notifications());
        assert!(!Capability::ClipboardOnly.background());
    }
}
