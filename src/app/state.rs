//! Small state types shared by the app and its renderer.

use std::time::{Duration, Instant};

/// How long a status message stays in the help bar.
pub const STATUS_TIMEOUT: Duration = Duration::from_millis(2500);

/// Transient help-bar feedback
#[derive(Debug, Clone, Default)]
pub enum StatusMessage {
    /// Nothing to report
    #[default]
    None,
    /// Informational message shown at the given instant
    Info { text: String, at: Instant },
    /// Something failed; the app keeps running
    Error { text: String, at: Instant },
}

impl StatusMessage {
    /// The message and whether it is an error, while it is still fresh.
    pub fn recent(&self, now: Instant) -> Option<(&str, bool)> {
        let (text, at, is_error) = match self {
            StatusMessage::None => return None,
            StatusMessage::Info { text, at } => (text, *at, false),
            StatusMessage::Error { text, at } => (text, *at, true),
        };
        (now.saturating_duration_since(at) < STATUS_TIMEOUT).then_some((text.as_str(), is_error))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_message_expires() {
        let t0 = Instant::now();
        let msg = StatusMessage::Error {
            text: "bad fixture".to_string(),
            at: t0,
        };
        assert_eq!(msg.recent(t0 + Duration::from_secs(1)), Some(("bad fixture", true)));
        assert_eq!(msg.recent(t0 + STATUS_TIMEOUT), None);
        assert_eq!(StatusMessage::None.recent(t0), None);
    }
}
