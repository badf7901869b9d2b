//! User-facing notices.
//!
//! The web layer renders these as toasts; this crate only decides when one
//! is emitted (exactly one per failure unless the caller suppresses it) and
//! what it says.

use std::sync::Mutex;

/// A short user-facing message: title plus plain-language description.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub title: String,
    pub message: String,
}

impl Notice {
    pub fn new(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            message: message.into(),
        }
    }
}

/// Sink for user-facing notices. The embedding UI supplies its own
/// implementation; the default just logs.
pub trait Notifier: Send + Sync {
    fn notify(&self, notice: Notice);
}

/// Notifier that logs at warn level. Used when no UI is attached
/// (service binaries, CLI).
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, notice: Notice) {
        tracing::warn!(title = %notice.title, message = %notice.message, "User notice");
    }
}

/// Notifier that records every notice, for assertions in tests and for
/// UIs that drain notices on their own schedule.
#[derive(Default)]
pub struct CollectingNotifier {
    notices: Mutex<Vec<Notice>>,
}

impl CollectingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn drain(&self) -> Vec<Notice> {
        let mut notices = self.notices.lock().expect("notifier mutex poisoned");
        std::mem::take(&mut *notices)
    }

    pub fn count(&self) -> usize {
        self.notices.lock().expect("notifier mutex poisoned").len()
    }
}

impl Notifier for CollectingNotifier {
    fn notify(&self, notice: Notice) {
        self.notices
            .lock()
            .expect("notifier mutex poisoned")
            .push(notice);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collecting_notifier_records_in_order() {
        let notifier = CollectingNotifier::new();
        notifier.notify(Notice::new("Too many requests", "Please wait 5 seconds"));
        notifier.notify(Notice::new("Request failed", "Error: 502 Bad Gateway"));

        let drained = notifier.drain();
        assert_eq!(drained.len(), 2);
        assert_eq!(drained[0].title, "Too many requests");
        assert_eq!(notifier.count(), 0);
    }
}
