//! Transient user-facing notifications (toasts).

use tokio::sync::mpsc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationLevel {
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub level: NotificationLevel,
    pub message: String,
}

/// Sending half handed to the controller; the view drains the receiver.
#[derive(Debug, Clone)]
pub struct Notifier {
    tx: mpsc::UnboundedSender<Notification>,
}

impl Notifier {
    pub fn channel() -> (Notifier, mpsc::UnboundedReceiver<Notification>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Notifier { tx }, rx)
    }

    pub fn success(&self, message: impl Into<String>) {
        self.send(NotificationLevel::Success, message.into());
    }

    pub fn error(&self, message: impl Into<String>) {
        self.send(NotificationLevel::Error, message.into());
    }

    fn send(&self, level: NotificationLevel, message: String) {
        // A closed view has dropped the receiver; nothing left to show.
        if self.tx.send(Notification { level, message }).is_err() {
            tracing::debug!("notification dropped: no receiver");
        }
    }
}
