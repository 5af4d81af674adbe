//! Transient notifications (toasts).
//!
//! Fetch callbacks and the action dispatcher must never block on the view
//! layer, so sends are best-effort: a full channel drops the toast.

use chrono::{DateTime, Utc};
use tokio::sync::mpsc;

/// Default capacity of the toast channel.
const CHANNEL_CAPACITY: usize = 64;

/// Toast severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastLevel {
    /// Action or login succeeded.
    Success,
    /// Action failed or the session was invalidated.
    Error,
    /// Neutral information.
    Info,
}

/// One transient notification.
#[derive(Debug, Clone)]
pub struct Toast {
    /// Severity.
    pub level: ToastLevel,
    /// Human-readable message.
    pub message: String,
    /// When the toast was emitted.
    pub at: DateTime<Utc>,
}

/// Sending half of the toast channel, cheap to clone.
#[derive(Clone)]
pub struct Notifier {
    tx: mpsc::Sender<Toast>,
}

impl Notifier {
    /// Creates the toast channel; the receiver goes to the view layer.
    pub fn channel() -> (Self, mpsc::Receiver<Toast>) {
        let (tx, rx) = mpsc::channel(CHANNEL_CAPACITY);
        (Self { tx }, rx)
    }

    /// Emits a success toast.
    pub fn success(&self, message: impl Into<String>) {
        self.push(ToastLevel::Success, message.into());
    }

    /// Emits an error toast.
    pub fn error(&self, message: impl Into<String>) {
        self.push(ToastLevel::Error, message.into());
    }

    /// Emits an informational toast.
    pub fn info(&self, message: impl Into<String>) {
        self.push(ToastLevel::Info, message.into());
    }

    fn push(&self, level: ToastLevel, message: String) {
        let toast = Toast {
            level,
            message,
            at: Utc::now(),
        };
        if let Err(err) = self.tx.try_send(toast) {
            tracing::debug!(error = %err, "Toast dropped, channel full or closed");
        }
    }
}
