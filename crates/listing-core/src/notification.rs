//! User-facing notifications emitted once per orchestrator run.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, IntoStaticStr};

use crate::TRACING_TARGET_NOTIFY;

/// Severity of a [`Notification`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[derive(AsRefStr, Display, IntoStaticStr, Serialize, Deserialize)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Success,
    Info,
    Error,
}

/// A single terminal outcome, ready to be shown to the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub title: String,
    pub message: String,
    pub severity: Severity,
    /// Presentation hint: keep the notification visible until dismissed.
    #[serde(default)]
    pub sticky: bool,
}

impl Notification {
    pub fn new(title: impl Into<String>, message: impl Into<String>, severity: Severity) -> Self {
        Self {
            title: title.into(),
            message: message.into(),
            severity,
            sticky: false,
        }
    }

    pub fn success(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(title, message, Severity::Success)
    }

    pub fn info(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(title, message, Severity::Info)
    }

    pub fn error(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(title, message, Severity::Error)
    }

    /// Marks the notification as sticky.
    #[must_use]
    pub fn sticky(mut self) -> Self {
        self.sticky = true;
        self
    }
}

impl fmt::Display for Notification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.severity, self.title, self.message)
    }
}

/// Destination for orchestrator notifications.
pub trait NotificationSink: Send + Sync {
    /// Presents one notification.
    fn notify(&self, notification: Notification);
}

impl<T: NotificationSink + ?Sized> NotificationSink for Arc<T> {
    fn notify(&self, notification: Notification) {
        (**self).notify(notification);
    }
}

/// Sink that writes notifications to the tracing subscriber.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl NotificationSink for TracingSink {
    fn notify(&self, notification: Notification) {
        match notification.severity {
            Severity::Error => tracing::error!(
                target: TRACING_TARGET_NOTIFY,
                title = %notification.title,
                sticky = notification.sticky,
                "{}", notification.message
            ),
            Severity::Success | Severity::Info => tracing::info!(
                target: TRACING_TARGET_NOTIFY,
                title = %notification.title,
                severity = %notification.severity,
                "{}", notification.message
            ),
        }
    }
}

/// Sink that forwards notifications over an unbounded channel.
impl NotificationSink for tokio::sync::mpsc::UnboundedSender<Notification> {
    fn notify(&self, notification: Notification) {
        if self.send(notification).is_err() {
            tracing::debug!(
                target: TRACING_TARGET_NOTIFY,
                "Notification receiver dropped"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display() {
        let notification = Notification::info("No Files", "No files found on this listing.");
        assert_eq!(
            notification.to_string(),
            "[info] No Files: No files found on this listing."
        );
    }

    #[test]
    fn error_can_be_sticky() {
        let notification = Notification::error("Archive Failed", "boom").sticky();
        assert!(notification.sticky);
        assert_eq!(notification.severity, Severity::Error);
    }

    #[tokio::test]
    async fn channel_sink_forwards() {
        let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
        tx.notify(Notification::success("Upload Finished", "1 of 1 files uploaded successfully!"));
        let received = rx.recv().await.unwrap();
        assert_eq!(received.title, "Upload Finished");
    }
}
