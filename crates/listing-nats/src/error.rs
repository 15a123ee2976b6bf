//! Error types for NATS operations.

use std::time::Duration;

/// Result type for all NATS operations in this crate.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Unified error type for NATS operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// NATS client/connection errors
    #[error("NATS connection error: {0}")]
    Connection(#[from] async_nats::Error),

    /// Subscribing to a subject failed
    #[error("Failed to subscribe to '{subject}': {reason}")]
    Subscribe { subject: String, reason: String },

    /// Releasing a subscription failed
    #[error("Failed to unsubscribe from '{subject}': {reason}")]
    Unsubscribe { subject: String, reason: String },

    /// The handle does not belong to an active subscription
    #[error("No active subscription for '{subject}'")]
    UnknownSubscription { subject: String },

    /// Connection-level event reported by the client
    #[error("NATS transport event: {event}")]
    Transport { event: String },

    /// Operation timeout
    #[error("Operation timed out after {timeout:?}")]
    Timeout { timeout: Duration },

    /// Invalid configuration
    #[error("Invalid configuration: {reason}")]
    InvalidConfig { reason: String },
}

impl Error {
    /// Create a subscribe error
    pub fn subscribe(subject: impl Into<String>, reason: impl ToString) -> Self {
        Self::Subscribe {
            subject: subject.into(),
            reason: reason.to_string(),
        }
    }

    /// Create an unsubscribe error
    pub fn unsubscribe(subject: impl Into<String>, reason: impl ToString) -> Self {
        Self::Unsubscribe {
            subject: subject.into(),
            reason: reason.to_string(),
        }
    }

    /// Create an invalid configuration error
    pub fn invalid_config(reason: impl Into<String>) -> Self {
        Self::InvalidConfig {
            reason: reason.into(),
        }
    }

    /// Create a timeout error with the given duration
    pub fn timeout(duration: Duration) -> Self {
        Self::Timeout { timeout: duration }
    }

    /// Check if this error is retryable
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Error::Connection(_) | Error::Timeout { .. } | Error::Transport { .. }
        )
    }
}

impl From<Error> for listing_core::Error {
    fn from(error: Error) -> Self {
        let kind = match &error {
            Error::Connection(_) => listing_core::ErrorKind::NetworkError,
            Error::Timeout { .. } => listing_core::ErrorKind::Timeout,
            Error::InvalidConfig { .. } => listing_core::ErrorKind::Configuration,
            Error::Subscribe { .. }
            | Error::Unsubscribe { .. }
            | Error::UnknownSubscription { .. }
            | Error::Transport { .. } => listing_core::ErrorKind::Subscription,
        };

        listing_core::Error::new(kind).with_source(error)
    }
}
