//! Runtime configuration for the store and the upload orchestrator.

#[cfg(feature = "config")]
use clap::Args;
use listing_core::channel::DEFAULT_REFRESH_TOPIC;
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};

/// How concurrent refetch results are reconciled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[derive(AsRefStr, Display, EnumString, Serialize, Deserialize)]
#[cfg_attr(feature = "config", derive(clap::ValueEnum))]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum RefreshOrdering {
    /// Discard a result if a refetch started later has already been applied.
    #[default]
    Sequenced,
    /// Apply every result as it completes; the last to finish wins.
    Completion,
}

/// Configuration of a [`ReactiveFileStore`](crate::ReactiveFileStore).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "config", derive(Args))]
pub struct SyncConfig {
    /// Topic carrying refresh signals.
    #[cfg_attr(
        feature = "config",
        arg(
            long = "refresh-topic",
            env = "LISTING_REFRESH_TOPIC",
            default_value = DEFAULT_REFRESH_TOPIC
        )
    )]
    #[serde(default = "default_refresh_topic")]
    pub refresh_topic: String,

    /// Reconciliation of overlapping refetches.
    #[cfg_attr(
        feature = "config",
        arg(
            long = "refresh-ordering",
            env = "LISTING_REFRESH_ORDERING",
            value_enum,
            default_value_t = RefreshOrdering::Sequenced
        )
    )]
    #[serde(default)]
    pub refresh_ordering: RefreshOrdering,
}

fn default_refresh_topic() -> String {
    DEFAULT_REFRESH_TOPIC.to_owned()
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            refresh_topic: default_refresh_topic(),
            refresh_ordering: RefreshOrdering::default(),
        }
    }
}

impl SyncConfig {
    #[must_use]
    pub fn with_topic(mut self, topic: impl Into<String>) -> Self {
        self.refresh_topic = topic.into();
        self
    }

    #[must_use]
    pub fn with_ordering(mut self, ordering: RefreshOrdering) -> Self {
        self.refresh_ordering = ordering;
        self
    }

    /// Validate the configuration and return any issues.
    pub fn validate(&self) -> Result<(), String> {
        if self.refresh_topic.trim().is_empty() {
            return Err("Refresh topic cannot be empty".to_string());
        }
        Ok(())
    }
}

// Default values
const DEFAULT_UPLOAD_CONCURRENCY: usize = 1;
const MAX_UPLOAD_CONCURRENCY: usize = 32;

/// Configuration of a [`DirectUploadOrchestrator`](crate::DirectUploadOrchestrator).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "config", derive(Args))]
pub struct UploadConfig {
    /// Maximum transfers in flight (1 = sequential)
    #[cfg_attr(
        feature = "config",
        arg(
            long = "upload-concurrency",
            env = "LISTING_UPLOAD_CONCURRENCY",
            default_value_t = DEFAULT_UPLOAD_CONCURRENCY
        )
    )]
    #[serde(default = "default_upload_concurrency")]
    pub upload_concurrency: usize,
}

fn default_upload_concurrency() -> usize {
    DEFAULT_UPLOAD_CONCURRENCY
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            upload_concurrency: DEFAULT_UPLOAD_CONCURRENCY,
        }
    }
}

impl UploadConfig {
    /// Sequential uploads in authorization order.
    pub fn sequential() -> Self {
        Self::default()
    }

    /// At most `concurrency` transfers in flight.
    pub fn concurrent(concurrency: usize) -> Self {
        Self {
            upload_concurrency: concurrency,
        }
    }

    /// Returns the effective fan-out, never below one.
    #[inline]
    pub fn effective_concurrency(&self) -> usize {
        self.upload_concurrency.clamp(1, MAX_UPLOAD_CONCURRENCY)
    }

    /// Validate the configuration and return any issues.
    pub fn validate(&self) -> Result<(), String> {
        if self.upload_concurrency == 0 {
            return Err("Upload concurrency must be at least 1".to_string());
        }
        if self.upload_concurrency > MAX_UPLOAD_CONCURRENCY {
            return Err(format!(
                "Upload concurrency cannot exceed {MAX_UPLOAD_CONCURRENCY}"
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sync_defaults() {
        let config = SyncConfig::default();
        assert_eq!(config.refresh_topic, DEFAULT_REFRESH_TOPIC);
        assert_eq!(config.refresh_ordering, RefreshOrdering::Sequenced);
        assert!(config.validate().is_ok());
        assert!(config.with_topic(" ").validate().is_err());
    }

    #[test]
    fn sync_from_partial_json() {
        let config: SyncConfig =
            serde_json::from_str(r#"{"refresh_ordering": "completion"}"#).unwrap();
        assert_eq!(config.refresh_ordering, RefreshOrdering::Completion);
        assert_eq!(config.refresh_topic, DEFAULT_REFRESH_TOPIC);
    }

    #[test]
    fn upload_concurrency_bounds() {
        assert_eq!(UploadConfig::sequential().effective_concurrency(), 1);
        assert_eq!(UploadConfig::concurrent(0).effective_concurrency(), 1);
        assert_eq!(UploadConfig::concurrent(4).effective_concurrency(), 4);
        assert_eq!(UploadConfig::concurrent(500).effective_concurrency(), 32);

        assert!(UploadConfig::concurrent(0).validate().is_err());
        assert!(UploadConfig::concurrent(33).validate().is_err());
        assert!(UploadConfig::concurrent(8).validate().is_ok());
    }
}
