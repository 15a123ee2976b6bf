//! Bulk archive destinations and service responses.

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString, IntoStaticStr};

/// Long-term object store a bulk archive is sent to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[derive(AsRefStr, Display, EnumString, IntoStaticStr, Serialize, Deserialize)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ArchiveDestination {
    /// Amazon S3.
    #[default]
    #[strum(serialize = "s3")]
    #[serde(rename = "s3")]
    Primary,
    /// Azure Blob Storage.
    #[strum(serialize = "azure")]
    #[serde(rename = "azure")]
    Secondary,
}

impl ArchiveDestination {
    /// Human-readable name of the store.
    pub fn label(self) -> &'static str {
        match self {
            Self::Primary => "S3",
            Self::Secondary => "Azure",
        }
    }

    /// Text used when the service reports nothing to archive and supplies no message.
    pub fn default_empty_message(self) -> &'static str {
        match self {
            Self::Primary => "No files found on this listing.",
            Self::Secondary => "No files found to archive.",
        }
    }

    /// Label of the idle archive action.
    pub fn action_label(self) -> &'static str {
        match self {
            Self::Primary => "Archive to S3",
            Self::Secondary => "Archive All Files to Azure",
        }
    }
}

/// Aggregate produced once per bulk archive request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArchiveBatchResult {
    /// Files the service found attached to the record.
    #[serde(default)]
    pub total_found: u64,
    /// Files the service queued for archival.
    #[serde(default)]
    pub total_queued: u64,
    /// Optional service message.
    #[serde(default)]
    pub message: Option<String>,
}

impl ArchiveBatchResult {
    /// Creates a response with matching found and queued counts.
    pub fn queued(total: u64) -> Self {
        Self {
            total_found: total,
            total_queued: total,
            message: None,
        }
    }

    /// Creates an empty response.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Attaches a service message.
    #[must_use]
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn destination_strings() {
        assert_eq!(ArchiveDestination::Primary.as_ref(), "s3");
        assert_eq!("azure".parse::<ArchiveDestination>().ok(), Some(ArchiveDestination::Secondary));
        assert_eq!(ArchiveDestination::Secondary.label(), "Azure");
    }

    #[test]
    fn response_from_wire() {
        let response: ArchiveBatchResult =
            serde_json::from_str(r#"{"totalFound": 0, "message": "Nothing attached"}"#).unwrap();
        assert_eq!(response.total_found, 0);
        assert_eq!(response.total_queued, 0);
        assert_eq!(response.message.as_deref(), Some("Nothing attached"));
    }
}
