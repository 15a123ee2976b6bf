//! Identifier of the business record whose files are synchronized.

use derive_more::{Deref, Display};
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Non-empty identifier of a property listing.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[derive(Deref, Display, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RecordId(String);

impl RecordId {
    /// Creates a record identifier, rejecting empty or blank input.
    pub fn new(id: impl Into<String>) -> Result<Self> {
        let id = id.into();
        let trimmed = id.trim();
        if trimmed.is_empty() {
            return Err(Error::invalid_input().with_message("recordId is missing"));
        }

        Ok(Self(trimmed.to_owned()))
    }

    /// Returns the identifier as a string slice.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for RecordId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for RecordId {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        Self::new(value)
    }
}

impl From<RecordId> for String {
    fn from(value: RecordId) -> Self {
        value.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorKind;

    #[test]
    fn rejects_blank() {
        let err = RecordId::new("   ").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
        assert_eq!(err.user_message(), "recordId is missing");
    }

    #[test]
    fn trims_and_displays() {
        let id = RecordId::new(" a0B5g000001 ").unwrap();
        assert_eq!(id.as_str(), "a0B5g000001");
        assert_eq!(id.to_string(), "a0B5g000001");
    }

    #[test]
    fn deserializes_through_validation() {
        let id: RecordId = serde_json::from_str("\"a01\"").unwrap();
        assert_eq!(id.as_str(), "a01");
        assert!(serde_json::from_str::<RecordId>("\"\"").is_err());
    }
}
