//! One-shot listing of the available archive buckets.

use listing_core::service::BucketListService;
use serde::Serialize;

use crate::TRACING_TARGET_CATALOG;

/// Bucket names, or the reason they could not be listed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BucketCatalog {
    pub buckets: Option<Vec<String>>,
    pub error: Option<String>,
}

impl BucketCatalog {
    /// Lists buckets once.
    ///
    /// Exactly one of `buckets` and `error` is set afterwards.
    pub async fn load(service: &BucketListService) -> Self {
        match service.list_buckets().await {
            Ok(buckets) => {
                tracing::debug!(
                    target: TRACING_TARGET_CATALOG,
                    count = buckets.len(),
                    "Loaded bucket catalog"
                );
                Self {
                    buckets: Some(buckets),
                    error: None,
                }
            }
            Err(error) => {
                tracing::warn!(
                    target: TRACING_TARGET_CATALOG,
                    error = %error,
                    "Failed to load bucket catalog"
                );
                Self {
                    buckets: None,
                    error: Some(error.user_message()),
                }
            }
        }
    }

    #[inline]
    pub fn is_loaded(&self) -> bool {
        self.buckets.is_some()
    }

    /// Bucket names, empty when loading failed.
    pub fn names(&self) -> &[String] {
        self.buckets.as_deref().unwrap_or_default()
    }
}
