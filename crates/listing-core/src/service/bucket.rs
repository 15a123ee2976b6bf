//! Remote bucket catalog.

use std::fmt;
use std::sync::Arc;

use super::TRACING_TARGET;
use crate::Result;

/// Lists the buckets available to archive into.
#[async_trait::async_trait]
pub trait BucketListProvider: Send + Sync {
    async fn list_buckets(&self) -> Result<Vec<String>>;
}

/// Bucket list wrapper with observability.
#[derive(Clone)]
pub struct BucketListService {
    inner: Arc<dyn BucketListProvider>,
}

impl fmt::Debug for BucketListService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BucketListService").finish_non_exhaustive()
    }
}

impl BucketListService {
    pub fn new<P>(provider: P) -> Self
    where
        P: BucketListProvider + 'static,
    {
        Self {
            inner: Arc::new(provider),
        }
    }

    pub fn from_arc(provider: Arc<dyn BucketListProvider>) -> Self {
        Self { inner: provider }
    }

    pub async fn list_buckets(&self) -> Result<Vec<String>> {
        let result = self.inner.list_buckets().await;
        match &result {
            Ok(buckets) => {
                tracing::debug!(target: TRACING_TARGET, count = buckets.len(), "Buckets listed")
            }
            Err(error) => {
                tracing::warn!(target: TRACING_TARGET, error = %error, "Bucket listing failed")
            }
        }
        result
    }
}
