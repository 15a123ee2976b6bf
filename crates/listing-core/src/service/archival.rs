//! Remote bulk archival service.

use std::fmt;
use std::sync::Arc;
use std::time::Instant;

use super::TRACING_TARGET;
use crate::Result;
use crate::types::{ArchiveBatchResult, ArchiveDestination, RecordId};

/// Queues every file attached to a record for archival.
///
/// The service enumerates files on its side and reports the totals.
#[async_trait::async_trait]
pub trait ArchivalProvider: Send + Sync {
    async fn archive_all(
        &self,
        record: &RecordId,
        destination: ArchiveDestination,
    ) -> Result<ArchiveBatchResult>;
}

/// Archival wrapper with observability.
#[derive(Clone)]
pub struct ArchivalService {
    inner: Arc<dyn ArchivalProvider>,
}

impl fmt::Debug for ArchivalService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ArchivalService").finish_non_exhaustive()
    }
}

impl ArchivalService {
    pub fn new<P>(provider: P) -> Self
    where
        P: ArchivalProvider + 'static,
    {
        Self {
            inner: Arc::new(provider),
        }
    }

    pub fn from_arc(provider: Arc<dyn ArchivalProvider>) -> Self {
        Self { inner: provider }
    }

    /// Requests archival of all files on `record` into `destination`.
    pub async fn archive_all(
        &self,
        record: &RecordId,
        destination: ArchiveDestination,
    ) -> Result<ArchiveBatchResult> {
        let started_at = Instant::now();
        tracing::debug!(
            target: TRACING_TARGET,
            record = %record,
            destination = %destination,
            "Requesting bulk archive"
        );

        let result = self.inner.archive_all(record, destination).await;
        let elapsed = started_at.elapsed();

        match &result {
            Ok(response) => tracing::debug!(
                target: TRACING_TARGET,
                record = %record,
                destination = %destination,
                total_found = response.total_found,
                total_queued = response.total_queued,
                elapsed_ms = elapsed.as_millis(),
                "Bulk archive accepted"
            ),
            Err(error) => tracing::error!(
                target: TRACING_TARGET,
                record = %record,
                destination = %destination,
                error = %error,
                elapsed_ms = elapsed.as_millis(),
                "Bulk archive request failed"
            ),
        }

        result
    }
}
