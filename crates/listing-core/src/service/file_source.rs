//! Remote file source.

use std::fmt;
use std::sync::Arc;
use std::time::Instant;

use super::TRACING_TARGET;
use crate::Result;
use crate::types::{RawFileRecord, RecordId};

/// Queries the files attached to a record.
///
/// Idempotent; safe to retry.
#[async_trait::async_trait]
pub trait FileSourceProvider: Send + Sync {
    /// Returns the current file set for `record`.
    async fn fetch_files(&self, record: &RecordId) -> Result<Vec<RawFileRecord>>;
}

/// File source wrapper with observability.
#[derive(Clone)]
pub struct FileSourceService {
    inner: Arc<dyn FileSourceProvider>,
}

impl fmt::Debug for FileSourceService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FileSourceService").finish_non_exhaustive()
    }
}

impl FileSourceService {
    pub fn new<P>(provider: P) -> Self
    where
        P: FileSourceProvider + 'static,
    {
        Self {
            inner: Arc::new(provider),
        }
    }

    pub fn from_arc(provider: Arc<dyn FileSourceProvider>) -> Self {
        Self { inner: provider }
    }

    /// Fetches the file set for `record`.
    pub async fn fetch_files(&self, record: &RecordId) -> Result<Vec<RawFileRecord>> {
        let started_at = Instant::now();
        tracing::debug!(target: TRACING_TARGET, record = %record, "Fetching files");

        let result = self.inner.fetch_files(record).await;
        let elapsed = started_at.elapsed();

        match &result {
            Ok(files) => tracing::debug!(
                target: TRACING_TARGET,
                record = %record,
                count = files.len(),
                elapsed_ms = elapsed.as_millis(),
                "Files fetched"
            ),
            Err(error) => tracing::warn!(
                target: TRACING_TARGET,
                record = %record,
                error = %error,
                elapsed_ms = elapsed.as_millis(),
                "File fetch failed"
            ),
        }

        result
    }
}
