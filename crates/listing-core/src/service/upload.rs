//! Collaborators of the direct upload flow: authorization, content and
//! transfer.

use std::fmt;
use std::sync::Arc;
use std::time::Instant;

use bytes::Bytes;

use super::TRACING_TARGET;
use crate::Result;
use crate::types::{RecordId, TransferReceipt, UploadAuthorization};

/// Issues short-lived per-file upload destinations.
#[async_trait::async_trait]
pub trait AuthorizationProvider: Send + Sync {
    /// Returns one descriptor per eligible file, in service order.
    async fn get_authorizations(&self, record: &RecordId) -> Result<Vec<UploadAuthorization>>;
}

/// Resolves the bytes to upload for one authorized file.
#[async_trait::async_trait]
pub trait ContentProvider: Send + Sync {
    async fn fetch_content(
        &self,
        record: &RecordId,
        authorization: &UploadAuthorization,
    ) -> Result<Bytes>;
}

/// Writes one object to an authorized destination.
///
/// `Ok` with `ok == false` means the destination completed the request and
/// rejected it; `Err` means the attempt itself failed.
#[async_trait::async_trait]
pub trait TransferProvider: Send + Sync {
    async fn put_object(
        &self,
        destination: &str,
        payload: Bytes,
        content_type: &str,
    ) -> Result<TransferReceipt>;
}

/// Authorization wrapper with observability.
#[derive(Clone)]
pub struct AuthorizationService {
    inner: Arc<dyn AuthorizationProvider>,
}

impl fmt::Debug for AuthorizationService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthorizationService").finish_non_exhaustive()
    }
}

impl AuthorizationService {
    pub fn new<P>(provider: P) -> Self
    where
        P: AuthorizationProvider + 'static,
    {
        Self {
            inner: Arc::new(provider),
        }
    }

    pub fn from_arc(provider: Arc<dyn AuthorizationProvider>) -> Self {
        Self { inner: provider }
    }

    pub async fn get_authorizations(&self, record: &RecordId) -> Result<Vec<UploadAuthorization>> {
        let started_at = Instant::now();
        let result = self.inner.get_authorizations(record).await;
        let elapsed = started_at.elapsed();

        match &result {
            Ok(authorizations) => tracing::debug!(
                target: TRACING_TARGET,
                record = %record,
                count = authorizations.len(),
                ready = authorizations.iter().filter(|a| a.is_ready()).count(),
                elapsed_ms = elapsed.as_millis(),
                "Upload authorizations issued"
            ),
            Err(error) => tracing::error!(
                target: TRACING_TARGET,
                record = %record,
                error = %error,
                elapsed_ms = elapsed.as_millis(),
                "Upload authorization request failed"
            ),
        }

        result
    }
}

/// Content wrapper with observability.
#[derive(Clone)]
pub struct ContentService {
    inner: Arc<dyn ContentProvider>,
}

impl fmt::Debug for ContentService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContentService").finish_non_exhaustive()
    }
}

impl ContentService {
    pub fn new<P>(provider: P) -> Self
    where
        P: ContentProvider + 'static,
    {
        Self {
            inner: Arc::new(provider),
        }
    }

    pub fn from_arc(provider: Arc<dyn ContentProvider>) -> Self {
        Self { inner: provider }
    }

    pub async fn fetch_content(
        &self,
        record: &RecordId,
        authorization: &UploadAuthorization,
    ) -> Result<Bytes> {
        let result = self.inner.fetch_content(record, authorization).await;

        match &result {
            Ok(content) => tracing::trace!(
                target: TRACING_TARGET,
                file_name = %authorization.file_name,
                size = content.len(),
                "Content resolved"
            ),
            Err(error) => tracing::warn!(
                target: TRACING_TARGET,
                file_name = %authorization.file_name,
                error = %error,
                "Content lookup failed"
            ),
        }

        result
    }
}

/// Transfer wrapper with observability.
#[derive(Clone)]
pub struct TransferService {
    inner: Arc<dyn TransferProvider>,
}

impl fmt::Debug for TransferService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransferService").finish_non_exhaustive()
    }
}

impl TransferService {
    pub fn new<P>(provider: P) -> Self
    where
        P: TransferProvider + 'static,
    {
        Self {
            inner: Arc::new(provider),
        }
    }

    pub fn from_arc(provider: Arc<dyn TransferProvider>) -> Self {
        Self { inner: provider }
    }

    pub async fn put_object(
        &self,
        destination: &str,
        payload: Bytes,
        content_type: &str,
    ) -> Result<TransferReceipt> {
        let started_at = Instant::now();
        let size = payload.len();
        let result = self.inner.put_object(destination, payload, content_type).await;
        let elapsed = started_at.elapsed();

        match &result {
            Ok(receipt) if receipt.ok => tracing::debug!(
                target: TRACING_TARGET,
                size,
                content_type,
                elapsed_ms = elapsed.as_millis(),
                "Transfer accepted"
            ),
            Ok(receipt) => tracing::warn!(
                target: TRACING_TARGET,
                size,
                status_detail = %receipt.status_detail,
                elapsed_ms = elapsed.as_millis(),
                "Transfer rejected by destination"
            ),
            Err(error) => tracing::warn!(
                target: TRACING_TARGET,
                size,
                error = %error,
                elapsed_ms = elapsed.as_millis(),
                "Transfer attempt failed"
            ),
        }

        result
    }
}
