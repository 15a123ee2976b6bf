//! Upload collaborators over an object store.

use bytes::Bytes;
use listing_core::service::{ContentProvider, TransferProvider};
use listing_core::types::{RecordId, TransferReceipt, UploadAuthorization};

use super::ObjectStoreClient;
use crate::TRACING_TARGET;

#[async_trait::async_trait]
impl TransferProvider for ObjectStoreClient {
    /// Writes `payload` under the key `destination`.
    ///
    /// Refusals by the store (access denied, precondition) complete the
    /// transfer as rejected; every other failure is returned as an error.
    async fn put_object(
        &self,
        destination: &str,
        payload: Bytes,
        content_type: &str,
    ) -> listing_core::Result<TransferReceipt> {
        let size = payload.len();
        match self.put(destination, payload, Some(content_type)).await {
            Ok(()) => {
                tracing::debug!(
                    target: TRACING_TARGET,
                    key = destination,
                    size,
                    "Object stored"
                );
                Ok(TransferReceipt::accepted(format!("Stored {size} bytes")))
            }
            Err(error) if error.is_rejection() => {
                tracing::warn!(
                    target: TRACING_TARGET,
                    key = destination,
                    error = %error,
                    "Object store rejected upload"
                );
                Ok(TransferReceipt::rejected(error.inner().to_string()))
            }
            Err(error) => Err(error.into()),
        }
    }
}

#[async_trait::async_trait]
impl ContentProvider for ObjectStoreClient {
    /// Reads the file's source key, or its file name when none is known.
    async fn fetch_content(
        &self,
        record: &RecordId,
        authorization: &UploadAuthorization,
    ) -> listing_core::Result<Bytes> {
        let key = authorization
            .source_key
            .as_deref()
            .unwrap_or(&authorization.file_name);

        tracing::trace!(
            target: TRACING_TARGET,
            record = %record,
            key,
            "Reading file content"
        );
        Ok(self.get(key).await?.data)
    }
}
