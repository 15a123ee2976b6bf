//! Collaborator implementations for [`RemoteClient`].

use bytes::Bytes;
use listing_core::service::{
    ArchivalProvider, AuthorizationProvider, BucketListProvider, ContentProvider,
    FileSourceProvider, TransferProvider,
};
use listing_core::types::{
    ArchiveBatchResult, ArchiveDestination, RawFileRecord, RecordId, TransferReceipt,
    UploadAuthorization,
};
use reqwest::header::CONTENT_TYPE;

use crate::{Error, RemoteClient, TRACING_TARGET_SERVICE};

#[async_trait::async_trait]
impl FileSourceProvider for RemoteClient {
    #[tracing::instrument(skip(self), target = TRACING_TARGET_SERVICE, fields(record = %record))]
    async fn fetch_files(&self, record: &RecordId) -> listing_core::Result<Vec<RawFileRecord>> {
        let url = self.endpoint(&["listings", record.as_str(), "files"])?;
        let files = self.send_json(self.http().get(url)).await?;
        Ok(files)
    }
}

#[async_trait::async_trait]
impl ArchivalProvider for RemoteClient {
    #[tracing::instrument(
        skip(self),
        target = TRACING_TARGET_SERVICE,
        fields(record = %record, destination = %destination)
    )]
    async fn archive_all(
        &self,
        record: &RecordId,
        destination: ArchiveDestination,
    ) -> listing_core::Result<ArchiveBatchResult> {
        let url = self.endpoint(&["listings", record.as_str(), "archive", destination.as_ref()])?;
        let result = self.send_json(self.http().post(url)).await?;
        Ok(result)
    }
}

#[async_trait::async_trait]
impl AuthorizationProvider for RemoteClient {
    #[tracing::instrument(skip(self), target = TRACING_TARGET_SERVICE, fields(record = %record))]
    async fn get_authorizations(
        &self,
        record: &RecordId,
    ) -> listing_core::Result<Vec<UploadAuthorization>> {
        let url = self.endpoint(&["listings", record.as_str(), "upload-authorizations"])?;
        let authorizations = self.send_json(self.http().get(url)).await?;
        Ok(authorizations)
    }
}

#[async_trait::async_trait]
impl ContentProvider for RemoteClient {
    #[tracing::instrument(
        skip(self, authorization),
        target = TRACING_TARGET_SERVICE,
        fields(record = %record, file_name = %authorization.file_name)
    )]
    async fn fetch_content(
        &self,
        record: &RecordId,
        authorization: &UploadAuthorization,
    ) -> listing_core::Result<Bytes> {
        let url = self.endpoint(&[
            "listings",
            record.as_str(),
            "files",
            &authorization.file_name,
            "content",
        ])?;
        let response = self.send(self.http().get(url)).await?;
        let content = response.bytes().await.map_err(Error::from)?;
        Ok(content)
    }
}

#[async_trait::async_trait]
impl BucketListProvider for RemoteClient {
    #[tracing::instrument(skip(self), target = TRACING_TARGET_SERVICE)]
    async fn list_buckets(&self) -> listing_core::Result<Vec<String>> {
        let url = self.endpoint(&["buckets"])?;
        let buckets = self.send_json(self.http().get(url)).await?;
        Ok(buckets)
    }
}

#[async_trait::async_trait]
impl TransferProvider for RemoteClient {
    /// Sends `payload` as a `PUT` to the presigned URL in `destination`.
    ///
    /// The presigned URL carries its own authorization, so no bearer token is
    /// attached. Any completed response yields a receipt; only transport
    /// failures are errors.
    #[tracing::instrument(
        skip(self, destination, payload),
        target = TRACING_TARGET_SERVICE,
        fields(size = payload.len())
    )]
    async fn put_object(
        &self,
        destination: &str,
        payload: Bytes,
        content_type: &str,
    ) -> listing_core::Result<TransferReceipt> {
        let response = self
            .http()
            .put(destination)
            .header(CONTENT_TYPE, content_type)
            .body(payload)
            .send()
            .await
            .map_err(Error::from)?;

        let status = response.status();
        let detail = status
            .canonical_reason()
            .map_or_else(|| status.as_u16().to_string(), str::to_owned);

        tracing::debug!(
            target: TRACING_TARGET_SERVICE,
            status = status.as_u16(),
            "Presigned transfer completed"
        );

        Ok(if status.is_success() {
            TransferReceipt::accepted(detail)
        } else {
            TransferReceipt::rejected(detail)
        })
    }
}

#[cfg(test)]
mod tests {
    use listing_core::ErrorKind;
    use listing_core::types::AuthorizationStatus;
    use mockito::{Matcher, Server};

    use super::*;
    use crate::RemoteConfig;

    fn record() -> RecordId {
        RecordId::new("a01").unwrap()
    }

    fn client(server: &Server) -> RemoteClient {
        RemoteClient::new(RemoteConfig::new(server.url()).with_token("secret")).unwrap()
    }

    #[tokio::test]
    async fn fetch_files_decodes_wire_records() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/listings/a01/files")
            .match_header("authorization", "Bearer secret")
            .with_header("content-type", "application/json")
            .with_body(r#"[{"Name": "plan.pdf", "Extension": "pdf", "Size": "2048", "IsFloorplan": "true"}]"#)
            .create_async()
            .await;

        let files = client(&server).fetch_files(&record()).await.unwrap();

        mock.assert_async().await;
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].size, 2048);
        assert_eq!(files[0].is_floorplan.as_deref(), Some("true"));
    }

    #[tokio::test]
    async fn fetch_files_surfaces_service_message() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/listings/a01/files")
            .with_status(404)
            .with_body(r#"{"message": "Listing a01 not found"}"#)
            .create_async()
            .await;

        let err = client(&server).fetch_files(&record()).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
        assert_eq!(err.user_message(), "Listing a01 not found");
    }

    #[tokio::test]
    async fn archive_posts_to_destination() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/listings/a01/archive/azure")
            .with_body(r#"{"totalFound": 4, "totalQueued": 3}"#)
            .create_async()
            .await;

        let result = client(&server)
            .archive_all(&record(), ArchiveDestination::Secondary)
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(result.total_found, 4);
        assert_eq!(result.total_queued, 3);
        assert_eq!(result.message, None);
    }

    #[tokio::test]
    async fn authorizations_keep_service_order() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/listings/a01/upload-authorizations")
            .with_body(
                r#"[
                    {"fileName": "a.pdf", "uploadUrl": "https://bucket/a", "status": "Ready"},
                    {"fileName": "b.pdf", "status": "Pending", "message": "Locked"}
                ]"#,
            )
            .create_async()
            .await;

        let authorizations = client(&server).get_authorizations(&record()).await.unwrap();

        assert_eq!(authorizations[0].destination, "https://bucket/a");
        assert!(authorizations[0].is_ready());
        assert_eq!(authorizations[1].status, AuthorizationStatus::NotReady);
        assert_eq!(authorizations[1].message.as_deref(), Some("Locked"));
    }

    #[tokio::test]
    async fn content_is_read_by_file_name() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/listings/a01/files/floor%20plan.pdf/content")
            .with_body("pdf-bytes")
            .create_async()
            .await;

        let authorization = UploadAuthorization::ready("floor plan.pdf", "https://bucket/x");
        let content = client(&server)
            .fetch_content(&record(), &authorization)
            .await
            .unwrap();
        assert_eq!(content, Bytes::from("pdf-bytes"));
    }

    #[tokio::test]
    async fn buckets_are_listed() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/buckets")
            .with_body(r#"["listing-archive", "listing-media"]"#)
            .create_async()
            .await;

        let buckets = client(&server).list_buckets().await.unwrap();
        assert_eq!(buckets, ["listing-archive", "listing-media"]);
    }

    #[tokio::test]
    async fn presigned_put_reports_status() {
        let mut server = Server::new_async().await;
        let accepted = server
            .mock("PUT", "/upload/a")
            .match_query(Matcher::Any)
            .match_header("content-type", "application/pdf")
            .match_header("authorization", Matcher::Missing)
            .match_body("pdf")
            .with_status(200)
            .create_async()
            .await;
        server
            .mock("PUT", "/upload/b")
            .with_status(403)
            .create_async()
            .await;

        let client = client(&server);
        let ok = client
            .put_object(
                &format!("{}/upload/a?X-Amz-Signature=abc", server.url()),
                Bytes::from("pdf"),
                "application/pdf",
            )
            .await
            .unwrap();
        let rejected = client
            .put_object(
                &format!("{}/upload/b", server.url()),
                Bytes::from("pdf"),
                "application/pdf",
            )
            .await
            .unwrap();

        accepted.assert_async().await;
        assert_eq!(ok, TransferReceipt::accepted("OK"));
        assert_eq!(rejected, TransferReceipt::rejected("Forbidden"));
    }

    #[tokio::test]
    async fn presigned_put_to_invalid_url_is_an_error() {
        let server = Server::new_async().await;
        let err = client(&server)
            .put_object("not a url", Bytes::new(), "text/plain")
            .await
            .unwrap_err();
        assert!(!err.user_message().is_empty());
    }
}
