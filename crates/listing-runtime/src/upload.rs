//! Direct upload of a record's files to per-file authorized destinations.

use std::fmt;
use std::sync::Arc;

use futures::StreamExt;
use futures::stream;
use listing_core::service::{AuthorizationService, ContentService, TransferService};
use listing_core::types::{RecordId, UploadAuthorization, UploadStatus, UploadTask};
use listing_core::{Error, ErrorKind, Notification, NotificationSink, Result};
use serde::Serialize;

use crate::TRACING_TARGET_UPLOAD;
use crate::busy::BusyFlag;
use crate::config::UploadConfig;

/// Message attached to a task whose transfer was acknowledged.
pub const UPLOAD_SUCCESSFUL: &str = "Upload successful";

/// Outcome of one [`DirectUploadOrchestrator::upload_all`] run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadBatch {
    /// One task per authorization, in authorization order.
    pub tasks: Vec<UploadTask>,
}

impl UploadBatch {
    /// Number of tasks that ended `Uploaded`.
    pub fn uploaded(&self) -> usize {
        self.tasks.iter().filter(|task| task.is_uploaded()).count()
    }

    /// Size of the batch, ready or not.
    #[inline]
    pub fn total(&self) -> usize {
        self.tasks.len()
    }

    /// Returns `"{uploaded} of {total} files uploaded successfully!"`.
    pub fn summary(&self) -> String {
        format!(
            "{} of {} files uploaded successfully!",
            self.uploaded(),
            self.total()
        )
    }
}

/// Uploads a record's files straight into object storage.
///
/// Authorizations are requested once for the whole record. A file the
/// service declined is recorded as-is; every ready file is fetched and
/// transferred to its destination. Failures stay local to their task and
/// never abort the batch.
#[derive(Clone)]
pub struct DirectUploadOrchestrator {
    authorization: AuthorizationService,
    content: ContentService,
    transfer: TransferService,
    sink: Arc<dyn NotificationSink>,
    config: UploadConfig,
    busy: BusyFlag,
}

impl fmt::Debug for DirectUploadOrchestrator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DirectUploadOrchestrator")
            .field("config", &self.config)
            .field("busy", &self.busy.is_busy())
            .finish_non_exhaustive()
    }
}

impl DirectUploadOrchestrator {
    pub fn new<S>(
        authorization: AuthorizationService,
        content: ContentService,
        transfer: TransferService,
        sink: S,
    ) -> Self
    where
        S: NotificationSink + 'static,
    {
        Self {
            authorization,
            content,
            transfer,
            sink: Arc::new(sink),
            config: UploadConfig::default(),
            busy: BusyFlag::new(),
        }
    }

    #[must_use]
    pub fn with_config(mut self, config: UploadConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &UploadConfig {
        &self.config
    }

    #[inline]
    pub fn is_busy(&self) -> bool {
        self.busy.is_busy()
    }

    /// Returns the flag observed by [`is_busy`](Self::is_busy).
    pub fn busy_flag(&self) -> BusyFlag {
        self.busy.clone()
    }

    /// Uploads every authorized file of `record` and notifies the summary.
    ///
    /// Fails only when the authorization request itself fails; the returned
    /// error then has kind [`ErrorKind::Authorization`].
    #[tracing::instrument(skip_all, target = TRACING_TARGET_UPLOAD, fields(record = %record))]
    pub async fn upload_all(&self, record: &RecordId) -> Result<UploadBatch> {
        let _busy = self.busy.enter();

        let authorizations = match self.authorization.get_authorizations(record).await {
            Ok(authorizations) => authorizations,
            Err(error) => {
                tracing::error!(
                    target: TRACING_TARGET_UPLOAD,
                    error = %error,
                    "Failed to get files for upload"
                );
                self.sink
                    .notify(Notification::error("Error", "Failed to get files for upload"));
                return Err(error.with_kind(ErrorKind::Authorization));
            }
        };

        let mut tasks: Vec<UploadTask> = authorizations
            .iter()
            .enumerate()
            .map(|(index, authorization)| UploadTask::from_authorization(index, authorization))
            .collect();

        let concurrency = self.config.effective_concurrency();
        tracing::debug!(
            target: TRACING_TARGET_UPLOAD,
            total = tasks.len(),
            ready = authorizations.iter().filter(|a| a.is_ready()).count(),
            concurrency,
            "Starting upload batch"
        );

        // A fan-out of one keeps the transfers strictly sequential.
        let outcomes: Vec<(usize, UploadStatus, String)> = stream::iter(
            authorizations
                .iter()
                .enumerate()
                .filter(|(_, authorization)| authorization.is_ready()),
        )
        .map(|(index, authorization)| async move {
            let (status, message) = self.transfer_one(record, authorization).await;
            (index, status, message)
        })
        .buffer_unordered(concurrency)
        .collect()
        .await;

        for (index, status, message) in outcomes {
            if let Some(task) = tasks.get_mut(index) {
                task.finish(status, message);
            }
        }

        let batch = UploadBatch { tasks };
        tracing::info!(
            target: TRACING_TARGET_UPLOAD,
            uploaded = batch.uploaded(),
            total = batch.total(),
            "Upload batch finished"
        );
        self.sink
            .notify(Notification::success("Upload Finished", batch.summary()));

        Ok(batch)
    }

    /// Validates `record_id` and uploads it.
    pub async fn upload_all_for(&self, record_id: &str) -> Result<UploadBatch> {
        match RecordId::new(record_id) {
            Ok(record) => self.upload_all(&record).await,
            Err(error) => {
                self.sink
                    .notify(Notification::error("Error", error.user_message()));
                Err(error)
            }
        }
    }

    /// Fetches and transfers one ready file, returning its terminal state.
    async fn transfer_one(
        &self,
        record: &RecordId,
        authorization: &UploadAuthorization,
    ) -> (UploadStatus, String) {
        let file_name = authorization.file_name.as_str();

        let payload = match self.content.fetch_content(record, authorization).await {
            Ok(payload) => payload,
            Err(error) => {
                tracing::warn!(
                    target: TRACING_TARGET_UPLOAD,
                    file_name,
                    error = %error,
                    "Could not read file content"
                );
                return (UploadStatus::Error, error.user_message());
            }
        };

        let result = self
            .transfer
            .put_object(
                &authorization.destination,
                payload,
                authorization.content_type(),
            )
            .await;

        match result {
            Ok(receipt) if receipt.ok => (UploadStatus::Uploaded, UPLOAD_SUCCESSFUL.to_owned()),
            Ok(receipt) => {
                tracing::warn!(
                    target: TRACING_TARGET_UPLOAD,
                    file_name,
                    status_detail = %receipt.status_detail,
                    "Destination rejected upload"
                );
                (UploadStatus::Failed, receipt.status_detail)
            }
            Err(error) => {
                let error: Error = error.with_kind(ErrorKind::Transfer);
                tracing::warn!(
                    target: TRACING_TARGET_UPLOAD,
                    file_name,
                    error = %error,
                    "Upload attempt failed"
                );
                (UploadStatus::Error, error.user_message())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use listing_core::Severity;
    use listing_core::service::mock::{
        MockAuthorization, MockContent, MockTransfer, RecordingSink, Scripted, TransferOutcome,
    };

    use super::*;

    fn record() -> RecordId {
        RecordId::new("a01").unwrap()
    }

    fn orchestrator(
        authorization: &MockAuthorization,
        content: MockContent,
        transfer: &MockTransfer,
    ) -> (DirectUploadOrchestrator, RecordingSink) {
        let sink = RecordingSink::new();
        let orchestrator = DirectUploadOrchestrator::new(
            AuthorizationService::new(authorization.clone()),
            ContentService::new(content),
            TransferService::new(transfer.clone()),
            sink.clone(),
        );
        (orchestrator, sink)
    }

    fn statuses(batch: &UploadBatch) -> Vec<UploadStatus> {
        batch.tasks.iter().map(|task| task.status).collect()
    }

    #[tokio::test]
    async fn mixed_batch() {
        let authorization = MockAuthorization::new(vec![
            UploadAuthorization::ready("a.pdf", "https://dest/a"),
            UploadAuthorization::not_ready("b.pdf").with_message("File is locked"),
            UploadAuthorization::ready("c.png", "https://dest/c"),
        ]);
        let transfer = MockTransfer::new()
            .with_outcome("https://dest/c", TransferOutcome::Reject("Forbidden".into()));
        let (orchestrator, sink) = orchestrator(&authorization, MockContent::new(), &transfer);

        let batch = orchestrator.upload_all(&record()).await.unwrap();

        assert_eq!(
            statuses(&batch),
            [UploadStatus::Uploaded, UploadStatus::NotReady, UploadStatus::Failed]
        );
        assert_eq!(batch.tasks[0].message.as_deref(), Some("Upload successful"));
        assert_eq!(batch.tasks[1].message.as_deref(), Some("File is locked"));
        assert_eq!(batch.tasks[2].message.as_deref(), Some("Forbidden"));

        let notification = sink.single().unwrap();
        assert_eq!(notification.severity, Severity::Success);
        assert_eq!(notification.title, "Upload Finished");
        assert_eq!(notification.message, "1 of 3 files uploaded successfully!");

        let puts = transfer.puts();
        assert_eq!(puts.len(), 2);
        assert_eq!(puts[0].payload.as_ref(), b"a.pdf");
        assert_eq!(puts[0].content_type, "application/pdf");
        assert_eq!(puts[1].content_type, "image/png");
    }

    #[tokio::test]
    async fn thrown_transfer_marks_error_and_continues() {
        let authorization = MockAuthorization::new(vec![
            UploadAuthorization::ready("a.pdf", "https://dest/a"),
            UploadAuthorization::ready("b.pdf", "https://dest/b"),
        ]);
        let transfer = MockTransfer::new()
            .with_outcome("https://dest/a", TransferOutcome::Throw("connection reset".into()));
        let (orchestrator, _sink) = orchestrator(&authorization, MockContent::new(), &transfer);

        let batch = orchestrator.upload_all(&record()).await.unwrap();

        assert_eq!(statuses(&batch), [UploadStatus::Error, UploadStatus::Uploaded]);
        assert_eq!(batch.tasks[0].message.as_deref(), Some("connection reset"));
    }

    #[tokio::test]
    async fn content_failure_skips_transfer() {
        let authorization = MockAuthorization::new(vec![
            UploadAuthorization::ready("a.pdf", "https://dest/a"),
            UploadAuthorization::ready("b.pdf", "https://dest/b"),
        ]);
        let content = MockContent::new().failing("a.pdf", "Source object missing");
        let transfer = MockTransfer::new();
        let (orchestrator, _sink) = orchestrator(&authorization, content, &transfer);

        let batch = orchestrator.upload_all(&record()).await.unwrap();

        assert_eq!(statuses(&batch), [UploadStatus::Error, UploadStatus::Uploaded]);
        assert_eq!(batch.tasks[0].message.as_deref(), Some("Source object missing"));
        assert_eq!(transfer.puts().len(), 1);
    }

    #[tokio::test]
    async fn authorization_failure_notifies_once() {
        let authorization =
            MockAuthorization::replying(Scripted::err(ErrorKind::NetworkError, "timed out"));
        let transfer = MockTransfer::new();
        let (orchestrator, sink) = orchestrator(&authorization, MockContent::new(), &transfer);

        let error = orchestrator.upload_all(&record()).await.unwrap_err();
        assert_eq!(error.kind(), ErrorKind::Authorization);

        let notification = sink.single().unwrap();
        assert_eq!(notification.severity, Severity::Error);
        assert_eq!(notification.title, "Error");
        assert_eq!(notification.message, "Failed to get files for upload");
        assert!(transfer.puts().is_empty());
        assert!(!orchestrator.is_busy());
    }

    #[tokio::test]
    async fn missing_record_id() {
        let authorization = MockAuthorization::new(Vec::new());
        let (orchestrator, sink) =
            orchestrator(&authorization, MockContent::new(), &MockTransfer::new());

        let error = orchestrator.upload_all_for("").await.unwrap_err();
        assert_eq!(error.kind(), ErrorKind::InvalidInput);
        assert_eq!(sink.single().unwrap().message, "recordId is missing");
        assert_eq!(authorization.calls(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn sequential_by_default() {
        let authorization = MockAuthorization::new(
            (0..4)
                .map(|i| UploadAuthorization::ready(format!("{i}.pdf"), format!("dest/{i}")))
                .collect(),
        );
        let transfer = MockTransfer::new().with_delay("dest/0", Duration::from_millis(50));
        let (orchestrator, _sink) = orchestrator(&authorization, MockContent::new(), &transfer);

        orchestrator.upload_all(&record()).await.unwrap();

        assert_eq!(transfer.max_in_flight(), 1);
        let order: Vec<_> = transfer.puts().into_iter().map(|p| p.destination).collect();
        assert_eq!(order, ["dest/0", "dest/1", "dest/2", "dest/3"]);
    }

    #[tokio::test(start_paused = true)]
    async fn bounded_pool_keeps_task_order() {
        let authorization = MockAuthorization::new(
            (0..6)
                .map(|i| UploadAuthorization::ready(format!("{i}.pdf"), format!("dest/{i}")))
                .collect(),
        );
        let transfer = (0..6).fold(MockTransfer::new(), |transfer, i| {
            transfer.with_delay(format!("dest/{i}"), Duration::from_millis(100 - i * 10))
        });
        let transfer =
            transfer.with_outcome("dest/1", TransferOutcome::Reject("Bad Request".into()));
        let (orchestrator, sink) = orchestrator(&authorization, MockContent::new(), &transfer);
        let orchestrator = orchestrator.with_config(UploadConfig::concurrent(3));

        let batch = orchestrator.upload_all(&record()).await.unwrap();

        assert_eq!(transfer.max_in_flight(), 3);
        let indices: Vec<_> = batch.tasks.iter().map(|task| task.index).collect();
        assert_eq!(indices, [0, 1, 2, 3, 4, 5]);
        assert_eq!(batch.tasks[1].status, UploadStatus::Failed);
        assert_eq!(batch.uploaded(), 5);
        assert_eq!(
            sink.single().unwrap().message,
            "5 of 6 files uploaded successfully!"
        );
    }
}
