//! Batch aggregation of the archive and upload orchestrators.

use listing_core::service::mock::{
    MockArchival, MockAuthorization, MockContent, MockTransfer, RecordingSink, Scripted,
    TransferOutcome,
};
use listing_core::service::{ArchivalService, AuthorizationService, ContentService, TransferService};
use listing_core::types::{ArchiveBatchResult, RecordId, UploadAuthorization, UploadStatus};
use listing_core::{Notification, Severity};
use listing_runtime::{BulkArchiveOrchestrator, DirectUploadOrchestrator, UploadConfig};

fn record() -> RecordId {
    RecordId::new("0015g00000XyZAbAAN").unwrap()
}

async fn archive(reply: ArchiveBatchResult) -> Notification {
    let sink = RecordingSink::new();
    let orchestrator = BulkArchiveOrchestrator::primary(
        ArchivalService::new(MockArchival::replying(Scripted::ok(reply))),
        sink.clone(),
    );
    orchestrator.archive_all(&record()).await.unwrap();
    sink.single().unwrap()
}

#[tokio::test]
async fn archive_reports_queued_count() {
    let notification = archive(ArchiveBatchResult::queued(5)).await;
    assert_eq!(notification.severity, Severity::Success);
    assert!(notification.message.contains('5'));
}

#[tokio::test]
async fn archive_reports_no_files() {
    let notification = archive(ArchiveBatchResult::empty()).await;
    assert_eq!(notification.severity, Severity::Info);
    assert_eq!(notification.message, "No files found on this listing.");
}

async fn upload(config: UploadConfig) -> (Vec<UploadStatus>, Notification) {
    let authorization = MockAuthorization::new(vec![
        UploadAuthorization::ready("floorplan.pdf", "https://store/floorplan"),
        UploadAuthorization::not_ready("disclosure.docx"),
        UploadAuthorization::ready("photo.jpg", "https://store/photo"),
    ]);
    let transfer = MockTransfer::new()
        .with_outcome("https://store/floorplan", TransferOutcome::Accept("OK".into()))
        .with_outcome("https://store/photo", TransferOutcome::Reject("Forbidden".into()));
    let sink = RecordingSink::new();

    let orchestrator = DirectUploadOrchestrator::new(
        AuthorizationService::new(authorization),
        ContentService::new(MockContent::new()),
        TransferService::new(transfer),
        sink.clone(),
    )
    .with_config(config);

    let batch = orchestrator.upload_all(&record()).await.unwrap();
    let statuses = batch.tasks.iter().map(|task| task.status).collect();
    (statuses, sink.single().unwrap())
}

#[tokio::test]
async fn upload_aggregates_mixed_outcomes() {
    for config in [UploadConfig::sequential(), UploadConfig::concurrent(4)] {
        let (statuses, notification) = upload(config).await;
        assert_eq!(
            statuses,
            [UploadStatus::Uploaded, UploadStatus::NotReady, UploadStatus::Failed]
        );
        assert_eq!(notification.message, "1 of 3 files uploaded successfully!");
    }
}
