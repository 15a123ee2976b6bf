//! Bulk archive of every file attached to a record.

use std::fmt;
use std::sync::Arc;

use listing_core::service::ArchivalService;
use listing_core::types::{ArchiveBatchResult, ArchiveDestination, RecordId};
use listing_core::{Error, ErrorKind, Notification, NotificationSink, Result};

use crate::TRACING_TARGET_ARCHIVE;
use crate::busy::BusyFlag;

/// Label shown on the archive action while a request is in flight.
pub const ARCHIVING_LABEL: &str = "Archiving...";

/// Requests archival of all files on a record into one fixed destination.
///
/// One orchestrator exists per destination. Every call to
/// [`archive_all`](Self::archive_all) resolves to exactly one notification.
#[derive(Clone)]
pub struct BulkArchiveOrchestrator {
    destination: ArchiveDestination,
    archival: ArchivalService,
    sink: Arc<dyn NotificationSink>,
    busy: BusyFlag,
}

impl fmt::Debug for BulkArchiveOrchestrator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BulkArchiveOrchestrator")
            .field("destination", &self.destination)
            .field("busy", &self.busy.is_busy())
            .finish_non_exhaustive()
    }
}

impl BulkArchiveOrchestrator {
    pub fn new<S>(destination: ArchiveDestination, archival: ArchivalService, sink: S) -> Self
    where
        S: NotificationSink + 'static,
    {
        Self {
            destination,
            archival,
            sink: Arc::new(sink),
            busy: BusyFlag::new(),
        }
    }

    /// Orchestrator archiving into S3.
    pub fn primary<S>(archival: ArchivalService, sink: S) -> Self
    where
        S: NotificationSink + 'static,
    {
        Self::new(ArchiveDestination::Primary, archival, sink)
    }

    /// Orchestrator archiving into Azure Blob Storage.
    pub fn secondary<S>(archival: ArchivalService, sink: S) -> Self
    where
        S: NotificationSink + 'static,
    {
        Self::new(ArchiveDestination::Secondary, archival, sink)
    }

    #[inline]
    pub fn destination(&self) -> ArchiveDestination {
        self.destination
    }

    /// Whether a request is in flight.
    #[inline]
    pub fn is_busy(&self) -> bool {
        self.busy.is_busy()
    }

    /// Returns the flag observed by [`is_busy`](Self::is_busy).
    pub fn busy_flag(&self) -> BusyFlag {
        self.busy.clone()
    }

    /// Label for the archive action in its current state.
    pub fn button_label(&self) -> &'static str {
        if self.is_busy() {
            ARCHIVING_LABEL
        } else {
            self.destination.action_label()
        }
    }

    /// Sends one archive request for `record` and notifies the outcome.
    ///
    /// Failures are not retried. On failure the returned error has kind
    /// [`ErrorKind::ArchiveRequest`].
    #[tracing::instrument(
        skip_all,
        target = TRACING_TARGET_ARCHIVE,
        fields(record = %record, destination = %self.destination)
    )]
    pub async fn archive_all(&self, record: &RecordId) -> Result<ArchiveBatchResult> {
        let _busy = self.busy.enter();
        let destination = self.destination;

        match self.archival.archive_all(record, destination).await {
            Ok(result) => {
                self.sink.notify(summarize(destination, &result));
                tracing::info!(
                    target: TRACING_TARGET_ARCHIVE,
                    total_found = result.total_found,
                    total_queued = result.total_queued,
                    "Bulk archive finished"
                );
                Ok(result)
            }
            Err(error) => {
                let message = error.user_message();
                tracing::error!(
                    target: TRACING_TARGET_ARCHIVE,
                    error = %error,
                    "Bulk archive failed"
                );
                self.sink
                    .notify(Notification::error("Archive Failed", message).sticky());
                Err(error.with_kind(ErrorKind::ArchiveRequest))
            }
        }
    }

    /// Validates `record_id` and archives it.
    ///
    /// A blank identifier is reported like any other failure, without a
    /// request being sent.
    pub async fn archive_all_for(&self, record_id: &str) -> Result<ArchiveBatchResult> {
        match RecordId::new(record_id) {
            Ok(record) => self.archive_all(&record).await,
            Err(error) => {
                self.sink
                    .notify(Notification::error("Archive Failed", error.user_message()).sticky());
                Err(Error::archive_request().with_message(error.user_message()))
            }
        }
    }
}

/// Turns a successful service response into the user-facing summary.
fn summarize(destination: ArchiveDestination, result: &ArchiveBatchResult) -> Notification {
    let label = destination.label();

    if result.total_found == 0 {
        let message = result
            .message
            .as_deref()
            .map(str::trim)
            .filter(|message| !message.is_empty())
            .unwrap_or(destination.default_empty_message());
        return Notification::info("No Files", message);
    }

    Notification::success(
        format!("Archive to {label}"),
        format!(
            "Queued {} file(s) for {label} archiving.",
            result.total_queued
        ),
    )
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use listing_core::Severity;
    use listing_core::service::mock::{MockArchival, RecordingSink, Scripted};

    use super::*;

    fn record() -> RecordId {
        RecordId::new("a01").unwrap()
    }

    fn orchestrator(
        destination: ArchiveDestination,
        archival: &MockArchival,
    ) -> (BulkArchiveOrchestrator, RecordingSink) {
        let sink = RecordingSink::new();
        let orchestrator = BulkArchiveOrchestrator::new(
            destination,
            ArchivalService::new(archival.clone()),
            sink.clone(),
        );
        (orchestrator, sink)
    }

    #[tokio::test]
    async fn queued_files_notify_success() {
        let archival = MockArchival::replying(Scripted::ok(ArchiveBatchResult::queued(5)));
        let (orchestrator, sink) = orchestrator(ArchiveDestination::Primary, &archival);

        let result = orchestrator.archive_all(&record()).await.unwrap();
        assert_eq!(result.total_queued, 5);

        let notification = sink.single().unwrap();
        assert_eq!(notification.severity, Severity::Success);
        assert_eq!(notification.title, "Archive to S3");
        assert_eq!(notification.message, "Queued 5 file(s) for S3 archiving.");
        assert_eq!(archival.requests(), [(record(), ArchiveDestination::Primary)]);
    }

    #[tokio::test]
    async fn no_files_uses_service_message() {
        let archival = MockArchival::replying(Scripted::ok(
            ArchiveBatchResult::empty().with_message("Listing has no attachments"),
        ));
        let (orchestrator, sink) = orchestrator(ArchiveDestination::Secondary, &archival);

        orchestrator.archive_all(&record()).await.unwrap();

        let notification = sink.single().unwrap();
        assert_eq!(notification.severity, Severity::Info);
        assert_eq!(notification.title, "No Files");
        assert_eq!(notification.message, "Listing has no attachments");
    }

    #[tokio::test]
    async fn no_files_default_message_per_destination() {
        for (destination, expected) in [
            (ArchiveDestination::Primary, "No files found on this listing."),
            (ArchiveDestination::Secondary, "No files found to archive."),
        ] {
            let archival = MockArchival::replying(Scripted::ok(
                ArchiveBatchResult::empty().with_message("  "),
            ));
            let (orchestrator, sink) = orchestrator(destination, &archival);
            orchestrator.archive_all(&record()).await.unwrap();
            assert_eq!(sink.single().unwrap().message, expected);
        }
    }

    #[tokio::test]
    async fn failure_carries_most_specific_message() {
        let archival =
            MockArchival::replying(Scripted::err(ErrorKind::ServiceUnavailable, "Queue is full"));
        let (orchestrator, sink) = orchestrator(ArchiveDestination::Primary, &archival);

        let error = orchestrator.archive_all(&record()).await.unwrap_err();
        assert_eq!(error.kind(), ErrorKind::ArchiveRequest);

        let notification = sink.single().unwrap();
        assert_eq!(notification.severity, Severity::Error);
        assert_eq!(notification.title, "Archive Failed");
        assert_eq!(notification.message, "Queue is full");
        assert!(notification.sticky);
        assert!(!orchestrator.is_busy());
    }

    #[tokio::test]
    async fn failure_without_message_is_unexpected() {
        let archival = MockArchival::replying(Scripted::bare_err(ErrorKind::Unknown));
        let (orchestrator, sink) = orchestrator(ArchiveDestination::Primary, &archival);

        orchestrator.archive_all(&record()).await.unwrap_err();
        assert_eq!(sink.single().unwrap().message, "Unexpected error");
    }

    #[tokio::test]
    async fn blank_record_sends_nothing() {
        let archival = MockArchival::new();
        let (orchestrator, sink) = orchestrator(ArchiveDestination::Primary, &archival);

        let error = orchestrator.archive_all_for("  ").await.unwrap_err();
        assert_eq!(error.kind(), ErrorKind::ArchiveRequest);
        assert_eq!(sink.single().unwrap().message, "recordId is missing");
        assert!(archival.requests().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn busy_while_in_flight() {
        let archival = MockArchival::replying(
            Scripted::ok(ArchiveBatchResult::queued(1)).after(Duration::from_secs(1)),
        );
        let (orchestrator, _sink) = orchestrator(ArchiveDestination::Secondary, &archival);
        assert_eq!(orchestrator.button_label(), "Archive All Files to Azure");

        let running = tokio::spawn({
            let orchestrator = orchestrator.clone();
            async move { orchestrator.archive_all(&record()).await }
        });
        tokio::task::yield_now().await;

        assert!(orchestrator.is_busy());
        assert_eq!(orchestrator.button_label(), "Archiving...");

        running.await.unwrap().unwrap();
        assert!(!orchestrator.is_busy());
        assert_eq!(orchestrator.button_label(), "Archive All Files to Azure");
    }
}
