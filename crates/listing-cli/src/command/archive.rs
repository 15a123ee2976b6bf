use listing_core::TracingSink;
use listing_core::service::ArchivalService;
use listing_reqwest::RemoteClient;
use listing_runtime::BulkArchiveOrchestrator;

use crate::config::{ArchiveArgs, OutputFormat};
use crate::render;

/// Requests archival of every file of one listing.
///
/// The outcome notification is logged; the service response is printed.
pub async fn archive(
    remote: RemoteClient,
    args: ArchiveArgs,
    output: OutputFormat,
) -> anyhow::Result<()> {
    let orchestrator =
        BulkArchiveOrchestrator::new(args.destination, ArchivalService::new(remote), TracingSink);

    let result = orchestrator.archive_all_for(&args.record).await?;
    render::archive(&result, args.destination, output)
}
