use listing_core::service::BucketListService;
use listing_reqwest::RemoteClient;
use listing_runtime::BucketCatalog;

use crate::config::OutputFormat;
use crate::render;

/// Lists the buckets available for archival.
pub async fn buckets(remote: RemoteClient, output: OutputFormat) -> anyhow::Result<()> {
    let catalog = BucketCatalog::load(&BucketListService::new(remote)).await;
    if let Some(error) = &catalog.error {
        anyhow::bail!("failed to list buckets: {error}");
    }

    render::buckets(catalog.names(), output)
}
