use anyhow::Context;
use listing_core::TracingSink;
use listing_core::service::{AuthorizationService, ContentService, TransferService};
use listing_object::{AzureProvider, Client, S3Provider};
use listing_reqwest::RemoteClient;
use listing_runtime::DirectUploadOrchestrator;

use crate::TRACING_TARGET_COMMAND;
use crate::config::{OutputFormat, TransferTarget, UploadArgs};
use crate::render;

/// Uploads every authorized file of one listing.
///
/// Authorizations and file content come from the listing API; transfers go
/// to presigned URLs or straight into the selected object store.
pub async fn upload(
    remote: RemoteClient,
    args: UploadArgs,
    output: OutputFormat,
) -> anyhow::Result<()> {
    let transfer = transfer_service(&remote, args.target.as_ref()).await?;
    let orchestrator = DirectUploadOrchestrator::new(
        AuthorizationService::new(remote.clone()),
        ContentService::new(remote),
        transfer,
        TracingSink,
    )
    .with_config(args.upload);

    let batch = orchestrator.upload_all_for(&args.record).await?;
    render::batch(&batch, output)
}

async fn transfer_service(
    remote: &RemoteClient,
    target: Option<&TransferTarget>,
) -> anyhow::Result<TransferService> {
    let service = match target {
        None | Some(TransferTarget::Presigned) => TransferService::new(remote.clone()),
        Some(TransferTarget::S3(creds)) => {
            let provider = S3Provider::connect(creds)
                .await
                .context("failed to configure S3 client")?;
            TransferService::new((*provider).clone())
        }
        Some(TransferTarget::Azure(creds)) => {
            let provider = AzureProvider::connect(creds)
                .await
                .context("failed to configure Azure client")?;
            TransferService::new((*provider).clone())
        }
    };

    tracing::debug!(
        target: TRACING_TARGET_COMMAND,
        target_kind = target.map_or("presigned", TransferTarget::name),
        "Transfer target ready"
    );
    Ok(service)
}
