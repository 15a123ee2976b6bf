use anyhow::Context;
use listing_core::service::FileSourceService;
use listing_core::types::RecordId;
use listing_reqwest::RemoteClient;
use listing_runtime::ReactiveFileStore;

use super::connect_channel;
use crate::config::{OutputFormat, WatchArgs};
use crate::shutdown::shutdown_signal;
use crate::{TRACING_TARGET_COMMAND, render};

/// Follows one listing, printing its file list on every applied change until
/// interrupted.
pub async fn watch(
    remote: RemoteClient,
    args: WatchArgs,
    output: OutputFormat,
) -> anyhow::Result<()> {
    let record = RecordId::new(args.record)?;
    let channel = connect_channel(&args.channel)
        .await
        .context("failed to connect to NATS")?;

    let store = ReactiveFileStore::new(
        FileSourceService::new(remote),
        channel,
        args.channel.sync,
    );
    let mut changes = store.subscribe();

    attach(&store, record).await?;

    let shutdown = shutdown_signal();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            () = &mut shutdown => break,
            changed = changes.changed() => {
                if changed.is_err() {
                    break;
                }
                let snapshot = changes.borrow_and_update().clone();
                if snapshot.pending == 0 {
                    render::snapshot(&snapshot, output)?;
                }
            }
        }
    }

    store.detach().await?;
    tracing::info!(
        target: TRACING_TARGET_COMMAND,
        "File store detached"
    );
    Ok(())
}

/// Attaches `store` to `record`, detaching again if that fails.
///
/// A detach failure is only logged; the attach error is the one returned.
async fn attach(store: &ReactiveFileStore, record: RecordId) -> anyhow::Result<()> {
    let Err(error) = store.attach(record).await else {
        return Ok(());
    };

    if let Err(detach_error) = store.detach().await {
        tracing::warn!(
            target: TRACING_TARGET_COMMAND,
            error = %detach_error,
            "Failed to detach file store after attach failure"
        );
    }
    Err(error).context("failed to attach file store")
}

#[cfg(test)]
mod tests {
    use listing_core::channel::MemoryChannel;
    use listing_core::service::mock::MockFileSource;
    use listing_core::types::RawFileRecord;
    use listing_core::{Error, ErrorKind};
    use listing_runtime::{StoreState, SyncConfig};

    use super::*;

    fn store(channel: &MemoryChannel) -> ReactiveFileStore {
        let source = MockFileSource::new(vec![RawFileRecord::new("a.pdf", "pdf", 10)]);
        ReactiveFileStore::new(
            FileSourceService::new(source),
            channel.clone(),
            SyncConfig::default(),
        )
    }

    #[tokio::test]
    async fn failed_attach_reports_attach_error_and_detaches() {
        let channel = MemoryChannel::new();
        channel.refuse_subscriptions(Some("broker down"));
        let store = store(&channel);

        let err = attach(&store, RecordId::new("a01").unwrap())
            .await
            .unwrap_err();

        let cause = err.downcast_ref::<Error>().unwrap();
        assert_eq!(cause.kind(), ErrorKind::Subscription);
        assert_eq!(cause.user_message(), "broker down");
        assert_eq!(store.snapshot().state, StoreState::Detached);
        assert_eq!(channel.released_subscriptions(), 0);
    }

    #[tokio::test]
    async fn attach_keeps_store_attached() {
        let channel = MemoryChannel::new();
        let store = store(&channel);

        attach(&store, RecordId::new("a01").unwrap()).await.unwrap();

        assert!(store.is_attached());
        assert_eq!(channel.active_subscriptions(), 1);
        store.detach().await.unwrap();
    }
}
