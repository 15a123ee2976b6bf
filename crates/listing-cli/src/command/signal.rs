use anyhow::Context;

use super::connect_channel;
use crate::TRACING_TARGET_COMMAND;
use crate::config::ChannelArgs;

/// Publishes one refresh signal on the configured topic.
pub async fn signal(args: ChannelArgs) -> anyhow::Result<()> {
    let channel = connect_channel(&args)
        .await
        .context("failed to connect to NATS")?;

    channel
        .publish(&args.sync.refresh_topic)
        .await
        .context("failed to publish refresh signal")?;

    tracing::info!(
        target: TRACING_TARGET_COMMAND,
        topic = %args.sync.refresh_topic,
        "Refresh signal published"
    );
    Ok(())
}
