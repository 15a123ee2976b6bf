//! Subcommands and their arguments.

use anyhow::Context;
use clap::{Args, Subcommand};
use listing_core::types::ArchiveDestination;
use listing_nats::NatsConfig;
use listing_object::{AzureCredentials, S3Credentials};
use listing_runtime::{SyncConfig, UploadConfig};

use crate::TRACING_TARGET_CONFIG;

/// Operation to run.
#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Follow a listing's files, refreshing on every invalidation signal
    Watch(WatchArgs),
    /// Publish one refresh signal on the invalidation channel
    Signal(ChannelArgs),
    /// Queue every file of a listing for archival
    Archive(ArchiveArgs),
    /// Upload every authorized file of a listing
    Upload(UploadArgs),
    /// List the buckets available for archival
    Buckets,
}

/// Invalidation channel connection and topic.
#[derive(Debug, Clone, Args)]
pub struct ChannelArgs {
    #[clap(flatten)]
    pub nats: NatsConfig,

    #[clap(flatten)]
    pub sync: SyncConfig,
}

#[derive(Debug, Clone, Args)]
pub struct WatchArgs {
    /// Listing identifier
    pub record: String,

    #[clap(flatten)]
    pub channel: ChannelArgs,
}

#[derive(Debug, Clone, Args)]
pub struct ArchiveArgs {
    /// Listing identifier
    pub record: String,

    /// Archive store (s3 or azure)
    #[arg(long, env = "LISTING_ARCHIVE_DESTINATION", default_value = "s3")]
    pub destination: ArchiveDestination,
}

#[derive(Debug, Clone, Args)]
pub struct UploadArgs {
    /// Listing identifier
    pub record: String,

    #[clap(flatten)]
    pub upload: UploadConfig,

    /// Where transfers are written; presigned URLs when omitted
    #[command(subcommand)]
    pub target: Option<TransferTarget>,
}

/// Destination of direct upload transfers.
#[derive(Debug, Clone, Subcommand)]
pub enum TransferTarget {
    /// PUT each file to the presigned URL issued with its authorization
    Presigned,
    /// Write each file into an S3 bucket under its authorized key
    S3(S3Credentials),
    /// Write each file into an Azure container under its authorized key
    Azure(AzureCredentials),
}

impl TransferTarget {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Presigned => "presigned",
            Self::S3(_) => "s3",
            Self::Azure(_) => "azure",
        }
    }
}

impl Command {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Watch(_) => "watch",
            Self::Signal(_) => "signal",
            Self::Archive(_) => "archive",
            Self::Upload(_) => "upload",
            Self::Buckets => "buckets",
        }
    }

    /// Validates the arguments of the selected command.
    pub fn validate(&self) -> anyhow::Result<()> {
        match self {
            Self::Watch(WatchArgs { channel, .. }) | Self::Signal(channel) => channel.validate(),
            Self::Upload(args) => args
                .upload
                .validate()
                .map_err(anyhow::Error::msg)
                .context("invalid upload configuration"),
            Self::Archive(_) | Self::Buckets => Ok(()),
        }
    }

    /// Logs command configuration (no sensitive information).
    pub fn log(&self) {
        match self {
            Self::Watch(WatchArgs { channel, .. }) | Self::Signal(channel) => {
                tracing::info!(
                    target: TRACING_TARGET_CONFIG,
                    nats_servers = ?channel.nats.servers(),
                    nats_client_name = channel.nats.name(),
                    refresh_topic = %channel.sync.refresh_topic,
                    refresh_ordering = %channel.sync.refresh_ordering,
                    "Invalidation channel configuration"
                );
            }
            Self::Upload(args) => {
                tracing::info!(
                    target: TRACING_TARGET_CONFIG,
                    concurrency = args.upload.effective_concurrency(),
                    target = args.target.as_ref().map_or("presigned", TransferTarget::name),
                    "Upload configuration"
                );
            }
            Self::Archive(args) => {
                tracing::info!(
                    target: TRACING_TARGET_CONFIG,
                    destination = %args.destination,
                    "Archive configuration"
                );
            }
            Self::Buckets => {}
        }
    }
}

impl ChannelArgs {
    fn validate(&self) -> anyhow::Result<()> {
        self.nats
            .validate()
            .map_err(anyhow::Error::msg)
            .context("invalid NATS configuration")?;
        self.sync
            .validate()
            .map_err(anyhow::Error::msg)
            .context("invalid sync configuration")?;
        Ok(())
    }
}
