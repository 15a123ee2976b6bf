//! CLI configuration management.
//!
//! ```text
//! Cli
//! ├── remote: RemoteConfig        # Listing API URL, token, HTTP settings
//! ├── log_format / output         # Presentation of logs and results
//! └── command: Command
//!     ├── watch   (NatsConfig, SyncConfig)
//!     ├── signal  (NatsConfig, SyncConfig)
//!     ├── archive (destination)
//!     ├── upload  (UploadConfig, optional transfer target)
//!     └── buckets
//! ```
//!
//! All configuration can be provided via CLI arguments or environment variables.

mod command;

use std::process;

use anyhow::Context;
use clap::{Parser, ValueEnum};
pub use command::{ArchiveArgs, ChannelArgs, Command, TransferTarget, UploadArgs, WatchArgs};
use listing_reqwest::RemoteConfig;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use crate::{TRACING_TARGET_CONFIG, TRACING_TARGET_STARTUP};

/// Format of log lines written to stderr.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

/// Format of command results written to stdout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Complete CLI configuration.
#[derive(Debug, Clone, Parser)]
#[command(name = "listing")]
#[command(about = "Synchronize, archive and upload the files of a property listing")]
#[command(version)]
pub struct Cli {
    /// Listing API connection.
    #[clap(flatten)]
    pub remote: RemoteConfig,

    /// Log line format
    #[arg(long, env = "LISTING_LOG_FORMAT", value_enum, default_value_t = LogFormat::Text, global = true)]
    pub log_format: LogFormat,

    /// Result output format
    #[arg(long, env = "LISTING_OUTPUT", value_enum, default_value_t = OutputFormat::Text, global = true)]
    pub output: OutputFormat,

    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    /// Loads environment variables from .env file (if enabled) and parses CLI arguments.
    pub fn init() -> Self {
        Self::load_dotenv();
        Self::parse()
    }

    /// Loads environment variables from .env file if the dotenv feature is enabled.
    #[cfg(feature = "dotenv")]
    fn load_dotenv() {
        if let Err(err) = dotenvy::dotenv()
            && !err.not_found()
        {
            eprintln!("Warning: failed to load .env file: {err}");
        }
    }

    /// No-op when dotenv feature is disabled.
    #[cfg(not(feature = "dotenv"))]
    fn load_dotenv() {}

    /// Initializes tracing with environment-based filtering.
    pub fn init_tracing(&self) {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
        let registry = tracing_subscriber::registry().with(filter);

        match self.log_format {
            LogFormat::Text => registry
                .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
                .init(),
            LogFormat::Json => registry
                .with(
                    tracing_subscriber::fmt::layer()
                        .json()
                        .with_writer(std::io::stderr),
                )
                .init(),
        }
    }

    /// Validates all configuration values.
    pub fn validate(&self) -> anyhow::Result<()> {
        self.remote
            .validate()
            .map_err(anyhow::Error::msg)
            .context("invalid listing API configuration")?;
        self.command.validate()
    }

    /// Logs configuration at debug level (no sensitive information).
    pub fn log(&self) {
        tracing::debug!(
            target: TRACING_TARGET_STARTUP,
            version = env!("CARGO_PKG_VERSION"),
            pid = process::id(),
            arch = std::env::consts::ARCH,
            os = std::env::consts::OS,
            features = ?Self::enabled_features(),
            "Build information"
        );

        tracing::info!(
            target: TRACING_TARGET_CONFIG,
            api_url = %self.remote.listing_api_url,
            authenticated = self.remote.listing_api_token.is_some(),
            timeout_secs = self.remote.effective_timeout().as_secs(),
            command = self.command.name(),
            "Listing API configuration"
        );

        self.command.log();
    }

    /// Returns a list of enabled compile-time features.
    fn enabled_features() -> Vec<&'static str> {
        [cfg!(feature = "dotenv").then_some("dotenv")]
            .into_iter()
            .flatten()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;
    use listing_core::types::ArchiveDestination;
    use listing_runtime::RefreshOrdering;

    use super::*;

    #[test]
    fn command_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_archive() {
        let cli = Cli::try_parse_from([
            "listing",
            "--api-url",
            "https://api.example.com",
            "archive",
            "a01",
            "--destination",
            "azure",
        ])
        .unwrap();

        let Command::Archive(args) = &cli.command else {
            panic!("expected archive command");
        };
        assert_eq!(args.record, "a01");
        assert_eq!(args.destination, ArchiveDestination::Secondary);
        assert!(cli.validate().is_ok());
    }

    #[test]
    fn parses_upload_with_s3_target() {
        let cli = Cli::try_parse_from([
            "listing",
            "--api-url",
            "https://api.example.com",
            "upload",
            "a01",
            "--upload-concurrency",
            "4",
            "s3",
            "--s3-bucket",
            "listing-archive",
        ])
        .unwrap();

        let Command::Upload(args) = cli.command else {
            panic!("expected upload command");
        };
        assert_eq!(args.upload.upload_concurrency, 4);
        let Some(TransferTarget::S3(creds)) = args.target else {
            panic!("expected s3 target");
        };
        assert_eq!(creds.bucket, "listing-archive");
    }

    #[test]
    fn parses_watch_with_ordering() {
        let cli = Cli::try_parse_from([
            "listing",
            "--api-url",
            "https://api.example.com",
            "--output",
            "json",
            "watch",
            "a01",
            "--nats-url",
            "nats://localhost:4222",
            "--nats-token",
            "secret",
            "--refresh-ordering",
            "completion",
        ])
        .unwrap();

        assert_eq!(cli.output, OutputFormat::Json);
        let Command::Watch(args) = cli.command else {
            panic!("expected watch command");
        };
        assert_eq!(args.channel.sync.refresh_ordering, RefreshOrdering::Completion);
        assert!(args.channel.nats.validate().is_ok());
    }

    #[test]
    fn zero_concurrency_is_rejected() {
        let cli = Cli::try_parse_from([
            "listing",
            "--api-url",
            "https://api.example.com",
            "upload",
            "a01",
            "--upload-concurrency",
            "0",
        ])
        .unwrap();
        assert!(cli.validate().is_err());
    }
}
