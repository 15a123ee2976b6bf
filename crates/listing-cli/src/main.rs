#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

mod command;
mod config;
mod render;
mod shutdown;

use std::process;

use anyhow::Context;
use listing_reqwest::RemoteClient;

use crate::config::{Cli, Command};

// Tracing target constants
pub const TRACING_TARGET_STARTUP: &str = "listing_cli::startup";
pub const TRACING_TARGET_SHUTDOWN: &str = "listing_cli::shutdown";
pub const TRACING_TARGET_CONFIG: &str = "listing_cli::config";
pub const TRACING_TARGET_COMMAND: &str = "listing_cli::command";

#[tokio::main]
async fn main() {
    let Err(error) = run().await else {
        tracing::debug!(
            target: TRACING_TARGET_SHUTDOWN,
            "command completed successfully"
        );
        process::exit(0);
    };

    if tracing::enabled!(tracing::Level::ERROR) {
        tracing::error!(
            target: TRACING_TARGET_SHUTDOWN,
            error = format!("{error:#}"),
            "command failed"
        );
    } else {
        eprintln!("Error: {error:#}");
    }

    process::exit(1);
}

/// Main application entry point.
async fn run() -> anyhow::Result<()> {
    let cli = Cli::init();
    cli.init_tracing();
    cli.log();
    cli.validate()?;

    let remote = || {
        RemoteClient::new(cli.remote.clone()).context("failed to create listing API client")
    };
    let output = cli.output;

    match cli.command {
        Command::Watch(args) => command::watch(remote()?, args, output).await,
        Command::Signal(args) => command::signal(args).await,
        Command::Archive(args) => command::archive(remote()?, args, output).await,
        Command::Upload(args) => command::upload(remote()?, args, output).await,
        Command::Buckets => command::buckets(remote()?, output).await,
    }
}
