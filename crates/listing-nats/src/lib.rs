#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

/// Tracing target for NATS client operations.
///
/// Use this target for logging client initialization and configuration.
pub const TRACING_TARGET_CLIENT: &str = "listing_nats::client";

/// Tracing target for NATS connection events.
///
/// Use this target for logging connection establishment, disconnects and reconnects.
pub const TRACING_TARGET_CONNECTION: &str = "listing_nats::connection";

/// Tracing target for invalidation subscriptions.
pub const TRACING_TARGET_CHANNEL: &str = "listing_nats::channel";

mod channel;
mod client;
mod error;

pub use channel::NatsChannel;
pub use client::{NatsClient, NatsConfig, TransportErrors};
pub use error::{Error, Result};
