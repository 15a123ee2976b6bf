#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

/// Tracing target for client construction and raw HTTP exchanges.
pub const TRACING_TARGET_CLIENT: &str = "listing_reqwest::client";

/// Tracing target for collaborator implementations.
pub const TRACING_TARGET_SERVICE: &str = "listing_reqwest::service";

mod client;
mod error;
mod service;

pub use crate::client::{RemoteClient, RemoteConfig};
pub use crate::error::{Error, Result};
