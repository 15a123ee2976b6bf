#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

/// Tracing target for object store operations.
pub const TRACING_TARGET: &str = "listing_object::client";

pub mod client;
mod error;
/// Client trait and object storage providers.
pub mod providers;

pub use client::{ObjectStoreClient, StoredObject};
pub use error::{Error, Result};
pub use providers::{AzureCredentials, AzureProvider, Client, S3Credentials, S3Provider};
