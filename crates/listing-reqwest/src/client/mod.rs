//! Listing API client and its configuration.

mod remote_client;
mod remote_config;

pub use remote_client::RemoteClient;
pub use remote_config::RemoteConfig;
