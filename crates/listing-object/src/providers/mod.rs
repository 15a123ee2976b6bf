mod azure;
mod s3;

use std::future::Future;

pub use azure::{AzureCredentials, AzureProvider};
use serde::de::DeserializeOwned;
pub use s3::{S3Credentials, S3Provider};

use crate::Result;

/// Object storage client built from typed credentials.
pub trait Client: Sized + Send {
    /// Strongly-typed credentials for this provider.
    type Credentials: DeserializeOwned + Send + Sync;

    /// Unique identifier (e.g. "s3", "azure").
    const ID: &'static str;

    /// Builds a client from `creds`.
    ///
    /// No request is made; invalid credentials surface on first use.
    fn connect(creds: &Self::Credentials) -> impl Future<Output = Result<Self>> + Send;
}
