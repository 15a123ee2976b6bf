//! S3-compatible provider using [`object_store::aws::AmazonS3Builder`].
//!
//! Works with AWS S3, MinIO, and any S3-compatible service.

#[cfg(feature = "config")]
use clap::Args;
use derive_more::Deref;
use object_store::aws::AmazonS3Builder;
use serde::{Deserialize, Serialize};

use super::Client;
use crate::client::ObjectStoreClient;
use crate::{Error, Result};

/// Typed credentials for S3-compatible provider.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[cfg_attr(feature = "config", derive(Args))]
#[serde(rename_all = "camelCase")]
pub struct S3Credentials {
    /// S3 bucket name
    #[cfg_attr(feature = "config", arg(long = "s3-bucket", env = "S3_BUCKET"))]
    pub bucket: String,

    /// AWS region
    #[cfg_attr(
        feature = "config",
        arg(long = "s3-region", env = "AWS_REGION", default_value = "us-east-1")
    )]
    #[serde(default = "default_region")]
    pub region: String,

    /// Endpoint URL (e.g. `http://localhost:9000` for MinIO)
    #[cfg_attr(feature = "config", arg(long = "s3-endpoint", env = "S3_ENDPOINT"))]
    #[serde(default)]
    pub endpoint: Option<String>,

    /// Access key ID for static credentials
    #[cfg_attr(feature = "config", arg(long = "s3-access-key-id", env = "AWS_ACCESS_KEY_ID"))]
    #[serde(default)]
    pub access_key_id: Option<String>,

    /// Secret access key for static credentials
    #[cfg_attr(
        feature = "config",
        arg(long = "s3-secret-access-key", env = "AWS_SECRET_ACCESS_KEY", hide_env_values = true)
    )]
    #[serde(default)]
    pub secret_access_key: Option<String>,

    /// Session token for temporary credentials
    #[cfg_attr(
        feature = "config",
        arg(long = "s3-session-token", env = "AWS_SESSION_TOKEN", hide_env_values = true)
    )]
    #[serde(default)]
    pub session_token: Option<String>,
}

fn default_region() -> String {
    "us-east-1".to_string()
}

/// S3-backed object storage client.
#[derive(Debug, Clone, Deref)]
pub struct S3Provider(ObjectStoreClient);

impl Client for S3Provider {
    type Credentials = S3Credentials;

    const ID: &'static str = "s3";

    async fn connect(creds: &Self::Credentials) -> Result<Self> {
        let mut builder = AmazonS3Builder::new()
            .with_bucket_name(&creds.bucket)
            .with_region(&creds.region);

        if let Some(endpoint) = &creds.endpoint {
            builder = builder.with_endpoint(endpoint);
            if endpoint.starts_with("http://") {
                builder = builder.with_allow_http(true);
            }
        }

        if let Some(access_key) = &creds.access_key_id {
            builder = builder.with_access_key_id(access_key);
        }

        if let Some(secret_key) = &creds.secret_access_key {
            builder = builder.with_secret_access_key(secret_key);
        }

        if let Some(token) = &creds.session_token {
            builder = builder.with_token(token);
        }

        let store = builder
            .build()
            .map_err(|e| Error::connection(Self::ID, e))?;

        tracing::debug!(
            target: crate::TRACING_TARGET,
            bucket = %creds.bucket,
            region = %creds.region,
            "S3 client ready"
        );
        Ok(Self(ObjectStoreClient::new(store)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn credentials_from_json() {
        let creds: S3Credentials =
            serde_json::from_str(r#"{"bucket": "listing-archive", "endpoint": "http://localhost:9000"}"#)
                .unwrap();
        assert_eq!(creds.region, "us-east-1");
        assert!(creds.access_key_id.is_none());
    }

    #[tokio::test]
    async fn connect_with_static_keys() {
        let creds: S3Credentials = serde_json::from_str(
            r#"{"bucket": "listing-archive", "endpoint": "http://localhost:9000",
                "accessKeyId": "minio", "secretAccessKey": "minio123"}"#,
        )
        .unwrap();
        assert!(S3Provider::connect(&creds).await.is_ok());
    }
}
