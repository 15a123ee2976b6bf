//! Azure Blob Storage provider using [`object_store::azure::MicrosoftAzureBuilder`].

#[cfg(feature = "config")]
use clap::Args;
use derive_more::Deref;
use object_store::azure::MicrosoftAzureBuilder;
use serde::{Deserialize, Serialize};

use super::Client;
use crate::client::ObjectStoreClient;
use crate::{Error, Result};

/// Typed credentials for Azure Blob Storage.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[cfg_attr(feature = "config", derive(Args))]
#[serde(rename_all = "camelCase")]
pub struct AzureCredentials {
    /// Azure storage container name
    #[cfg_attr(feature = "config", arg(long = "azure-container", env = "AZURE_CONTAINER"))]
    pub container: String,

    /// Azure storage account name
    #[cfg_attr(
        feature = "config",
        arg(long = "azure-account", env = "AZURE_STORAGE_ACCOUNT")
    )]
    pub account_name: String,

    /// Storage account access key
    #[cfg_attr(
        feature = "config",
        arg(long = "azure-access-key", env = "AZURE_STORAGE_ACCESS_KEY", hide_env_values = true)
    )]
    #[serde(default)]
    pub access_key: Option<String>,

    /// Shared Access Signature token
    #[cfg_attr(
        feature = "config",
        arg(long = "azure-sas-token", env = "AZURE_SAS_TOKEN", hide_env_values = true)
    )]
    #[serde(default)]
    pub sas_token: Option<String>,

    /// Custom endpoint URL (for Azurite)
    #[cfg_attr(feature = "config", arg(long = "azure-endpoint", env = "AZURE_ENDPOINT"))]
    #[serde(default)]
    pub endpoint: Option<String>,
}

impl AzureCredentials {
    /// Splits the SAS token into query pairs.
    fn sas_pairs(&self) -> Option<Vec<(String, String)>> {
        let sas = self.sas_token.as_deref()?;
        let pairs = sas
            .trim_start_matches('?')
            .split('&')
            .filter(|pair| !pair.is_empty())
            .map(|pair| match pair.split_once('=') {
                Some((key, value)) => (key.to_owned(), value.to_owned()),
                None => (pair.to_owned(), String::new()),
            })
            .collect();
        Some(pairs)
    }
}

/// Azure Blob Storage-backed object storage client.
#[derive(Debug, Clone, Deref)]
pub struct AzureProvider(ObjectStoreClient);

impl Client for AzureProvider {
    type Credentials = AzureCredentials;

    const ID: &'static str = "azure";

    async fn connect(creds: &Self::Credentials) -> Result<Self> {
        let mut builder = MicrosoftAzureBuilder::new()
            .with_container_name(&creds.container)
            .with_account(&creds.account_name);

        if let Some(key) = &creds.access_key {
            builder = builder.with_access_key(key);
        }

        if let Some(pairs) = creds.sas_pairs() {
            builder = builder.with_sas_authorization(pairs);
        }

        if let Some(endpoint) = &creds.endpoint {
            builder = builder.with_endpoint(endpoint.clone());
            if endpoint.starts_with("http://") {
                builder = builder.with_allow_http(true);
            }
        }

        let store = builder
            .build()
            .map_err(|e| Error::connection(Self::ID, e))?;

        tracing::debug!(
            target: crate::TRACING_TARGET,
            account = %creds.account_name,
            container = %creds.container,
            "Azure client ready"
        );
        Ok(Self(ObjectStoreClient::new(store)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sas_token_pairs() {
        let creds: AzureCredentials = serde_json::from_str(
            r#"{"container": "listing", "accountName": "archive",
                "sasToken": "?sv=2022-11-02&sig=abc%3D&flag"}"#,
        )
        .unwrap();

        assert_eq!(
            creds.sas_pairs().unwrap(),
            [
                ("sv".to_owned(), "2022-11-02".to_owned()),
                ("sig".to_owned(), "abc%3D".to_owned()),
                ("flag".to_owned(), String::new()),
            ]
        );
    }

    #[test]
    fn no_sas_token() {
        let creds: AzureCredentials =
            serde_json::from_str(r#"{"container": "listing", "accountName": "archive"}"#).unwrap();
        assert!(creds.sas_pairs().is_none());
    }
}
