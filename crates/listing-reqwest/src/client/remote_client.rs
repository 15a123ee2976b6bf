//! Reqwest-based client for the listing API.

use std::sync::Arc;

use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use url::Url;

use super::RemoteConfig;
use crate::{Error, Result, TRACING_TARGET_CLIENT};

/// Inner client that holds the HTTP client, configuration and parsed base URL.
struct RemoteClientInner {
    http: Client,
    config: RemoteConfig,
    base: Url,
}

/// HTTP client for the listing API.
///
/// Cheap to clone; all clones share one connection pool. The client
/// implements every remote collaborator trait of `listing-core`, so a single
/// instance can back the store, both orchestrators and the bucket catalog.
#[derive(Clone)]
pub struct RemoteClient {
    inner: Arc<RemoteClientInner>,
}

impl std::fmt::Debug for RemoteClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RemoteClient")
            .field("base", &self.inner.base.as_str())
            .finish_non_exhaustive()
    }
}

impl RemoteClient {
    /// Creates a new client with the given configuration.
    pub fn new(config: RemoteConfig) -> Result<Self> {
        config.validate().map_err(Error::InvalidUrl)?;
        let base = config.base_url().map_err(Error::InvalidUrl)?;
        let timeout = config.effective_timeout();
        let user_agent = config.effective_user_agent();

        tracing::debug!(
            target: TRACING_TARGET_CLIENT,
            base = %base,
            timeout_ms = timeout.as_millis(),
            "Creating listing API client"
        );

        let http = Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .build()?;

        tracing::info!(
            target: TRACING_TARGET_CLIENT,
            base = %base,
            authenticated = config.listing_api_token.is_some(),
            "Listing API client created"
        );

        Ok(Self {
            inner: Arc::new(RemoteClientInner { http, config, base }),
        })
    }

    /// Gets the client configuration.
    pub fn config(&self) -> &RemoteConfig {
        &self.inner.config
    }

    /// Gets the underlying HTTP client.
    pub(crate) fn http(&self) -> &Client {
        &self.inner.http
    }

    /// Resolves `segments` under the base URL, percent-encoding each one.
    pub(crate) fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.inner.base.clone();
        url.path_segments_mut()
            .map_err(|()| Error::InvalidUrl(format!("API URL cannot be a base: {}", self.inner.base)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Attaches the bearer token, if configured.
    pub(crate) fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.inner.config.listing_api_token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    /// Sends an authorized request and fails on non-success statuses.
    pub(crate) async fn send(&self, request: RequestBuilder) -> Result<Response> {
        let response = self.authorize(request).send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        tracing::debug!(
            target: TRACING_TARGET_CLIENT,
            status = status.as_u16(),
            body_len = body.len(),
            "Listing API returned an error status"
        );
        Err(Error::status(status, &body))
    }

    /// Sends an authorized request and decodes a JSON body.
    pub(crate) async fn send_json<T>(&self, request: RequestBuilder) -> Result<T>
    where
        T: DeserializeOwned,
    {
        let response = self.send(request).await?;
        let bytes = response.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_encodes_segments() {
        let client = RemoteClient::new(RemoteConfig::new("https://api.example.com/v1/")).unwrap();
        let url = client
            .endpoint(&["listings", "a01", "files", "floor plan#2.pdf", "content"])
            .unwrap();
        assert_eq!(
            url.as_str(),
            "https://api.example.com/v1/listings/a01/files/floor%20plan%232.pdf/content"
        );
    }

    #[test]
    fn endpoint_without_base_path() {
        let client = RemoteClient::new(RemoteConfig::new("https://api.example.com")).unwrap();
        let url = client.endpoint(&["buckets"]).unwrap();
        assert_eq!(url.as_str(), "https://api.example.com/buckets");
    }

    #[test]
    fn invalid_config_is_rejected() {
        let err = RemoteClient::new(RemoteConfig::new("nope")).unwrap_err();
        assert!(matches!(err, Error::InvalidUrl(_)));
    }
}
