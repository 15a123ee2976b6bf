//! Configuration for the listing API client.

use std::time::Duration;

#[cfg(feature = "config")]
use clap::Args;
use serde::{Deserialize, Serialize};
use url::Url;

/// Default timeout for HTTP requests: 30 seconds.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Configuration for the listing API client.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "config", derive(Args))]
pub struct RemoteConfig {
    /// Base URL of the listing API
    #[cfg_attr(feature = "config", arg(long = "api-url", env = "LISTING_API_URL"))]
    pub listing_api_url: String,

    /// Bearer token sent with every API request
    #[cfg_attr(
        feature = "config",
        arg(long = "api-token", env = "LISTING_API_TOKEN", hide_env_values = true)
    )]
    pub listing_api_token: Option<String>,

    /// Request timeout in seconds
    #[cfg_attr(feature = "config", arg(long = "http-timeout", env = "HTTP_TIMEOUT"))]
    pub http_timeout: Option<u64>,

    /// User-Agent header to send with requests
    #[cfg_attr(
        feature = "config",
        arg(long = "http-user-agent", env = "HTTP_USER_AGENT")
    )]
    pub http_user_agent: Option<String>,
}

impl RemoteConfig {
    /// Creates a configuration for the API at `base_url`.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            listing_api_url: base_url.into(),
            listing_api_token: None,
            http_timeout: None,
            http_user_agent: None,
        }
    }

    /// Returns the default user agent string.
    fn default_user_agent() -> String {
        format!("listing-sync/{}", env!("CARGO_PKG_VERSION"))
    }

    /// Sets the bearer token.
    #[must_use]
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.listing_api_token = Some(token.into());
        self
    }

    /// Sets the request timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.http_timeout = Some(timeout.as_secs());
        self
    }

    /// Sets the user agent.
    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.http_user_agent = Some(user_agent.into());
        self
    }

    /// Returns the effective timeout, using default if unset or zero.
    pub fn effective_timeout(&self) -> Duration {
        match self.http_timeout {
            Some(secs) if secs > 0 => Duration::from_secs(secs),
            _ => DEFAULT_TIMEOUT,
        }
    }

    /// Returns the effective user agent, using default if unset or empty.
    pub fn effective_user_agent(&self) -> String {
        self.http_user_agent
            .as_deref()
            .filter(|agent| !agent.trim().is_empty())
            .map_or_else(Self::default_user_agent, str::to_owned)
    }

    /// Parses the base URL.
    pub fn base_url(&self) -> Result<Url, String> {
        let url = Url::parse(self.listing_api_url.trim())
            .map_err(|e| format!("Invalid API URL '{}': {e}", self.listing_api_url))?;

        if !matches!(url.scheme(), "http" | "https") {
            return Err(format!("Unsupported API URL scheme: {}", url.scheme()));
        }
        if url.cannot_be_a_base() {
            return Err(format!("API URL cannot be a base: {url}"));
        }

        Ok(url)
    }

    /// Validate the configuration and return any issues.
    pub fn validate(&self) -> Result<(), String> {
        self.base_url()?;

        if self
            .listing_api_token
            .as_deref()
            .is_some_and(|token| token.trim().is_empty())
        {
            return Err("API token cannot be blank".to_string());
        }

        Ok(())
    }
}
