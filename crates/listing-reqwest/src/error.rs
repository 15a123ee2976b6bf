//! Error types for the listing HTTP client.

use reqwest::StatusCode;
use serde::Deserialize;
use thiserror::Error;

/// Result type alias for listing-reqwest operations.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Error type for listing-reqwest operations.
#[derive(Debug, Error)]
pub enum Error {
    /// HTTP request failed before a response was read.
    #[error("HTTP error: {0}")]
    Reqwest(#[from] reqwest::Error),
    /// Response body could not be decoded.
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
    /// The service answered with a non-success status.
    #[error("HTTP {status}")]
    Status {
        status: StatusCode,
        /// Message decoded from the error body, if any.
        message: Option<String>,
    },
    /// Configured base URL is unusable.
    #[error("Invalid base URL: {0}")]
    InvalidUrl(String),
}

/// Error body returned by the listing API.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
}

impl Error {
    /// Builds a status error, decoding `{"message": ...}` from `body`.
    pub(crate) fn status(status: StatusCode, body: &str) -> Self {
        let message = serde_json::from_str::<ErrorBody>(body)
            .ok()
            .and_then(|body| body.message)
            .filter(|message| !message.trim().is_empty());
        Self::Status { status, message }
    }

    /// Returns true if the request may succeed on retry.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Reqwest(e) => e.is_timeout() || e.is_connect(),
            Self::Status { status, .. } => {
                status.is_server_error() || *status == StatusCode::TOO_MANY_REQUESTS
            }
            Self::Serde(_) | Self::InvalidUrl(_) => false,
        }
    }
}

impl From<Error> for listing_core::Error {
    fn from(err: Error) -> Self {
        match err {
            Error::Reqwest(e) => {
                if e.is_timeout() {
                    listing_core::Error::timeout()
                        .with_message(e.to_string())
                        .with_source(e)
                } else if e.is_connect() {
                    listing_core::Error::network_error()
                        .with_message("Connection failed")
                        .with_source(e)
                } else if e.is_decode() {
                    listing_core::Error::serialization().with_source(e)
                } else {
                    listing_core::Error::network_error()
                        .with_message(e.to_string())
                        .with_source(e)
                }
            }
            Error::Serde(e) => listing_core::Error::serialization()
                .with_message(e.to_string())
                .with_source(e),
            Error::Status { status, message } => {
                let error = match status {
                    StatusCode::BAD_REQUEST | StatusCode::NOT_FOUND => {
                        listing_core::Error::invalid_input()
                    }
                    StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                        listing_core::Error::authorization()
                    }
                    StatusCode::REQUEST_TIMEOUT | StatusCode::GATEWAY_TIMEOUT => {
                        listing_core::Error::timeout()
                    }
                    StatusCode::SERVICE_UNAVAILABLE | StatusCode::TOO_MANY_REQUESTS => {
                        listing_core::Error::service_unavailable()
                    }
                    _ => listing_core::Error::external_error(),
                };
                let error = error.with_context(format!("status={}", status.as_u16()));
                match message {
                    Some(message) => error.with_message(message),
                    None => error.with_source(Error::Status {
                        status,
                        message: None,
                    }),
                }
            }
            Error::InvalidUrl(reason) => listing_core::Error::configuration().with_message(reason),
        }
    }
}

#[cfg(test)]
mod tests {
    use listing_core::ErrorKind;

    use super::*;

    #[test]
    fn service_message_is_decoded() {
        let err = Error::status(StatusCode::NOT_FOUND, r#"{"message": "Listing not found"}"#);
        let err = listing_core::Error::from(err);
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
        assert_eq!(err.user_message(), "Listing not found");
    }

    #[test]
    fn bare_status_falls_back_to_status_text() {
        let err = Error::status(StatusCode::INTERNAL_SERVER_ERROR, "<html>oops</html>");
        assert!(err.is_retryable());

        let err = listing_core::Error::from(err);
        assert_eq!(err.kind(), ErrorKind::ExternalError);
        assert_eq!(err.user_message(), "HTTP 500 Internal Server Error");
    }

    #[test]
    fn blank_message_is_ignored() {
        let err = Error::status(StatusCode::FORBIDDEN, r#"{"message": "  "}"#);
        assert!(matches!(err, Error::Status { message: None, .. }));
        assert!(!err.is_retryable());
    }
}
