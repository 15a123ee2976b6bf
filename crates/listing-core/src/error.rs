//! Common error type definitions.

use strum::{AsRefStr, Display, EnumString, IntoStaticStr};
use thiserror::Error;

/// Type alias for boxed dynamic errors that can be sent across threads.
pub type BoxedError = Box<dyn std::error::Error + Send + Sync>;

/// Type alias for Results with our custom Error type.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Fallback text shown when an error carries no usable message.
pub const UNEXPECTED_ERROR: &str = "Unexpected error";

/// Categories of errors that can occur while synchronizing or archiving files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[derive(AsRefStr, Display, EnumString, IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum ErrorKind {
    /// Remote file query failed.
    Fetch,
    /// Pub/sub transport failure.
    Subscription,
    /// Bulk archive request failed outright.
    ArchiveRequest,
    /// Upload authorization could not be obtained.
    Authorization,
    /// A single file transfer threw.
    Transfer,
    /// Input validation failed.
    InvalidInput,
    /// Network-related error occurred.
    NetworkError,
    /// Timeout occurred.
    Timeout,
    /// Service temporarily unavailable.
    ServiceUnavailable,
    /// External service returned an error.
    ExternalError,
    /// Serialization/deserialization error.
    Serialization,
    /// Configuration error.
    Configuration,
    /// The owning component was already detached.
    Detached,
    /// Unknown error occurred.
    Unknown,
}

impl ErrorKind {
    /// Returns true if an operation failing with this kind may succeed on retry.
    pub fn is_retryable(self) -> bool {
        matches!(
            self,
            Self::NetworkError | Self::Timeout | Self::ServiceUnavailable
        )
    }
}

/// A structured error type for listing synchronization operations.
///
/// `message` is reserved for text supplied by the remote service (or by this
/// crate when it originates the failure). Transport failures keep their cause
/// in `source`.
#[derive(Debug, Error)]
#[error("{kind}{}", message.as_ref().map(|m| format!(": {m}")).unwrap_or_default())]
pub struct Error {
    /// The kind of error that occurred.
    pub kind: ErrorKind,
    /// Optional error message.
    pub message: Option<String>,
    /// Optional context, such as the record or file being processed.
    pub context: Option<String>,
    /// Optional source error.
    #[source]
    pub source: Option<BoxedError>,
}

impl Error {
    /// Creates a new error with the given kind.
    pub fn new(kind: ErrorKind) -> Self {
        Self {
            kind,
            message: None,
            context: None,
            source: None,
        }
    }

    /// Adds a message to this error.
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Adds context to this error.
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    /// Adds a source error to this error.
    pub fn with_source(mut self, source: impl std::error::Error + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// Re-classifies this error, keeping message, context and source.
    pub fn with_kind(mut self, kind: ErrorKind) -> Self {
        self.kind = kind;
        self
    }

    /// Creates a new fetch error.
    pub fn fetch() -> Self {
        Self::new(ErrorKind::Fetch)
    }

    /// Creates a new subscription error.
    pub fn subscription() -> Self {
        Self::new(ErrorKind::Subscription)
    }

    /// Creates a new archive request error.
    pub fn archive_request() -> Self {
        Self::new(ErrorKind::ArchiveRequest)
    }

    /// Creates a new authorization error.
    pub fn authorization() -> Self {
        Self::new(ErrorKind::Authorization)
    }

    /// Creates a new transfer error.
    pub fn transfer() -> Self {
        Self::new(ErrorKind::Transfer)
    }

    /// Creates a new invalid input error.
    pub fn invalid_input() -> Self {
        Self::new(ErrorKind::InvalidInput)
    }

    /// Creates a new network error.
    pub fn network_error() -> Self {
        Self::new(ErrorKind::NetworkError)
    }

    /// Creates a new timeout error.
    pub fn timeout() -> Self {
        Self::new(ErrorKind::Timeout)
    }

    /// Creates a new service unavailable error.
    pub fn service_unavailable() -> Self {
        Self::new(ErrorKind::ServiceUnavailable)
    }

    /// Creates a new external error.
    pub fn external_error() -> Self {
        Self::new(ErrorKind::ExternalError)
    }

    /// Creates a new serialization error.
    pub fn serialization() -> Self {
        Self::new(ErrorKind::Serialization)
    }

    /// Creates a new configuration error.
    pub fn configuration() -> Self {
        Self::new(ErrorKind::Configuration)
    }

    /// Creates a new detached error.
    pub fn detached() -> Self {
        Self::new(ErrorKind::Detached)
    }

    /// Creates a new unknown error.
    pub fn unknown() -> Self {
        Self::new(ErrorKind::Unknown)
    }

    /// Returns the error kind.
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Returns the error kind as a string.
    pub fn kind_str(&self) -> &'static str {
        self.kind.into()
    }

    /// Returns true if the operation may succeed on retry.
    pub fn is_retryable(&self) -> bool {
        self.kind.is_retryable()
    }

    /// Returns the most specific text describing this failure.
    ///
    /// Prefers the service-supplied message, then the transport cause.
    pub fn most_specific_message(&self) -> Option<String> {
        self.message
            .as_deref()
            .filter(|m| !m.trim().is_empty())
            .map(str::to_owned)
            .or_else(|| {
                self.source
                    .as_ref()
                    .map(|source| source.to_string())
                    .filter(|m| !m.trim().is_empty())
            })
    }

    /// Returns [`most_specific_message`](Self::most_specific_message) or
    /// [`UNEXPECTED_ERROR`].
    pub fn user_message(&self) -> String {
        self.most_specific_message()
            .unwrap_or_else(|| UNEXPECTED_ERROR.to_owned())
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::serialization().with_source(err)
    }
}
