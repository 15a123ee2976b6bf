//! Error type for object store operations.

/// Result type for all object store operations in this crate.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Unified error type for object store operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A store operation failed
    #[error("[{operation}] {source}")]
    Store {
        operation: &'static str,
        #[source]
        source: object_store::Error,
    },

    /// A provider could not be built from its credentials
    #[error("[{provider}] {source}")]
    Connection {
        provider: &'static str,
        #[source]
        source: object_store::Error,
    },
}

impl Error {
    pub(crate) fn store(operation: &'static str, source: object_store::Error) -> Self {
        Self::Store { operation, source }
    }

    pub(crate) fn connection(provider: &'static str, source: object_store::Error) -> Self {
        Self::Connection { provider, source }
    }

    /// Returns the underlying store error.
    pub fn inner(&self) -> &object_store::Error {
        match self {
            Self::Store { source, .. } | Self::Connection { source, .. } => source,
        }
    }

    /// Whether the store refused the request rather than failing to serve it.
    pub fn is_rejection(&self) -> bool {
        matches!(
            self.inner(),
            object_store::Error::PermissionDenied { .. }
                | object_store::Error::Unauthenticated { .. }
                | object_store::Error::AlreadyExists { .. }
                | object_store::Error::Precondition { .. }
        )
    }

    /// Whether the caller should retry this operation.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Store { .. })
            && !self.is_rejection()
            && !matches!(self.inner(), object_store::Error::NotFound { .. })
    }
}

impl From<Error> for listing_core::Error {
    fn from(error: Error) -> Self {
        let kind = match (&error, error.inner()) {
            (Error::Connection { .. }, _) => listing_core::ErrorKind::Configuration,
            (_, object_store::Error::NotFound { .. }) => listing_core::ErrorKind::ExternalError,
            (_, object_store::Error::PermissionDenied { .. })
            | (_, object_store::Error::Unauthenticated { .. }) => {
                listing_core::ErrorKind::Authorization
            }
            _ if error.is_retryable() => listing_core::ErrorKind::NetworkError,
            _ => listing_core::ErrorKind::ExternalError,
        };

        listing_core::Error::new(kind).with_source(error)
    }
}
