//! Connector error types.
//!
//! Errors are split by the run-level status they map to: incomplete
//! configuration, connection establishment failure, and query execution
//! failure.

use thiserror::Error;

/// Error that can occur while talking to the external course database.
#[derive(Debug, Error)]
pub enum ConnectorError {
    /// The connection parameters are incomplete or invalid.
    #[error("invalid configuration: {message}")]
    InvalidConfiguration { message: String },

    /// Failed to establish a connection to the external database.
    #[error("connection failed: {message}")]
    ConnectionFailed {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// A query against the external database could not be executed.
    #[error("read failed: {message}")]
    ReadFailed {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The row source has already been closed.
    #[error("row source has been closed")]
    Closed,
}

impl ConnectorError {
    /// Create an invalid configuration error.
    pub fn invalid_configuration(message: impl Into<String>) -> Self {
        Self::InvalidConfiguration {
            message: message.into(),
        }
    }

    /// Create a connection failure without an underlying cause.
    pub fn connection_failed(message: impl Into<String>) -> Self {
        Self::ConnectionFailed {
            message: message.into(),
            source: None,
        }
    }

    /// Create a connection failure wrapping an underlying error.
    pub fn connection_failed_with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::ConnectionFailed {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create a read failure without an underlying cause.
    pub fn read_failed(message: impl Into<String>) -> Self {
        Self::ReadFailed {
            message: message.into(),
            source: None,
        }
    }

    /// Create a read failure wrapping an underlying error.
    pub fn read_failed_with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::ReadFailed {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Whether this error reports incomplete configuration rather than a
    /// runtime fault.
    #[must_use]
    pub fn is_configuration(&self) -> bool {
        matches!(self, ConnectorError::InvalidConfiguration { .. })
    }
}

/// Result type for connector operations.
pub type ConnectorResult<T> = Result<T, ConnectorError>;
