//! Sync error types.

use coursedb_connector::ConnectorError;
use thiserror::Error;

/// Errors that abort a sync run.
///
/// Row-level failures are not errors; they are [`crate::types::SkipReason`]s
/// recorded on the report while the run continues.
#[derive(Debug, Error)]
pub enum SyncError {
    /// The sync or connection configuration is incomplete.
    #[error("configuration error: {message}")]
    Configuration { message: String },

    /// The external database could not be reached.
    #[error("connection error: {message}")]
    Connect {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// A read against the external database failed.
    #[error("read error: {message}")]
    Read {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The local course store rejected an operation.
    #[error("store error: {message}")]
    Store {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

impl SyncError {
    /// Create a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Create a connection error.
    pub fn connect(message: impl Into<String>) -> Self {
        Self::Connect {
            message: message.into(),
            source: None,
        }
    }

    /// Create a read error.
    pub fn read(message: impl Into<String>) -> Self {
        Self::Read {
            message: message.into(),
            source: None,
        }
    }

    /// Create a store error.
    pub fn store(message: impl Into<String>) -> Self {
        Self::Store {
            message: message.into(),
            source: None,
        }
    }

    /// Create a store error wrapping an underlying cause.
    pub fn store_with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Store {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }
}

impl From<ConnectorError> for SyncError {
    fn from(err: ConnectorError) -> Self {
        match err {
            ConnectorError::InvalidConfiguration { message } => SyncError::Configuration { message },
            ConnectorError::ConnectionFailed { message, source } => {
                SyncError::Connect { message, source }
            }
            ConnectorError::ReadFailed { message, source } => SyncError::Read { message, source },
            ConnectorError::Closed => SyncError::read("row source has been closed"),
        }
    }
}

/// Result type for sync operations.
pub type SyncResult<T> = Result<T, SyncError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = SyncError::configuration("fullname mapping is blank");
        assert!(err.to_string().contains("fullname mapping is blank"));

        let err = SyncError::store("constraint violation");
        assert!(err.to_string().contains("constraint violation"));
    }

    #[test]
    fn test_from_connector_error() {
        let err: SyncError = ConnectorError::invalid_configuration("host").into();
        assert!(matches!(err, SyncError::Configuration { .. }));

        let err: SyncError = ConnectorError::connection_failed("refused").into();
        assert!(matches!(err, SyncError::Connect { .. }));

        let err: SyncError = ConnectorError::read_failed("bad query").into();
        assert!(matches!(err, SyncError::Read { .. }));

        let err: SyncError = ConnectorError::Closed.into();
        assert!(matches!(err, SyncError::Read { .. }));
    }
}
