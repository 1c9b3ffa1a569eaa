//! External database connection configuration.

use serde::{Deserialize, Serialize};

use crate::encoding::TextEncoding;
use crate::error::{ConnectorError, ConnectorResult};
use crate::escape::QuotingStyle;

/// Connection parameters for the external course database.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Database server hostname or IP address.
    pub host: String,

    /// Database server port.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,

    /// Database name.
    pub database: String,

    /// Username for authentication.
    pub username: String,

    /// Password for authentication.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,

    /// Text encoding of the external table.
    #[serde(default)]
    pub encoding: TextEncoding,

    /// Quoting convention used when interpolating values into queries.
    #[serde(default)]
    pub quoting: QuotingStyle,

    /// SQL executed once after connecting, for session setup.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub setup_sql: Option<String>,

    /// Connection pool size.
    #[serde(default = "default_pool_size")]
    pub pool_size: u32,

    /// Connection acquire timeout in seconds.
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,
}

fn default_pool_size() -> u32 {
    2
}

fn default_connect_timeout() -> u64 {
    10
}

impl DatabaseConfig {
    /// Create a new config with required fields.
    pub fn new(
        host: impl Into<String>,
        database: impl Into<String>,
        username: impl Into<String>,
    ) -> Self {
        Self {
            host: host.into(),
            port: None,
            database: database.into(),
            username: username.into(),
            password: None,
            encoding: TextEncoding::default(),
            quoting: QuotingStyle::default(),
            setup_sql: None,
            pool_size: default_pool_size(),
            connect_timeout_secs: default_connect_timeout(),
        }
    }

    /// Set password.
    pub fn with_password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(password.into());
        self
    }

    /// Set port.
    #[must_use]
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    /// Set the external table encoding.
    #[must_use]
    pub fn with_encoding(mut self, encoding: TextEncoding) -> Self {
        self.encoding = encoding;
        self
    }

    /// Set the quoting style.
    #[must_use]
    pub fn with_quoting(mut self, quoting: QuotingStyle) -> Self {
        self.quoting = quoting;
        self
    }

    /// Set post-connect session setup SQL.
    pub fn with_setup_sql(mut self, sql: impl Into<String>) -> Self {
        self.setup_sql = Some(sql.into());
        self
    }

    /// Get the effective port (default if not specified).
    #[must_use]
    pub fn effective_port(&self) -> u16 {
        self.port.unwrap_or(5432)
    }

    /// Check that the connection parameters are complete.
    ///
    /// An incomplete configuration aborts a sync run before any I/O.
    pub fn validate(&self) -> ConnectorResult<()> {
        if self.host.trim().is_empty() {
            return Err(ConnectorError::invalid_configuration("host is required"));
        }
        if self.database.trim().is_empty() {
            return Err(ConnectorError::invalid_configuration(
                "database is required",
            ));
        }
        if self.username.trim().is_empty() {
            return Err(ConnectorError::invalid_configuration(
                "username is required",
            ));
        }
        Ok(())
    }

    /// Copy of the config with the password masked, for logging.
    #[must_use]
    pub fn redacted(&self) -> Self {
        let mut config = self.clone();
        if config.password.is_some() {
            config.password = Some("***REDACTED***".to_string());
        }
        config
    }

    /// Build the connection URL for `SQLx`.
    pub(crate) fn connection_url(&self) -> String {
        format!(
            "postgres://{}:{}@{}:{}/{}",
            self.username,
            self.password.as_deref().unwrap_or(""),
            self.host,
            self.effective_port(),
            self.database
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_new_and_builders() {
        let config = DatabaseConfig::new("db.example.com", "sis", "reader")
            .with_password("secret")
            .with_port(5433)
            .with_encoding(TextEncoding::Latin1);

        assert_eq!(config.host, "db.example.com");
        assert_eq!(config.effective_port(), 5433);
        assert_eq!(config.encoding, TextEncoding::Latin1);
        assert_eq!(config.password, Some("secret".to_string()));
    }

    #[test]
    fn test_default_port() {
        let config = DatabaseConfig::new("h", "d", "u");
        assert_eq!(config.effective_port(), 5432);
    }

    #[test]
    fn test_validation() {
        assert!(DatabaseConfig::new("h", "d", "u").validate().is_ok());
        assert!(DatabaseConfig::new("", "d", "u").validate().is_err());
        assert!(DatabaseConfig::new("h", "", "u").validate().is_err());
        assert!(DatabaseConfig::new("h", "d", " ").validate().is_err());
    }

    #[test]
    fn test_redacted() {
        let config = DatabaseConfig::new("h", "d", "u").with_password("hunter2");
        let redacted = config.redacted();
        assert_eq!(redacted.password, Some("***REDACTED***".to_string()));
        assert_eq!(config.password, Some("hunter2".to_string()));
    }

    #[test]
    fn test_connection_url() {
        let config = DatabaseConfig::new("db.example.com", "sis", "reader").with_password("pw");
        assert_eq!(
            config.connection_url(),
            "postgres://reader:pw@db.example.com:5432/sis"
        );
    }

    #[test]
    fn test_serialization_roundtrip() {
        let config = DatabaseConfig::new("h", "d", "u").with_setup_sql("SET search_path TO sis");
        let json = serde_json::to_string(&config).unwrap();
        let parsed: DatabaseConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.setup_sql, Some("SET search_path TO sis".to_string()));
        assert_eq!(parsed.pool_size, config.pool_size);
    }
}
