//! External row source.
//!
//! Reads candidate course rows from the external database and yields them as
//! case-normalized field maps. The source is forward-only: rows come back in
//! source order and are consumed in a single pass.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::{Column, PgPool, Row};
use tracing::{debug, info, instrument};

use crate::config::DatabaseConfig;
use crate::encoding::TextEncoding;
use crate::error::{ConnectorError, ConnectorResult};
use crate::escape::QuotingStyle;
use crate::query::SelectQuery;

/// One record read from the external table, keyed by lower-cased column name.
///
/// NULL columns are absent from the map.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(transparent)]
pub struct ExternalRow {
    fields: HashMap<String, String>,
}

impl ExternalRow {
    /// Create an empty row.
    #[must_use]
    pub fn new() -> Self {
        Self {
            fields: HashMap::new(),
        }
    }

    /// Insert a field value. The name is lower-cased on insert.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.fields.insert(name.into().to_lowercase(), value.into());
    }

    /// Insert a field using builder pattern.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.set(name, value);
        self
    }

    /// Case-insensitive field lookup.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields.get(&name.to_lowercase()).map(String::as_str)
    }

    /// Field lookup that treats an empty value as absent.
    #[must_use]
    pub fn get_non_empty(&self, name: &str) -> Option<&str> {
        self.get(name).filter(|value| !value.is_empty())
    }

    /// Number of fields in the row.
    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Check if the row has no fields.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Iterate over (name, value) pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_str()))
    }
}

/// Forward-only reader over the external course table.
#[async_trait]
pub trait RowSource: Send + Sync {
    /// Count the rows in `table`. Used by the pre-flight sanity check.
    async fn count(&self, table: &str) -> ConnectorResult<u64>;

    /// Execute the read query and return its rows in source order.
    ///
    /// An empty result set is valid and returns an empty vector.
    async fn fetch(&self, query: &SelectQuery) -> ConnectorResult<Vec<ExternalRow>>;

    /// Release the underlying connection. Further calls fail with `Closed`.
    async fn close(&self) -> ConnectorResult<()>;
}

/// Opens row sources for sync runs.
///
/// Separating open from read lets the engine distinguish connection failures
/// (abort with `ConnectFailure`) from query failures (`ReadFailure`).
#[async_trait]
pub trait SourceProvider: Send + Sync {
    /// The source type this provider opens.
    type Source: RowSource;

    /// Open a connection to the external database.
    async fn open(&self) -> ConnectorResult<Self::Source>;
}

/// PostgreSQL-backed row source.
pub struct PgRowSource {
    pool: PgPool,
    encoding: TextEncoding,
    quoting: QuotingStyle,
    closed: AtomicBool,
}

impl std::fmt::Debug for PgRowSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PgRowSource")
            .field("encoding", &self.encoding)
            .field("closed", &self.closed.load(Ordering::SeqCst))
            .finish()
    }
}

impl PgRowSource {
    /// Connect to the external database described by `config`.
    #[instrument(skip(config), fields(host = %config.host, database = %config.database))]
    pub async fn connect(config: &DatabaseConfig) -> ConnectorResult<Self> {
        config.validate()?;

        let pool = PgPoolOptions::new()
            .max_connections(config.pool_size)
            .acquire_timeout(Duration::from_secs(config.connect_timeout_secs))
            .connect(&config.connection_url())
            .await
            .map_err(|e| {
                ConnectorError::connection_failed_with_source(
                    format!(
                        "failed to connect to {}:{}",
                        config.host,
                        config.effective_port()
                    ),
                    e,
                )
            })?;

        if let Some(setup) = &config.setup_sql {
            sqlx::query(setup)
                .execute(&pool)
                .await
                .map_err(|e| ConnectorError::connection_failed_with_source("setup SQL failed", e))?;
        }

        info!(host = %config.host, "external database connection established");

        Ok(Self {
            pool,
            encoding: config.encoding,
            quoting: config.quoting,
            closed: AtomicBool::new(false),
        })
    }

    fn ensure_open(&self) -> ConnectorResult<()> {
        if self.closed.load(Ordering::SeqCst) {
            Err(ConnectorError::Closed)
        } else {
            Ok(())
        }
    }

    /// Convert a result row into an `ExternalRow`, coercing common column
    /// types to text. Byte columns pass through the external codec; text
    /// columns arrive already transcoded by the server.
    fn row_to_external(&self, row: &PgRow) -> ExternalRow {
        let mut out = ExternalRow::new();
        for column in row.columns() {
            let name = column.name();
            if let Ok(Some(value)) = row.try_get::<Option<Vec<u8>>, _>(name) {
                out.set(name, self.encoding.decode(&value));
            } else if let Ok(Some(value)) = row.try_get::<Option<String>, _>(name) {
                out.set(name, value);
            } else if let Ok(Some(value)) = row.try_get::<Option<i64>, _>(name) {
                out.set(name, value.to_string());
            } else if let Ok(Some(value)) = row.try_get::<Option<i32>, _>(name) {
                out.set(name, value.to_string());
            } else if let Ok(Some(value)) = row.try_get::<Option<f64>, _>(name) {
                out.set(name, value.to_string());
            } else if let Ok(Some(value)) = row.try_get::<Option<bool>, _>(name) {
                out.set(name, value.to_string());
            } else if let Ok(Some(value)) = row.try_get::<Option<uuid::Uuid>, _>(name) {
                out.set(name, value.to_string());
            }
        }
        out
    }
}

#[async_trait]
impl RowSource for PgRowSource {
    #[instrument(skip(self))]
    async fn count(&self, table: &str) -> ConnectorResult<u64> {
        self.ensure_open()?;

        let sql = format!("SELECT count(*) FROM {table}");
        let count: i64 = sqlx::query_scalar(&sql)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                ConnectorError::read_failed_with_source(
                    format!("count query failed for table {table}"),
                    e,
                )
            })?;

        Ok(u64::try_from(count).unwrap_or(0))
    }

    #[instrument(skip(self, query), fields(table = %query.table()))]
    async fn fetch(&self, query: &SelectQuery) -> ConnectorResult<Vec<ExternalRow>> {
        self.ensure_open()?;

        let sql = query.build(self.quoting, self.encoding);
        let rows = sqlx::query(&sql).fetch_all(&self.pool).await.map_err(|e| {
            ConnectorError::read_failed_with_source(
                format!("read query failed for table {}", query.table()),
                e,
            )
        })?;

        debug!(rows = rows.len(), "fetched external course rows");

        Ok(rows.iter().map(|row| self.row_to_external(row)).collect())
    }

    async fn close(&self) -> ConnectorResult<()> {
        if self.closed.swap(true, Ordering::SeqCst) {
            return Ok(());
        }
        self.pool.close().await;
        debug!("external database connection closed");
        Ok(())
    }
}

/// Provider that opens PostgreSQL row sources from a stored configuration.
#[derive(Debug, Clone)]
pub struct PgSourceProvider {
    config: DatabaseConfig,
}

impl PgSourceProvider {
    /// Create a provider for the given connection parameters.
    #[must_use]
    pub fn new(config: DatabaseConfig) -> Self {
        Self { config }
    }

    /// The connection parameters this provider opens with.
    #[must_use]
    pub fn config(&self) -> &DatabaseConfig {
        &self.config
    }
}

#[async_trait]
impl SourceProvider for PgSourceProvider {
    type Source = PgRowSource;

    async fn open(&self) -> ConnectorResult<Self::Source> {
        PgRowSource::connect(&self.config).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_names_are_case_insensitive() {
        let row = ExternalRow::new().with("ExtID", "A1").with("NAME", "Algebra");
        assert_eq!(row.get("extid"), Some("A1"));
        assert_eq!(row.get("EXTID"), Some("A1"));
        assert_eq!(row.get("name"), Some("Algebra"));
        assert_eq!(row.get("missing"), None);
        assert_eq!(row.len(), 2);
    }

    #[test]
    fn test_get_non_empty() {
        let row = ExternalRow::new().with("code", "").with("name", "Algebra");
        assert_eq!(row.get("code"), Some(""));
        assert_eq!(row.get_non_empty("code"), None);
        assert_eq!(row.get_non_empty("name"), Some("Algebra"));
        assert_eq!(row.get_non_empty("missing"), None);
    }

    #[test]
    fn test_row_serializes_as_plain_map() {
        let row = ExternalRow::new().with("code", "ALG1");
        let json = serde_json::to_string(&row).unwrap();
        assert_eq!(json, r#"{"code":"ALG1"}"#);
    }

    #[test]
    fn test_iter_yields_all_fields() {
        let row = ExternalRow::new().with("a", "1").with("b", "2");
        let mut pairs: Vec<_> = row.iter().collect();
        pairs.sort_unstable();
        assert_eq!(pairs, vec![("a", "1"), ("b", "2")]);
    }
}
