//! # External Course Database Connector
//!
//! Read-only access to the external relational database that holds candidate
//! course records. The external database is always the source of truth; this
//! crate never writes to it.
//!
//! ## Components
//!
//! - [`DatabaseConfig`] — connection parameters, validated before any I/O
//! - [`TextEncoding`] — symmetric codec between the external table encoding
//!   and UTF-8
//! - [`SelectQuery`] — read-query construction with escaped interpolation
//! - [`RowSource`] / [`SourceProvider`] — the traits the sync engine
//!   consumes
//! - [`PgRowSource`] — PostgreSQL implementation over `sqlx`
//!
//! ## Example
//!
//! ```ignore
//! use coursedb_connector::{DatabaseConfig, PgSourceProvider, SelectQuery, SourceProvider, RowSource};
//!
//! let config = DatabaseConfig::new("sis.example.edu", "sis", "reader")
//!     .with_password("secret");
//! let provider = PgSourceProvider::new(config);
//!
//! let source = provider.open().await?;
//! let rows = source.fetch(&SelectQuery::new("ext_courses")).await?;
//! source.close().await?;
//! ```

pub mod config;
pub mod encoding;
pub mod error;
pub mod escape;
pub mod query;
pub mod source;

pub use config::DatabaseConfig;
pub use encoding::TextEncoding;
pub use error::{ConnectorError, ConnectorResult};
pub use escape::{escape_identifier, escape_value, QuotingStyle};
pub use query::SelectQuery;
pub use source::{ExternalRow, PgRowSource, PgSourceProvider, RowSource, SourceProvider};
