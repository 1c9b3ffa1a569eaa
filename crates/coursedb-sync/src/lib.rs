//! # Course Reconciliation Engine
//!
//! Reconciles course records held in an external relational database with
//! course entities in the host learning-management system, creating or
//! updating local courses to match. The external database is always the
//! source of truth; nothing is ever written back to it.
//!
//! ## Synchronisation Flow
//!
//! ```text
//! ┌─────────────────┐     ┌──────────────┐     ┌────────────────────┐
//! │ External Row    │────►│ Field Mapper │────►│ Category Resolver /│
//! │ Source (sqlx)   │     │              │     │ Matcher            │
//! └─────────────────┘     └──────────────┘     └─────────┬──────────┘
//!                                                        │
//!                             ┌──────────────────────────┼─────────┐
//!                             ▼                          ▼         │
//!                     ┌───────────────┐        ┌─────────────────┐ │
//!                     │   Template    │        │ Local Course    │◄┘
//!                     │   Resolver    │───────►│ Store           │
//!                     └───────────────┘ create └─────────────────┘
//! ```
//!
//! Each run is one sequential pass: a pre-flight record-count sanity check,
//! a per-row pass that maps, resolves, and matches each external row, and a
//! batched creation pass that re-checks duplicates against live store state
//! immediately before each write. Rows that cannot be processed are logged
//! and skipped; they never abort the run.
//!
//! ## Example
//!
//! ```ignore
//! use coursedb_connector::{DatabaseConfig, PgSourceProvider};
//! use coursedb_sync::{
//!     BufferedTrace, CategoryId, FieldMappings, SyncConfig, SyncEngine,
//! };
//!
//! let provider = PgSourceProvider::new(
//!     DatabaseConfig::new("sis.example.edu", "sis", "reader").with_password("secret"),
//! );
//! let config = SyncConfig::new(
//!     "ext_courses",
//!     FieldMappings::new("ext_id", "name", "code"),
//!     CategoryId::new(3),
//! )
//! .with_update_existing(true);
//!
//! let engine = SyncEngine::new(provider, store, defaults);
//! let mut trace = BufferedTrace::new();
//! let report = engine.run(&config, &mut trace).await;
//! println!("{}: created {}", report.status, report.created);
//! ```

pub mod category;
pub mod config;
pub mod engine;
pub mod error;
pub mod mapper;
pub mod matcher;
pub mod report;
pub mod store;
pub mod template;
pub mod trace;
pub mod types;

#[cfg(test)]
mod testutil;

pub use config::{FieldMappings, LocalCategoryField, LocalCourseField, SyncConfig};
pub use engine::SyncEngine;
pub use error::{SyncError, SyncResult};
pub use mapper::{FieldMapper, RowRejection};
pub use report::SyncReport;
pub use store::{CourseStore, HostDefaults, HostDefaultsProvider, StaticDefaults};
pub use trace::{BufferedTrace, LogLine, SyncTrace, TracingTrace};
pub use types::{
    CandidateCourse, CategoryId, CourseId, CourseShell, CourseTemplate, CourseUpdate, GroupMode,
    LocalCourse, MatchOutcome, ResolvedCategory, SkipReason, SyncStatus, TextFormat,
};
