//! Sync run report.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::trace::LogLine;
use crate::types::{SkipReason, SyncStatus};

/// Outcome of one sync run.
///
/// Created fresh per run and returned to the caller; the engine never
/// persists it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncReport {
    /// Identifier of this run, for log correlation.
    pub run_id: Uuid,
    /// Exit status.
    pub status: SyncStatus,
    /// Number of external rows read.
    pub rows_read: u32,
    /// Courses created.
    pub created: u32,
    /// Courses updated.
    pub updated: u32,
    /// Rows skipped.
    pub skipped: u32,
    /// Skips broken down by reason.
    pub skipped_by_reason: HashMap<String, u32>,
    /// Ordered trace lines emitted during the run.
    pub log: Vec<LogLine>,
    /// Wall-clock duration of the run.
    pub duration_seconds: u64,
}

impl SyncReport {
    /// Create an empty report for a new run.
    #[must_use]
    pub fn new() -> Self {
        Self {
            run_id: Uuid::new_v4(),
            status: SyncStatus::Success,
            rows_read: 0,
            created: 0,
            updated: 0,
            skipped: 0,
            skipped_by_reason: HashMap::new(),
            log: Vec::new(),
            duration_seconds: 0,
        }
    }

    /// Total create/update calls issued.
    #[must_use]
    pub fn total_writes(&self) -> u32 {
        self.created + self.updated
    }

    /// Skip count for a specific reason.
    #[must_use]
    pub fn skip_count(&self, reason: SkipReason) -> u32 {
        self.skipped_by_reason
            .get(reason.as_str())
            .copied()
            .unwrap_or(0)
    }

    pub(crate) fn record_created(&mut self) {
        self.created += 1;
    }

    pub(crate) fn record_updated(&mut self) {
        self.updated += 1;
    }

    pub(crate) fn record_skip(&mut self, reason: SkipReason) {
        self.skipped += 1;
        *self
            .skipped_by_reason
            .entry(reason.as_str().to_string())
            .or_insert(0) += 1;
    }
}

impl Default for SyncReport {
    fn default() -> Self {
        Self::new()
    }
}
