//! Core types shared across the sync engine.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of a local course.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CourseId(i64);

impl CourseId {
    /// Wrap a raw course id.
    #[must_use]
    pub fn new(id: i64) -> Self {
        Self(id)
    }

    /// The raw id value.
    #[must_use]
    pub fn value(&self) -> i64 {
        self.0
    }
}

impl fmt::Display for CourseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier of a local course category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CategoryId(i64);

impl CategoryId {
    /// Wrap a raw category id.
    #[must_use]
    pub fn new(id: i64) -> Self {
        Self(id)
    }

    /// The raw id value.
    #[must_use]
    pub fn value(&self) -> i64 {
        self.0
    }
}

impl fmt::Display for CategoryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Format of a course summary text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TextFormat {
    /// HTML markup.
    #[default]
    Html,
    /// Plain text.
    Plain,
}

/// Group mode of a course.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum GroupMode {
    /// No groups.
    #[default]
    None,
    /// Separate groups.
    Separate,
    /// Visible groups.
    Visible,
}

impl GroupMode {
    /// Convert to string representation.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            GroupMode::None => "none",
            GroupMode::Separate => "separate",
            GroupMode::Visible => "visible",
        }
    }
}

impl fmt::Display for GroupMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for GroupMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "none" => Ok(GroupMode::None),
            "separate" => Ok(GroupMode::Separate),
            "visible" => Ok(GroupMode::Visible),
            _ => Err(format!("Unknown group mode: {s}")),
        }
    }
}

/// Format and scheduling fields copied into newly created courses.
///
/// Identity fields (id, fullname, shortname, idnumber) never appear here, so
/// a template extracted from an existing course carries nothing that would
/// collide with the new course's own identity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CourseTemplate {
    /// Course summary text.
    pub summary: String,
    /// Format of the summary text.
    pub summary_format: TextFormat,
    /// Course format (e.g. "topics", "weeks").
    pub format: String,
    /// Number of sections.
    pub num_sections: u32,
    /// Number of news items shown.
    pub news_items: u32,
    /// Show the gradebook to students.
    pub show_grades: bool,
    /// Show activity reports to students.
    pub show_reports: bool,
    /// Maximum upload size in bytes (0 = site limit).
    pub max_bytes: u64,
    /// Group mode.
    pub group_mode: GroupMode,
    /// Force the group mode onto all activities.
    pub group_mode_force: bool,
    /// Course visibility.
    pub visible: bool,
    /// Forced course language (empty = no forcing).
    pub lang: String,
    /// Completion tracking enabled.
    pub enable_completion: bool,
    /// Course start date.
    pub start_date: DateTime<Utc>,
    /// Course end date, when the host enables end dates.
    pub end_date: Option<DateTime<Utc>>,
}

/// A course entity owned by the host system.
///
/// The engine only reads these for match and duplicate checks; writes go
/// through [`CourseShell`] and [`CourseUpdate`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocalCourse {
    /// Course id.
    pub id: CourseId,
    /// Visibility flag. Hidden courses can be protected from updates.
    pub visible: bool,
    /// Full display name.
    pub fullname: String,
    /// Short name, unique within the host.
    pub shortname: String,
    /// External id number (may be empty).
    pub idnumber: String,
    /// Category the course lives in.
    pub category: CategoryId,
    /// Scheduling and format fields.
    pub template: CourseTemplate,
}

/// Identity fields overlaid on a template: the create payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CourseShell {
    /// Full display name.
    pub fullname: String,
    /// Short name.
    pub shortname: String,
    /// External id number (empty when unmapped).
    pub idnumber: String,
    /// Category for the new course.
    pub category: CategoryId,
    /// Field values seeded from the resolved template.
    pub template: CourseTemplate,
}

/// Partial update applied to an existing course.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CourseUpdate {
    /// Course to update.
    pub id: CourseId,
    /// New full name.
    pub fullname: String,
    /// New short name.
    pub shortname: String,
    /// New id number.
    pub idnumber: String,
    /// New category. `None` leaves the stored category untouched; it is only
    /// set when the external row supplied a resolvable category value.
    pub category: Option<CategoryId>,
}

/// Category resolution for a candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedCategory {
    /// The local category id to use.
    pub id: CategoryId,
    /// Whether the external row supplied the category (as opposed to the
    /// configured default). Updates only touch the category when explicit.
    pub explicit: bool,
}

/// A not-yet-committed course record derived from one external row.
///
/// Fullname, shortname, and the match value are non-empty by construction;
/// the mapper rejects rows that cannot satisfy that.
#[derive(Debug, Clone, PartialEq)]
pub struct CandidateCourse {
    /// Value matched against the configured local course field.
    pub match_value: String,
    /// Full display name.
    pub fullname: String,
    /// Short name.
    pub shortname: String,
    /// External id number (empty when unmapped or absent).
    pub idnumber: String,
    /// Raw category reference from the external row.
    pub category_ref: Option<String>,
    /// Category resolution, filled in by the category resolver.
    pub resolved_category: Option<ResolvedCategory>,
    /// Template course shortname from the external row.
    pub template_ref: Option<String>,
}

/// Outcome of matching a candidate against the local store.
#[derive(Debug, Clone, PartialEq)]
pub enum MatchOutcome {
    /// No local course matches; the candidate routes to creation.
    NotFound,
    /// A local course matches and may be updated.
    Updatable(LocalCourse),
    /// A local course matches but updating is disabled in configuration.
    UpdatesDisabled(LocalCourse),
    /// A local course matches but is hidden and protected from updates.
    HiddenProtected(LocalCourse),
}

/// Exit status of a sync run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncStatus {
    /// The run completed. Individual rows may still have been skipped.
    Success,
    /// Connection parameters or required field mappings are missing.
    NotConfigured,
    /// The external database could not be reached.
    ConnectFailure,
    /// A query against the external database failed mid-run.
    ReadFailure,
    /// The external table held too few records; nothing was written.
    InsufficientRecords,
}

impl SyncStatus {
    /// Convert to string representation.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            SyncStatus::Success => "success",
            SyncStatus::NotConfigured => "not_configured",
            SyncStatus::ConnectFailure => "connect_failure",
            SyncStatus::ReadFailure => "read_failure",
            SyncStatus::InsufficientRecords => "insufficient_records",
        }
    }

    /// Whether the run ran to completion.
    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self, SyncStatus::Success)
    }
}

impl fmt::Display for SyncStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for SyncStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "success" => Ok(SyncStatus::Success),
            "not_configured" => Ok(SyncStatus::NotConfigured),
            "connect_failure" => Ok(SyncStatus::ConnectFailure),
            "read_failure" => Ok(SyncStatus::ReadFailure),
            "insufficient_records" => Ok(SyncStatus::InsufficientRecords),
            _ => Err(format!("Unknown sync status: {s}")),
        }
    }
}

/// Why a row was skipped without aborting the run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// Match key, fullname, or shortname column was missing or empty.
    MissingRequiredFields,
    /// The row's category reference does not resolve to a local category.
    InvalidCategory,
    /// A match exists but updating existing courses is disabled.
    UpdatesDisabled,
    /// A match exists but the course is hidden and protected.
    HiddenCourse,
    /// A course with the same shortname already exists at commit time.
    DuplicateShortname,
    /// A course with the same idnumber already exists at commit time.
    DuplicateIdnumber,
    /// The local store failed a read or write for this row.
    StoreFailure,
}

impl SkipReason {
    /// Convert to string representation.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            SkipReason::MissingRequiredFields => "missing_required_fields",
            SkipReason::InvalidCategory => "invalid_category",
            SkipReason::UpdatesDisabled => "updates_disabled",
            SkipReason::HiddenCourse => "hidden_course",
            SkipReason::DuplicateShortname => "duplicate_shortname",
            SkipReason::DuplicateIdnumber => "duplicate_idnumber",
            SkipReason::StoreFailure => "store_failure",
        }
    }
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sync_status_roundtrip() {
        for status in [
            SyncStatus::Success,
            SyncStatus::NotConfigured,
            SyncStatus::ConnectFailure,
            SyncStatus::ReadFailure,
            SyncStatus::InsufficientRecords,
        ] {
            let parsed: SyncStatus = status.as_str().parse().unwrap();
            assert_eq!(status, parsed);
        }
    }

    #[test]
    fn test_group_mode_roundtrip() {
        for mode in [GroupMode::None, GroupMode::Separate, GroupMode::Visible] {
            let parsed: GroupMode = mode.as_str().parse().unwrap();
            assert_eq!(mode, parsed);
        }
    }

    #[test]
    fn test_ids_display() {
        assert_eq!(CourseId::new(42).to_string(), "42");
        assert_eq!(CategoryId::new(3).value(), 3);
    }

    #[test]
    fn test_status_is_success() {
        assert!(SyncStatus::Success.is_success());
        assert!(!SyncStatus::ReadFailure.is_success());
    }
}
