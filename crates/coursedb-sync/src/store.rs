//! Local course store and host defaults collaborators.
//!
//! These traits are the engine's only view of the host system. The engine
//! reads for match and duplicate checks, writes through `create`/`update`,
//! and never holds course references across rows.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::config::{LocalCategoryField, LocalCourseField};
use crate::error::SyncResult;
use crate::types::{CategoryId, CourseShell, CourseUpdate, GroupMode, LocalCourse};

/// Read/write surface of the host system's course store.
#[async_trait]
pub trait CourseStore: Send + Sync {
    /// Look up a course by the given field.
    async fn find_course(
        &self,
        field: LocalCourseField,
        value: &str,
    ) -> SyncResult<Option<LocalCourse>>;

    /// Look up a category id by the given field.
    async fn find_category(
        &self,
        field: LocalCategoryField,
        value: &str,
    ) -> SyncResult<Option<CategoryId>>;

    /// Whether any course carries this shortname.
    async fn shortname_exists(&self, shortname: &str) -> SyncResult<bool>;

    /// Whether any course carries this idnumber.
    async fn idnumber_exists(&self, idnumber: &str) -> SyncResult<bool>;

    /// Create a new course from the shell.
    async fn create(&self, shell: CourseShell) -> SyncResult<LocalCourse>;

    /// Apply a partial update to an existing course.
    async fn update(&self, update: CourseUpdate) -> SyncResult<()>;
}

/// Host-wide defaults used to synthesize course templates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HostDefaults {
    /// Default course format.
    pub format: String,
    /// Default number of sections.
    pub num_sections: u32,
    /// Default number of news items.
    pub news_items: u32,
    /// Show the gradebook to students.
    pub show_grades: bool,
    /// Show activity reports to students.
    pub show_reports: bool,
    /// Maximum upload size in bytes.
    pub max_bytes: u64,
    /// Default group mode.
    pub group_mode: GroupMode,
    /// Force the group mode.
    pub group_mode_force: bool,
    /// New courses start visible.
    pub visible: bool,
    /// Forced course language (empty = none).
    pub lang: String,
    /// Completion tracking enabled by default.
    pub enable_completion: bool,
    /// Whether new courses get an end date.
    pub end_date_enabled: bool,
    /// Course duration in seconds, applied when end dates are enabled.
    pub course_duration_secs: i64,
}

impl Default for HostDefaults {
    fn default() -> Self {
        Self {
            format: "topics".to_string(),
            num_sections: 4,
            news_items: 5,
            show_grades: true,
            show_reports: false,
            max_bytes: 0,
            group_mode: GroupMode::None,
            group_mode_force: false,
            visible: true,
            lang: String::new(),
            enable_completion: true,
            end_date_enabled: true,
            course_duration_secs: 365 * 24 * 60 * 60,
        }
    }
}

/// Read-only provider of the host defaults snapshot.
#[async_trait]
pub trait HostDefaultsProvider: Send + Sync {
    /// Fetch the current host-wide course creation defaults.
    async fn defaults(&self) -> SyncResult<HostDefaults>;
}

/// Provider returning a fixed defaults snapshot.
#[derive(Debug, Clone, Default)]
pub struct StaticDefaults {
    defaults: HostDefaults,
}

impl StaticDefaults {
    /// Create a provider around the given snapshot.
    #[must_use]
    pub fn new(defaults: HostDefaults) -> Self {
        Self { defaults }
    }
}

#[async_trait]
impl HostDefaultsProvider for StaticDefaults {
    async fn defaults(&self) -> SyncResult<HostDefaults> {
        Ok(self.defaults.clone())
    }
}
