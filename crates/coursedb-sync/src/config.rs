//! Sync run configuration.
//!
//! Loaded once per run and never mutated mid-run. Column mappings are
//! resolved into a validated table at load time; blank required mappings are
//! rejected before any I/O rather than deep inside row processing.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{SyncError, SyncResult};
use crate::types::CategoryId;

/// Local course field used to match external rows to existing courses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum LocalCourseField {
    /// Match on the course id.
    Id,
    /// Match on the course idnumber.
    #[default]
    Idnumber,
    /// Match on the course shortname.
    Shortname,
}

impl LocalCourseField {
    /// Convert to the field name.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            LocalCourseField::Id => "id",
            LocalCourseField::Idnumber => "idnumber",
            LocalCourseField::Shortname => "shortname",
        }
    }
}

impl fmt::Display for LocalCourseField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for LocalCourseField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "id" => Ok(LocalCourseField::Id),
            "idnumber" => Ok(LocalCourseField::Idnumber),
            "shortname" => Ok(LocalCourseField::Shortname),
            _ => Err(format!("Unknown local course field: {s}")),
        }
    }
}

/// Local category field used to resolve external category references.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum LocalCategoryField {
    /// Match on the category id.
    Id,
    /// Match on the category idnumber.
    #[default]
    Idnumber,
}

impl LocalCategoryField {
    /// Convert to the field name.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            LocalCategoryField::Id => "id",
            LocalCategoryField::Idnumber => "idnumber",
        }
    }
}

impl fmt::Display for LocalCategoryField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for LocalCategoryField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "id" => Ok(LocalCategoryField::Id),
            "idnumber" => Ok(LocalCategoryField::Idnumber),
            _ => Err(format!("Unknown local category field: {s}")),
        }
    }
}

/// Remote column names for each mapped course field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldMappings {
    /// Column matched against the configured local course field.
    pub match_key: String,
    /// Column holding the course full name.
    pub fullname: String,
    /// Column holding the course short name.
    pub shortname: String,
    /// Column holding the course idnumber.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub idnumber: Option<String>,
    /// Column holding the category reference.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    /// Column naming the template course shortname.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template: Option<String>,
}

impl FieldMappings {
    /// Create mappings with the required columns.
    pub fn new(
        match_key: impl Into<String>,
        fullname: impl Into<String>,
        shortname: impl Into<String>,
    ) -> Self {
        Self {
            match_key: match_key.into(),
            fullname: fullname.into(),
            shortname: shortname.into(),
            idnumber: None,
            category: None,
            template: None,
        }
    }

    /// Set the idnumber column.
    pub fn with_idnumber(mut self, column: impl Into<String>) -> Self {
        self.idnumber = Some(column.into());
        self
    }

    /// Set the category column.
    pub fn with_category(mut self, column: impl Into<String>) -> Self {
        self.category = Some(column.into());
        self
    }

    /// Set the template column.
    pub fn with_template(mut self, column: impl Into<String>) -> Self {
        self.template = Some(column.into());
        self
    }

    /// Lower-case and trim every column name; blank optional columns become
    /// unconfigured.
    #[must_use]
    pub fn normalized(&self) -> Self {
        let clean = |s: &String| s.trim().to_lowercase();
        let clean_opt = |s: &Option<String>| {
            s.as_ref()
                .map(|c| clean(c))
                .filter(|c| !c.is_empty())
        };
        Self {
            match_key: clean(&self.match_key),
            fullname: clean(&self.fullname),
            shortname: clean(&self.shortname),
            idnumber: clean_opt(&self.idnumber),
            category: clean_opt(&self.category),
            template: clean_opt(&self.template),
        }
    }

    /// Check that the required column mappings are present.
    pub fn validate(&self) -> SyncResult<()> {
        if self.match_key.trim().is_empty() {
            return Err(SyncError::configuration("match key mapping is blank"));
        }
        if self.fullname.trim().is_empty() {
            return Err(SyncError::configuration("fullname mapping is blank"));
        }
        if self.shortname.trim().is_empty() {
            return Err(SyncError::configuration("shortname mapping is blank"));
        }
        Ok(())
    }
}

/// Immutable configuration for one sync run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncConfig {
    /// External table holding candidate course rows.
    pub table: String,
    /// Remote column mappings.
    pub mappings: FieldMappings,
    /// Local course field matched against the match-key column.
    #[serde(default)]
    pub local_course_field: LocalCourseField,
    /// Local category field matched against the category column.
    #[serde(default)]
    pub local_category_field: LocalCategoryField,
    /// Category for courses whose row supplies no category value.
    pub default_category: CategoryId,
    /// Update courses that already exist locally.
    #[serde(default)]
    pub update_existing: bool,
    /// Leave manually-hidden courses untouched on update.
    #[serde(default)]
    pub skip_hidden_on_update: bool,
    /// Abort the run when the external table holds this many rows or fewer.
    /// Zero disables the check.
    #[serde(default)]
    pub min_records: u64,
}

impl SyncConfig {
    /// Create a config with required fields.
    pub fn new(
        table: impl Into<String>,
        mappings: FieldMappings,
        default_category: CategoryId,
    ) -> Self {
        Self {
            table: table.into(),
            mappings,
            local_course_field: LocalCourseField::default(),
            local_category_field: LocalCategoryField::default(),
            default_category,
            update_existing: false,
            skip_hidden_on_update: false,
            min_records: 0,
        }
    }

    /// Set the local course match field.
    #[must_use]
    pub fn with_local_course_field(mut self, field: LocalCourseField) -> Self {
        self.local_course_field = field;
        self
    }

    /// Set the local category match field.
    #[must_use]
    pub fn with_local_category_field(mut self, field: LocalCategoryField) -> Self {
        self.local_category_field = field;
        self
    }

    /// Enable updating of existing courses.
    #[must_use]
    pub fn with_update_existing(mut self, update: bool) -> Self {
        self.update_existing = update;
        self
    }

    /// Protect hidden courses from updates.
    #[must_use]
    pub fn with_skip_hidden(mut self, skip: bool) -> Self {
        self.skip_hidden_on_update = skip;
        self
    }

    /// Set the minimum-record threshold.
    #[must_use]
    pub fn with_min_records(mut self, min: u64) -> Self {
        self.min_records = min;
        self
    }

    /// Copy with the table trimmed and all mappings normalized.
    #[must_use]
    pub fn normalized(&self) -> Self {
        let mut config = self.clone();
        config.table = config.table.trim().to_string();
        config.mappings = config.mappings.normalized();
        config
    }

    /// Check that the configuration is complete enough to run.
    pub fn validate(&self) -> SyncResult<()> {
        if self.table.trim().is_empty() {
            return Err(SyncError::configuration("external table is not set"));
        }
        self.mappings.validate()
    }
}
