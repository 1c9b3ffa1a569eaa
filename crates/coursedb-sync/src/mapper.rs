//! Field mapping from external rows to candidate courses.

use coursedb_connector::ExternalRow;

use crate::config::FieldMappings;
use crate::types::{CandidateCourse, SkipReason};

/// Per-row mapping failure. The row is logged and skipped; it never aborts
/// the run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowRejection {
    /// Why the row was rejected.
    pub reason: SkipReason,
    /// Diagnostic detail for the trace.
    pub detail: String,
}

/// Maps raw external rows into candidate courses.
#[derive(Debug, Clone)]
pub struct FieldMapper {
    mappings: FieldMappings,
}

impl FieldMapper {
    /// Create a mapper over normalized column mappings.
    #[must_use]
    pub fn new(mappings: FieldMappings) -> Self {
        Self { mappings }
    }

    /// Map one row into a candidate course.
    ///
    /// The match-key, fullname, and shortname columns must be present and
    /// non-empty. Optional columns pass through as absent when unconfigured
    /// or empty.
    pub fn map(&self, row: &ExternalRow) -> Result<CandidateCourse, RowRejection> {
        let match_value = row.get_non_empty(&self.mappings.match_key);
        let fullname = row.get_non_empty(&self.mappings.fullname);
        let shortname = row.get_non_empty(&self.mappings.shortname);

        let (Some(match_value), Some(fullname), Some(shortname)) =
            (match_value, fullname, shortname)
        else {
            return Err(RowRejection {
                reason: SkipReason::MissingRequiredFields,
                detail: render_row(row),
            });
        };

        let optional = |column: &Option<String>| {
            column
                .as_deref()
                .and_then(|c| row.get_non_empty(c))
                .map(str::to_string)
        };

        Ok(CandidateCourse {
            match_value: match_value.to_string(),
            fullname: fullname.to_string(),
            shortname: shortname.to_string(),
            idnumber: optional(&self.mappings.idnumber).unwrap_or_default(),
            category_ref: optional(&self.mappings.category),
            resolved_category: None,
            template_ref: optional(&self.mappings.template),
        })
    }
}

fn render_row(row: &ExternalRow) -> String {
    serde_json::to_string(row).unwrap_or_else(|_| "<unprintable row>".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mapper() -> FieldMapper {
        FieldMapper::new(
            FieldMappings::new("ext_id", "name", "code")
                .with_idnumber("idnum")
                .with_category("cat")
                .with_template("tpl"),
        )
    }

    fn full_row() -> ExternalRow {
        ExternalRow::new()
            .with("ext_id", "A1")
            .with("name", "Algebra")
            .with("code", "ALG1")
            .with("idnum", "X-1")
            .with("cat", "MATH")
            .with("tpl", "TPL1")
    }

    #[test]
    fn test_maps_all_fields() {
        let candidate = mapper().map(&full_row()).unwrap();
        assert_eq!(candidate.match_value, "A1");
        assert_eq!(candidate.fullname, "Algebra");
        assert_eq!(candidate.shortname, "ALG1");
        assert_eq!(candidate.idnumber, "X-1");
        assert_eq!(candidate.category_ref, Some("MATH".to_string()));
        assert_eq!(candidate.template_ref, Some("TPL1".to_string()));
        assert!(candidate.resolved_category.is_none());
    }

    #[test]
    fn test_missing_required_field_rejects() {
        let row = ExternalRow::new().with("ext_id", "A1").with("name", "Algebra");
        let rejection = mapper().map(&row).unwrap_err();
        assert_eq!(rejection.reason, SkipReason::MissingRequiredFields);
        assert!(rejection.detail.contains("Algebra"));
    }

    #[test]
    fn test_empty_required_field_rejects() {
        let row = ExternalRow::new()
            .with("ext_id", "A1")
            .with("name", "")
            .with("code", "ALG1");
        let rejection = mapper().map(&row).unwrap_err();
        assert_eq!(rejection.reason, SkipReason::MissingRequiredFields);
    }

    #[test]
    fn test_optional_fields_absent() {
        let simple = FieldMapper::new(FieldMappings::new("ext_id", "name", "code"));
        let candidate = simple.map(&full_row()).unwrap();
        assert_eq!(candidate.idnumber, "");
        assert_eq!(candidate.category_ref, None);
        assert_eq!(candidate.template_ref, None);
    }

    #[test]
    fn test_empty_optional_value_is_absent() {
        let row = ExternalRow::new()
            .with("ext_id", "A1")
            .with("name", "Algebra")
            .with("code", "ALG1")
            .with("cat", "");
        let candidate = mapper().map(&row).unwrap();
        assert_eq!(candidate.category_ref, None);
    }

    #[test]
    fn test_column_names_match_case_insensitively() {
        let row = ExternalRow::new()
            .with("EXT_ID", "A1")
            .with("Name", "Algebra")
            .with("CODE", "ALG1");
        let candidate = mapper().map(&row).unwrap();
        assert_eq!(candidate.shortname, "ALG1");
    }
}
