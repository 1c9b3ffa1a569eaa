//! Existing-course matching.

use crate::config::LocalCourseField;
use crate::error::SyncResult;
use crate::store::CourseStore;
use crate::types::MatchOutcome;

/// Decide whether a candidate corresponds to an existing local course.
///
/// The lookup key is the configured local course field compared against the
/// candidate's match value. A match with updates disabled, or with a hidden
/// course under protection, is a skip rather than an error.
pub async fn match_course<S: CourseStore + ?Sized>(
    store: &S,
    field: LocalCourseField,
    match_value: &str,
    update_existing: bool,
    skip_hidden: bool,
) -> SyncResult<MatchOutcome> {
    match store.find_course(field, match_value).await? {
        None => Ok(MatchOutcome::NotFound),
        Some(course) if !update_existing => Ok(MatchOutcome::UpdatesDisabled(course)),
        Some(course) if skip_hidden && !course.visible => {
            Ok(MatchOutcome::HiddenProtected(course))
        }
        Some(course) => Ok(MatchOutcome::Updatable(course)),
    }
}
