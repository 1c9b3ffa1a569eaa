//! Template resolution for new courses.

use chrono::{DateTime, Duration, NaiveTime, Utc};
use tracing::debug;

use crate::config::LocalCourseField;
use crate::error::SyncResult;
use crate::store::{CourseStore, HostDefaults, HostDefaultsProvider};
use crate::types::{CourseTemplate, TextFormat};

/// Resolve the template for a queued candidate.
///
/// When `template_ref` names an existing course by shortname, that course's
/// format fields are copied. Otherwise a template is synthesized from the
/// host defaults. An unresolvable reference is a fallback, not an error.
pub async fn resolve<S, D>(
    store: &S,
    defaults: &D,
    template_ref: Option<&str>,
    now: DateTime<Utc>,
) -> SyncResult<CourseTemplate>
where
    S: CourseStore + ?Sized,
    D: HostDefaultsProvider + ?Sized,
{
    if let Some(shortname) = template_ref {
        if let Some(course) = store
            .find_course(LocalCourseField::Shortname, shortname)
            .await?
        {
            return Ok(course.template);
        }
        debug!(template = %shortname, "template course not found, using host defaults");
    }

    let defaults = defaults.defaults().await?;
    Ok(synthesize(&defaults, now))
}

/// Build a fresh template from the host-wide course creation defaults.
///
/// The start date is midnight of the current day; the end date is start plus
/// the configured duration, only when the host enables end dates.
#[must_use]
pub fn synthesize(defaults: &HostDefaults, now: DateTime<Utc>) -> CourseTemplate {
    let start_date = midnight(now);
    let end_date = defaults
        .end_date_enabled
        .then(|| start_date + Duration::seconds(defaults.course_duration_secs));

    CourseTemplate {
        summary: String::new(),
        summary_format: TextFormat::Html,
        format: defaults.format.clone(),
        num_sections: defaults.num_sections,
        news_items: defaults.news_items,
        show_grades: defaults.show_grades,
        show_reports: defaults.show_reports,
        max_bytes: defaults.max_bytes,
        group_mode: defaults.group_mode,
        group_mode_force: defaults.group_mode_force,
        visible: defaults.visible,
        lang: defaults.lang.clone(),
        enable_completion: defaults.enable_completion,
        start_date,
        end_date,
    }
}

fn midnight(now: DateTime<Utc>) -> DateTime<Utc> {
    now.date_naive().and_time(NaiveTime::MIN).and_utc()
}
