//! Reconciliation engine.
//!
//! Runs one full pass: pre-flight sanity check, per-row mapping and
//! dispatch, then batched creation with commit-time duplicate checks. One
//! run is a single sequential pass; every external call completes before the
//! next row is considered, so local-store lookups observe earlier rows'
//! writes.

use std::time::Instant;

use chrono::Utc;
use coursedb_connector::{RowSource, SelectQuery, SourceProvider};
use tracing::{info, instrument, warn};

use crate::category::{self, CategoryResolution};
use crate::config::SyncConfig;
use crate::mapper::FieldMapper;
use crate::matcher;
use crate::report::SyncReport;
use crate::store::{CourseStore, HostDefaultsProvider};
use crate::template;
use crate::trace::{LogLine, SyncTrace};
use crate::types::{CandidateCourse, CourseShell, CourseUpdate, MatchOutcome, SkipReason, SyncStatus};

/// Orchestrates one reconciliation pass against the local course store.
///
/// The engine is pure decision logic over its collaborators: the external
/// row source (opened per run), the local course store, and the host
/// defaults snapshot. It carries no state between runs.
pub struct SyncEngine<P, S, D> {
    provider: P,
    store: S,
    defaults: D,
}

impl<P, S, D> SyncEngine<P, S, D>
where
    P: SourceProvider,
    S: CourseStore,
    D: HostDefaultsProvider,
{
    /// Create an engine over its collaborators.
    pub fn new(provider: P, store: S, defaults: D) -> Self {
        Self {
            provider,
            store,
            defaults,
        }
    }

    /// Perform a full sync run.
    ///
    /// Run-level failures come back as report statuses, never as errors;
    /// row-level failures are logged, counted, and skipped.
    #[instrument(skip_all, fields(table = %config.table))]
    pub async fn run(&self, config: &SyncConfig, trace: &mut dyn SyncTrace) -> SyncReport {
        let started = Instant::now();
        let mut report = SyncReport::new();
        let config = config.normalized();

        if let Err(err) = config.validate() {
            log(trace, &mut report, 0, &format!("sync configuration not complete: {err}"));
            return finish(trace, report, SyncStatus::NotConfigured, started);
        }

        log(trace, &mut report, 0, "starting course synchronisation");

        let source = match self.provider.open().await {
            Ok(source) => source,
            Err(err) => {
                let status = if err.is_configuration() {
                    SyncStatus::NotConfigured
                } else {
                    SyncStatus::ConnectFailure
                };
                log(
                    trace,
                    &mut report,
                    0,
                    &format!("error while communicating with external courses database: {err}"),
                );
                return finish(trace, report, status, started);
            }
        };

        let status = self
            .run_with_source(&config, &source, trace, &mut report)
            .await;

        // The connection is released on every exit path after open.
        if let Err(err) = source.close().await {
            warn!(error = %err, "failed to close external database connection");
        }

        finish(trace, report, status, started)
    }

    async fn run_with_source(
        &self,
        config: &SyncConfig,
        source: &P::Source,
        trace: &mut dyn SyncTrace,
        report: &mut SyncReport,
    ) -> SyncStatus {
        // Pre-flight sanity check: an empty or truncated feed must not be
        // mistaken for a valid (near-empty) course list.
        if config.min_records > 0 {
            let count = match source.count(&config.table).await {
                Ok(count) => count,
                Err(err) => {
                    log(
                        trace,
                        report,
                        0,
                        &format!("error counting records in the external course table: {err}"),
                    );
                    return SyncStatus::ReadFailure;
                }
            };
            if count <= config.min_records {
                log(
                    trace,
                    report,
                    0,
                    &format!(
                        "failed to sync because the external db returned {count} records and the minimum required is {}",
                        config.min_records
                    ),
                );
                return SyncStatus::InsufficientRecords;
            }
        }

        log(trace, report, 0, "starting course database sync");

        let rows = match source.fetch(&SelectQuery::new(&config.table)).await {
            Ok(rows) => rows,
            Err(err) => {
                log(
                    trace,
                    report,
                    0,
                    &format!("error reading data from the external course table: {err}"),
                );
                return SyncStatus::ReadFailure;
            }
        };
        report.rows_read = rows.len() as u32;

        let mapper = FieldMapper::new(config.mappings.clone());
        let mut creation_queue: Vec<CandidateCourse> = Vec::new();

        for row in &rows {
            let mut candidate = match mapper.map(row) {
                Ok(candidate) => candidate,
                Err(rejection) => {
                    report.record_skip(rejection.reason);
                    log(
                        trace,
                        report,
                        1,
                        &format!(
                            "error: invalid external course record, one or more required fields are empty: {}",
                            rejection.detail
                        ),
                    );
                    continue;
                }
            };

            let resolved = match category::resolve(
                &self.store,
                config.local_category_field,
                candidate.category_ref.as_deref(),
                config.default_category,
            )
            .await
            {
                Ok(CategoryResolution::Resolved(resolved)) => resolved,
                Ok(CategoryResolution::Rejected { reference }) => {
                    report.record_skip(SkipReason::InvalidCategory);
                    log(
                        trace,
                        report,
                        1,
                        &format!(
                            "error: invalid category {reference}, can not create/update course: {}",
                            candidate.shortname
                        ),
                    );
                    continue;
                }
                Err(err) => {
                    report.record_skip(SkipReason::StoreFailure);
                    log(
                        trace,
                        report,
                        1,
                        &format!(
                            "error: category lookup failed for course {}: {err}",
                            candidate.shortname
                        ),
                    );
                    continue;
                }
            };
            candidate.resolved_category = Some(resolved);

            let outcome = match matcher::match_course(
                &self.store,
                config.local_course_field,
                &candidate.match_value,
                config.update_existing,
                config.skip_hidden_on_update,
            )
            .await
            {
                Ok(outcome) => outcome,
                Err(err) => {
                    report.record_skip(SkipReason::StoreFailure);
                    log(
                        trace,
                        report,
                        1,
                        &format!(
                            "error: local course lookup failed for '{}': {err}",
                            candidate.match_value
                        ),
                    );
                    continue;
                }
            };

            match outcome {
                MatchOutcome::NotFound => {
                    log(
                        trace,
                        report,
                        1,
                        &format!("caching course for creation: {}", candidate.shortname),
                    );
                    creation_queue.push(candidate);
                }
                MatchOutcome::Updatable(course) => {
                    let shortname = candidate.shortname.clone();
                    let update = CourseUpdate {
                        id: course.id,
                        fullname: candidate.fullname,
                        shortname: candidate.shortname,
                        idnumber: candidate.idnumber,
                        category: resolved.explicit.then_some(resolved.id),
                    };
                    match self.store.update(update).await {
                        Ok(()) => {
                            report.record_updated();
                            log(trace, report, 1, &format!("updating course: {shortname}"));
                        }
                        Err(err) => {
                            report.record_skip(SkipReason::StoreFailure);
                            log(
                                trace,
                                report,
                                1,
                                &format!("error: failed to update course {shortname}: {err}"),
                            );
                        }
                    }
                }
                MatchOutcome::UpdatesDisabled(course) => {
                    report.record_skip(SkipReason::UpdatesDisabled);
                    log(
                        trace,
                        report,
                        1,
                        &format!(
                            "error: skipping update to {} ({}) because update is disabled in config",
                            course.shortname, course.id
                        ),
                    );
                }
                MatchOutcome::HiddenProtected(_) => {
                    report.record_skip(SkipReason::HiddenCourse);
                    log(
                        trace,
                        report,
                        1,
                        &format!(
                            "error: skipping row because course {} '{}' is hidden",
                            config.local_course_field, candidate.match_value
                        ),
                    );
                }
            }
        }

        if !creation_queue.is_empty() {
            log(trace, report, 0, "creating courses...");
            let now = Utc::now();
            for candidate in creation_queue {
                self.create_course(config, candidate, now, trace, report)
                    .await;
            }
        }

        log(trace, report, 0, "sync complete");
        SyncStatus::Success
    }

    async fn create_course(
        &self,
        config: &SyncConfig,
        candidate: CandidateCourse,
        now: chrono::DateTime<Utc>,
        trace: &mut dyn SyncTrace,
        report: &mut SyncReport,
    ) {
        let template = match template::resolve(
            &self.store,
            &self.defaults,
            candidate.template_ref.as_deref(),
            now,
        )
        .await
        {
            Ok(template) => template,
            Err(err) => {
                report.record_skip(SkipReason::StoreFailure);
                log(
                    trace,
                    report,
                    1,
                    &format!(
                        "error: template lookup failed for course {}: {err}",
                        candidate.shortname
                    ),
                );
                return;
            }
        };

        let category = candidate
            .resolved_category
            .map_or(config.default_category, |resolved| resolved.id);
        let shell = CourseShell {
            fullname: candidate.fullname,
            shortname: candidate.shortname,
            idnumber: candidate.idnumber,
            category,
            template,
        };

        // The per-row lookups can miss duplicates when external and local
        // collations disagree; re-check against live store state immediately
        // before the write.
        match self.store.shortname_exists(&shell.shortname).await {
            Ok(true) => {
                report.record_skip(SkipReason::DuplicateShortname);
                log(
                    trace,
                    report,
                    1,
                    &format!(
                        "can not insert new course, duplicate shortname detected: {}",
                        shell.shortname
                    ),
                );
                return;
            }
            Ok(false) => {}
            Err(err) => {
                report.record_skip(SkipReason::StoreFailure);
                log(
                    trace,
                    report,
                    1,
                    &format!(
                        "error: duplicate check failed for course {}: {err}",
                        shell.shortname
                    ),
                );
                return;
            }
        }
        if !shell.idnumber.is_empty() {
            match self.store.idnumber_exists(&shell.idnumber).await {
                Ok(true) => {
                    report.record_skip(SkipReason::DuplicateIdnumber);
                    log(
                        trace,
                        report,
                        1,
                        &format!(
                            "can not insert new course, duplicate idnumber detected: {}",
                            shell.idnumber
                        ),
                    );
                    return;
                }
                Ok(false) => {}
                Err(err) => {
                    report.record_skip(SkipReason::StoreFailure);
                    log(
                        trace,
                        report,
                        1,
                        &format!(
                            "error: duplicate check failed for course {}: {err}",
                            shell.shortname
                        ),
                    );
                    return;
                }
            }
        }

        let shortname = shell.shortname.clone();
        match self.store.create(shell).await {
            Ok(course) => {
                report.record_created();
                log(
                    trace,
                    report,
                    1,
                    &format!(
                        "created course: {}, {}, {}, {}, {}",
                        course.id, course.fullname, course.shortname, course.idnumber, course.category
                    ),
                );
            }
            Err(err) => {
                report.record_skip(SkipReason::StoreFailure);
                log(
                    trace,
                    report,
                    1,
                    &format!("error: failed to create course {shortname}: {err}"),
                );
            }
        }
    }
}

fn log(trace: &mut dyn SyncTrace, report: &mut SyncReport, verbosity: u8, message: &str) {
    report.log.push(LogLine {
        message: message.to_string(),
        verbosity,
    });
    trace.output(message, verbosity);
}

fn finish(
    trace: &mut dyn SyncTrace,
    mut report: SyncReport,
    status: SyncStatus,
    started: Instant,
) -> SyncReport {
    report.status = status;
    report.duration_seconds = started.elapsed().as_secs();
    trace.finished();
    info!(
        run_id = %report.run_id,
        status = %status,
        created = report.created,
        updated = report.updated,
        skipped = report.skipped,
        "course sync finished"
    );
    report
}
