//! Merges an edited plan document into progress state.

use chrono::NaiveDate;

use crate::dashboard::streaks;
use crate::error::EntryError;
use crate::plan::{ParsedEntry, PlanDocument};
use crate::progress::{Attempt, ProgressRecord, ProgressStatus, State, TimeSource};
use crate::scheduler::{Rating, SchedulingPolicy};
use crate::sync::types::{SyncOutcome, SyncReport};
use crate::tracker::{ArtifactKey, ArtifactSource, TimeLimits};

/// Applies checked plan entries to a staged copy of [`State`].
///
/// Per checked entry, in document order:
/// 1. unknown id: consistency error
/// 2. record not scheduled and due by the sync date: skipped
/// 3. rating missing or invalid: validation error
/// 4. manual time if given, else the workspace artifact; neither: missing data
/// 5. append the attempt and reschedule
///
/// Errors leave the record untouched; the entry stays due and shows up in
/// the next plan.
pub struct SyncEngine<'a> {
    policy: &'a SchedulingPolicy,
    limits: &'a TimeLimits,
    artifacts: &'a dyn ArtifactSource,
}

impl<'a> SyncEngine<'a> {
    pub fn new(policy: &'a SchedulingPolicy, limits: &'a TimeLimits, artifacts: &'a dyn ArtifactSource) -> Self {
        Self {
            policy,
            limits,
            artifacts,
        }
    }

    /// Process `doc` as of `date`.
    pub fn sync_day(&self, state: &State, doc: &PlanDocument, date: NaiveDate) -> SyncOutcome {
        let mut staged = state.clone();
        let mut report = SyncReport::default();

        if let Some(doc_date) = doc.date.filter(|d| *d > date) {
            log::warn!("plan document is dated {doc_date}, after the sync date {date}");
        }

        for entry in doc.checked() {
            let Some(record) = staged.problems.get_mut(&entry.id) else {
                log::warn!("problem {} is not in the study plan", entry.id);
                report.errors.push(EntryError::Consistency { id: entry.id });
                continue;
            };
            if !record.is_due(date) {
                log::info!(
                    "skipping problem {}: {:?}, due {}",
                    entry.id,
                    record.status,
                    record.due_date
                );
                report.skipped_ids.push(entry.id);
                continue;
            }
            match self.apply(record, entry, date) {
                Ok(attempt) => {
                    log::info!(
                        "problem {} rated {}; next review {} (+{}d)",
                        entry.id,
                        attempt.rating,
                        record.due_date,
                        record.interval_days.unwrap_or_default()
                    );
                    report.totals.by_rating[usize::from(attempt.rating.value()) - 1] += 1;
                    report.totals.time_recorded_secs =
                        report.totals.time_recorded_secs.saturating_add(attempt.duration_seconds);
                    report.updated_ids.push(entry.id);
                }
                Err(e) => {
                    log::warn!("{e}");
                    report.errors.push(e);
                }
            }
        }

        report.totals.updated = report.updated_ids.len();
        report.totals.skipped = report.skipped_ids.len();
        report.totals.errored = report.errors.len();
        report.totals.backlog_size = staged.problems.values().filter(|r| r.is_due(date)).count();
        report.totals.streak = streaks(&staged, date).current;

        SyncOutcome { state: staged, report }
    }

    fn apply(&self, record: &mut ProgressRecord, entry: &ParsedEntry, date: NaiveDate) -> Result<Attempt, EntryError> {
        let id = entry.id;
        let rating: Rating = entry
            .rating()
            .map_err(|source| EntryError::Validation { id, source })?;
        let (duration_seconds, time_source) = self.duration(record, entry)?;

        let outcome = self.policy.schedule(record.interval_days, rating, date);
        let attempt = Attempt {
            date,
            rating,
            duration_seconds,
            notes: entry.notes.clone(),
            time_source,
        };

        record.history.push(attempt.clone());
        record.status = ProgressStatus::CompletedThisCycle;
        record.last_rating = Some(rating);
        record.total_time_spent_seconds = record.total_time_spent_seconds.saturating_add(duration_seconds);
        record.interval_days = Some(outcome.interval_days);
        record.due_date = outcome.due_date;
        record.status = ProgressStatus::Scheduled;
        Ok(attempt)
    }

    fn duration(&self, record: &ProgressRecord, entry: &ParsedEntry) -> Result<(u64, TimeSource), EntryError> {
        let id = entry.id;
        if let Some(manual) = entry.manual_seconds() {
            let secs = manual.map_err(|source| EntryError::Validation { id, source })?;
            return Ok((secs, TimeSource::Manual));
        }

        let key = ArtifactKey {
            id,
            title: &record.title,
        };
        let Some(span) = self.artifacts.find(key) else {
            return Err(EntryError::MissingData { id });
        };
        match self.limits.bound(span.span_secs()) {
            Some(secs) => Ok((secs, TimeSource::Artifact)),
            None => {
                log::warn!(
                    "{}: {}s between creation and last edit exceeds the {}s limit; ignoring stale artifact",
                    span.path.display(),
                    span.span_secs(),
                    self.limits.max_duration_secs
                );
                Err(EntryError::MissingData { id })
            }
        }
    }
}
