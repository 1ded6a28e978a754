//! Result types of a sync run.

use serde::Serialize;

use crate::error::EntryError;
use crate::problem::ProblemId;
use crate::progress::State;
use crate::scheduler::Rating;

/// Aggregates of one run, for the dashboard and the CLI summary.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SyncTotals {
    pub updated: usize,
    pub skipped: usize,
    pub errored: usize,
    /// Updated entries per rating, indexed by `rating - 1`
    pub by_rating: [usize; 4],
    pub time_recorded_secs: u64,
    /// Problems still due on or before the sync date after the run
    pub backlog_size: usize,
    /// Current streak of days with at least one review
    pub streak: u32,
}

impl SyncTotals {
    pub fn count_for(&self, rating: Rating) -> usize {
        self.by_rating[usize::from(rating.value()) - 1]
    }
}

/// What happened to each checked entry.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SyncReport {
    pub updated_ids: Vec<ProblemId>,
    /// Checked entries that were not due, typically already synced
    pub skipped_ids: Vec<ProblemId>,
    #[serde(serialize_with = "serialize_errors")]
    pub errors: Vec<EntryError>,
    pub totals: SyncTotals,
}

impl SyncReport {
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }
}

fn serialize_errors<S: serde::Serializer>(errors: &[EntryError], serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_seq(errors.iter().map(|e| e.to_string()))
}

/// Staged state plus the report. Nothing is persisted until the caller
/// commits `state`.
#[derive(Debug, Clone)]
pub struct SyncOutcome {
    pub state: State,
    pub report: SyncReport,
}
