//! Persisted progress state.
//!
//! [`State`] is the single root object of a journey: one [`ProgressRecord`]
//! per problem, the plan settings chosen at `init`, the configured list
//! order and the marker of the most recent daily plan. It round-trips
//! through `state.json`; every field has a serde default so older snapshots
//! keep loading when fields are added.

use std::collections::{BTreeMap, HashSet};

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::problem::{ProblemCatalog, ProblemId};
use crate::scheduler::Rating;

pub const SCHEMA_VERSION: u32 = 1;

/// Per-problem lifecycle.
///
/// `NotStarted -> Scheduled -> CompletedThisCycle -> Scheduled -> ...`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProgressStatus {
    #[default]
    NotStarted,
    Scheduled,
    CompletedThisCycle,
}

/// How much auxiliary content a plan entry carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RichnessLevel {
    /// Problem and solution links
    #[default]
    Minimal,
    /// Adds collapsible hints and the full solution
    Spoilers,
    /// Adds a link to the video walkthrough
    VideoLink,
    /// Embeds the video walkthrough
    VideoEmbed,
}

impl RichnessLevel {
    pub const ALL: [RichnessLevel; 4] = [
        RichnessLevel::Minimal,
        RichnessLevel::Spoilers,
        RichnessLevel::VideoLink,
        RichnessLevel::VideoEmbed,
    ];

    pub fn includes_spoilers(self) -> bool {
        self >= RichnessLevel::Spoilers
    }

    pub fn includes_video(self) -> bool {
        self >= RichnessLevel::VideoLink
    }
}

impl std::str::FromStr for RichnessLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "1" | "minimal" => Ok(RichnessLevel::Minimal),
            "2" | "spoilers" => Ok(RichnessLevel::Spoilers),
            "3" | "video_link" => Ok(RichnessLevel::VideoLink),
            "4" | "video_embed" => Ok(RichnessLevel::VideoEmbed),
            other => Err(format!(
                "unknown richness level '{other}' (minimal, spoilers, video_link, video_embed)"
            )),
        }
    }
}

impl std::fmt::Display for RichnessLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            RichnessLevel::Minimal => "minimal",
            RichnessLevel::Spoilers => "spoilers",
            RichnessLevel::VideoLink => "video_link",
            RichnessLevel::VideoEmbed => "video_embed",
        };
        f.write_str(s)
    }
}

/// Where an attempt's duration came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeSource {
    #[default]
    Manual,
    Artifact,
}

/// One successfully synced review.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attempt {
    pub date: NaiveDate,
    pub rating: Rating,
    pub duration_seconds: u64,
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub time_source: TimeSource,
}

/// Scheduling state and review history of one problem.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressRecord {
    pub id: ProblemId,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub status: ProgressStatus,
    #[serde(default)]
    pub last_rating: Option<Rating>,
    #[serde(default)]
    pub interval_days: Option<u32>,
    /// Introduction date while NotStarted, next review date afterwards.
    pub due_date: NaiveDate,
    #[serde(default)]
    pub total_time_spent_seconds: u64,
    #[serde(default)]
    pub history: Vec<Attempt>,
}

impl ProgressRecord {
    pub fn new(id: ProblemId, title: impl Into<String>, category: impl Into<String>, due_date: NaiveDate) -> Self {
        Self {
            id,
            title: title.into(),
            category: category.into(),
            status: ProgressStatus::NotStarted,
            last_rating: None,
            interval_days: None,
            due_date,
            total_time_spent_seconds: 0,
            history: Vec::new(),
        }
    }

    /// Assigned to a plan and waiting for review on or before `date`.
    pub fn is_due(&self, date: NaiveDate) -> bool {
        self.status == ProgressStatus::Scheduled && self.due_date <= date
    }

    pub fn is_overdue(&self, date: NaiveDate) -> bool {
        self.status == ProgressStatus::Scheduled && self.due_date < date
    }

    pub fn last_attempt(&self) -> Option<&Attempt> {
        self.history.last()
    }
}

/// Settings chosen when the journey was initialized.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanSettings {
    /// Display name of the problem list
    pub plan_name: String,
    /// Problem list file name inside `problem_lists/`
    #[serde(default)]
    pub plan_source: String,
    pub start_date: NaiveDate,
    #[serde(default = "default_problems_per_day")]
    pub problems_per_day: u32,
    #[serde(default)]
    pub richness: RichnessLevel,
}

fn default_problems_per_day() -> u32 {
    3
}

/// Ids assigned by the most recent plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanMarker {
    pub date: NaiveDate,
    #[serde(default)]
    pub assigned: Vec<ProblemId>,
    /// Subset of `assigned` added through `add`
    #[serde(default)]
    pub extra: Vec<ProblemId>,
}

/// Root of all persisted progress.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct State {
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,
    pub settings: PlanSettings,
    /// Configured list order of problem ids
    #[serde(default)]
    pub order: Vec<ProblemId>,
    #[serde(default)]
    pub problems: BTreeMap<ProblemId, ProgressRecord>,
    #[serde(default)]
    pub current_plan: Option<PlanMarker>,
}

fn default_schema_version() -> u32 {
    SCHEMA_VERSION
}

impl State {
    /// Create a fresh state from a problem list.
    ///
    /// Every problem starts NotStarted; introduction dates spread the list
    /// from `settings.start_date` at `problems_per_day` per day.
    pub fn initialize(catalog: &ProblemCatalog, settings: PlanSettings) -> Self {
        let mut state = Self {
            schema_version: SCHEMA_VERSION,
            settings,
            order: Vec::with_capacity(catalog.len()),
            problems: BTreeMap::new(),
            current_plan: None,
        };
        for (category, problem) in catalog.iter() {
            state.order.push(problem.id);
            state.problems.insert(
                problem.id,
                ProgressRecord::new(problem.id, &problem.title, category, state.settings.start_date),
            );
        }
        let start = state.settings.start_date;
        let per_day = state.settings.problems_per_day;
        state.spread_not_started(start, per_day);
        state
    }

    /// Re-spread introduction dates of all NotStarted problems from `from`.
    ///
    /// Returns how many problems moved.
    pub fn spread_not_started(&mut self, from: NaiveDate, per_day: u32) -> usize {
        let per_day = per_day.max(1) as usize;
        let pending: Vec<ProblemId> = self
            .order
            .iter()
            .copied()
            .filter(|id| {
                self.problems
                    .get(id)
                    .is_some_and(|r| r.status == ProgressStatus::NotStarted)
            })
            .collect();
        for (index, id) in pending.iter().enumerate() {
            if let Some(record) = self.problems.get_mut(id) {
                record.due_date = from + Duration::days((index / per_day) as i64);
            }
        }
        pending.len()
    }

    /// Records in configured list order.
    pub fn records_in_order(&self) -> impl Iterator<Item = &ProgressRecord> {
        self.order.iter().filter_map(|id| self.problems.get(id))
    }

    /// Position of an id in the configured list order.
    pub fn position(&self, id: ProblemId) -> usize {
        self.order.iter().position(|p| *p == id).unwrap_or(usize::MAX)
    }

    pub fn count_by_status(&self, status: ProgressStatus) -> usize {
        self.problems.values().filter(|r| r.status == status).count()
    }

    /// Check structural invariants of a loaded snapshot.
    ///
    /// # Errors
    /// Returns a description of the first violation found.
    pub fn check(&self) -> Result<(), String> {
        let mut seen = HashSet::new();
        for id in &self.order {
            if !seen.insert(*id) {
                return Err(format!("problem {id} appears twice in the list order"));
            }
            if !self.problems.contains_key(id) {
                return Err(format!("problem {id} is listed but has no progress record"));
            }
        }
        for (id, record) in &self.problems {
            if record.id != *id {
                return Err(format!("record keyed {id} carries id {}", record.id));
            }
            if !seen.contains(id) {
                return Err(format!("problem {id} has a record but is missing from the list order"));
            }
            if let Some(last) = record.last_attempt() {
                if record.due_date < last.date {
                    return Err(format!(
                        "problem {id} is due {} before its last attempt on {}",
                        record.due_date, last.date
                    ));
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;
    use crate::problem::{Category, ProblemDefinition};

    pub fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    pub fn problem(id: ProblemId, title: &str) -> ProblemDefinition {
        ProblemDefinition {
            id,
            title: title.to_string(),
            leetcode_url: Some(format!("https://leetcode.com/problems/{id}/")),
            solution_link: None,
            hints: vec![format!("hint for {id}")],
            solution: None,
            youtube_id: Some(format!("yt{id}")),
        }
    }

    /// Catalog of `n` problems with ids 1..=n split over two categories.
    pub fn catalog(n: u32) -> ProblemCatalog {
        let half = n / 2;
        let first = (1..=half).map(|i| problem(i, &format!("Problem {i}"))).collect();
        let second = (half + 1..=n).map(|i| problem(i, &format!("Problem {i}"))).collect();
        ProblemCatalog::new(
            "Fixture",
            vec![
                Category { name: "Arrays".into(), problems: first },
                Category { name: "Graphs".into(), problems: second },
            ],
        )
        .unwrap()
    }

    pub fn settings(start: &str, per_day: u32) -> PlanSettings {
        PlanSettings {
            plan_name: "Fixture".into(),
            plan_source: "Fixture.json".into(),
            start_date: date(start),
            problems_per_day: per_day,
            richness: RichnessLevel::Minimal,
        }
    }

    pub fn state(n: u32, start: &str, per_day: u32) -> State {
        State::initialize(&catalog(n), settings(start, per_day))
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use super::*;

    #[test]
    fn initialize_spreads_introduction_dates() {
        let state = state(7, "2026-01-05", 3);
        assert_eq!(state.order, vec![1, 2, 3, 4, 5, 6, 7]);
        let due: Vec<_> = state.records_in_order().map(|r| r.due_date).collect();
        assert_eq!(
            due,
            vec![
                date("2026-01-05"),
                date("2026-01-05"),
                date("2026-01-05"),
                date("2026-01-06"),
                date("2026-01-06"),
                date("2026-01-06"),
                date("2026-01-07"),
            ]
        );
        assert!(state
            .problems
            .values()
            .all(|r| r.status == ProgressStatus::NotStarted && r.history.is_empty()));
        assert_eq!(state.problems[&4].category, "Graphs");
        assert!(state.check().is_ok());
    }

    #[test]
    fn spread_skips_started_problems() {
        let mut state = state(4, "2026-01-05", 1);
        state.problems.get_mut(&1).unwrap().status = ProgressStatus::Scheduled;
        let moved = state.spread_not_started(date("2026-02-01"), 2);
        assert_eq!(moved, 3);
        assert_eq!(state.problems[&1].due_date, date("2026-01-05"));
        assert_eq!(state.problems[&2].due_date, date("2026-02-01"));
        assert_eq!(state.problems[&3].due_date, date("2026-02-01"));
        assert_eq!(state.problems[&4].due_date, date("2026-02-02"));
    }

    #[test]
    fn check_flags_order_mismatch() {
        let mut state = state(3, "2026-01-05", 3);
        state.order.push(2);
        assert!(state.check().is_err());

        let mut state = super::fixtures::state(3, "2026-01-05", 3);
        state.order.retain(|id| *id != 3);
        assert!(state.check().is_err());
    }

    #[test]
    fn older_snapshot_fields_default() {
        let json = r#"{
            "settings": { "plan_name": "Old", "start_date": "2025-01-01" },
            "order": [1],
            "problems": { "1": { "id": 1, "due_date": "2025-01-01", "some_future_field": true } }
        }"#;
        let state: State = serde_json::from_str(json).unwrap();
        assert_eq!(state.schema_version, SCHEMA_VERSION);
        assert_eq!(state.settings.problems_per_day, 3);
        assert_eq!(state.settings.richness, RichnessLevel::Minimal);
        assert_eq!(state.problems[&1].status, ProgressStatus::NotStarted);
        assert!(state.current_plan.is_none());
    }

    #[test]
    fn richness_parses_names_and_numbers() {
        assert_eq!("spoilers".parse::<RichnessLevel>(), Ok(RichnessLevel::Spoilers));
        assert_eq!("video-embed".parse::<RichnessLevel>(), Ok(RichnessLevel::VideoEmbed));
        assert_eq!("3".parse::<RichnessLevel>(), Ok(RichnessLevel::VideoLink));
        assert!("loud".parse::<RichnessLevel>().is_err());
        assert!(RichnessLevel::VideoLink.includes_spoilers());
        assert!(!RichnessLevel::Spoilers.includes_video());
    }
}
