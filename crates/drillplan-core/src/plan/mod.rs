//! Daily plan selection.
//!
//! Selection for a target date:
//! 1. Due problems (scheduled, due on or before the date), oldest due first
//! 2. If they exceed the daily cap, keep the oldest `cap` and introduce no
//!    new problems that day
//! 3. Otherwise introduce NotStarted problems in list order, up to the
//!    problems-per-day rate and the remaining capacity
//!
//! The chosen ids are remembered in the state's plan marker, so building
//! again for the same date returns the same plan.

pub mod document;
pub mod render;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::problem::ProblemId;
use crate::progress::{PlanMarker, ProgressRecord, ProgressStatus, State};
use crate::scheduler::Rating;

pub use document::{ParsedEntry, PlanDocument};

/// Why a problem is in the plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryKind {
    /// First attempt
    New,
    /// Review due today
    Review,
    /// Was due on an earlier date
    Overdue,
    /// Pulled ahead by `add`
    Extra,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanEntry {
    pub id: ProblemId,
    pub title: String,
    pub category: String,
    pub kind: EntryKind,
    pub due_date: NaiveDate,
    /// Filled from an edited plan document
    #[serde(default)]
    pub completed: bool,
    #[serde(default)]
    pub rating: Option<Rating>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub manual_time: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyPlan {
    pub date: NaiveDate,
    pub entries: Vec<PlanEntry>,
    /// Due problems left out because the cap was hit
    pub deferred: usize,
    /// New problems were held back to work the backlog
    pub backlog_focus: bool,
}

impl DailyPlan {
    pub fn ids(&self) -> Vec<ProblemId> {
        self.entries.iter().map(|e| e.id).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn count(&self, kind: EntryKind) -> usize {
        self.entries.iter().filter(|e| e.kind == kind).count()
    }

    /// Copy checkbox and fields from an edited document, so a rewritten
    /// document keeps what the user already filled in.
    ///
    /// Ratings that do not parse stay `None`.
    pub fn apply_edits(&mut self, doc: &PlanDocument) {
        for entry in &mut self.entries {
            if let Some(parsed) = doc.entry(entry.id) {
                entry.completed = parsed.checked;
                entry.rating = parsed.rating().ok();
                entry.notes = Some(parsed.notes.clone()).filter(|n| !n.is_empty());
                entry.manual_time = parsed.manual_time.clone();
            }
        }
    }
}

/// Selects and marks a day's problems.
#[derive(Debug, Clone)]
pub struct DailyPlanBuilder {
    daily_cap: usize,
}

impl DailyPlanBuilder {
    pub fn new(daily_cap: usize) -> Self {
        Self {
            daily_cap: daily_cap.max(1),
        }
    }

    /// Build the plan for `date`, marking newly introduced problems as
    /// scheduled for that date.
    pub fn build(&self, state: &mut State, date: NaiveDate) -> DailyPlan {
        if let Some(marker) = state.current_plan.as_ref().filter(|m| m.date == date) {
            log::debug!("reusing plan marker for {date}");
            return Self::from_marker(state, marker, date);
        }

        let mut due: Vec<&ProgressRecord> = state.problems.values().filter(|r| r.is_due(date)).collect();
        due.sort_by_key(|r| (r.due_date, state.position(r.id)));
        let due_total = due.len();

        let backlog_focus = due_total > self.daily_cap;
        let mut assigned: Vec<ProblemId> = due.iter().take(self.daily_cap).map(|r| r.id).collect();

        if backlog_focus {
            log::info!(
                "{due_total} problems due on {date}; focusing on the oldest {} and holding back new ones",
                self.daily_cap
            );
        } else {
            let slots = (self.daily_cap - due_total).min(state.settings.problems_per_day as usize);
            let new_ids: Vec<ProblemId> = state
                .records_in_order()
                .filter(|r| r.status == ProgressStatus::NotStarted && r.due_date <= date)
                .take(slots)
                .map(|r| r.id)
                .collect();
            for id in &new_ids {
                Self::assign(state, *id, date);
            }
            assigned.extend(new_ids);
        }

        let marker = PlanMarker {
            date,
            assigned,
            extra: Vec::new(),
        };
        let plan = Self::from_marker(state, &marker, date);
        state.current_plan = Some(marker);
        plan
    }

    /// Build the day's plan and pull `count` more NotStarted problems into
    /// it, regardless of backlog focus or their introduction dates.
    ///
    /// Returns the plan and how many problems were actually added.
    pub fn add_extra(&self, state: &mut State, date: NaiveDate, count: usize) -> (DailyPlan, usize) {
        self.build(state, date);

        let extra_ids: Vec<ProblemId> = state
            .records_in_order()
            .filter(|r| r.status == ProgressStatus::NotStarted)
            .take(count)
            .map(|r| r.id)
            .collect();
        for id in &extra_ids {
            Self::assign(state, *id, date);
        }
        if let Some(marker) = state.current_plan.as_mut() {
            marker.assigned.extend(extra_ids.iter().copied());
            marker.extra.extend(extra_ids.iter().copied());
        }
        log::info!("added {} extra problem(s) to {date}", extra_ids.len());

        (self.build(state, date), extra_ids.len())
    }

    fn assign(state: &mut State, id: ProblemId, date: NaiveDate) {
        if let Some(record) = state.problems.get_mut(&id) {
            record.status = ProgressStatus::Scheduled;
            record.due_date = date;
        }
    }

    fn from_marker(state: &State, marker: &PlanMarker, date: NaiveDate) -> DailyPlan {
        let entries = marker
            .assigned
            .iter()
            .filter_map(|id| state.problems.get(id))
            .filter(|r| r.is_due(date))
            .map(|r| PlanEntry {
                id: r.id,
                title: r.title.clone(),
                category: r.category.clone(),
                kind: kind_of(r, date, &marker.extra),
                due_date: r.due_date,
                completed: false,
                rating: None,
                notes: None,
                manual_time: None,
            })
            .collect();
        let deferred = state
            .problems
            .values()
            .filter(|r| r.is_due(date) && !marker.assigned.contains(&r.id))
            .count();
        DailyPlan {
            date,
            entries,
            deferred,
            backlog_focus: deferred > 0,
        }
    }
}

fn kind_of(record: &ProgressRecord, date: NaiveDate, extra: &[ProblemId]) -> EntryKind {
    if extra.contains(&record.id) {
        EntryKind::Extra
    } else if record.due_date < date {
        EntryKind::Overdue
    } else if record.history.is_empty() {
        EntryKind::New
    } else {
        EntryKind::Review
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progress::fixtures::{date, state};
    use crate::progress::Attempt;

    /// Mark `id` as reviewed once and due on `due`.
    fn schedule(state: &mut State, id: ProblemId, due: &str) {
        let record = state.problems.get_mut(&id).unwrap();
        record.status = ProgressStatus::Scheduled;
        record.interval_days = Some(3);
        record.due_date = date(due);
        record.history.push(Attempt {
            date: date("2026-01-01"),
            rating: Rating::Good,
            duration_seconds: 600,
            notes: String::new(),
            time_source: Default::default(),
        });
    }

    #[test]
    fn first_day_introduces_new_problems() {
        let mut s = state(10, "2026-01-05", 3);
        let plan = DailyPlanBuilder::new(6).build(&mut s, date("2026-01-05"));
        assert_eq!(plan.ids(), vec![1, 2, 3]);
        assert!(plan.entries.iter().all(|e| e.kind == EntryKind::New));
        assert!(!plan.backlog_focus);
        assert_eq!(s.problems[&1].status, ProgressStatus::Scheduled);
        assert_eq!(s.problems[&4].status, ProgressStatus::NotStarted);
        assert_eq!(s.current_plan.as_ref().unwrap().assigned, vec![1, 2, 3]);
    }

    #[test]
    fn nothing_introduced_before_start_date() {
        let mut s = state(10, "2026-01-05", 3);
        let plan = DailyPlanBuilder::new(6).build(&mut s, date("2026-01-04"));
        assert!(plan.is_empty());
    }

    #[test]
    fn building_twice_is_idempotent() {
        let mut s = state(10, "2026-01-05", 3);
        schedule(&mut s, 9, "2026-01-04");
        let builder = DailyPlanBuilder::new(6);
        let first = builder.build(&mut s, date("2026-01-05"));
        let snapshot = s.clone();
        let second = builder.build(&mut s, date("2026-01-05"));
        assert_eq!(first, second);
        assert_eq!(s, snapshot);
    }

    #[test]
    fn due_reviews_come_first_oldest_first() {
        let mut s = state(10, "2026-01-05", 2);
        schedule(&mut s, 8, "2026-01-05");
        schedule(&mut s, 7, "2026-01-03");
        let plan = DailyPlanBuilder::new(6).build(&mut s, date("2026-01-05"));
        assert_eq!(plan.ids(), vec![7, 8, 1, 2]);
        assert_eq!(plan.entries[0].kind, EntryKind::Overdue);
        assert_eq!(plan.entries[1].kind, EntryKind::Review);
        assert_eq!(plan.entries[2].kind, EntryKind::New);
    }

    #[test]
    fn new_problems_fill_only_remaining_capacity() {
        let mut s = state(10, "2026-01-05", 3);
        schedule(&mut s, 8, "2026-01-05");
        schedule(&mut s, 9, "2026-01-05");
        let plan = DailyPlanBuilder::new(4).build(&mut s, date("2026-01-05"));
        assert_eq!(plan.ids(), vec![8, 9, 1, 2]);
    }

    #[test]
    fn backlog_over_cap_suppresses_new_problems() {
        let mut s = state(10, "2026-01-20", 3);
        schedule(&mut s, 6, "2026-01-14");
        schedule(&mut s, 2, "2026-01-10");
        schedule(&mut s, 9, "2026-01-12");
        schedule(&mut s, 4, "2026-01-11");
        let plan = DailyPlanBuilder::new(3).build(&mut s, date("2026-01-20"));

        assert_eq!(plan.ids(), vec![2, 4, 9]);
        assert!(plan.entries.iter().all(|e| e.kind == EntryKind::Overdue));
        assert!(plan.backlog_focus);
        assert_eq!(plan.deferred, 1);
        assert_eq!(s.count_by_status(ProgressStatus::Scheduled), 4);
    }

    #[test]
    fn backlog_at_cap_has_no_room_for_new() {
        let mut s = state(10, "2026-01-05", 3);
        schedule(&mut s, 8, "2026-01-05");
        schedule(&mut s, 9, "2026-01-05");
        let plan = DailyPlanBuilder::new(2).build(&mut s, date("2026-01-05"));
        assert_eq!(plan.ids(), vec![8, 9]);
        assert!(!plan.backlog_focus);
    }

    #[test]
    fn unfinished_problems_become_overdue_next_day() {
        let mut s = state(10, "2026-01-05", 2);
        let builder = DailyPlanBuilder::new(6);
        builder.build(&mut s, date("2026-01-05"));
        let plan = builder.build(&mut s, date("2026-01-06"));
        assert_eq!(plan.ids(), vec![1, 2, 3, 4]);
        assert_eq!(plan.entries[0].kind, EntryKind::Overdue);
        assert_eq!(plan.entries[2].kind, EntryKind::New);
    }

    #[test]
    fn add_extra_bypasses_backlog_focus() {
        let mut s = state(10, "2026-01-20", 3);
        for (id, due) in [(6, "2026-01-14"), (2, "2026-01-10"), (9, "2026-01-12")] {
            schedule(&mut s, id, due);
        }
        let builder = DailyPlanBuilder::new(2);
        let (plan, added) = builder.add_extra(&mut s, date("2026-01-20"), 2);

        assert_eq!(added, 2);
        assert_eq!(plan.ids(), vec![2, 9, 1, 3]);
        assert_eq!(plan.count(EntryKind::Extra), 2);
        assert!(plan.backlog_focus);
        assert_eq!(s.problems[&1].due_date, date("2026-01-20"));

        let again = builder.build(&mut s, date("2026-01-20"));
        assert_eq!(again.ids(), plan.ids());
    }

    #[test]
    fn add_extra_pulls_future_problems_in_list_order() {
        let mut s = state(10, "2026-01-05", 2);
        let builder = DailyPlanBuilder::new(6);
        let (plan, added) = builder.add_extra(&mut s, date("2026-01-05"), 3);
        assert_eq!(added, 3);
        assert_eq!(plan.ids(), vec![1, 2, 3, 4, 5]);
        assert_eq!(s.problems[&5].status, ProgressStatus::Scheduled);
    }

    #[test]
    fn add_extra_when_list_is_exhausted() {
        let mut s = state(2, "2026-01-05", 2);
        let (plan, added) = DailyPlanBuilder::new(6).add_extra(&mut s, date("2026-01-05"), 3);
        assert_eq!(added, 0);
        assert_eq!(plan.ids(), vec![1, 2]);
    }

    #[test]
    fn resolved_entries_drop_out_of_the_marker_plan() {
        let mut s = state(10, "2026-01-05", 3);
        let builder = DailyPlanBuilder::new(6);
        builder.build(&mut s, date("2026-01-05"));
        let record = s.problems.get_mut(&2).unwrap();
        record.due_date = date("2026-01-11");
        let plan = builder.build(&mut s, date("2026-01-05"));
        assert_eq!(plan.ids(), vec![1, 3]);
    }
}
