//! Progress dashboard.
//!
//! Always derived from the current [`State`]; nothing here is persisted
//! except the rendered `dashboard.md`, which is overwritten every time.

use std::collections::BTreeSet;
use std::fmt::Write;

use chrono::{Duration, NaiveDate};
use indexmap::IndexMap;
use serde::Serialize;

use crate::problem::ProblemId;
use crate::progress::{Attempt, ProgressRecord, ProgressStatus, State};
use crate::tracker::format_duration;

/// Days in a row with at least one synced review.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Streaks {
    /// Run ending today, or yesterday if nothing was synced yet today
    pub current: u32,
    pub longest: u32,
}

/// Compute review streaks as of `date`. Attempts after `date` are ignored.
pub fn streaks(state: &State, date: NaiveDate) -> Streaks {
    let days: BTreeSet<NaiveDate> = state
        .problems
        .values()
        .flat_map(|r| r.history.iter().map(|a| a.date))
        .filter(|d| *d <= date)
        .collect();

    let mut longest = 0;
    let mut run = 0;
    let mut previous: Option<NaiveDate> = None;
    for day in &days {
        run = match previous {
            Some(p) if *day - p == Duration::days(1) => run + 1,
            _ => 1,
        };
        longest = longest.max(run);
        previous = Some(*day);
    }

    let mut cursor = if days.contains(&date) {
        date
    } else {
        date - Duration::days(1)
    };
    let mut current = 0;
    while days.contains(&cursor) {
        current += 1;
        cursor -= Duration::days(1);
    }
    Streaks { current, longest }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DueItem {
    pub id: ProblemId,
    pub title: String,
    pub category: String,
    pub due_date: NaiveDate,
}

impl From<&ProgressRecord> for DueItem {
    fn from(r: &ProgressRecord) -> Self {
        Self {
            id: r.id,
            title: r.title.clone(),
            category: r.category.clone(),
            due_date: r.due_date,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryProgress {
    pub name: String,
    pub total: usize,
    /// Problems reviewed at least once
    pub reviewed: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProblemHistory {
    pub id: ProblemId,
    pub title: String,
    pub next_review: NaiveDate,
    pub attempts: Vec<Attempt>,
}

/// Everything shown on the dashboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Dashboard {
    pub plan_name: String,
    pub date: NaiveDate,
    pub total: usize,
    pub not_started: usize,
    pub scheduled: usize,
    pub reviewed: usize,
    pub total_time_secs: u64,
    pub streaks: Streaks,
    pub overdue: Vec<DueItem>,
    pub due_today: Vec<DueItem>,
    /// Due within the upcoming window, soonest first
    pub upcoming: Vec<DueItem>,
    pub categories: Vec<CategoryProgress>,
    pub history: Vec<ProblemHistory>,
}

impl Dashboard {
    pub fn from_state(state: &State, date: NaiveDate, upcoming_days: u32) -> Self {
        let horizon = date + Duration::days(i64::from(upcoming_days));
        let mut overdue = Vec::new();
        let mut due_today = Vec::new();
        let mut upcoming = Vec::new();
        let mut categories: IndexMap<&str, CategoryProgress> = IndexMap::new();
        let mut history = Vec::new();

        for record in state.records_in_order() {
            let reviewed = !record.history.is_empty();
            let entry = categories
                .entry(record.category.as_str())
                .or_insert_with(|| CategoryProgress {
                    name: record.category.clone(),
                    total: 0,
                    reviewed: 0,
                });
            entry.total += 1;
            if reviewed {
                entry.reviewed += 1;
                history.push(ProblemHistory {
                    id: record.id,
                    title: record.title.clone(),
                    next_review: record.due_date,
                    attempts: record.history.clone(),
                });
            }

            if record.status != ProgressStatus::Scheduled {
                continue;
            }
            if record.due_date < date {
                overdue.push(DueItem::from(record));
            } else if record.due_date == date {
                due_today.push(DueItem::from(record));
            } else if record.due_date <= horizon {
                upcoming.push(DueItem::from(record));
            }
        }
        overdue.sort_by_key(|d| d.due_date);
        upcoming.sort_by_key(|d| d.due_date);

        Self {
            plan_name: state.settings.plan_name.clone(),
            date,
            total: state.problems.len(),
            not_started: state.count_by_status(ProgressStatus::NotStarted),
            scheduled: state.count_by_status(ProgressStatus::Scheduled),
            reviewed: state.problems.values().filter(|r| !r.history.is_empty()).count(),
            total_time_secs: state.problems.values().map(|r| r.total_time_spent_seconds).sum(),
            streaks: streaks(state, date),
            overdue,
            due_today,
            upcoming,
            categories: categories.into_values().collect(),
            history,
        }
    }

    pub fn progress_percent(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.reviewed as f64 * 100.0 / self.total as f64
        }
    }

    pub fn render_markdown(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "# Study Journey: {} Dashboard\n", self.plan_name);
        let _ = writeln!(out, "_As of {}_\n", self.date.format("%Y-%m-%d"));
        let _ = writeln!(
            out,
            "**Overall Progress: {} / {} ({:.1}%)**\n",
            self.reviewed,
            self.total,
            self.progress_percent()
        );
        let _ = writeln!(
            out,
            "- Not started: {}\n- Scheduled: {}\n- Time spent: {}\n- Current streak: {} day(s)\n- Longest streak: {} day(s)",
            self.not_started,
            self.scheduled,
            format_duration(self.total_time_secs),
            self.streaks.current,
            self.streaks.longest
        );

        for (heading, items, show_date) in [
            ("Overdue", &self.overdue, true),
            ("Due Today", &self.due_today, false),
            ("Upcoming", &self.upcoming, true),
        ] {
            let _ = writeln!(out, "\n## {heading}\n");
            if items.is_empty() {
                out.push_str("_None_\n");
            }
            for item in items {
                let _ = write!(out, "- {}\\. {} ({})", item.id, item.title, item.category);
                if show_date {
                    let _ = write!(out, " - due {}", item.due_date.format("%Y-%m-%d"));
                }
                out.push('\n');
            }
        }

        out.push_str("\n## Categories\n\n");
        for category in &self.categories {
            let _ = writeln!(out, "- {} ({} / {})", category.name, category.reviewed, category.total);
        }

        out.push_str("\n## History\n");
        for problem in &self.history {
            let _ = writeln!(
                out,
                "\n### {}\\. {} (next review {})\n",
                problem.id,
                problem.title,
                problem.next_review.format("%Y-%m-%d")
            );
            for (i, attempt) in problem.attempts.iter().enumerate() {
                let notes = if attempt.notes.trim().is_empty() {
                    "No notes provided."
                } else {
                    attempt.notes.trim()
                };
                let _ = writeln!(
                    out,
                    "- **Attempt {} ({}, Time: {}, Rating: {}):** {notes}",
                    i + 1,
                    attempt.date.format("%Y-%m-%d"),
                    format_duration(attempt.duration_seconds),
                    attempt.rating
                );
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progress::fixtures::{date, state};
    use crate::progress::TimeSource;
    use crate::scheduler::Rating;

    fn review(state: &mut State, id: ProblemId, on: &str, next: &str) {
        let record = state.problems.get_mut(&id).unwrap();
        record.status = ProgressStatus::Scheduled;
        record.due_date = date(next);
        record.total_time_spent_seconds += 600;
        record.history.push(Attempt {
            date: date(on),
            rating: Rating::Good,
            duration_seconds: 600,
            notes: String::new(),
            time_source: TimeSource::Manual,
        });
    }

    #[test]
    fn streak_counts_consecutive_days() {
        let mut s = state(6, "2026-05-01", 2);
        review(&mut s, 1, "2026-05-01", "2026-05-10");
        review(&mut s, 2, "2026-05-02", "2026-05-10");
        review(&mut s, 3, "2026-05-03", "2026-05-10");
        review(&mut s, 4, "2026-05-06", "2026-05-10");
        review(&mut s, 5, "2026-05-07", "2026-05-10");

        assert_eq!(streaks(&s, date("2026-05-07")), Streaks { current: 2, longest: 3 });
        // Still alive the next morning
        assert_eq!(streaks(&s, date("2026-05-08")).current, 2);
        assert_eq!(streaks(&s, date("2026-05-09")).current, 0);
        assert_eq!(streaks(&s, date("2026-05-02")), Streaks { current: 2, longest: 2 });
    }

    #[test]
    fn dashboard_lists() {
        let mut s = state(6, "2026-05-01", 2);
        review(&mut s, 1, "2026-05-01", "2026-05-03");
        review(&mut s, 2, "2026-05-01", "2026-05-05");
        review(&mut s, 4, "2026-05-01", "2026-05-07");
        review(&mut s, 5, "2026-05-01", "2026-06-30");

        let d = Dashboard::from_state(&s, date("2026-05-05"), 7);
        assert_eq!(d.total, 6);
        assert_eq!(d.reviewed, 4);
        assert_eq!(d.not_started, 2);
        assert_eq!(d.overdue.iter().map(|i| i.id).collect::<Vec<_>>(), vec![1]);
        assert_eq!(d.due_today.iter().map(|i| i.id).collect::<Vec<_>>(), vec![2]);
        assert_eq!(d.upcoming.iter().map(|i| i.id).collect::<Vec<_>>(), vec![4]);
        assert_eq!(
            d.categories,
            vec![
                CategoryProgress { name: "Arrays".into(), total: 3, reviewed: 2 },
                CategoryProgress { name: "Graphs".into(), total: 3, reviewed: 2 },
            ]
        );
        assert_eq!(d.total_time_secs, 2400);
    }

    #[test]
    fn markdown_has_all_sections() {
        let mut s = state(4, "2026-05-01", 2);
        review(&mut s, 1, "2026-05-01", "2026-05-03");
        let text = Dashboard::from_state(&s, date("2026-05-05"), 7).render_markdown();
        assert!(text.contains("**Overall Progress: 1 / 4 (25.0%)**"));
        assert!(text.contains("## Overdue\n\n- 1\\. Problem 1 (Arrays) - due 2026-05-03"));
        assert!(text.contains("- Arrays (1 / 2)"));
        assert!(text.contains("**Attempt 1 (2026-05-01, Time: 10m 0s, Rating: 3 (Good)):** No notes provided."));
    }
}
