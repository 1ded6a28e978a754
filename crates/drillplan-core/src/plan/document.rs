//! Tolerant reader for edited plan documents.
//!
//! An entry starts at a checkbox line carrying the problem id:
//!
//! ```text
//! - [x] 1\. Two Sum
//!     *   **Rating (1-4)**: 3
//!     *   **Notes**: hash map, one pass
//!     *   **Time Taken (Manual)**: 25m
//! ```
//!
//! and runs until the next checkbox line. Field labels are matched
//! case-insensitively on their first word, so `**Rating**:` and
//! `**rating (1-4)**:` both work. Lines that match nothing are ignored.

use std::path::Path;
use std::sync::OnceLock;

use chrono::NaiveDate;
use regex::Regex;
use serde::Serialize;

use crate::error::ValidationError;
use crate::problem::ProblemId;
use crate::scheduler::Rating;
use crate::tracker::parse_manual_duration;

fn entry_start() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^\s*[-*]\s*\[([ xX])\]\s*(\d+)\\?\.\s*(.*)$").expect("entry pattern is valid")
    })
}

fn checkbox_line() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\s*[-*]\s*\[[ xX]\]").expect("checkbox pattern is valid"))
}

fn field_line() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)\*\*\s*(rating|notes|time taken)[^*]*\*\*\s*:(.*)$").expect("field pattern is valid")
    })
}

fn header_date() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^#.*?(\d{4}-\d{2}-\d{2})").expect("date pattern is valid"))
}

/// One entry as written in the document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParsedEntry {
    pub id: ProblemId,
    /// Rest of the checkbox line after the id
    pub title: String,
    pub checked: bool,
    /// Rating field exactly as written, trimmed
    pub rating_raw: String,
    pub notes: String,
    /// Manual time field, `None` when left blank
    pub manual_time: Option<String>,
}

impl ParsedEntry {
    pub fn rating(&self) -> Result<Rating, ValidationError> {
        Rating::parse_field(&self.rating_raw)
    }

    /// Parsed manual time; `None` when the field is blank.
    pub fn manual_seconds(&self) -> Option<Result<u64, ValidationError>> {
        self.manual_time.as_deref().map(parse_manual_duration)
    }
}

/// A parsed plan document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PlanDocument {
    /// Date from the first heading that carries one
    pub date: Option<NaiveDate>,
    pub entries: Vec<ParsedEntry>,
}

impl PlanDocument {
    pub fn parse(text: &str) -> Self {
        let mut doc = PlanDocument::default();
        let mut current: Option<ParsedEntry> = None;
        let mut seen_fields = [false; 3];

        for line in text.lines() {
            if doc.date.is_none() {
                if let Some(caps) = header_date().captures(line) {
                    doc.date = NaiveDate::parse_from_str(&caps[1], "%Y-%m-%d").ok();
                }
            }

            if checkbox_line().is_match(line) {
                doc.entries.extend(current.take());
                seen_fields = [false; 3];
                // A checkbox without a readable id closes the previous entry
                // and starts nothing.
                if let Some(caps) = entry_start().captures(line) {
                    if let Ok(id) = caps[2].parse::<ProblemId>() {
                        current = Some(ParsedEntry {
                            id,
                            title: caps[3].trim().to_string(),
                            checked: !caps[1].trim().is_empty(),
                            rating_raw: String::new(),
                            notes: String::new(),
                            manual_time: None,
                        });
                    }
                }
                continue;
            }

            let Some(entry) = current.as_mut() else {
                continue;
            };
            let Some(caps) = field_line().captures(line) else {
                continue;
            };
            let value = caps[2].trim().to_string();
            let slot = match caps[1].to_lowercase().as_str() {
                "rating" => 0,
                "notes" => 1,
                _ => 2,
            };
            if seen_fields[slot] {
                continue;
            }
            seen_fields[slot] = true;
            match slot {
                0 => entry.rating_raw = value,
                1 => entry.notes = value,
                _ => entry.manual_time = Some(value).filter(|v| !v.is_empty()),
            }
        }
        doc.entries.extend(current);
        doc
    }

    pub fn load(path: &Path) -> std::io::Result<Self> {
        Ok(Self::parse(&std::fs::read_to_string(path)?))
    }

    /// First entry for `id`.
    pub fn entry(&self, id: ProblemId) -> Option<&ParsedEntry> {
        self.entries.iter().find(|e| e.id == id)
    }

    pub fn checked(&self) -> impl Iterator<Item = &ParsedEntry> {
        self.entries.iter().filter(|e| e.checked)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use indoc::indoc;

    const EDITED: &str = indoc! {r"
        # Daily Plan: 2026-03-10

        ### Rating Legend
        - **1: Again** - lost
        - **4: Easy** - confident

        ## New Problems

        - [x] 1\. Two Sum (Arrays)
            *   **Rating (1-4)**: 3
            *   **Notes**: hash map: one pass
            *   **Time Taken (Manual)**: 25m
            *   **Resources**:
                *   [LeetCode Problem](https://leetcode.com/problems/two-sum/)
        - [ ] 2\. Valid Anagram (Arrays)
            *   **Rating (1-4)**:
            *   **Notes**:
            *   **Time Taken (Manual)**:
        * [X] 3. Group Anagrams
          **RATING**: 4 - easy
          **notes**: first
          **Notes**: second
    "};

    #[test]
    fn parses_entries_and_fields() {
        let doc = PlanDocument::parse(EDITED);
        assert_eq!(doc.date, NaiveDate::from_ymd_opt(2026, 3, 10));
        assert_eq!(doc.entries.len(), 3);

        let first = &doc.entries[0];
        assert_eq!(first.id, 1);
        assert!(first.checked);
        assert_eq!(first.title, "Two Sum (Arrays)");
        assert_eq!(first.rating(), Ok(Rating::Good));
        assert_eq!(first.notes, "hash map: one pass");
        assert_eq!(first.manual_seconds(), Some(Ok(1500)));

        let second = &doc.entries[1];
        assert!(!second.checked);
        assert_eq!(second.rating(), Err(ValidationError::MissingRating));
        assert_eq!(second.manual_time, None);
    }

    #[test]
    fn tolerates_loose_formatting() {
        let doc = PlanDocument::parse(EDITED);
        let third = doc.entry(3).unwrap();
        assert!(third.checked);
        assert_eq!(third.rating(), Ok(Rating::Easy));
        assert_eq!(third.notes, "first");
        assert_eq!(doc.checked().map(|e| e.id).collect::<Vec<_>>(), vec![1, 3]);
    }

    #[test]
    fn bad_values_surface_as_validation_errors() {
        let doc = PlanDocument::parse(indoc! {r"
            - [x] 5\. Climbing Stairs
                *   **Rating (1-4)**: 7
                *   **Time Taken (Manual)**: a while
            - [x] 6\. House Robber
                *   **Rating (1-4)**: good
        "});
        assert_eq!(doc.entries[0].rating(), Err(ValidationError::RatingOutOfRange(7)));
        assert!(matches!(
            doc.entries[0].manual_seconds(),
            Some(Err(ValidationError::MalformedDuration(_)))
        ));
        assert!(matches!(doc.entries[1].rating(), Err(ValidationError::MalformedRating(_))));
    }

    #[test]
    fn checkbox_without_id_is_skipped() {
        let doc = PlanDocument::parse(indoc! {r"
            - [x] 4\. Reverse List
                *   **Rating (1-4)**: 2
            - [x] shopping list
                *   **Rating (1-4)**: 4
        "});
        assert_eq!(doc.entries.len(), 1);
        assert_eq!(doc.entries[0].rating(), Ok(Rating::Hard));
        assert!(PlanDocument::parse("").entries.is_empty());
    }
}
