//! Elapsed work time from workspace file timestamps.
//!
//! A problem's artifact is a file directly inside the workspace directory
//! whose name is keyed to the problem:
//! - stem equal to the id (`1.py`)
//! - stem starting with the id and a separator (`1_two_sum.py`, `1-two-sum.rs`)
//! - stem equal to the title slug (`two-sum.rs`, `two_sum.rs`)
//!
//! The elapsed time is `modified - created`. The tracker never writes to
//! the workspace and never samples the wall clock.

use std::path::{Path, PathBuf};
use std::time::SystemTime;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, ValidationError};
use crate::problem::ProblemId;

/// Bounds applied to artifact-derived durations.
///
/// Stored under `[time_tracking]` in `drillplan.toml`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeLimits {
    /// Floor for a derived duration
    #[serde(default = "default_min_duration")]
    pub min_duration_secs: u64,
    /// Spans above this are treated as stale artifacts
    #[serde(default = "default_max_duration")]
    pub max_duration_secs: u64,
}

fn default_min_duration() -> u64 {
    1
}
fn default_max_duration() -> u64 {
    6 * 60 * 60
}

impl Default for TimeLimits {
    fn default() -> Self {
        Self {
            min_duration_secs: default_min_duration(),
            max_duration_secs: default_max_duration(),
        }
    }
}

impl TimeLimits {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.min_duration_secs == 0 {
            return Err(ConfigError::InvalidValue {
                key: "time_tracking.min_duration_secs".into(),
                message: "must be at least 1".into(),
            });
        }
        if self.max_duration_secs < self.min_duration_secs {
            return Err(ConfigError::InvalidValue {
                key: "time_tracking.max_duration_secs".into(),
                message: "must not be below min_duration_secs".into(),
            });
        }
        Ok(())
    }

    /// Bound a raw span. `None` means the artifact is stale.
    pub fn bound(&self, span_secs: i64) -> Option<u64> {
        let secs = u64::try_from(span_secs).unwrap_or(0).max(self.min_duration_secs);
        if secs > self.max_duration_secs {
            None
        } else {
            Some(secs)
        }
    }
}

/// Timestamps of one workspace artifact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactSpan {
    pub path: PathBuf,
    pub created: DateTime<Utc>,
    pub modified: DateTime<Utc>,
}

impl ArtifactSpan {
    /// Raw `modified - created` in seconds; may be negative on clock skew.
    pub fn span_secs(&self) -> i64 {
        (self.modified - self.created).num_seconds()
    }
}

/// What the sync engine needs to find a problem's artifact.
#[derive(Debug, Clone, Copy)]
pub struct ArtifactKey<'a> {
    pub id: ProblemId,
    pub title: &'a str,
}

/// Source of artifact timestamps.
pub trait ArtifactSource {
    /// The artifact for a problem, if any.
    fn find(&self, key: ArtifactKey<'_>) -> Option<ArtifactSpan>;
}

/// Reads artifact timestamps from a workspace directory.
#[derive(Debug, Clone)]
pub struct FsTimeTracker {
    dir: PathBuf,
}

impl FsTimeTracker {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn span_of(path: &Path) -> Option<ArtifactSpan> {
        let meta = std::fs::metadata(path).ok()?;
        if !meta.is_file() {
            return None;
        }
        let modified = meta.modified().ok()?;
        let created = match meta.created() {
            Ok(created) => created,
            Err(e) => {
                log::warn!(
                    "{}: creation time unavailable on this filesystem ({e}); ignoring artifact",
                    path.display()
                );
                return None;
            }
        };
        Some(ArtifactSpan {
            path: path.to_path_buf(),
            created: to_utc(created),
            modified: to_utc(modified),
        })
    }
}

impl ArtifactSource for FsTimeTracker {
    fn find(&self, key: ArtifactKey<'_>) -> Option<ArtifactSpan> {
        let entries = match std::fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(e) => {
                log::debug!("workspace {} unreadable: {e}", self.dir.display());
                return None;
            }
        };

        let best = entries
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| {
                path.file_stem()
                    .and_then(|s| s.to_str())
                    .is_some_and(|stem| matches_problem(stem, key))
            })
            .filter_map(|path| Self::span_of(&path))
            .max_by(|a, b| a.modified.cmp(&b.modified).then_with(|| b.path.cmp(&a.path)));

        match &best {
            Some(span) => log::debug!("problem {}: artifact {}", key.id, span.path.display()),
            None => log::debug!("problem {}: no artifact in {}", key.id, self.dir.display()),
        }
        best
    }
}

fn to_utc(time: SystemTime) -> DateTime<Utc> {
    DateTime::<Utc>::from(time)
}

/// Kebab-case slug of a title: "Two Sum II" -> "two-sum-ii".
pub fn slugify(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    let mut pending_dash = false;
    for c in title.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(c.to_ascii_lowercase());
        } else {
            pending_dash = true;
        }
    }
    slug
}

fn matches_problem(stem: &str, key: ArtifactKey<'_>) -> bool {
    let id = key.id.to_string();
    if stem == id {
        return true;
    }
    if let Some(rest) = stem.strip_prefix(&id) {
        if rest.starts_with(['_', '-', '.']) {
            return true;
        }
    }
    let slug = slugify(key.title);
    !slug.is_empty() && (stem.eq_ignore_ascii_case(&slug) || stem.eq_ignore_ascii_case(&slug.replace('-', "_")))
}

/// Parse a manual time value.
///
/// Accepts `95s`, `25m`, `1h 5m`, `1h5m30s`, `1:05:00`, `25:00` and bare
/// integers, which count as minutes.
///
/// # Errors
/// [`ValidationError::MalformedDuration`] if nothing sensible is found.
pub fn parse_manual_duration(raw: &str) -> Result<u64, ValidationError> {
    let text = raw.trim().to_lowercase();
    let malformed = || ValidationError::MalformedDuration(raw.trim().to_string());
    if text.is_empty() {
        return Err(malformed());
    }

    if text.contains(':') {
        let parts: Vec<u64> = text
            .split(':')
            .map(|p| p.trim().parse::<u64>())
            .collect::<Result<_, _>>()
            .map_err(|_| malformed())?;
        let (h, m, s) = match parts.as_slice() {
            [m, s] => (0, *m, *s),
            [h, m, s] => (*h, *m, *s),
            _ => return Err(malformed()),
        };
        return h
            .checked_mul(3600)
            .and_then(|secs| secs.checked_add(m.checked_mul(60)?))
            .and_then(|secs| secs.checked_add(s))
            .ok_or_else(malformed);
    }

    if let Ok(minutes) = text.parse::<u64>() {
        return minutes.checked_mul(60).ok_or_else(malformed);
    }

    let mut total = 0u64;
    let mut number = String::new();
    let mut saw_unit = false;
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        if c.is_ascii_digit() {
            number.push(c);
            continue;
        }
        if c.is_whitespace() {
            continue;
        }
        let mut unit = String::from(c);
        while let Some(next) = chars.peek() {
            if next.is_ascii_alphabetic() {
                unit.push(*next);
                chars.next();
            } else {
                break;
            }
        }
        let value: u64 = number.parse().map_err(|_| malformed())?;
        number.clear();
        let factor = match unit.as_str() {
            "h" | "hr" | "hrs" | "hour" | "hours" => 3600,
            "m" | "min" | "mins" | "minute" | "minutes" => 60,
            "s" | "sec" | "secs" | "second" | "seconds" => 1,
            _ => return Err(malformed()),
        };
        total = value
            .checked_mul(factor)
            .and_then(|secs| total.checked_add(secs))
            .ok_or_else(malformed)?;
        saw_unit = true;
    }
    if !number.is_empty() || !saw_unit {
        return Err(malformed());
    }
    Ok(total)
}

/// Human-readable duration: `45s`, `3m 20s`, `1h 25m`.
pub fn format_duration(seconds: u64) -> String {
    if seconds < 60 {
        return format!("{seconds}s");
    }
    let minutes = seconds / 60;
    if minutes < 60 {
        return format!("{}m {}s", minutes, seconds % 60);
    }
    format!("{}h {}m", minutes / 60, minutes % 60)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn key(id: ProblemId, title: &str) -> ArtifactKey<'_> {
        ArtifactKey { id, title }
    }

    #[test]
    fn span_of_95_seconds() {
        let created = DateTime::parse_from_rfc3339("2026-03-10T09:00:00Z").unwrap().with_timezone(&Utc);
        let span = ArtifactSpan {
            path: PathBuf::from("1.py"),
            created,
            modified: created + chrono::Duration::seconds(95),
        };
        assert_eq!(span.span_secs(), 95);
        assert_eq!(TimeLimits::default().bound(span.span_secs()), Some(95));
    }

    #[test]
    fn bound_floors_and_rejects_stale() {
        let limits = TimeLimits::default();
        assert_eq!(limits.bound(0), Some(1));
        assert_eq!(limits.bound(-30), Some(1));
        assert_eq!(limits.bound(6 * 3600), Some(6 * 3600));
        assert_eq!(limits.bound(6 * 3600 + 1), None);
    }

    #[test]
    fn filename_convention() {
        let k = key(42, "Trapping Rain Water");
        assert!(matches_problem("42", k));
        assert!(matches_problem("42_trapping", k));
        assert!(matches_problem("42-x", k));
        assert!(matches_problem("trapping-rain-water", k));
        assert!(matches_problem("trapping_rain_water", k));
        assert!(!matches_problem("421", k));
        assert!(!matches_problem("4", k));
        assert!(!matches_problem("rain-water", k));
    }

    #[test]
    fn slugify_titles() {
        assert_eq!(slugify("Two Sum II - Input Array Is Sorted"), "two-sum-ii-input-array-is-sorted");
        assert_eq!(slugify("  LRU Cache "), "lru-cache");
        assert_eq!(slugify("???"), "");
    }

    #[test]
    fn finds_artifact_in_workspace() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("1.py"), "print()").unwrap();
        fs::write(temp.path().join("11.py"), "print()").unwrap();
        let tracker = FsTimeTracker::new(temp.path());

        match fs::metadata(temp.path().join("1.py")).unwrap().created() {
            Ok(_) => {
                let span = tracker.find(key(1, "Two Sum")).unwrap();
                assert_eq!(span.path, temp.path().join("1.py"));
                assert!(span.modified >= span.created - chrono::Duration::seconds(1));
            }
            // Filesystems without birth time never yield artifacts
            Err(_) => assert!(tracker.find(key(1, "Two Sum")).is_none()),
        }
    }

    #[test]
    fn missing_artifact_and_missing_dir() {
        let temp = TempDir::new().unwrap();
        let tracker = FsTimeTracker::new(temp.path());
        assert!(tracker.find(key(3, "Longest Substring")).is_none());

        let tracker = FsTimeTracker::new(temp.path().join("nope"));
        assert!(tracker.find(key(3, "Longest Substring")).is_none());
    }

    #[test]
    fn tracker_is_read_only() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("7_reverse.rs");
        fs::write(&path, "fn main() {}").unwrap();
        let before = fs::metadata(&path).unwrap().modified().unwrap();
        let _ = FsTimeTracker::new(temp.path()).find(key(7, "Reverse Integer"));
        assert_eq!(fs::metadata(&path).unwrap().modified().unwrap(), before);
        assert_eq!(fs::read_dir(temp.path()).unwrap().count(), 1);
    }

    #[test]
    fn manual_durations() {
        assert_eq!(parse_manual_duration("95s"), Ok(95));
        assert_eq!(parse_manual_duration("25m"), Ok(1500));
        assert_eq!(parse_manual_duration("25"), Ok(1500));
        assert_eq!(parse_manual_duration("1h 5m"), Ok(3900));
        assert_eq!(parse_manual_duration("1h5m30s"), Ok(3930));
        assert_eq!(parse_manual_duration("3m 20s"), Ok(200));
        assert_eq!(parse_manual_duration("25:00"), Ok(1500));
        assert_eq!(parse_manual_duration("1:05:00"), Ok(3900));
        assert_eq!(parse_manual_duration("40 min"), Ok(2400));
        assert!(parse_manual_duration("about an hour").is_err());
        assert!(parse_manual_duration("12x").is_err());
        assert!(parse_manual_duration("5m 3").is_err());
        assert!(parse_manual_duration("").is_err());
    }

    #[test]
    fn oversized_manual_durations_are_malformed() {
        for raw in ["999999999999999999", "999999999999999999:00", "99999999999999999999h", "5124095576030431h 1h"] {
            assert!(
                matches!(parse_manual_duration(raw), Err(ValidationError::MalformedDuration(_))),
                "{raw}"
            );
        }
        assert_eq!(parse_manual_duration("1000000:00:00"), Ok(3_600_000_000));
    }

    #[test]
    fn format_durations() {
        assert_eq!(format_duration(45), "45s");
        assert_eq!(format_duration(200), "3m 20s");
        assert_eq!(format_duration(5100), "1h 25m");
    }
}
