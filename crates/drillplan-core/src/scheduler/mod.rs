//! Adaptive review interval scheduler.
//!
//! Maps `(previous interval, rating)` to the next interval and due date:
//! - Rating 1 (again) resets to the minimum interval
//! - Ratings 2-4 (hard, good, easy) grow the previous interval by
//!   increasing multipliers, or the seed interval on a first review
//! - Every result is clamped to `[min_interval_days, max_interval_days]`
//!
//! The computation is pure. The only date involved is the one passed in.

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, ValidationError};

/// Self-assessed rating of a review attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum Rating {
    /// Lost; needs near-term repetition
    Again = 1,
    /// Needed hints or the solution
    Hard = 2,
    /// Solved with some effort
    Good = 3,
    /// Solved quickly and confidently
    Easy = 4,
}

impl Rating {
    pub const ALL: [Rating; 4] = [Rating::Again, Rating::Hard, Rating::Good, Rating::Easy];

    pub fn value(self) -> u8 {
        self as u8
    }

    pub fn label(self) -> &'static str {
        match self {
            Rating::Again => "Again",
            Rating::Hard => "Hard",
            Rating::Good => "Good",
            Rating::Easy => "Easy",
        }
    }

    /// Parse the value written in a plan document's rating field.
    ///
    /// Accepts a leading integer followed by anything (`"3"`, `"3 - good"`).
    pub fn parse_field(raw: &str) -> Result<Rating, ValidationError> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Err(ValidationError::MissingRating);
        }
        let digits: String = raw
            .chars()
            .take_while(|c| c.is_ascii_digit() || *c == '-')
            .collect();
        let value: i64 = digits
            .parse()
            .map_err(|_| ValidationError::MalformedRating(raw.to_string()))?;
        Rating::try_from(value)
    }
}

impl TryFrom<i64> for Rating {
    type Error = ValidationError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Rating::Again),
            2 => Ok(Rating::Hard),
            3 => Ok(Rating::Good),
            4 => Ok(Rating::Easy),
            other => Err(ValidationError::RatingOutOfRange(other)),
        }
    }
}

impl TryFrom<u8> for Rating {
    type Error = ValidationError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Rating::try_from(i64::from(value))
    }
}

impl From<Rating> for u8 {
    fn from(rating: Rating) -> u8 {
        rating.value()
    }
}

impl std::fmt::Display for Rating {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.value(), self.label())
    }
}

/// Interval growth constants.
///
/// Stored under `[scheduling]` in `drillplan.toml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchedulingPolicy {
    /// Interval after an "again" rating
    #[serde(default = "default_min_interval")]
    pub min_interval_days: u32,
    /// Base interval when a problem has never been reviewed
    #[serde(default = "default_seed_interval")]
    pub seed_interval_days: u32,
    #[serde(default = "default_hard_multiplier")]
    pub hard_multiplier: f64,
    #[serde(default = "default_good_multiplier")]
    pub good_multiplier: f64,
    #[serde(default = "default_easy_multiplier")]
    pub easy_multiplier: f64,
    /// Upper bound on any interval
    #[serde(default = "default_max_interval")]
    pub max_interval_days: u32,
}

/// Largest accepted `max_interval_days`, about a century.
pub const MAX_INTERVAL_CEILING: u32 = 36_500;
/// Largest accepted growth multiplier.
pub const MAX_MULTIPLIER: f64 = 100.0;

fn default_min_interval() -> u32 {
    1
}
fn default_seed_interval() -> u32 {
    3
}
fn default_hard_multiplier() -> f64 {
    1.2
}
fn default_good_multiplier() -> f64 {
    1.8
}
fn default_easy_multiplier() -> f64 {
    2.5
}
fn default_max_interval() -> u32 {
    180
}

impl Default for SchedulingPolicy {
    fn default() -> Self {
        Self {
            min_interval_days: default_min_interval(),
            seed_interval_days: default_seed_interval(),
            hard_multiplier: default_hard_multiplier(),
            good_multiplier: default_good_multiplier(),
            easy_multiplier: default_easy_multiplier(),
            max_interval_days: default_max_interval(),
        }
    }
}

/// Outcome of scheduling one review.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScheduleOutcome {
    pub interval_days: u32,
    pub due_date: NaiveDate,
}

impl SchedulingPolicy {
    /// Check the constants are usable.
    ///
    /// # Errors
    /// Returns [`ConfigError::InvalidValue`] naming the offending key.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |key: &str, message: &str| ConfigError::InvalidValue {
            key: format!("scheduling.{key}"),
            message: message.to_string(),
        };

        if self.min_interval_days == 0 {
            return Err(invalid("min_interval_days", "must be at least 1"));
        }
        if self.seed_interval_days == 0 {
            return Err(invalid("seed_interval_days", "must be at least 1"));
        }
        if self.max_interval_days < self.min_interval_days {
            return Err(invalid("max_interval_days", "must not be below min_interval_days"));
        }
        if self.max_interval_days > MAX_INTERVAL_CEILING {
            return Err(invalid("max_interval_days", "must not exceed 36500 days"));
        }
        if self.seed_interval_days > MAX_INTERVAL_CEILING {
            return Err(invalid("seed_interval_days", "must not exceed 36500 days"));
        }
        for (key, value) in [
            ("hard_multiplier", self.hard_multiplier),
            ("good_multiplier", self.good_multiplier),
            ("easy_multiplier", self.easy_multiplier),
        ] {
            if !value.is_finite() || !(1.0..=MAX_MULTIPLIER).contains(&value) {
                return Err(invalid(key, "must be a number between 1.0 and 100.0"));
            }
        }
        if self.hard_multiplier > self.good_multiplier {
            return Err(invalid("hard_multiplier", "must not exceed good_multiplier"));
        }
        if self.good_multiplier > self.easy_multiplier {
            return Err(invalid("good_multiplier", "must not exceed easy_multiplier"));
        }
        Ok(())
    }

    /// Next interval in days for a rating.
    pub fn next_interval(&self, previous: Option<u32>, rating: Rating) -> u32 {
        let interval = match rating {
            Rating::Again => self.min_interval_days,
            Rating::Hard => grow(self.base(previous), self.hard_multiplier),
            Rating::Good => grow(self.base(previous), self.good_multiplier),
            Rating::Easy => grow(self.base(previous), self.easy_multiplier),
        };
        let ceiling = self.max_interval_days.clamp(1, MAX_INTERVAL_CEILING);
        interval.clamp(self.min_interval_days.min(ceiling), ceiling)
    }

    /// Schedule a review synced on `sync_date`.
    pub fn schedule(&self, previous: Option<u32>, rating: Rating, sync_date: NaiveDate) -> ScheduleOutcome {
        let interval_days = self.next_interval(previous, rating);
        ScheduleOutcome {
            interval_days,
            due_date: sync_date + Duration::days(i64::from(interval_days)),
        }
    }

    fn base(&self, previous: Option<u32>) -> u32 {
        match previous {
            Some(days) if days > 0 => days,
            _ => self.seed_interval_days,
        }
    }
}

/// `ceil(base * multiplier)` on thousandths, so 5 * 1.2 is exactly 6.
fn grow(base: u32, multiplier: f64) -> u32 {
    let permille = (multiplier.clamp(0.0, MAX_MULTIPLIER) * 1000.0).round() as u64;
    u64::from(base)
        .checked_mul(permille)
        .map(|scaled| scaled.div_ceil(1000))
        .and_then(|days| u32::try_from(days).ok())
        .unwrap_or(u32::MAX)
}
