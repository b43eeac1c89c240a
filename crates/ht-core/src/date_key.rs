//! Calendar-day identity.
//!
//! Every log is keyed by a local calendar day written as `YYYY-MM-DD`. This is
//! the only day format the store and the engine exchange; no timezone
//! conversion happens past this point.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use chrono::{Days, NaiveDate};
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::types::ValidationError;

/// Shape check for date keys. chrono alone accepts `2024-1-5`.
static DATE_KEY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").expect("date key regex is valid"));

const DATE_KEY_FORMAT: &str = "%Y-%m-%d";

/// A validated `YYYY-MM-DD` calendar day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DateKey(NaiveDate);

impl DateKey {
    /// Wraps an already-known calendar day.
    #[must_use]
    pub const fn from_date(date: NaiveDate) -> Self {
        Self(date)
    }

    /// Returns the calendar day.
    #[must_use]
    pub const fn date(self) -> NaiveDate {
        self.0
    }
}

impl From<NaiveDate> for DateKey {
    fn from(date: NaiveDate) -> Self {
        Self(date)
    }
}

impl From<DateKey> for NaiveDate {
    fn from(key: DateKey) -> Self {
        key.0
    }
}

impl FromStr for DateKey {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ValidationError::InvalidDateKey {
            value: s.to_string(),
        };
        if !DATE_KEY_RE.is_match(s) {
            return Err(invalid());
        }
        NaiveDate::parse_from_str(s, DATE_KEY_FORMAT)
            .map(Self)
            .map_err(|_| invalid())
    }
}

impl TryFrom<String> for DateKey {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<DateKey> for String {
    fn from(key: DateKey) -> Self {
        key.to_string()
    }
}

impl fmt::Display for DateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format(DATE_KEY_FORMAT))
    }
}

/// Returns `day - n` days, saturating at chrono's minimum date.
pub(crate) fn days_before(day: NaiveDate, n: u64) -> NaiveDate {
    day.checked_sub_days(Days::new(n)).unwrap_or(NaiveDate::MIN)
}

/// The set of days on which a habit has a log.
///
/// At most one log exists per habit per day, so a set is the whole story.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LogDays {
    days: BTreeSet<NaiveDate>,
}

impl LogDays {
    /// Creates an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds the set from stored date keys.
    ///
    /// Malformed keys are skipped with a warning so a single corrupt row
    /// cannot blank out a habit's history.
    pub fn from_keys<I, S>(keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut days = BTreeSet::new();
        for key in keys {
            let key = key.as_ref();
            match key.parse::<DateKey>() {
                Ok(parsed) => {
                    days.insert(parsed.date());
                }
                Err(e) => {
                    tracing::warn!(date_key = key, error = %e, "skipping malformed log date key");
                }
            }
        }
        Self { days }
    }

    /// Whether `day` has a log.
    pub fn contains(&self, day: NaiveDate) -> bool {
        self.days.contains(&day)
    }

    /// Adds a log for `day` if absent, removes it if present.
    ///
    /// Returns `true` when the day is logged afterwards.
    pub fn toggle(&mut self, day: NaiveDate) -> bool {
        if self.days.remove(&day) {
            false
        } else {
            self.days.insert(day);
            true
        }
    }

    /// Number of logged days in `start..=end`.
    pub fn count_between(&self, start: NaiveDate, end: NaiveDate) -> usize {
        if end < start {
            return 0;
        }
        self.days.range(start..=end).count()
    }

    /// Number of logged days overall.
    pub fn len(&self) -> usize {
        self.days.len()
    }

    /// Whether no day is logged.
    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }

    /// Logged days in chronological order.
    pub fn iter(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.days.iter().copied()
    }
}

impl FromIterator<NaiveDate> for LogDays {
    fn from_iter<T: IntoIterator<Item = NaiveDate>>(iter: T) -> Self {
        Self {
            days: iter.into_iter().collect(),
        }
    }
}
