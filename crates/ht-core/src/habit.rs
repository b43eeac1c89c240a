//! Habits and their daily log entries.

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::date_key::DateKey;
use crate::types::{HabitId, HabitKind, LogId, ValidationError};

/// A tracked habit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Habit {
    pub id: HabitId,
    pub name: String,
    pub kind: HabitKind,
    /// When the habit was created. Streak math only sees the day part.
    pub created_at: DateTime<Utc>,
    /// Archived habits are hidden from active views but keep their logs.
    #[serde(default)]
    pub archived: bool,
}

impl Habit {
    /// Creates an active habit, trimming and validating the name.
    pub fn new(
        id: HabitId,
        name: &str,
        kind: HabitKind,
        created_at: DateTime<Utc>,
    ) -> Result<Self, ValidationError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ValidationError::Empty {
                field: "habit name",
            });
        }
        Ok(Self {
            id,
            name: name.to_string(),
            kind,
            created_at,
            archived: false,
        })
    }

    /// The creation day as seen on a calendar in `tz`.
    pub fn creation_day_in<Tz: TimeZone>(&self, tz: &Tz) -> NaiveDate {
        self.created_at.with_timezone(tz).date_naive()
    }
}

/// A single "done" (or, for negative habits, "lapsed") mark on one day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    pub id: LogId,
    pub habit_id: HabitId,
    pub date_key: DateKey,
    /// When the toggle happened. Informational only.
    pub completed_at: DateTime<Utc>,
}
