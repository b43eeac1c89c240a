//! Collaborator contracts and stats loading.
//!
//! The engine does not own storage. Anything that can list a habit's logs and
//! look up its metadata can feed it, via [`LogStore`] and [`HabitRegistry`].

use std::error::Error as StdError;

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use thiserror::Error;

use crate::date_key::{DateKey, LogDays};
use crate::habit::{Habit, LogEntry};
use crate::streak::{HabitContext, HabitStats, compute_stats};
use crate::types::{HabitId, RollingWindow};

/// Errors surfaced while loading the inputs for a stats computation.
#[derive(Debug, Error)]
pub enum StatsError {
    /// The registry has no habit with this ID.
    #[error("habit not found: {0}")]
    HabitNotFound(HabitId),

    /// The backing store could not be read.
    #[error("habit store unavailable")]
    StoreUnavailable(#[source] Box<dyn StdError + Send + Sync>),
}

impl StatsError {
    fn unavailable<E>(err: E) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        Self::StoreUnavailable(Box::new(err))
    }
}

/// A stored log row as read back from the store.
///
/// `date_key` is kept raw: rows are validated when the log set is built, so a
/// corrupt key only drops that one row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogRecord {
    pub date_key: String,
    pub completed_at: Option<DateTime<Utc>>,
}

/// Result of toggling a day.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToggleOutcome {
    /// No log existed; one was inserted.
    Added(LogEntry),
    /// A log existed and was deleted.
    Removed,
}

/// Source of per-day completion logs.
pub trait LogStore {
    type Error: StdError + Send + Sync + 'static;

    /// Returns every log of a habit, in any order.
    fn list_logs(&self, habit_id: &HabitId) -> Result<Vec<LogRecord>, Self::Error>;

    /// Inserts a log for `day` if absent, deletes it if present.
    ///
    /// Implementations must make the read-then-write atomic per
    /// `(habit_id, day)`.
    fn toggle(
        &mut self,
        habit_id: &HabitId,
        day: DateKey,
        completed_at: DateTime<Utc>,
    ) -> Result<ToggleOutcome, Self::Error>;
}

/// Source of habit metadata.
pub trait HabitRegistry {
    type Error: StdError + Send + Sync + 'static;

    fn get(&self, habit_id: &HabitId) -> Result<Option<Habit>, Self::Error>;
}

/// Loads a habit's log set, skipping malformed rows.
pub fn load_log_days<S: LogStore>(store: &S, habit_id: &HabitId) -> Result<LogDays, StatsError> {
    let records = store.list_logs(habit_id).map_err(StatsError::unavailable)?;
    Ok(LogDays::from_keys(
        records.iter().map(|record| record.date_key.as_str()),
    ))
}

/// Fetches a habit and its logs and computes its stats.
///
/// Nothing is cached: on error the caller keeps whatever it showed before.
pub fn load_stats<S, Tz>(
    store: &S,
    habit_id: &HabitId,
    today: NaiveDate,
    tz: &Tz,
    window: RollingWindow,
) -> Result<(Habit, HabitStats), StatsError>
where
    S: LogStore + HabitRegistry,
    Tz: TimeZone,
{
    let habit = HabitRegistry::get(store, habit_id)
        .map_err(StatsError::unavailable)?
        .ok_or_else(|| StatsError::HabitNotFound(habit_id.clone()))?;
    let logs = load_log_days(store, habit_id)?;
    tracing::debug!(habit_id = %habit_id, log_days = logs.len(), "loaded habit logs");

    let ctx = HabitContext::for_habit(&habit, tz, today);
    let stats = compute_stats(&ctx, &logs, window);
    Ok((habit, stats))
}
