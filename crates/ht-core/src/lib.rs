//! Core domain logic for the habit tracker.
//!
//! This crate contains the fundamental types and logic for:
//! - Habits, log entries and `YYYY-MM-DD` day keys
//! - The streak and consistency engine
//! - The store contracts the engine is fed through

pub mod date_key;
pub mod habit;
pub mod store;
pub mod streak;
pub mod types;

pub use date_key::{DateKey, LogDays};
pub use habit::{Habit, LogEntry};
pub use store::{
    HabitRegistry, LogRecord, LogStore, StatsError, ToggleOutcome, load_log_days, load_stats,
};
pub use streak::{
    CalendarDay, DayStatus, HabitContext, HabitStats, MonthCalendar, RollingAveragePoint,
    Sparkline, SparklineDay, classify_day, compute_stats, consistency_score, current_streak,
    longest_streak, month_calendar, rolling_average_series, sparkline, total_completions,
};
pub use types::{HabitId, HabitKind, LogId, RollingWindow, ValidationError};
