//! Streak and consistency engine.
//!
//! Turns the sparse set of days a habit was logged into the numbers every
//! view shows: current and longest streak, consistency score, total
//! completions, the 7-day sparkline, the rolling-average trend and the
//! monthly calendar.
//!
//! # Semantics
//!
//! - Positive habits succeed on days **with** a log; negative habits succeed on
//!   days **without** one.
//! - A day before the habit's creation day is never a success or a failure.
//!   It is reported as "before creation".
//! - "Today" is always supplied by the caller. Nothing here reads the clock.
//! - A positive habit that is not logged yet today is pending, not broken:
//!   the current streak walk starts at yesterday instead. Negative habits
//!   always count today.
//!
//! Every function is pure and cheap (linear in the number of days scanned),
//! so callers recompute on each change instead of caching.

use chrono::{Datelike, NaiveDate, TimeZone};
use serde::Serialize;

use crate::date_key::{DateKey, LogDays, days_before};
use crate::habit::Habit;
use crate::types::{HabitKind, RollingWindow, ValidationError};

/// How far back the current streak walk may go.
pub const MAX_STREAK_LOOKBACK_DAYS: u64 = 365;

/// Longest scoring window for the consistency score.
pub const CONSISTENCY_PERIOD_DAYS: u32 = 30;

/// Number of days on a habit card sparkline.
pub const SPARKLINE_DAYS: u64 = 7;

/// Trailing span averaged by each rolling-average point.
const ROLLING_AVERAGE_SPAN: u64 = 7;

/// Everything the engine needs to know about a habit besides its logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HabitContext {
    pub kind: HabitKind,
    /// First eligible day. `None` means the creation day is unknown and every
    /// day counts, with scans falling back to `today - 365`.
    pub creation_day: Option<NaiveDate>,
    pub today: NaiveDate,
}

impl HabitContext {
    pub const fn new(kind: HabitKind, creation_day: NaiveDate, today: NaiveDate) -> Self {
        Self {
            kind,
            creation_day: Some(creation_day),
            today,
        }
    }

    /// Context for a habit whose creation day is not known.
    pub const fn without_creation_day(kind: HabitKind, today: NaiveDate) -> Self {
        Self {
            kind,
            creation_day: None,
            today,
        }
    }

    /// Context for a stored habit, reading its creation day on `tz`'s calendar.
    pub fn for_habit<Tz: TimeZone>(habit: &Habit, tz: &Tz, today: NaiveDate) -> Self {
        Self::new(habit.kind, habit.creation_day_in(tz), today)
    }

    /// Whether `day` falls before the habit existed.
    pub fn is_before_creation(&self, day: NaiveDate) -> bool {
        self.creation_day.is_some_and(|created| day < created)
    }

    /// Whether `day` is on or after the creation day and not in the future.
    pub fn is_eligible(&self, day: NaiveDate) -> bool {
        !self.is_before_creation(day) && day <= self.today
    }

    /// `today` earlier than the creation day. Reachable through clock skew;
    /// every statistic is zero in that case.
    fn today_predates_creation(&self) -> bool {
        self.is_before_creation(self.today)
    }

    /// First day of a forward scan.
    fn scan_start(&self) -> NaiveDate {
        self.creation_day
            .unwrap_or_else(|| days_before(self.today, MAX_STREAK_LOOKBACK_DAYS))
    }
}

/// Counts consecutive successful days ending at `today`, never looking at a
/// day before `floor`.
///
/// Shared by the detail view streak and the sparkline card streak.
fn walk_back<F>(kind: HabitKind, floor: NaiveDate, today: NaiveDate, has_log: F) -> u32
where
    F: Fn(NaiveDate) -> bool,
{
    let mut day = today;
    if kind == HabitKind::Positive && !has_log(today) {
        // Not done yet today is still pending.
        match today.pred_opt() {
            Some(yesterday) => day = yesterday,
            None => return 0,
        }
    }

    let mut streak = 0;
    while day >= floor && kind.is_success(has_log(day)) {
        streak += 1;
        match day.pred_opt() {
            Some(prev) => day = prev,
            None => break,
        }
    }
    streak
}

/// Current run of successful days ending today (or yesterday, for a positive
/// habit not yet logged today).
pub fn current_streak(ctx: &HabitContext, logs: &LogDays) -> u32 {
    if ctx.today_predates_creation() {
        return 0;
    }
    let lookback_floor = days_before(ctx.today, MAX_STREAK_LOOKBACK_DAYS);
    let floor = ctx
        .creation_day
        .map_or(lookback_floor, |created| created.max(lookback_floor));
    walk_back(ctx.kind, floor, ctx.today, |day| logs.contains(day))
}

/// Longest run of successful days between the creation day and today.
pub fn longest_streak(ctx: &HabitContext, logs: &LogDays) -> u32 {
    if ctx.today_predates_creation() {
        return 0;
    }
    let mut run = 0;
    let mut longest = 0;
    for day in ctx.scan_start().iter_days().take_while(|day| *day <= ctx.today) {
        if ctx.kind.is_success(logs.contains(day)) {
            run += 1;
            longest = longest.max(run);
        } else {
            run = 0;
        }
    }
    longest
}

/// Length of the consistency scoring window: up to 30 days, shorter for
/// habits younger than that.
pub fn consistency_period_days(ctx: &HabitContext) -> u32 {
    let Some(created) = ctx.creation_day else {
        return CONSISTENCY_PERIOD_DAYS;
    };
    let age_days = ctx.today.signed_duration_since(created).num_days() + 1;
    let period = age_days.clamp(1, i64::from(CONSISTENCY_PERIOD_DAYS));
    u32::try_from(period).unwrap_or(CONSISTENCY_PERIOD_DAYS)
}

/// Percentage (0-100) of days in the scoring window that met the habit's goal.
///
/// Positive habits score logged days; negative habits score clean days.
pub fn consistency_score(ctx: &HabitContext, logs: &LogDays) -> u8 {
    if ctx.today_predates_creation() {
        return 0;
    }
    let period = consistency_period_days(ctx);
    let window_start = days_before(ctx.today, u64::from(period - 1));
    let logged = u32::try_from(logs.count_between(window_start, ctx.today))
        .unwrap_or(period)
        .min(period);
    let successes = match ctx.kind {
        HabitKind::Positive => logged,
        HabitKind::Negative => period - logged,
    };
    rounded_percent(successes, period)
}

/// `round(100 * part / whole)`, rounding halves up, clamped to 0-100.
fn rounded_percent(part: u32, whole: u32) -> u8 {
    if whole == 0 {
        return 0;
    }
    let part = u64::from(part);
    let whole = u64::from(whole);
    let percent = (200 * part + whole) / (2 * whole);
    u8::try_from(percent.min(100)).unwrap_or(100)
}

/// Number of logged eligible days.
pub fn total_completions(ctx: &HabitContext, logs: &LogDays) -> u32 {
    let count = logs.iter().filter(|day| ctx.is_eligible(*day)).count();
    u32::try_from(count).unwrap_or(u32::MAX)
}

/// One day on a habit card sparkline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SparklineDay {
    pub date: DateKey,
    pub has_log: bool,
    pub is_before_creation: bool,
}

/// The last seven days of a habit, oldest first, ending today.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Sparkline {
    days: Vec<SparklineDay>,
}

impl Sparkline {
    pub fn days(&self) -> &[SparklineDay] {
        &self.days
    }

    /// Short streak shown on the card.
    ///
    /// Same walk as [`current_streak`], limited to the visible days.
    pub fn streak(&self, kind: HabitKind) -> u32 {
        let Some(last) = self.days.last() else {
            return 0;
        };
        let Some(first_eligible) = self.days.iter().find(|day| !day.is_before_creation) else {
            return 0;
        };
        walk_back(
            kind,
            first_eligible.date.date(),
            last.date.date(),
            |date| {
                self.days
                    .iter()
                    .any(|day| day.date.date() == date && day.has_log)
            },
        )
    }
}

/// Annotates the trailing seven days ending today.
pub fn sparkline(ctx: &HabitContext, logs: &LogDays) -> Sparkline {
    let days = (0..SPARKLINE_DAYS)
        .rev()
        .map(|offset| {
            let date = days_before(ctx.today, offset);
            SparklineDay {
                date: DateKey::from_date(date),
                has_log: logs.contains(date),
                is_before_creation: ctx.is_before_creation(date),
            }
        })
        .collect();
    Sparkline { days }
}

/// One point on the rolling-average trend line.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RollingAveragePoint {
    pub date: DateKey,
    /// Fraction of the trailing seven days (inclusive) with a log, in \[0, 1\].
    pub average: f64,
}

/// Trailing 7-day log average for every day in `window`, oldest first.
///
/// Unlike every other statistic this ignores habit kind and creation day:
/// days before the habit existed read as "no log".
pub fn rolling_average_series(
    logs: &LogDays,
    today: NaiveDate,
    window: RollingWindow,
) -> Vec<RollingAveragePoint> {
    let start = days_before(today, u64::from(window.days() - 1));
    start
        .iter_days()
        .take_while(|day| *day <= today)
        .map(|day| {
            let logged = logs.count_between(days_before(day, ROLLING_AVERAGE_SPAN - 1), day);
            let logged = u8::try_from(logged).unwrap_or(u8::MAX);
            RollingAveragePoint {
                date: DateKey::from_date(day),
                average: f64::from(logged) / 7.0,
            }
        })
        .collect()
}

/// How a calendar renders one day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum DayStatus {
    BeforeCreation,
    Future,
    PositiveSuccess,
    PositiveMiss,
    /// Clean day for a negative habit.
    NegativeSuccess,
    /// Lapse for a negative habit.
    NegativeFailure,
}

impl DayStatus {
    /// Whether the day can be toggled.
    pub const fn is_interactive(self) -> bool {
        !matches!(self, Self::BeforeCreation | Self::Future)
    }

    pub const fn is_success(self) -> bool {
        matches!(self, Self::PositiveSuccess | Self::NegativeSuccess)
    }

    pub const fn is_failure(self) -> bool {
        matches!(self, Self::PositiveMiss | Self::NegativeFailure)
    }
}

/// Classifies a single day for calendar display.
pub fn classify_day(ctx: &HabitContext, day: NaiveDate, has_log: bool) -> DayStatus {
    if ctx.is_before_creation(day) {
        return DayStatus::BeforeCreation;
    }
    if day > ctx.today {
        return DayStatus::Future;
    }
    match (ctx.kind, has_log) {
        (HabitKind::Positive, true) => DayStatus::PositiveSuccess,
        (HabitKind::Positive, false) => DayStatus::PositiveMiss,
        (HabitKind::Negative, false) => DayStatus::NegativeSuccess,
        (HabitKind::Negative, true) => DayStatus::NegativeFailure,
    }
}

/// One cell of a month calendar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CalendarDay {
    pub date: DateKey,
    pub has_log: bool,
    pub status: DayStatus,
}

/// A classified month.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonthCalendar {
    pub year: i32,
    pub month: u32,
    pub days: Vec<CalendarDay>,
    pub successes: u32,
    pub failures: u32,
}

impl MonthCalendar {
    /// Days from Monday of the first day of the month, for grid layout.
    pub fn leading_blank_days(&self) -> u32 {
        self.days
            .first()
            .map_or(0, |day| day.date.date().weekday().num_days_from_monday())
    }
}

/// Classifies every day of `year`-`month`.
pub fn month_calendar(
    ctx: &HabitContext,
    logs: &LogDays,
    year: i32,
    month: u32,
) -> Result<MonthCalendar, ValidationError> {
    let invalid = || ValidationError::InvalidMonth { year, month };
    let first_day = NaiveDate::from_ymd_opt(year, month, 1).ok_or_else(invalid)?;
    let first_of_next = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)
    };
    let last_day = first_of_next
        .and_then(|day| day.pred_opt())
        .ok_or_else(invalid)?;

    let days: Vec<CalendarDay> = first_day
        .iter_days()
        .take_while(|day| *day <= last_day)
        .map(|day| {
            let has_log = logs.contains(day);
            CalendarDay {
                date: DateKey::from_date(day),
                has_log,
                status: classify_day(ctx, day, has_log),
            }
        })
        .collect();

    let successes = days.iter().filter(|day| day.status.is_success()).count();
    let failures = days.iter().filter(|day| day.status.is_failure()).count();

    Ok(MonthCalendar {
        year,
        month,
        successes: u32::try_from(successes).unwrap_or(u32::MAX),
        failures: u32::try_from(failures).unwrap_or(u32::MAX),
        days,
    })
}

/// Every derived statistic for one habit.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HabitStats {
    pub kind: HabitKind,
    pub today: DateKey,
    pub is_completed_today: bool,
    pub current_streak: u32,
    pub longest_streak: u32,
    pub consistency_score: u8,
    pub consistency_period_days: u32,
    pub total_completions: u32,
    pub sparkline: Sparkline,
    pub rolling_average: Vec<RollingAveragePoint>,
}

/// Computes all statistics for one habit from its full log set.
pub fn compute_stats(ctx: &HabitContext, logs: &LogDays, window: RollingWindow) -> HabitStats {
    let stats = HabitStats {
        kind: ctx.kind,
        today: DateKey::from_date(ctx.today),
        is_completed_today: logs.contains(ctx.today),
        current_streak: current_streak(ctx, logs),
        longest_streak: longest_streak(ctx, logs),
        consistency_score: consistency_score(ctx, logs),
        consistency_period_days: consistency_period_days(ctx),
        total_completions: total_completions(ctx, logs),
        sparkline: sparkline(ctx, logs),
        rolling_average: rolling_average_series(logs, ctx.today, window),
    };
    tracing::debug!(
        kind = %ctx.kind,
        today = %stats.today,
        current = stats.current_streak,
        longest = stats.longest_streak,
        score = stats.consistency_score,
        "computed habit stats"
    );
    stats
}
