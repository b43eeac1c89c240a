//! Shared utilities for CLI commands.

use std::sync::LazyLock;

use anyhow::{Context, bail};
use chrono::{DateTime, Days, Local, LocalResult, NaiveDate, NaiveTime, TimeZone, Utc};
use regex::Regex;

use ht_core::{DateKey, Habit, HabitId};
use ht_db::Database;

/// Pre-compiled regex for relative day parsing.
static RELATIVE_DAY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d+)\s+(day|week)s?\s+ago$").unwrap());

/// Conservative bound for relative day parsing (~100 years).
const MAX_RELATIVE_DAYS: u64 = 100 * 366;

/// Parse a day as a date key or a relative day.
///
/// Supports:
/// - Date key: "2026-01-15"
/// - Named: "today", "yesterday"
/// - Relative: "3 days ago", "1 week ago"
pub fn parse_day(s: &str, today: NaiveDate) -> anyhow::Result<NaiveDate> {
    let s = s.trim();
    match s {
        "today" => return Ok(today),
        "yesterday" => return today.pred_opt().context("date out of range"),
        _ => {}
    }

    if let Ok(key) = s.parse::<DateKey>() {
        return Ok(key.date());
    }

    let Some(caps) = RELATIVE_DAY_RE.captures(s) else {
        bail!("Invalid day: {s}. Use YYYY-MM-DD, 'today', 'yesterday' or relative (e.g., '3 days ago')");
    };

    let n: u64 = caps[1]
        .parse()
        .context("failed to parse number in relative day")?;

    let days_per_unit = match &caps[2] {
        "day" => 1,
        "week" => 7,
        unit => bail!("Unknown day unit: {unit}"),
    };

    if n > MAX_RELATIVE_DAYS / days_per_unit {
        bail!("Relative day value too large: {n} {}", &caps[2]);
    }

    today
        .checked_sub_days(Days::new(n * days_per_unit))
        .context("date out of range")
}

/// Converts a local date at midnight to UTC.
/// Handles DST ambiguity by picking the earlier time.
pub fn local_midnight_to_utc(local_date: NaiveDate) -> DateTime<Utc> {
    let midnight = local_date.and_time(NaiveTime::MIN);
    match Local.from_local_datetime(&midnight) {
        LocalResult::Single(dt) | LocalResult::Ambiguous(dt, _) => dt.with_timezone(&Utc),
        LocalResult::None => {
            // DST spring-forward gap at midnight; the naive time is still the right day.
            midnight.and_utc()
        }
    }
}

/// Finds a habit by exact ID or by case-insensitive name.
pub fn resolve_habit(db: &Database, ident: &str) -> anyhow::Result<Habit> {
    let ident = ident.trim();
    if let Ok(id) = HabitId::new(ident) {
        if let Some(habit) = db.get_habit(&id)? {
            return Ok(habit);
        }
    }

    let matches: Vec<Habit> = db
        .list_habits(true)?
        .into_iter()
        .filter(|habit| habit.name.eq_ignore_ascii_case(ident))
        .collect();

    match matches.len() {
        0 => bail!("habit not found: {ident}"),
        1 => Ok(matches.into_iter().next().context("habit disappeared")?),
        _ => {
            let ids: Vec<&str> = matches.iter().map(|habit| habit.id.as_str()).collect();
            bail!(
                "habit name is ambiguous: {ident} (use one of the IDs: {})",
                ids.join(", ")
            )
        }
    }
}

/// Pluralizes a day count for display.
pub fn days_label(n: u32) -> String {
    if n == 1 {
        "1 day".to_string()
    } else {
        format!("{n} days")
    }
}
