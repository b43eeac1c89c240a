//! Toggle command for marking and clearing days.

use std::io::Write;

use anyhow::{Result, bail};
use chrono::{Local, NaiveDate, Utc};
use clap::Args;

use ht_core::{
    DateKey, DayStatus, HabitContext, HabitKind, ToggleOutcome, classify_day, current_streak,
    load_log_days,
};
use ht_db::Database;

use super::util::{days_label, parse_day, resolve_habit};

#[derive(Debug, Args)]
pub struct ToggleArgs {
    /// Habit ID or name.
    pub habit: String,

    /// Day to toggle (YYYY-MM-DD or relative). Defaults to today.
    #[arg(long, value_name = "DAY")]
    pub date: Option<String>,
}

pub fn run<W: Write>(
    writer: &mut W,
    db: &mut Database,
    args: &ToggleArgs,
    today: NaiveDate,
) -> Result<ToggleOutcome> {
    let habit = resolve_habit(db, &args.habit)?;
    let day = match &args.date {
        Some(day) => parse_day(day, today)?,
        None => today,
    };
    let date_key = DateKey::from_date(day);

    let ctx = HabitContext::for_habit(&habit, &Local, today);
    match classify_day(&ctx, day, false) {
        DayStatus::BeforeCreation => bail!("{} did not exist yet on {date_key}", habit.name),
        DayStatus::Future => bail!("cannot mark {date_key}: it is in the future"),
        _ => {}
    }

    let outcome = db.toggle_log(&habit.id, date_key, Utc::now())?;
    let verb = match (habit.kind, &outcome) {
        (HabitKind::Positive, ToggleOutcome::Added(_)) => "Marked done",
        (HabitKind::Positive, ToggleOutcome::Removed) => "Cleared",
        (HabitKind::Negative, ToggleOutcome::Added(_)) => "Logged lapse",
        (HabitKind::Negative, ToggleOutcome::Removed) => "Cleared lapse",
    };
    writeln!(writer, "{verb}: {} on {date_key}", habit.name)?;

    let logs = load_log_days(&*db, &habit.id)?;
    writeln!(
        writer,
        "Current streak: {}",
        days_label(current_streak(&ctx, &logs))
    )?;
    Ok(outcome)
}
