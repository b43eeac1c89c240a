//! Add command for creating habits.

use std::io::Write;

use anyhow::Result;
use chrono::{NaiveDate, Utc};
use clap::Args;

use ht_core::{Habit, HabitKind};
use ht_db::Database;

use super::util::{local_midnight_to_utc, parse_day};

#[derive(Debug, Args)]
pub struct AddArgs {
    /// Habit name.
    pub name: String,

    /// Track a habit to break: logged days count as lapses.
    #[arg(long)]
    pub negative: bool,

    /// Backdate the habit to this day (YYYY-MM-DD or relative).
    #[arg(long, value_name = "DAY")]
    pub created: Option<String>,
}

pub fn run<W: Write>(
    writer: &mut W,
    db: &mut Database,
    args: &AddArgs,
    today: NaiveDate,
) -> Result<Habit> {
    let kind = if args.negative {
        HabitKind::Negative
    } else {
        HabitKind::Positive
    };
    let created_at = match &args.created {
        Some(day) => local_midnight_to_utc(parse_day(day, today)?),
        None => Utc::now(),
    };

    let habit = db.create_habit(&args.name, kind, created_at)?;
    tracing::info!(habit_id = %habit.id, "added habit");

    writeln!(writer, "Added {} habit: {}", habit.kind, habit.name)?;
    writeln!(writer, "ID: {}", habit.id)?;
    Ok(habit)
}
