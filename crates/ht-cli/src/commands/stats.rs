//! Stats command for the detail view of one habit.
//!
//! Shows today's state, current and longest streak, the consistency score,
//! the seven-day sparkline and the rolling-average trend.

use anyhow::Result;
use chrono::{Local, NaiveDate};
use clap::Args;
use serde::Serialize;

use ht_core::{Habit, HabitKind, HabitStats, RollingWindow, Sparkline, load_stats};
use ht_db::Database;

use super::list::HabitEntry;
use super::util::{days_label, resolve_habit};

#[derive(Debug, Args)]
pub struct StatsArgs {
    /// Habit ID or name.
    pub habit: String,

    /// Trend window in days (30, 90 or 180). Defaults to the configured window.
    #[arg(long, value_name = "DAYS")]
    pub window: Option<u32>,

    /// Output as JSON.
    #[arg(long)]
    pub json: bool,
}

/// Renders a sparkline as one glyph per day, oldest first.
///
/// `●` met the goal, `○` missed it, `·` before the habit existed.
pub fn sparkline_glyphs(sparkline: &Sparkline, kind: HabitKind) -> String {
    sparkline
        .days()
        .iter()
        .map(|day| {
            if day.is_before_creation {
                '·'
            } else if kind.is_success(day.has_log) {
                '●'
            } else {
                '○'
            }
        })
        .collect()
}

fn today_label(stats: &HabitStats) -> &'static str {
    match (stats.kind, stats.is_completed_today) {
        (HabitKind::Positive, true) => "done",
        (HabitKind::Positive, false) => "not done yet",
        (HabitKind::Negative, true) => "lapsed",
        (HabitKind::Negative, false) => "clean",
    }
}

/// Format one habit's stats for human-readable output.
pub fn format_stats(habit: &Habit, stats: &HabitStats, window: RollingWindow) -> String {
    let mut lines = vec![
        format!("{} [{}]", habit.name, habit.kind),
        format!("Today: {}", today_label(stats)),
        format!("Current streak: {}", days_label(stats.current_streak)),
        format!("Longest streak: {}", days_label(stats.longest_streak)),
        format!(
            "Consistency: {}% over the last {}",
            stats.consistency_score,
            days_label(stats.consistency_period_days)
        ),
    ];
    lines.push(match habit.kind {
        HabitKind::Positive => format!("Completions: {}", stats.total_completions),
        HabitKind::Negative => format!("Lapses: {}", stats.total_completions),
    });
    lines.push(format!(
        "Last 7 days: {} (streak: {})",
        sparkline_glyphs(&stats.sparkline, habit.kind),
        days_label(stats.sparkline.streak(habit.kind))
    ));
    if let (Some(first), Some(last)) = (stats.rolling_average.first(), stats.rolling_average.last())
    {
        lines.push(format!(
            "7-day average: {:.0}% ({:.0}% on {}, {window} window)",
            last.average * 100.0,
            first.average * 100.0,
            first.date
        ));
    }

    let mut output = lines.join("\n");
    output.push('\n');
    output
}

#[derive(Debug, Serialize)]
struct JsonStats<'a> {
    habit: HabitEntry,
    window: RollingWindow,
    stats: &'a HabitStats,
}

/// Format one habit's stats as JSON.
pub fn format_stats_json(habit: Habit, stats: &HabitStats, window: RollingWindow) -> Result<String> {
    let json = JsonStats {
        habit: HabitEntry::from_habit(habit),
        window,
        stats,
    };
    Ok(serde_json::to_string_pretty(&json)?)
}

/// Runs the stats command.
pub fn run(
    db: &Database,
    args: &StatsArgs,
    default_window: RollingWindow,
    today: NaiveDate,
) -> Result<()> {
    let window = match args.window {
        Some(days) => RollingWindow::try_from(days)?,
        None => default_window,
    };
    let habit = resolve_habit(db, &args.habit)?;
    let (habit, stats) = load_stats(db, &habit.id, today, &Local, window)?;

    if args.json {
        println!("{}", format_stats_json(habit, &stats, window)?);
    } else {
        print!("{}", format_stats(&habit, &stats, window));
    }
    Ok(())
}
