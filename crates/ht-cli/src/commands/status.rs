//! Status command for today's overview of every active habit.

use anyhow::Result;
use chrono::{Local, NaiveDate};
use rayon::prelude::*;
use serde::Serialize;

use ht_core::{
    DateKey, Habit, HabitContext, HabitKind, LogDays, Sparkline, consistency_score,
    current_streak, load_log_days, sparkline,
};
use ht_db::Database;

use super::stats::sparkline_glyphs;
use super::util::days_label;

const NAME_WIDTH: usize = 20;

/// One habit card.
#[derive(Debug, Clone, Serialize)]
pub struct StatusEntry {
    pub id: String,
    pub name: String,
    pub kind: HabitKind,
    pub completed_today: bool,
    pub current_streak: u32,
    pub consistency_score: u8,
    pub sparkline: Sparkline,
}

fn status_entry(habit: Habit, logs: &LogDays, today: NaiveDate) -> StatusEntry {
    let ctx = HabitContext::for_habit(&habit, &Local, today);
    StatusEntry {
        completed_today: logs.contains(today),
        current_streak: current_streak(&ctx, logs),
        consistency_score: consistency_score(&ctx, logs),
        sparkline: sparkline(&ctx, logs),
        id: habit.id.to_string(),
        name: habit.name,
        kind: habit.kind,
    }
}

/// Builds a card for each active habit.
///
/// Logs are read sequentially from the single connection; the statistics
/// are then computed in parallel.
pub fn get_status_entries(db: &Database, today: NaiveDate) -> Result<Vec<StatusEntry>> {
    let mut loaded = Vec::new();
    for habit in db.list_habits(false)? {
        let logs = load_log_days(db, &habit.id)?;
        loaded.push((habit, logs));
    }
    tracing::debug!(habits = loaded.len(), "loaded active habits");

    Ok(loaded
        .into_par_iter()
        .map(|(habit, logs)| status_entry(habit, &logs, today))
        .collect())
}

fn today_mark(entry: &StatusEntry) -> char {
    match (entry.kind, entry.completed_today) {
        (HabitKind::Positive, true) | (HabitKind::Negative, false) => '✓',
        (HabitKind::Positive, false) => '·',
        (HabitKind::Negative, true) => '✗',
    }
}

/// Format the overview for human-readable output.
pub fn format_status(entries: &[StatusEntry], today: NaiveDate) -> String {
    if entries.is_empty() {
        return "No active habits.\n\nHint: Run 'ht add <name>' to start tracking one.\n"
            .to_string();
    }

    let mut output = format!("Habits for {}\n\n", DateKey::from_date(today));
    for entry in entries {
        // Truncate by characters, not bytes
        let name = if entry.name.chars().count() > NAME_WIDTH {
            format!(
                "{}...",
                entry.name.chars().take(NAME_WIDTH - 3).collect::<String>()
            )
        } else {
            entry.name.clone()
        };
        output.push_str(&format!(
            "{} {name:<NAME_WIDTH$} {:>8}  {}  {:>3}%\n",
            today_mark(entry),
            days_label(entry.current_streak),
            sparkline_glyphs(&entry.sparkline, entry.kind),
            entry.consistency_score
        ));
    }
    output
}

#[derive(Debug, Serialize)]
struct JsonStatus<'a> {
    today: DateKey,
    habits: &'a [StatusEntry],
}

/// Format the overview as JSON.
pub fn format_status_json(entries: &[StatusEntry], today: NaiveDate) -> Result<String> {
    let json = JsonStatus {
        today: DateKey::from_date(today),
        habits: entries,
    };
    Ok(serde_json::to_string_pretty(&json)?)
}

/// Runs the status command.
pub fn run(db: &Database, today: NaiveDate, json: bool) -> Result<()> {
    let entries = get_status_entries(db, today)?;
    if json {
        println!("{}", format_status_json(&entries, today)?);
    } else {
        print!("{}", format_status(&entries, today));
    }
    Ok(())
}
