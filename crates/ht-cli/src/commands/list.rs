//! List command for showing tracked habits.

use anyhow::Result;
use chrono::Local;
use serde::Serialize;

use ht_core::{DateKey, Habit, HabitKind};
use ht_db::Database;

/// Habit data for display.
#[derive(Debug, Clone, Serialize)]
pub struct HabitEntry {
    pub id: String,
    pub name: String,
    pub kind: HabitKind,
    pub created_on: DateKey,
    pub archived: bool,
}

impl HabitEntry {
    pub(crate) fn from_habit(habit: Habit) -> Self {
        Self {
            created_on: DateKey::from_date(habit.creation_day_in(&Local)),
            id: habit.id.to_string(),
            name: habit.name,
            kind: habit.kind,
            archived: habit.archived,
        }
    }
}

pub fn get_habits_for_display(db: &Database, include_archived: bool) -> Result<Vec<HabitEntry>> {
    Ok(db
        .list_habits(include_archived)?
        .into_iter()
        .map(HabitEntry::from_habit)
        .collect())
}

/// Format habits for human-readable output.
pub fn format_habits(entries: &[HabitEntry]) -> String {
    if entries.is_empty() {
        return "No habits yet.\n\nHint: Run 'ht add <name>' to start tracking one.\n".to_string();
    }

    let mut output = String::new();
    for entry in entries {
        let id_short: String = entry.id.chars().take(8).collect();
        output.push_str(&format!(
            "{}  {} [{}] since {}{}\n",
            id_short,
            entry.name,
            entry.kind,
            entry.created_on,
            if entry.archived { " (archived)" } else { "" }
        ));
    }
    output
}

/// Runs the list command.
pub fn run(db: &Database, include_archived: bool, json: bool) -> Result<()> {
    let entries = get_habits_for_display(db, include_archived)?;
    if json {
        println!("{}", serde_json::to_string_pretty(&entries)?);
    } else {
        print!("{}", format_habits(&entries));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    use insta::assert_snapshot;

    fn entry(id: &str, name: &str, kind: HabitKind, created_on: &str, archived: bool) -> HabitEntry {
        HabitEntry {
            id: id.to_string(),
            name: name.to_string(),
            kind,
            created_on: created_on.parse().unwrap(),
            archived,
        }
    }

    #[test]
    fn format_empty_list() {
        assert_snapshot!(format_habits(&[]), @r"
        No habits yet.

        Hint: Run 'ht add <name>' to start tracking one.
        ");
    }

    #[test]
    fn format_mixed_list() {
        let entries = vec![
            entry("0f3c9a1e-aaaa", "Read", HabitKind::Positive, "2024-01-01", false),
            entry("7b21d4c0-bbbb", "Smoking", HabitKind::Negative, "2024-01-05", true),
        ];
        assert_snapshot!(format_habits(&entries), @r"
        0f3c9a1e  Read [positive] since 2024-01-01
        7b21d4c0  Smoking [negative] since 2024-01-05 (archived)
        ");
    }

    #[test]
    fn archived_habits_hidden_by_default() {
        let mut db = Database::open_in_memory().unwrap();
        let read = db
            .create_habit("Read", HabitKind::Positive, chrono::Utc::now())
            .unwrap();
        let smoking = db
            .create_habit("Smoking", HabitKind::Negative, chrono::Utc::now())
            .unwrap();
        db.set_archived(&smoking.id, true).unwrap();

        let active = get_habits_for_display(&db, false).unwrap();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].id, read.id.as_str());

        let all = get_habits_for_display(&db, true).unwrap();
        assert_eq!(all.len(), 2);
        assert!(all.iter().any(|entry| entry.archived));
    }

    #[test]
    fn json_entries_use_date_keys() {
        let entries = vec![entry("id-1", "Read", HabitKind::Positive, "2024-01-01", false)];
        let value = serde_json::to_value(&entries).unwrap();
        assert_eq!(value[0]["kind"], "positive");
        assert_eq!(value[0]["created_on"], "2024-01-01");
        assert_eq!(value[0]["archived"], false);
    }
}
