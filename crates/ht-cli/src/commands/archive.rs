//! Archive, unarchive and delete commands.

use std::io::Write;

use anyhow::Result;

use ht_db::Database;

use super::util::resolve_habit;

/// Hides a habit from active views, or brings it back.
pub fn set_archived<W: Write>(
    writer: &mut W,
    db: &mut Database,
    ident: &str,
    archived: bool,
) -> Result<()> {
    let habit = resolve_habit(db, ident)?;
    if habit.archived == archived {
        let state = if archived { "archived" } else { "active" };
        writeln!(writer, "{} is already {state}", habit.name)?;
        return Ok(());
    }

    db.set_archived(&habit.id, archived)?;
    tracing::info!(habit_id = %habit.id, archived, "updated habit archive state");
    let verb = if archived { "Archived" } else { "Restored" };
    writeln!(writer, "{verb} {}", habit.name)?;
    Ok(())
}

/// Deletes a habit together with its whole log history.
pub fn delete<W: Write>(writer: &mut W, db: &mut Database, ident: &str) -> Result<()> {
    let habit = resolve_habit(db, ident)?;
    let log_count = db.list_logs(&habit.id)?.len();
    db.delete_habit(&habit.id)?;
    tracing::info!(habit_id = %habit.id, log_count, "deleted habit");
    writeln!(writer, "Deleted {} and {log_count} logged day(s)", habit.name)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    use chrono::Utc;
    use insta::assert_snapshot;

    use ht_core::{DateKey, HabitKind};

    fn output_of(f: impl FnOnce(&mut Vec<u8>) -> Result<()>) -> String {
        let mut output = Vec::new();
        f(&mut output).unwrap();
        String::from_utf8(output).unwrap()
    }

    #[test]
    fn archive_and_restore() {
        let mut db = Database::open_in_memory().unwrap();
        let habit = db
            .create_habit("Read", HabitKind::Positive, Utc::now())
            .unwrap();

        let out = output_of(|w| set_archived(w, &mut db, "Read", true));
        assert_snapshot!(out, @"Archived Read");
        assert!(db.get_habit(&habit.id).unwrap().unwrap().archived);

        let out = output_of(|w| set_archived(w, &mut db, "Read", true));
        assert_snapshot!(out, @"Read is already archived");

        let out = output_of(|w| set_archived(w, &mut db, habit.id.as_str(), false));
        assert_snapshot!(out, @"Restored Read");
        assert!(!db.get_habit(&habit.id).unwrap().unwrap().archived);
    }

    #[test]
    fn delete_removes_habit_and_logs() {
        let mut db = Database::open_in_memory().unwrap();
        let habit = db
            .create_habit("Smoking", HabitKind::Negative, Utc::now())
            .unwrap();
        for key in ["2024-01-01", "2024-01-02"] {
            db.toggle_log(&habit.id, key.parse::<DateKey>().unwrap(), Utc::now())
                .unwrap();
        }

        let out = output_of(|w| delete(w, &mut db, "smoking"));
        assert_snapshot!(out, @"Deleted Smoking and 2 logged day(s)");
        assert!(db.get_habit(&habit.id).unwrap().is_none());
        assert!(db.list_logs(&habit.id).unwrap().is_empty());
    }

    #[test]
    fn unknown_habit_is_an_error() {
        let mut db = Database::open_in_memory().unwrap();
        let mut output = Vec::new();
        let err = delete(&mut output, &mut db, "nope").unwrap_err();
        assert!(err.to_string().contains("habit not found"));
    }
}
