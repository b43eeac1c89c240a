//! Storage layer for the habit tracker.
//!
//! Provides persistence for habits and their daily logs using `rusqlite`.
//!
//! # Thread Safety
//!
//! The [`Database`] type wraps a `rusqlite::Connection`, which is `Send` but not `Sync`.
//! This means a `Database` instance can be moved between threads but cannot be shared
//! across threads without external synchronization. Load logs first, then fan the
//! pure stats computation out to other threads.
//!
//! # Schema
//!
//! Two tables: `habits` and `logs`. A log belongs to one habit and is removed
//! with it (`ON DELETE CASCADE`). At most one log exists per habit per day,
//! enforced by `UNIQUE (habit_id, date_key)`.
//!
//! ## Day and Timestamp Format
//!
//! - `logs.date_key` is a local calendar day, `YYYY-MM-DD`.
//! - `habits.created_at` and `logs.completed_at` are RFC 3339 UTC with
//!   millisecond precision (e.g., `2024-01-15T10:30:00.000Z`), so lexicographic
//!   order matches chronological order.

use std::path::Path;

use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{Connection, OptionalExtension, Row, TransactionBehavior, params};
use thiserror::Error;
use uuid::Uuid;

use ht_core::{
    DateKey, Habit, HabitId, HabitKind, HabitRegistry, LogEntry, LogId, LogRecord, LogStore,
    ToggleOutcome, ValidationError,
};

/// Database errors.
#[derive(Debug, Error)]
pub enum DbError {
    /// An error from the underlying database.
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    /// Failed to parse a habit's creation timestamp.
    #[error("invalid timestamp for habit {habit_id}: {timestamp}")]
    TimestampParse {
        habit_id: String,
        timestamp: String,
        #[source]
        source: chrono::ParseError,
    },
    /// A stored habit row does not describe a valid habit.
    #[error("invalid habit data for {habit_id}: {source}")]
    InvalidHabitData {
        habit_id: String,
        #[source]
        source: ValidationError,
    },
    /// Rejected input before touching the database.
    #[error(transparent)]
    Validation(#[from] ValidationError),
    /// No habit with this ID.
    #[error("habit not found: {0}")]
    HabitNotFound(String),
}

/// Database connection wrapper.
///
/// See the [module documentation](self) for thread safety considerations.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Opens a database at the given path, creating it if necessary.
    ///
    /// The database schema is automatically initialized on first open.
    pub fn open(path: &Path) -> Result<Self, DbError> {
        let conn = Connection::open(path)?;
        let db = Self { conn };
        db.init()?;
        Ok(db)
    }

    /// Opens an in-memory database.
    ///
    /// Useful for testing. The database is destroyed when the connection closes.
    pub fn open_in_memory() -> Result<Self, DbError> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn };
        db.init()?;
        Ok(db)
    }

    /// Initializes the database schema.
    ///
    /// This is idempotent - safe to call on an already-initialized database.
    fn init(&self) -> Result<(), DbError> {
        self.conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        self.conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS habits (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                kind TEXT NOT NULL,
                created_at TEXT NOT NULL,
                archived INTEGER NOT NULL DEFAULT 0
            );

            CREATE INDEX IF NOT EXISTS idx_habits_archived ON habits(archived);

            -- One row per habit per day the habit was marked.
            -- date_key: local calendar day, 'YYYY-MM-DD'
            CREATE TABLE IF NOT EXISTS logs (
                id TEXT PRIMARY KEY,
                habit_id TEXT NOT NULL,
                date_key TEXT NOT NULL,
                completed_at TEXT NOT NULL,
                UNIQUE (habit_id, date_key),
                FOREIGN KEY (habit_id) REFERENCES habits(id) ON DELETE CASCADE
            );

            CREATE INDEX IF NOT EXISTS idx_logs_date_key ON logs(date_key);
            ",
        )?;
        Ok(())
    }

    /// Creates a new active habit with a fresh ID.
    pub fn create_habit(
        &mut self,
        name: &str,
        kind: HabitKind,
        created_at: DateTime<Utc>,
    ) -> Result<Habit, DbError> {
        let id = HabitId::new(Uuid::new_v4().to_string())?;
        let habit = Habit::new(id, name, kind, created_at)?;
        self.conn.execute(
            "
            INSERT INTO habits (id, name, kind, created_at, archived)
            VALUES (?, ?, ?, ?, ?)
            ",
            params![
                habit.id.as_str(),
                habit.name,
                habit.kind.as_str(),
                format_timestamp(habit.created_at),
                habit.archived,
            ],
        )?;
        tracing::debug!(habit_id = %habit.id, kind = %habit.kind, "created habit");
        Ok(habit)
    }

    /// Looks up a habit by ID.
    pub fn get_habit(&self, habit_id: &HabitId) -> Result<Option<Habit>, DbError> {
        let row = self
            .conn
            .query_row(
                "SELECT id, name, kind, created_at, archived FROM habits WHERE id = ?",
                [habit_id.as_str()],
                HabitRow::from_row,
            )
            .optional()?;
        row.map(HabitRow::into_habit).transpose()
    }

    /// Lists habits ordered by creation time then ID.
    pub fn list_habits(&self, include_archived: bool) -> Result<Vec<Habit>, DbError> {
        let mut stmt = self.conn.prepare(
            "
            SELECT id, name, kind, created_at, archived
            FROM habits
            WHERE archived = 0 OR ?1
            ORDER BY created_at ASC, id ASC
            ",
        )?;
        let rows = stmt.query_map([include_archived], HabitRow::from_row)?;
        let mut habits = Vec::new();
        for row in rows {
            habits.push(row?.into_habit()?);
        }
        Ok(habits)
    }

    /// Archives or restores a habit. Logs are untouched.
    pub fn set_archived(&mut self, habit_id: &HabitId, archived: bool) -> Result<(), DbError> {
        let updated = self.conn.execute(
            "UPDATE habits SET archived = ? WHERE id = ?",
            params![archived, habit_id.as_str()],
        )?;
        if updated == 0 {
            return Err(DbError::HabitNotFound(habit_id.to_string()));
        }
        Ok(())
    }

    /// Deletes a habit and, through the cascade, all of its logs.
    pub fn delete_habit(&mut self, habit_id: &HabitId) -> Result<(), DbError> {
        let deleted = self
            .conn
            .execute("DELETE FROM habits WHERE id = ?", [habit_id.as_str()])?;
        if deleted == 0 {
            return Err(DbError::HabitNotFound(habit_id.to_string()));
        }
        tracing::debug!(habit_id = %habit_id, "deleted habit");
        Ok(())
    }

    /// Lists a habit's logs ordered by day.
    pub fn list_logs(&self, habit_id: &HabitId) -> Result<Vec<LogRecord>, DbError> {
        let mut stmt = self.conn.prepare(
            "
            SELECT date_key, completed_at
            FROM logs
            WHERE habit_id = ?
            ORDER BY date_key ASC
            ",
        )?;
        let rows = stmt.query_map([habit_id.as_str()], |row| {
            let date_key: String = row.get(0)?;
            let completed_at: String = row.get(1)?;
            Ok((date_key, completed_at))
        })?;
        let mut logs = Vec::new();
        for row in rows {
            let (date_key, completed_at) = row?;
            logs.push(LogRecord {
                completed_at: parse_completed_at(&completed_at, &date_key),
                date_key,
            });
        }
        Ok(logs)
    }

    /// Marks `day` done if it is not, or clears it if it is.
    ///
    /// Runs in an `IMMEDIATE` transaction so two toggles of the same day
    /// cannot both observe "absent" and insert twice.
    pub fn toggle_log(
        &mut self,
        habit_id: &HabitId,
        day: DateKey,
        completed_at: DateTime<Utc>,
    ) -> Result<ToggleOutcome, DbError> {
        let date_key = day.to_string();
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;

        let habit_exists: bool = tx.query_row(
            "SELECT EXISTS(SELECT 1 FROM habits WHERE id = ?)",
            [habit_id.as_str()],
            |row| row.get(0),
        )?;
        if !habit_exists {
            return Err(DbError::HabitNotFound(habit_id.to_string()));
        }

        let removed = tx.execute(
            "DELETE FROM logs WHERE habit_id = ? AND date_key = ?",
            params![habit_id.as_str(), date_key],
        )?;
        let outcome = if removed > 0 {
            ToggleOutcome::Removed
        } else {
            let entry = LogEntry {
                id: LogId::new(Uuid::new_v4().to_string())?,
                habit_id: habit_id.clone(),
                date_key: day,
                completed_at,
            };
            tx.execute(
                "
                INSERT INTO logs (id, habit_id, date_key, completed_at)
                VALUES (?, ?, ?, ?)
                ",
                params![
                    entry.id.as_str(),
                    habit_id.as_str(),
                    date_key,
                    format_timestamp(completed_at),
                ],
            )?;
            ToggleOutcome::Added(entry)
        };
        tx.commit()?;

        tracing::debug!(
            habit_id = %habit_id,
            date_key = %date_key,
            added = matches!(outcome, ToggleOutcome::Added(_)),
            "toggled log"
        );
        Ok(outcome)
    }
}

impl LogStore for Database {
    type Error = DbError;

    fn list_logs(&self, habit_id: &HabitId) -> Result<Vec<LogRecord>, DbError> {
        Self::list_logs(self, habit_id)
    }

    fn toggle(
        &mut self,
        habit_id: &HabitId,
        day: DateKey,
        completed_at: DateTime<Utc>,
    ) -> Result<ToggleOutcome, DbError> {
        self.toggle_log(habit_id, day, completed_at)
    }
}

impl HabitRegistry for Database {
    type Error = DbError;

    fn get(&self, habit_id: &HabitId) -> Result<Option<Habit>, DbError> {
        self.get_habit(habit_id)
    }
}

#[derive(Debug)]
struct HabitRow {
    id: String,
    name: String,
    kind: String,
    created_at: String,
    archived: bool,
}

impl HabitRow {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            name: row.get(1)?,
            kind: row.get(2)?,
            created_at: row.get(3)?,
            archived: row.get(4)?,
        })
    }

    fn into_habit(self) -> Result<Habit, DbError> {
        let invalid = |source| DbError::InvalidHabitData {
            habit_id: self.id.clone(),
            source,
        };
        let kind = self.kind.parse::<HabitKind>().map_err(invalid)?;
        let created_at = parse_timestamp(&self.created_at, &self.id)?;
        let id = HabitId::new(self.id.clone()).map_err(invalid)?;
        Ok(Habit {
            id,
            name: self.name,
            kind,
            created_at,
            archived: self.archived,
        })
    }
}

fn parse_timestamp(timestamp: &str, habit_id: &str) -> Result<DateTime<Utc>, DbError> {
    DateTime::parse_from_rfc3339(timestamp)
        .map(|parsed| parsed.with_timezone(&Utc))
        .map_err(|source| DbError::TimestampParse {
            habit_id: habit_id.to_string(),
            timestamp: timestamp.to_string(),
            source,
        })
}

/// `completed_at` is informational, so a bad value only loses that field.
fn parse_completed_at(timestamp: &str, date_key: &str) -> Option<DateTime<Utc>> {
    match DateTime::parse_from_rfc3339(timestamp) {
        Ok(parsed) => Some(parsed.with_timezone(&Utc)),
        Err(e) => {
            tracing::warn!(date_key, timestamp, error = %e, "ignoring invalid completed_at");
            None
        }
    }
}

fn format_timestamp(timestamp: DateTime<Utc>) -> String {
    timestamp.to_rfc3339_opts(SecondsFormat::Millis, true)
}
