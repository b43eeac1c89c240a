//! Command-line argument definitions.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use ht_core::DateKey;

use crate::commands::add::AddArgs;
use crate::commands::calendar::CalendarArgs;
use crate::commands::stats::StatsArgs;
use crate::commands::toggle::ToggleArgs;

/// Daily habit tracker.
///
/// Tracks habits to build and habits to break, and reports streaks,
/// consistency and trends from the days you mark.
#[derive(Debug, Parser)]
#[command(name = "ht", version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to config file.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Treat this day (YYYY-MM-DD) as today instead of the local date.
    #[arg(long, global = true, value_name = "DAY")]
    pub today: Option<DateKey>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Start tracking a new habit.
    Add(AddArgs),

    /// List habits.
    List {
        /// Include archived habits.
        #[arg(long)]
        all: bool,

        /// Output as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Mark or unmark a day for a habit.
    Toggle(ToggleArgs),

    /// Hide a habit from active views, keeping its history.
    Archive {
        /// Habit ID or name.
        habit: String,
    },

    /// Bring an archived habit back.
    Unarchive {
        /// Habit ID or name.
        habit: String,
    },

    /// Delete a habit and all of its logs.
    Delete {
        /// Habit ID or name.
        habit: String,
    },

    /// Show streaks, consistency and trend for one habit.
    Stats(StatsArgs),

    /// Show a month calendar for one habit.
    Calendar(CalendarArgs),

    /// Show today's state of every active habit.
    Status {
        /// Output as JSON.
        #[arg(long)]
        json: bool,
    },
}
