//! Calendar command for a month grid of one habit.

use std::sync::LazyLock;

use anyhow::{Context, Result, bail};
use chrono::{Datelike, Local, NaiveDate};
use clap::Args;
use regex::Regex;

use ht_core::{
    DayStatus, Habit, HabitContext, HabitKind, MonthCalendar, load_log_days, month_calendar,
};
use ht_db::Database;

use super::util::resolve_habit;

static MONTH_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^(\d{4})-(\d{2})$").unwrap());

#[derive(Debug, Args)]
pub struct CalendarArgs {
    /// Habit ID or name.
    pub habit: String,

    /// Month to show (YYYY-MM). Defaults to the current month.
    #[arg(long, value_name = "YYYY-MM")]
    pub month: Option<String>,
}

/// Parses a `YYYY-MM` month. Range checks happen when the calendar is built.
pub fn parse_month(s: &str) -> Result<(i32, u32)> {
    let Some(caps) = MONTH_RE.captures(s.trim()) else {
        bail!("Invalid month: {s}. Use YYYY-MM");
    };
    let year = caps[1].parse().context("failed to parse year")?;
    let month = caps[2].parse().context("failed to parse month")?;
    Ok((year, month))
}

const fn glyph(status: DayStatus) -> char {
    match status {
        DayStatus::BeforeCreation => '·',
        DayStatus::Future => '-',
        DayStatus::PositiveSuccess | DayStatus::NegativeSuccess => '●',
        DayStatus::PositiveMiss | DayStatus::NegativeFailure => '○',
    }
}

/// Format a month as a Monday-first grid.
pub fn format_calendar(habit: &Habit, calendar: &MonthCalendar) -> String {
    let title = NaiveDate::from_ymd_opt(calendar.year, calendar.month, 1).map_or_else(
        || format!("{}-{:02}", calendar.year, calendar.month),
        |first| first.format("%B %Y").to_string(),
    );

    let mut cells: Vec<String> = (0..calendar.leading_blank_days())
        .map(|_| "  ".to_string())
        .collect();
    cells.extend(
        calendar
            .days
            .iter()
            .map(|day| format!(" {}", glyph(day.status))),
    );

    let mut lines = vec![
        format!("{} [{}]: {title}", habit.name, habit.kind),
        "Mo Tu We Th Fr Sa Su".to_string(),
    ];
    lines.extend(
        cells
            .chunks(7)
            .map(|week| week.join(" ").trim_end().to_string()),
    );
    lines.push(String::new());
    lines.push(match habit.kind {
        HabitKind::Positive => format!(
            "Done: {}  Missed: {}",
            calendar.successes, calendar.failures
        ),
        HabitKind::Negative => format!(
            "Clean days: {}  Lapses: {}",
            calendar.successes, calendar.failures
        ),
    });

    let mut output = lines.join("\n");
    output.push('\n');
    output
}

/// Runs the calendar command.
pub fn run(db: &Database, args: &CalendarArgs, today: NaiveDate) -> Result<()> {
    let (year, month) = match &args.month {
        Some(month) => parse_month(month)?,
        None => (today.year(), today.month()),
    };
    let habit = resolve_habit(db, &args.habit)?;
    let logs = load_log_days(db, &habit.id)?;
    let ctx = HabitContext::for_habit(&habit, &Local, today);
    let calendar = month_calendar(&ctx, &logs, year, month)?;
    print!("{}", format_calendar(&habit, &calendar));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    use chrono::Utc;
    use insta::assert_snapshot;

    use ht_core::{DateKey, HabitId, LogDays};

    fn day(s: &str) -> NaiveDate {
        s.parse::<DateKey>().unwrap().date()
    }

    fn habit(name: &str, kind: HabitKind) -> Habit {
        Habit::new(HabitId::new("habit-1").unwrap(), name, kind, Utc::now()).unwrap()
    }

    #[test]
    fn parse_month_accepts_year_month() {
        assert_eq!(parse_month("2024-02").unwrap(), (2024, 2));
        assert!(parse_month("2024-2").is_err());
        assert!(parse_month("Feb 2024").is_err());
    }

    #[test]
    fn format_positive_month_starting_monday() {
        let ctx = HabitContext::new(HabitKind::Positive, day("2024-01-03"), day("2024-01-10"));
        let logs = LogDays::from_keys(["2024-01-03", "2024-01-04", "2024-01-08"]);
        let calendar = month_calendar(&ctx, &logs, 2024, 1).unwrap();

        let output = format_calendar(&habit("Read", HabitKind::Positive), &calendar);
        assert_snapshot!(output, @r"
        Read [positive]: January 2024
        Mo Tu We Th Fr Sa Su
         ·  ·  ●  ●  ○  ○  ○
         ●  ○  ○  -  -  -  -
         -  -  -  -  -  -  -
         -  -  -  -  -  -  -
         -  -  -

        Done: 3  Missed: 5
        ");
    }

    #[test]
    fn format_negative_month_with_leading_blanks() {
        let ctx = HabitContext::new(HabitKind::Negative, day("2024-01-15"), day("2024-02-05"));
        let logs = LogDays::from_keys(["2024-02-02"]);
        let calendar = month_calendar(&ctx, &logs, 2024, 2).unwrap();
        assert_eq!(calendar.leading_blank_days(), 3);

        let output = format_calendar(&habit("Smoking", HabitKind::Negative), &calendar);
        assert_snapshot!(output, @r"
        Smoking [negative]: February 2024
        Mo Tu We Th Fr Sa Su
                  ●  ○  ●  ●
         ●  -  -  -  -  -  -
         -  -  -  -  -  -  -
         -  -  -  -  -  -  -
         -  -  -  -

        Clean days: 4  Lapses: 1
        ");
    }

    #[test]
    fn run_rejects_out_of_range_month() {
        let mut db = Database::open_in_memory().unwrap();
        db.create_habit("Read", HabitKind::Positive, Utc::now())
            .unwrap();
        let args = CalendarArgs {
            habit: "Read".to_string(),
            month: Some("2024-13".to_string()),
        };
        let err = run(&db, &args, Local::now().date_naive()).unwrap_err();
        assert!(err.to_string().contains("invalid month"));
    }
}
