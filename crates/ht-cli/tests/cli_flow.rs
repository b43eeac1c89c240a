//! End-to-end tests driving the `ht` binary against a throwaway database.

use std::path::Path;
use std::process::{Command, Output};

use serde_json::Value;
use tempfile::TempDir;

fn ht_binary() -> String {
    env!("CARGO_BIN_EXE_ht").to_string()
}

/// Runs `ht` with an isolated home and database.
fn ht(temp: &Path, args: &[&str]) -> Output {
    Command::new(ht_binary())
        .env("HOME", temp)
        .env_remove("XDG_CONFIG_HOME")
        .env_remove("XDG_DATA_HOME")
        .env_remove("HT_WINDOW_DAYS")
        .env_remove("RUST_LOG")
        .env("HT_DATABASE_PATH", temp.join("data/ht.db"))
        .args(args)
        .output()
        .expect("failed to run ht")
}

fn ht_ok(temp: &Path, args: &[&str]) -> String {
    let output = ht(temp, args);
    assert!(
        output.status.success(),
        "ht {args:?} should succeed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8(output.stdout).unwrap()
}

fn ht_json(temp: &Path, args: &[&str]) -> Value {
    serde_json::from_str(&ht_ok(temp, args)).unwrap()
}

#[test]
fn test_positive_habit_flow() {
    let temp = TempDir::new().unwrap();
    let today = ["--today", "2024-01-10"];

    ht_ok(temp.path(), &["add", "Read", "--created", "2024-01-01"]);
    assert!(temp.path().join("data/ht.db").exists());

    for date in ["2024-01-08", "2024-01-09", "2024-01-10"] {
        ht_ok(temp.path(), &["toggle", "Read", "--date", date, today[0], today[1]]);
    }

    let value = ht_json(temp.path(), &["stats", "Read", "--json", today[0], today[1]]);
    let stats = &value["stats"];
    assert_eq!(stats["current_streak"], 3);
    assert_eq!(stats["longest_streak"], 3);
    assert_eq!(stats["consistency_period_days"], 10);
    assert_eq!(stats["consistency_score"], 30);
    assert_eq!(stats["total_completions"], 3);
    assert_eq!(stats["is_completed_today"], true);
    assert_eq!(stats["rolling_average"].as_array().unwrap().len(), 30);

    // Clearing today leaves yesterday's streak standing.
    ht_ok(temp.path(), &["toggle", "read", today[0], today[1]]);
    let value = ht_json(temp.path(), &["stats", "Read", "--json", today[0], today[1]]);
    assert_eq!(value["stats"]["current_streak"], 2);
    assert_eq!(value["stats"]["is_completed_today"], false);
}

#[test]
fn test_negative_habit_flow() {
    let temp = TempDir::new().unwrap();

    ht_ok(
        temp.path(),
        &["add", "Smoking", "--negative", "--created", "2024-01-05"],
    );
    ht_ok(
        temp.path(),
        &["toggle", "Smoking", "--date", "2024-01-08", "--today", "2024-01-10"],
    );

    let value = ht_json(
        temp.path(),
        &["stats", "Smoking", "--json", "--today", "2024-01-10"],
    );
    let stats = &value["stats"];
    assert_eq!(stats["kind"], "negative");
    assert_eq!(stats["current_streak"], 2);
    assert_eq!(stats["longest_streak"], 3);
    assert_eq!(stats["consistency_score"], 83);
    assert_eq!(stats["total_completions"], 1);

    let calendar = ht_ok(
        temp.path(),
        &["calendar", "Smoking", "--month", "2024-01", "--today", "2024-01-10"],
    );
    assert!(calendar.contains("Clean days: 5  Lapses: 1"), "{calendar}");
}

#[test]
fn test_toggle_outside_habit_life_fails() {
    let temp = TempDir::new().unwrap();
    ht_ok(temp.path(), &["add", "Read", "--created", "2024-01-05"]);

    let output = ht(
        temp.path(),
        &["toggle", "Read", "--date", "2024-01-04", "--today", "2024-01-10"],
    );
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("did not exist yet"));

    let output = ht(
        temp.path(),
        &["toggle", "Read", "--date", "2024-01-11", "--today", "2024-01-10"],
    );
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("in the future"));
}

#[test]
fn test_archive_hides_habit_from_status() {
    let temp = TempDir::new().unwrap();
    ht_ok(temp.path(), &["add", "Read", "--created", "2024-01-01"]);
    ht_ok(temp.path(), &["add", "Smoking", "--negative", "--created", "2024-01-01"]);
    ht_ok(temp.path(), &["archive", "Smoking"]);

    let status = ht_json(temp.path(), &["status", "--json", "--today", "2024-01-10"]);
    let habits = status["habits"].as_array().unwrap();
    assert_eq!(habits.len(), 1);
    assert_eq!(habits[0]["name"], "Read");

    let all = ht_json(temp.path(), &["list", "--all", "--json"]);
    let all = all.as_array().unwrap();
    assert_eq!(all.len(), 2);
    assert!(
        all.iter()
            .any(|habit| habit["name"] == "Smoking" && habit["archived"] == true)
    );

    ht_ok(temp.path(), &["unarchive", "Smoking"]);
    let active = ht_json(temp.path(), &["list", "--json"]);
    assert_eq!(active.as_array().unwrap().len(), 2);
}

#[test]
fn test_delete_removes_habit() {
    let temp = TempDir::new().unwrap();
    ht_ok(temp.path(), &["add", "Read"]);
    ht_ok(temp.path(), &["toggle", "Read"]);
    ht_ok(temp.path(), &["delete", "Read"]);

    let output = ht(temp.path(), &["stats", "Read"]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("habit not found"));
}

#[test]
fn test_config_file_sets_trend_window() {
    let temp = TempDir::new().unwrap();
    let config_path = temp.path().join("ht.toml");
    std::fs::write(&config_path, "window_days = 90\n").unwrap();
    let config = config_path.to_str().unwrap();

    ht_ok(temp.path(), &["add", "Read", "--created", "2024-01-01"]);
    let value = ht_json(
        temp.path(),
        &["stats", "Read", "--json", "--config", config, "--today", "2024-01-10"],
    );
    assert_eq!(value["window"], 90);
    assert_eq!(value["stats"]["rolling_average"].as_array().unwrap().len(), 90);

    let value = ht_json(
        temp.path(),
        &[
            "stats", "Read", "--json", "--window", "180", "--config", config, "--today",
            "2024-01-10",
        ],
    );
    assert_eq!(value["window"], 180);
}

#[test]
fn test_no_subcommand_prints_help() {
    let temp = TempDir::new().unwrap();
    let output = ht_ok(temp.path(), &[]);
    assert!(output.contains("Usage:"));
}
