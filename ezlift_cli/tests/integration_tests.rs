//! Integration tests for the ezlift binary.
//!
//! These tests verify end-to-end behavior including:
//! - Loading session and routine exports
//! - Weekly, record and summary reports
//! - CSV export
//! - Exercise library caching

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::json;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Fixed reference instant: Friday 2024-03-15
const NOW: &str = "2024-03-15T12:00:00Z";

/// Helper to create a test data directory
fn setup_test_dir() -> TempDir {
    tempfile::tempdir().expect("Failed to create temp dir")
}

/// Helper to get the path to the CLI binary
fn cli() -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("ezlift"));
    cmd.arg("--now").arg(NOW);
    cmd
}

fn write_config(dir: &Path) -> PathBuf {
    let path = dir.join("config.toml");
    fs::write(
        &path,
        format!("[data]\ndata_dir = {:?}\n", dir.join("data").to_string_lossy()),
    )
    .unwrap();
    path
}

fn write_sessions(dir: &Path) -> PathBuf {
    let sessions = json!([
        {
            "id": "s1",
            "sessionDate": "2024-03-05T18:00:00Z",
            "duration": 50,
            "workoutId": "push",
            "name": "Push Day",
            "logs": [{
                "id": "l1", "exerciseId": "bench", "name": "Bench Press",
                "sets": [{"weight": 100, "reps": 10}, {"weight": 110, "reps": 8}]
            }]
        },
        {
            "id": "s2",
            "sessionDate": "2024-03-13T18:00:00Z",
            "duration": 45,
            "workoutId": "pull",
            "name": "Pull Day",
            "logs": [
                {"id": "l2", "exerciseId": "row", "name": "Barbell Row",
                 "sets": [{"weight": 80, "reps": 10}]},
                {"id": "l3", "exerciseId": "pullup", "name": "Pull-up",
                 "sets": [{"reps": 8}, {"weight": 0, "reps": 6}]}
            ]
        }
    ]);

    let path = dir.join("sessions.json");
    fs::write(&path, sessions.to_string()).unwrap();
    path
}

fn write_routine(dir: &Path) -> PathBuf {
    let routine = json!([{
        "id": "ppl",
        "name": "Push Pull Legs",
        "isActive": true,
        "workouts": [
            {"id": "push", "name": "Push", "orderIndex": 0},
            {"id": "pull", "name": "Pull", "orderIndex": 1},
            {"id": "legs", "name": "Legs", "orderIndex": 2}
        ]
    }]);

    let path = dir.join("routine.json");
    fs::write(&path, routine.to_string()).unwrap();
    path
}

#[test]
fn test_cli_help() {
    Command::new(assert_cmd::cargo::cargo_bin!("ezlift"))
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("EZLift workout statistics"));
}

#[test]
fn test_weekly_report() {
    let temp_dir = setup_test_dir();
    let config = write_config(temp_dir.path());
    let sessions = write_sessions(temp_dir.path());

    cli()
        .arg("--config")
        .arg(&config)
        .arg("weekly")
        .arg("--sessions")
        .arg(&sessions)
        .assert()
        .success()
        .stdout(predicate::str::contains("2024-03-04"))
        .stdout(predicate::str::contains("1880.0"))
        .stdout(predicate::str::contains("this week"));
}

#[test]
fn test_weekly_outside_range() {
    let temp_dir = setup_test_dir();
    let config = write_config(temp_dir.path());
    let sessions = write_sessions(temp_dir.path());

    cli()
        .arg("--config")
        .arg(&config)
        .arg("weekly")
        .arg("--sessions")
        .arg(&sessions)
        .arg("--from")
        .arg("2024-01-01")
        .arg("--to")
        .arg("2024-01-31")
        .assert()
        .success()
        .stdout(predicate::str::contains("No sessions between"));
}

#[test]
fn test_inverted_range_fails() {
    let temp_dir = setup_test_dir();
    let config = write_config(temp_dir.path());
    let sessions = write_sessions(temp_dir.path());

    cli()
        .arg("--config")
        .arg(&config)
        .arg("weekly")
        .arg("--sessions")
        .arg(&sessions)
        .arg("--from")
        .arg("2024-03-31")
        .arg("--to")
        .arg("2024-03-01")
        .assert()
        .failure();
}

#[test]
fn test_records_skip_bodyweight() {
    let temp_dir = setup_test_dir();
    let config = write_config(temp_dir.path());
    let sessions = write_sessions(temp_dir.path());

    cli()
        .arg("--config")
        .arg(&config)
        .arg("records")
        .arg("--sessions")
        .arg(&sessions)
        .assert()
        .success()
        .stdout(predicate::str::contains("1. Bench Press: 100 × 10 = 1000.0"))
        .stdout(predicate::str::contains("2. Barbell Row: 80 × 10 = 800.0 on 2024-03-13 (new)"))
        .stdout(predicate::str::contains("Pull-up").not());
}

#[test]
fn test_summary() {
    let temp_dir = setup_test_dir();
    let config = write_config(temp_dir.path());
    let sessions = write_sessions(temp_dir.path());

    cli()
        .arg("--config")
        .arg(&config)
        .arg("summary")
        .arg("--sessions")
        .arg(&sessions)
        .assert()
        .success()
        .stdout(predicate::str::contains("Week of 2024-03-11"))
        .stdout(predicate::str::contains("Volume: 800.0 (last week 1880.0)"))
        .stdout(predicate::str::contains("2 days ago"))
        .stdout(predicate::str::contains("Pull Day"));
}

#[test]
fn test_progress() {
    let temp_dir = setup_test_dir();
    let config = write_config(temp_dir.path());
    let sessions = write_sessions(temp_dir.path());

    cli()
        .arg("--config")
        .arg(&config)
        .arg("progress")
        .arg("--sessions")
        .arg(&sessions)
        .arg("--exercise")
        .arg("Bench Press")
        .assert()
        .success()
        .stdout(predicate::str::contains("2024-03-05"))
        .stdout(predicate::str::contains("110.0"));
}

#[test]
fn test_one_rep_max() {
    cli()
        .arg("one-rep-max")
        .arg("--weight")
        .arg("100")
        .arg("--reps")
        .arg("10")
        .assert()
        .success()
        .stdout(predicate::str::contains("Estimated 1RM: 133.3"));

    cli()
        .arg("one-rep-max")
        .arg("--weight")
        .arg("50")
        .arg("--reps")
        .arg("35")
        .assert()
        .success()
        .stdout(predicate::str::contains("Estimated 1RM: 50.0"));
}

#[test]
fn test_next_workout_follows_history() {
    let temp_dir = setup_test_dir();
    let config = write_config(temp_dir.path());
    let sessions = write_sessions(temp_dir.path());
    let routine = write_routine(temp_dir.path());

    cli()
        .arg("--config")
        .arg(&config)
        .arg("next-workout")
        .arg("--routine")
        .arg(&routine)
        .arg("--sessions")
        .arg(&sessions)
        .assert()
        .success()
        .stdout(predicate::str::contains("Next workout: Legs"));

    cli()
        .arg("--config")
        .arg(&config)
        .arg("next-workout")
        .arg("--routine")
        .arg(&routine)
        .assert()
        .success()
        .stdout(predicate::str::contains("Next workout: Push"));
}

#[test]
fn test_export_creates_csv() {
    let temp_dir = setup_test_dir();
    let config = write_config(temp_dir.path());
    let sessions = write_sessions(temp_dir.path());
    let out = temp_dir.path().join("reports").join("weekly.csv");

    cli()
        .arg("--config")
        .arg(&config)
        .arg("export")
        .arg("--sessions")
        .arg(&sessions)
        .arg("--out")
        .arg(&out)
        .assert()
        .success()
        .stdout(predicate::str::contains("Exported 2 weeks"));

    let csv_content = fs::read_to_string(&out).expect("Failed to read CSV");
    assert!(csv_content.starts_with("week_start,total_sets,total_volume,is_current"));
    assert!(csv_content.contains("2024-03-11,3,800.0,true"));
}

#[test]
fn test_missing_sessions_file_fails() {
    let temp_dir = setup_test_dir();
    let config = write_config(temp_dir.path());

    cli()
        .arg("--config")
        .arg(&config)
        .arg("weekly")
        .arg("--sessions")
        .arg(temp_dir.path().join("nope.json"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("NotFound"));
}

#[test]
fn test_exercise_library_cache() {
    let temp_dir = setup_test_dir();
    let config = write_config(temp_dir.path());

    // Nothing cached yet
    cli()
        .arg("--config")
        .arg(&config)
        .arg("exercises")
        .assert()
        .success()
        .stderr(predicate::str::contains("--import"));

    let library = json!([
        {"id": "bench", "name": "Bench Press", "muscleGroups": ["Chest"], "equipment": ["Barbell"]},
        {"id": "squat", "name": "Back Squat", "muscleGroups": ["Quads"], "equipment": ["Barbell"]},
        {"id": "curl", "name": "Dumbbell Curl", "muscleGroups": ["Biceps"], "equipment": ["Dumbbell"]}
    ]);
    let import = temp_dir.path().join("exercises.json");
    fs::write(&import, library.to_string()).unwrap();

    cli()
        .arg("--config")
        .arg(&config)
        .arg("exercises")
        .arg("--import")
        .arg(&import)
        .assert()
        .success()
        .stdout(predicate::str::contains("Cached 3 exercises"));

    assert!(temp_dir.path().join("data/cache/exercises.json").exists());

    // Served from cache with filters applied
    cli()
        .arg("--config")
        .arg(&config)
        .arg("exercises")
        .arg("--equipment")
        .arg("barbell")
        .arg("--query")
        .arg("squat")
        .assert()
        .success()
        .stdout(predicate::str::contains("Back Squat"))
        .stdout(predicate::str::contains("Bench Press").not());

    // Search is case-insensitive and trims the term
    cli()
        .arg("--config")
        .arg(&config)
        .arg("exercises")
        .arg("--query")
        .arg("  CURL ")
        .assert()
        .success()
        .stdout(predicate::str::contains("Dumbbell Curl"))
        .stdout(predicate::str::contains("Back Squat").not());

    // Search hits narrowed away by the other filters
    cli()
        .arg("--config")
        .arg(&config)
        .arg("exercises")
        .arg("--query")
        .arg("curl")
        .arg("--equipment")
        .arg("barbell")
        .assert()
        .success()
        .stdout(predicate::str::contains("No exercises match."));
}

#[test]
fn test_weekly_all_history() {
    let temp_dir = setup_test_dir();
    let config = write_config(temp_dir.path());
    let sessions = write_sessions(temp_dir.path());

    cli()
        .arg("--config")
        .arg(&config)
        .arg("weekly")
        .arg("--sessions")
        .arg(&sessions)
        .arg("--weeks")
        .arg("0")
        .assert()
        .success()
        .stdout(predicate::str::contains("2024-03-04"))
        .stdout(predicate::str::contains("2024-03-11"));
}
