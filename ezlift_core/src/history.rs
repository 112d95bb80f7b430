//! Loading exported session history and routines.
//!
//! The backend answers with a bare array on some endpoints and wraps it in
//! an envelope (`data`, `sessions`, `routines`, ...) on others. Exports
//! may also be JSON Lines. Every shape is normalized to a plain list here;
//! entries that fail to parse are skipped with a warning.

use crate::{Error, Exercise, Result, Routine, WorkoutSession};
use fs2::FileExt;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// Envelope keys that may wrap a list in backend responses
const ENVELOPE_KEYS: &[&str] = &[
    "data",
    "sessions",
    "workoutLogs",
    "logs",
    "routines",
    "routine",
    "workouts",
    "exercises",
    "items",
];

/// Unwrap a backend payload into its list of items
///
/// Arrays are returned as-is. An object with an `id` is a single item; an
/// object carrying one of the known envelope keys yields what that key
/// wraps. Any other object (`{"message": ...}`) holds no items.
/// Scalars and `null` are not lists.
pub fn envelope_items(value: Value) -> Option<Vec<Value>> {
    match value {
        Value::Array(items) => Some(items),
        Value::Object(map) if map.contains_key("id") => Some(vec![Value::Object(map)]),
        Value::Object(mut map) => {
            for key in ENVELOPE_KEYS {
                match map.remove(*key) {
                    Some(Value::Array(items)) => return Some(items),
                    Some(inner @ Value::Object(_)) => return envelope_items(inner),
                    _ => {}
                }
            }
            tracing::debug!("Object without id or list envelope, treating as empty");
            Some(Vec::new())
        }
        _ => None,
    }
}

/// Parse a backend payload into sessions, skipping malformed entries
pub fn normalize_sessions(value: Value) -> Result<Vec<WorkoutSession>> {
    parse_items(value, "session")
}

fn parse_items<T: DeserializeOwned>(value: Value, what: &str) -> Result<Vec<T>> {
    let items = envelope_items(value)
        .ok_or_else(|| Error::InvalidData(format!("Expected a list of {}s", what)))?;

    let mut parsed = Vec::with_capacity(items.len());
    for (index, item) in items.into_iter().enumerate() {
        match serde_json::from_value::<T>(item) {
            Ok(entry) => parsed.push(entry),
            Err(e) => tracing::warn!("Skipping {} at index {}: {}", what, index, e),
        }
    }
    Ok(parsed)
}

/// Load sessions from a JSON or JSON Lines export
pub fn load_sessions(path: &Path) -> Result<Vec<WorkoutSession>> {
    let contents = read_locked(path)?;
    let trimmed = contents.trim();
    if trimmed.is_empty() {
        return Ok(Vec::new());
    }

    let sessions = match serde_json::from_str::<Value>(trimmed) {
        Ok(value) => normalize_sessions(value)?,
        Err(_) => parse_jsonl(trimmed),
    };

    tracing::info!("Loaded {} sessions from {:?}", sessions.len(), path);
    Ok(sessions)
}

/// Load routines from a JSON export (array, envelope or single routine)
pub fn load_routines(path: &Path) -> Result<Vec<Routine>> {
    let contents = read_locked(path)?;
    let value: Value = serde_json::from_str(&contents)?;
    let routines = parse_items(value, "routine")?;
    tracing::debug!("Loaded {} routines from {:?}", routines.len(), path);
    Ok(routines)
}

/// Load an exercise library export (array or envelope)
pub fn load_exercises(path: &Path) -> Result<Vec<Exercise>> {
    let contents = read_locked(path)?;
    let value: Value = serde_json::from_str(&contents)?;
    parse_items(value, "exercise")
}

fn parse_jsonl(contents: &str) -> Vec<WorkoutSession> {
    let mut sessions = Vec::new();
    for (line_num, line) in contents.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }

        match serde_json::from_str::<WorkoutSession>(line) {
            Ok(session) => sessions.push(session),
            Err(e) => {
                tracing::warn!("Failed to parse session at line {}: {}", line_num + 1, e);
            }
        }
    }
    sessions
}

fn read_locked(path: &Path) -> Result<String> {
    let file = File::open(path)?;
    file.lock_shared()?;

    let mut contents = String::new();
    let read = std::io::BufReader::new(&file).read_to_string(&mut contents);
    file.unlock()?;
    read?;
    Ok(contents)
}
