//! Core domain types for EZLift.
//!
//! Sessions, logged exercises and sets mirror the backend's JSON shapes
//! (camelCase field names). Everything here is a read-only projection of
//! backend state; derived types (records, weekly buckets) are recomputed
//! on every fetch and never persisted.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

// ============================================================================
// Logged training data
// ============================================================================

/// A single performed set
///
/// Any field may be absent: bodyweight sets carry no weight, timed sets
/// carry a duration instead of reps, cardio sets carry a distance.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ExerciseSet {
    #[serde(default)]
    pub reps: Option<u32>,
    #[serde(default)]
    pub weight: Option<f64>,
    /// Seconds
    #[serde(default)]
    pub duration: Option<u32>,
    #[serde(default)]
    pub distance: Option<f64>,
}

impl ExerciseSet {
    /// Convenience constructor for a loaded set
    pub fn weighted(weight: f64, reps: u32) -> Self {
        Self {
            reps: Some(reps),
            weight: Some(weight),
            ..Self::default()
        }
    }

    /// `weight × reps` when both are present
    pub fn volume(&self) -> Option<f64> {
        match (self.weight, self.reps) {
            (Some(weight), Some(reps)) => Some(weight * f64::from(reps)),
            _ => None,
        }
    }
}

/// One exercise's entries within a session
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LogExercise {
    pub id: String,
    #[serde(default)]
    pub exercise_id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub sets: Vec<ExerciseSet>,
}

impl LogExercise {
    /// Identifier used to group entries of the same exercise
    ///
    /// Falls back to the display name for entries the backend logged
    /// without a catalog id.
    pub fn key(&self) -> &str {
        self.exercise_id.as_deref().unwrap_or(&self.name)
    }

    /// Whether this entry refers to the given exercise id or name
    pub fn matches(&self, key: &str) -> bool {
        self.key() == key || self.name.eq_ignore_ascii_case(key)
    }
}

/// A completed training session
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WorkoutSession {
    pub id: String,
    pub session_date: DateTime<Utc>,
    /// Minutes
    #[serde(default)]
    pub duration: Option<u32>,
    /// Routine workout this session was performed from, if any
    #[serde(default)]
    pub workout_id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub logs: Vec<LogExercise>,
}

impl WorkoutSession {
    pub fn date(&self) -> NaiveDate {
        self.session_date.date_naive()
    }

    pub fn set_count(&self) -> usize {
        self.logs.iter().map(|log| log.sets.len()).sum()
    }

    pub fn volume(&self) -> f64 {
        self.logs
            .iter()
            .flat_map(|log| log.sets.iter())
            .filter_map(ExerciseSet::volume)
            .sum()
    }
}

// ============================================================================
// Programs
// ============================================================================

/// A workout entry within a routine
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Workout {
    pub id: String,
    pub name: String,
    /// 0 = Sunday … 6 = Saturday
    #[serde(default)]
    pub day_of_week: Option<u8>,
    #[serde(default)]
    pub order_index: u32,
}

/// A reusable training program
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Routine {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub is_active: bool,
    #[serde(default)]
    pub workouts: Vec<Workout>,
}

// ============================================================================
// Derived dashboard data
// ============================================================================

/// Best `weight × reps` set for one exercise within a date range
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PersonalRecord {
    pub exercise_id: String,
    pub exercise_name: String,
    pub weight: f64,
    pub reps: u32,
    pub volume: f64,
    pub date: DateTime<Utc>,
    pub session_id: String,
    pub is_recent: bool,
}

/// Sets and volume for one ISO week (Monday start)
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WeeklyVolume {
    pub week_start: NaiveDate,
    pub total_sets: usize,
    pub total_volume: f64,
    pub is_current: bool,
}

/// Totals for a single week used by the training volume card
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WeekTotals {
    pub workouts: usize,
    pub sets: usize,
    pub reps: u64,
    pub volume: f64,
    pub minutes: u64,
}

/// Current week against the week before
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WeeklyComparison {
    pub week_start: NaiveDate,
    pub current: WeekTotals,
    pub previous: WeekTotals,
    /// Percent change in volume; `None` when last week had none
    pub volume_change_pct: Option<f64>,
}

/// One point of an exercise progress chart
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ProgressPoint {
    pub date: DateTime<Utc>,
    pub session_id: String,
    pub best_weight: f64,
    pub estimated_1rm: f64,
    pub volume: f64,
}

/// Row of the recent workouts card
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SessionSummary {
    pub session_id: String,
    pub name: String,
    pub date: DateTime<Utc>,
    pub relative_date: String,
    pub exercise_count: usize,
    pub set_count: usize,
    pub volume: f64,
    pub duration: Option<u32>,
}

/// Whether a user has any training data yet
///
/// `Unknown` is the state before classification ran. Classification
/// failures resolve to `Existing`, the read-only state.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum UserDataState {
    New,
    Existing,
    #[default]
    Unknown,
}

impl UserDataState {
    pub fn is_new(self) -> bool {
        self == UserDataState::New
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_volume_requires_both_fields() {
        assert_eq!(ExerciseSet::weighted(100.0, 10).volume(), Some(1000.0));

        let bodyweight = ExerciseSet {
            reps: Some(12),
            ..ExerciseSet::default()
        };
        assert_eq!(bodyweight.volume(), None);
    }

    #[test]
    fn test_session_deserializes_backend_shape() {
        let json = r#"{
            "id": "s1",
            "sessionDate": "2024-03-04T18:00:00Z",
            "duration": 55,
            "logs": [
                {"id": "l1", "exerciseId": "bench", "name": "Bench Press",
                 "sets": [{"reps": 10, "weight": 100}, {"duration": 60}]}
            ]
        }"#;

        let session: WorkoutSession = serde_json::from_str(json).unwrap();
        assert_eq!(session.duration, Some(55));
        assert_eq!(session.logs[0].key(), "bench");
        assert_eq!(session.set_count(), 2);
        assert_eq!(session.volume(), 1000.0);
    }

    #[test]
    fn test_log_key_falls_back_to_name() {
        let log = LogExercise {
            id: "l1".into(),
            exercise_id: None,
            name: "Farmer Carry".into(),
            sets: vec![],
        };
        assert_eq!(log.key(), "Farmer Carry");
        assert!(log.matches("farmer carry"));
    }

    #[test]
    fn test_user_state_serializes_lowercase() {
        let json = serde_json::to_string(&UserDataState::Existing).unwrap();
        assert_eq!(json, "\"existing\"");
        assert_eq!(UserDataState::default(), UserDataState::Unknown);
    }
}
