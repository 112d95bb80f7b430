//! Exercise library: catalog entries, filtering and the on-disk list cache.
//!
//! The full exercise list is expensive to fetch and rarely changes, so it
//! is kept in a small JSON file with a fetch timestamp and reused until it
//! is older than the configured TTL.

use crate::{Error, Result};
use chrono::{DateTime, Utc};
use fs2::FileExt;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tempfile::NamedTempFile;

/// A catalog exercise
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Exercise {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub muscle_groups: Vec<String>,
    #[serde(default)]
    pub equipment: Vec<String>,
    #[serde(default)]
    pub category: Option<String>,
}

/// Library filters; every field that is set must match
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ExerciseFilter {
    /// Case-insensitive substring of the name
    pub query: Option<String>,
    pub muscle_group: Option<String>,
    pub equipment: Option<String>,
}

impl ExerciseFilter {
    pub fn query(term: &str) -> Self {
        Self {
            query: Some(term.to_string()),
            ..Self::default()
        }
    }

    pub fn matches(&self, exercise: &Exercise) -> bool {
        let query_ok = match self.query.as_deref().map(str::trim) {
            None | Some("") => true,
            Some(q) => exercise.name.to_lowercase().contains(&q.to_lowercase()),
        };

        query_ok
            && contains_ignore_case(&exercise.muscle_groups, self.muscle_group.as_deref())
            && contains_ignore_case(&exercise.equipment, self.equipment.as_deref())
    }
}

fn contains_ignore_case(values: &[String], wanted: Option<&str>) -> bool {
    match wanted {
        None => true,
        Some(wanted) => values.iter().any(|v| v.eq_ignore_ascii_case(wanted)),
    }
}

/// Exercises matching `filter`, in library order
pub fn filter_exercises<'a>(exercises: &'a [Exercise], filter: &ExerciseFilter) -> Vec<&'a Exercise> {
    exercises.iter().filter(|e| filter.matches(e)).collect()
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredExercises {
    fetched_at: DateTime<Utc>,
    exercises: Vec<Exercise>,
}

/// File-backed cache of the full exercise list
pub struct ExerciseStore {
    path: PathBuf,
    ttl: Duration,
}

impl ExerciseStore {
    pub fn new(path: impl Into<PathBuf>, ttl: Duration) -> Self {
        Self {
            path: path.into(),
            ttl,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Cached exercises if present and younger than the TTL
    ///
    /// A missing, unreadable or corrupted file counts as a miss.
    pub fn load_fresh(&self, now: DateTime<Utc>) -> Option<Vec<Exercise>> {
        let stored = self.read()?;
        let age = now.signed_duration_since(stored.fetched_at);

        match age.to_std() {
            Ok(age) if age < self.ttl => {}
            _ => {
                tracing::debug!(
                    "Exercise cache at {:?} is stale ({}s old)",
                    self.path,
                    age.num_seconds()
                );
                return None;
            }
        }

        tracing::debug!("Loaded {} exercises from cache", stored.exercises.len());
        Some(stored.exercises)
    }

    fn read(&self) -> Option<StoredExercises> {
        if !self.path.exists() {
            return None;
        }

        let file = match File::open(&self.path) {
            Ok(f) => f,
            Err(e) => {
                tracing::warn!("Unable to open exercise cache {:?}: {}", self.path, e);
                return None;
            }
        };

        if let Err(e) = file.lock_shared() {
            tracing::warn!("Unable to lock exercise cache {:?}: {}", self.path, e);
            return None;
        }

        let mut contents = String::new();
        let read = std::io::BufReader::new(&file).read_to_string(&mut contents);
        let _ = file.unlock();
        if let Err(e) = read {
            tracing::warn!("Failed to read exercise cache {:?}: {}", self.path, e);
            return None;
        }

        match serde_json::from_str(&contents) {
            Ok(stored) => Some(stored),
            Err(e) => {
                tracing::warn!("Ignoring corrupted exercise cache {:?}: {}", self.path, e);
                None
            }
        }
    }

    /// Replace the cached list atomically
    pub fn save(&self, exercises: &[Exercise], now: DateTime<Utc>) -> Result<()> {
        let parent = self.path.parent().ok_or_else(|| {
            Error::Other(format!("Exercise cache path {:?} has no parent", self.path))
        })?;
        std::fs::create_dir_all(parent)?;

        let temp = NamedTempFile::new_in(parent)?;
        temp.as_file().lock_exclusive()?;

        {
            let stored = StoredExercises {
                fetched_at: now,
                exercises: exercises.to_vec(),
            };
            let mut writer = std::io::BufWriter::new(temp.as_file());
            writer.write_all(serde_json::to_string(&stored)?.as_bytes())?;
            writer.flush()?;
        }

        temp.as_file().sync_all()?;
        temp.as_file().unlock()?;
        temp.persist(&self.path).map_err(|e| Error::Io(e.error))?;

        tracing::info!("Cached {} exercises at {:?}", exercises.len(), self.path);
        Ok(())
    }

    /// Drop the cached list
    pub fn clear(&self) -> Result<()> {
        if self.path.exists() {
            std::fs::remove_file(&self.path)?;
        }
        Ok(())
    }
}
