#![forbid(unsafe_code)]

//! Core domain model and workout statistics for EZLift.
//!
//! This crate provides:
//! - Domain types (sessions, logged exercises, sets, routines)
//! - Dashboard statistics (weekly volume, personal records, 1RM, progress)
//! - Routine scheduling and user-state classification
//! - Caching (TTL/LRU cache, file-backed exercise store)
//! - Debounced exercise search and exercise detail enrichment
//! - History loading and CSV export

pub mod types;
pub mod error;
pub mod config;
pub mod logging;
pub mod dates;
pub mod stats;
pub mod routine;
pub mod user_state;
pub mod cache;
pub mod exercises;
pub mod search;
pub mod enrichment;
pub mod history;
pub mod export;

// Re-export commonly used types
pub use error::{Error, Result};
pub use types::*;
pub use config::Config;
pub use dates::{format_relative_date, week_start, DateRange};
pub use stats::{
    aggregate_by_week, aggregate_weekly_metrics, calculate_estimated_1rm,
    calculate_personal_records, exercise_progress, summarize_recent,
};
pub use routine::{active_routine, next_workout};
pub use user_state::classify_user_state;
pub use cache::TtlLruCache;
pub use exercises::{filter_exercises, Exercise, ExerciseFilter, ExerciseStore};
pub use search::{DebouncedSearch, LocalExerciseIndex, SearchBackend, SearchState};
pub use enrichment::{enrich_exercise, ContentLookup, ExerciseDetails, MediaLookup};
pub use history::{load_exercises, load_routines, load_sessions, normalize_sessions};
