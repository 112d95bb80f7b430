//! Dashboard statistics over fetched workout sessions.
//!
//! All functions are pure: they take the sessions as returned by the
//! backend (in response order) plus an explicit `now`, and recompute their
//! output from scratch on every call.

use crate::config::StatsConfig;
use crate::dates::{format_relative_date, week_start, DateRange};
use crate::types::{
    PersonalRecord, ProgressPoint, SessionSummary, WeekTotals, WeeklyComparison, WeeklyVolume,
    WorkoutSession,
};
use chrono::{DateTime, Duration, NaiveDate, Utc};
use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};

/// Rep counts above this are outside the range where Epley holds
const EPLEY_MAX_REPS: u32 = 30;

/// Group sessions by ISO week and sum sets and volume per week
///
/// Sessions dated outside `range` are ignored. Every set counts towards
/// `total_sets`; only sets with both weight and reps contribute volume.
/// Weeks come back in ascending order and only weeks with at least one
/// session appear.
pub fn aggregate_by_week(
    sessions: &[WorkoutSession],
    range: &DateRange,
    now: DateTime<Utc>,
) -> Vec<WeeklyVolume> {
    let current_week = week_start(now.date_naive());
    let mut weeks: BTreeMap<NaiveDate, (usize, f64)> = BTreeMap::new();

    for session in sessions.iter().filter(|s| range.contains(s.date())) {
        let entry = weeks.entry(week_start(session.date())).or_insert((0, 0.0));
        entry.0 += session.set_count();
        entry.1 += session.volume();
    }

    weeks
        .into_iter()
        .map(|(week_start, (total_sets, total_volume))| WeeklyVolume {
            week_start,
            total_sets,
            total_volume,
            is_current: week_start == current_week,
        })
        .collect()
}

/// Best `weight × reps` set per exercise, top N by volume
///
/// Sets with no or zero weight and sets with no or zero reps are skipped.
/// An exercise's record is only replaced by a strictly greater volume, so
/// the first set seen wins a tie. The result is sorted by volume
/// descending (stable) and truncated to `personal_record_limit`.
pub fn calculate_personal_records(
    sessions: &[WorkoutSession],
    range: &DateRange,
    now: DateTime<Utc>,
    config: &StatsConfig,
) -> Vec<PersonalRecord> {
    let mut records: Vec<PersonalRecord> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for session in sessions.iter().filter(|s| range.contains(s.date())) {
        for log in &session.logs {
            for set in &log.sets {
                let (weight, reps) = match (set.weight, set.reps) {
                    (Some(w), Some(r)) if w > 0.0 && r > 0 => (w, r),
                    _ => continue,
                };
                let volume = weight * f64::from(reps);

                let candidate = PersonalRecord {
                    exercise_id: log.key().to_string(),
                    exercise_name: log.name.clone(),
                    weight,
                    reps,
                    volume,
                    date: session.session_date,
                    session_id: session.id.clone(),
                    is_recent: false,
                };

                match index.get(log.key()) {
                    Some(&i) => {
                        if volume > records[i].volume {
                            records[i] = candidate;
                        }
                    }
                    None => {
                        index.insert(log.key().to_string(), records.len());
                        records.push(candidate);
                    }
                }
            }
        }
    }

    let recent_window = Duration::try_days(config.recent_record_days);
    for record in &mut records {
        record.is_recent = match recent_window {
            Some(window) => now.signed_duration_since(record.date) <= window,
            None => true,
        };
    }

    records.sort_by(|a, b| b.volume.partial_cmp(&a.volume).unwrap_or(Ordering::Equal));
    records.truncate(config.personal_record_limit);
    records
}

/// Estimated one-rep max using the Epley formula
///
/// Returns 0 for non-positive weight or zero reps. For a single rep, or
/// more than 30 reps where the formula stops being meaningful, the lifted
/// weight is returned unchanged.
pub fn calculate_estimated_1rm(weight: f64, reps: u32) -> f64 {
    if weight <= 0.0 || reps == 0 {
        return 0.0;
    }
    if reps == 1 || reps > EPLEY_MAX_REPS {
        return weight;
    }
    weight * (1.0 + f64::from(reps) / 30.0)
}

/// Totals for the week of `now` against the week before it
pub fn aggregate_weekly_metrics(
    sessions: &[WorkoutSession],
    now: DateTime<Utc>,
) -> WeeklyComparison {
    let current_start = week_start(now.date_naive());
    let previous_start = current_start - Duration::days(7);

    let mut current = WeekTotals::default();
    let mut previous = WeekTotals::default();

    for session in sessions {
        let totals = match week_start(session.date()) {
            w if w == current_start => &mut current,
            w if w == previous_start => &mut previous,
            _ => continue,
        };

        totals.workouts += 1;
        totals.sets += session.set_count();
        totals.volume += session.volume();
        totals.minutes += u64::from(session.duration.unwrap_or(0));
        totals.reps += session
            .logs
            .iter()
            .flat_map(|log| log.sets.iter())
            .filter_map(|set| set.reps)
            .map(u64::from)
            .sum::<u64>();
    }

    let volume_change_pct = if previous.volume > 0.0 {
        Some((current.volume - previous.volume) / previous.volume * 100.0)
    } else {
        None
    };

    WeeklyComparison {
        week_start: current_start,
        current,
        previous,
        volume_change_pct,
    }
}

/// Per-session series for one exercise, oldest first
///
/// `exercise` matches either the catalog id or the display name. Sessions
/// where the exercise has no loaded set are left out of the series.
pub fn exercise_progress(
    sessions: &[WorkoutSession],
    exercise: &str,
    range: &DateRange,
) -> Vec<ProgressPoint> {
    let mut points: Vec<ProgressPoint> = sessions
        .iter()
        .filter(|s| range.contains(s.date()))
        .filter_map(|session| {
            let mut best_weight: f64 = 0.0;
            let mut best_1rm: f64 = 0.0;
            let mut volume = 0.0;

            let loaded_sets = session
                .logs
                .iter()
                .filter(|log| log.matches(exercise))
                .flat_map(|log| log.sets.iter())
                .filter_map(|set| match (set.weight, set.reps) {
                    (Some(w), Some(r)) if w > 0.0 && r > 0 => Some((w, r)),
                    _ => None,
                });

            let mut any = false;
            for (weight, reps) in loaded_sets {
                any = true;
                best_weight = best_weight.max(weight);
                best_1rm = best_1rm.max(calculate_estimated_1rm(weight, reps));
                volume += weight * f64::from(reps);
            }

            any.then(|| ProgressPoint {
                date: session.session_date,
                session_id: session.id.clone(),
                best_weight,
                estimated_1rm: best_1rm,
                volume,
            })
        })
        .collect();

    points.sort_by_key(|p| p.date);
    points
}

/// Newest sessions first, with labels for the recent workouts card
pub fn summarize_recent(
    sessions: &[WorkoutSession],
    now: DateTime<Utc>,
    limit: usize,
) -> Vec<SessionSummary> {
    let mut sorted: Vec<&WorkoutSession> = sessions.iter().collect();
    sorted.sort_by(|a, b| b.session_date.cmp(&a.session_date));

    sorted
        .into_iter()
        .take(limit)
        .map(|session| SessionSummary {
            session_id: session.id.clone(),
            name: session.name.clone().unwrap_or_else(|| "Workout".to_string()),
            date: session.session_date,
            relative_date: format_relative_date(session.session_date, now),
            exercise_count: session.logs.len(),
            set_count: session.set_count(),
            volume: session.volume(),
            duration: session.duration,
        })
        .collect()
}
