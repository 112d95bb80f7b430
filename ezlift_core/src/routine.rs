//! Active program lookup and next-workout selection.

use crate::types::{Routine, Workout, WorkoutSession};

/// The routine flagged active, or the first one if none is flagged
pub fn active_routine(routines: &[Routine]) -> Option<&Routine> {
    routines
        .iter()
        .find(|r| r.is_active)
        .or_else(|| routines.first())
}

/// Workouts of a routine in program order
pub fn ordered_workouts(routine: &Routine) -> Vec<&Workout> {
    let mut workouts: Vec<&Workout> = routine.workouts.iter().collect();
    workouts.sort_by_key(|w| w.order_index);
    workouts
}

/// The workout that follows the most recently performed one
///
/// Looks up the newest session that was performed from one of this
/// routine's workouts and returns the next workout in order, wrapping
/// around after the last one. With no matching history the first workout
/// is returned. An empty routine has no next workout.
pub fn next_workout<'a>(routine: &'a Routine, sessions: &[WorkoutSession]) -> Option<&'a Workout> {
    let workouts = ordered_workouts(routine);
    if workouts.is_empty() {
        return None;
    }

    let last_position = sessions
        .iter()
        .filter(|s| s.workout_id.is_some())
        .max_by_key(|s| s.session_date)
        .and_then(|latest| {
            let id = latest.workout_id.as_deref()?;
            workouts.iter().position(|w| w.id == id)
        });

    let next = match last_position {
        Some(pos) => workouts[(pos + 1) % workouts.len()],
        None => workouts[0],
    };

    tracing::debug!(
        "Next workout for routine {}: {} ({})",
        routine.id,
        next.name,
        next.id
    );
    Some(next)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};

    fn workout(id: &str, order_index: u32) -> Workout {
        Workout {
            id: id.into(),
            name: format!("Day {}", id),
            day_of_week: None,
            order_index,
        }
    }

    fn routine() -> Routine {
        Routine {
            id: "ppl".into(),
            name: "Push Pull Legs".into(),
            is_active: true,
            // Deliberately out of order
            workouts: vec![workout("legs", 2), workout("push", 0), workout("pull", 1)],
        }
    }

    fn performed(workout_id: Option<&str>, days_ago: i64) -> WorkoutSession {
        let base = Utc.with_ymd_and_hms(2024, 3, 15, 9, 0, 0).unwrap();
        WorkoutSession {
            id: format!("s{}", days_ago),
            session_date: base - Duration::days(days_ago),
            duration: None,
            workout_id: workout_id.map(String::from),
            name: None,
            logs: vec![],
        }
    }

    #[test]
    fn test_no_history_starts_at_first() {
        let routine = routine();
        assert_eq!(next_workout(&routine, &[]).unwrap().id, "push");
    }

    #[test]
    fn test_follows_latest_session() {
        let routine = routine();
        let sessions = vec![performed(Some("push"), 3), performed(Some("pull"), 1)];
        assert_eq!(next_workout(&routine, &sessions).unwrap().id, "legs");
    }

    #[test]
    fn test_wraps_around() {
        let routine = routine();
        let sessions = vec![performed(Some("legs"), 0), performed(Some("pull"), 2)];
        assert_eq!(next_workout(&routine, &sessions).unwrap().id, "push");
    }

    #[test]
    fn test_unknown_workout_starts_at_first() {
        let routine = routine();
        let sessions = vec![performed(Some("other-program"), 0), performed(None, 1)];
        assert_eq!(next_workout(&routine, &sessions).unwrap().id, "push");
    }

    #[test]
    fn test_empty_routine() {
        let mut routine = routine();
        routine.workouts.clear();
        assert!(next_workout(&routine, &[performed(Some("push"), 0)]).is_none());
    }

    #[test]
    fn test_active_routine_selection() {
        let mut inactive = routine();
        inactive.id = "old".into();
        inactive.is_active = false;
        let active = routine();

        let routines = vec![inactive.clone(), active];
        assert_eq!(active_routine(&routines).unwrap().id, "ppl");

        let only_inactive = vec![inactive];
        assert_eq!(active_routine(&only_inactive).unwrap().id, "old");
        assert!(active_routine(&[]).is_none());
    }
}
