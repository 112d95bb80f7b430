//! New-versus-existing user classification.
//!
//! Callers fetch the routine count and the session count (in parallel)
//! and hand both outcomes over. Any failure resolves to `Existing`, the
//! read-only state.

use crate::types::UserDataState;
use std::fmt::Display;

/// Classify a user from the outcome of the two count queries
pub fn classify_user_state<E: Display>(
    routine_count: Result<usize, E>,
    session_count: Result<usize, E>,
) -> UserDataState {
    match (routine_count, session_count) {
        (Ok(0), Ok(0)) => UserDataState::New,
        (Ok(_), Ok(_)) => UserDataState::Existing,
        (Err(e), _) | (_, Err(e)) => {
            tracing::warn!(
                "User state detection failed: {}. Falling back to existing.",
                e
            );
            UserDataState::Existing
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_data_is_new() {
        assert_eq!(
            classify_user_state::<String>(Ok(0), Ok(0)),
            UserDataState::New
        );
    }

    #[test]
    fn test_any_data_is_existing() {
        assert_eq!(
            classify_user_state::<String>(Ok(1), Ok(0)),
            UserDataState::Existing
        );
        assert_eq!(
            classify_user_state::<String>(Ok(0), Ok(12)),
            UserDataState::Existing
        );
    }

    #[test]
    fn test_failure_is_existing() {
        assert_eq!(
            classify_user_state(Err("timeout".to_string()), Ok(0)),
            UserDataState::Existing
        );
        assert_eq!(
            classify_user_state(Ok(0), Err("500".to_string())),
            UserDataState::Existing
        );
    }
}
