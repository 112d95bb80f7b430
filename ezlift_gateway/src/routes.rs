use std::{collections::BTreeMap, sync::Arc};

use axum::{
    Json,
    extract::{self, OriginalUri, Path, Query},
    http::{HeaderMap, StatusCode},
};
use chrono::Utc;
use ezlift_core::{
    DateRange, PersonalRecord, SessionSummary, UserDataState, WeeklyComparison, WeeklyVolume,
    aggregate_by_week, aggregate_weekly_metrics, calculate_personal_records,
    ExerciseDetails, classify_user_state, enrich_exercise, history::envelope_items,
    normalize_sessions, summarize_recent,
};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::{debug, info, warn};

use super::{
    auth::{original_path, require_token},
    backend::{BackendResponse, ROUTINE_PATH, SessionLookup, WORKOUT_LOG_PATHS},
    error::AppError,
    state::State,
};

/// Weeks shown by the dashboard when the caller does not say
const DEFAULT_DASHBOARD_WEEKS: u32 = 12;

const RECENT_WORKOUTS: usize = 5;

#[derive(Deserialize)]
pub struct WorkoutQuery {
    limit: Option<String>,
    sort: Option<String>,
    filter: Option<String>,
}

impl WorkoutQuery {
    fn pairs(&self) -> Vec<(String, String)> {
        [("limit", &self.limit), ("sort", &self.sort), ("filter", &self.filter)]
            .into_iter()
            .filter_map(|(key, value)| value.clone().map(|v| (key.to_string(), v)))
            .collect()
    }
}

/// Routines for the signed-in user
pub async fn workout_handler(
    extract::State(state): extract::State<Arc<State>>,
    headers: HeaderMap,
    uri: OriginalUri,
    Query(query): Query<WorkoutQuery>,
) -> Result<Json<Value>, AppError> {
    let token = require_token(&headers, &uri)?;
    let response = state.backend.get(ROUTINE_PATH, &query.pairs(), &token).await?;

    let Some(response) = check_response(response, &original_path(&headers, &uri))? else {
        return Ok(Json(json!([])));
    };
    response.json().map(Json).ok_or_else(|| AppError::Backend {
        status: StatusCode::BAD_GATEWAY,
        message: "Backend returned a non-JSON routine list".into(),
    })
}

/// Session logs for the signed-in user, always as an array
pub async fn workout_log_handler(
    extract::State(state): extract::State<Arc<State>>,
    headers: HeaderMap,
    uri: OriginalUri,
    Query(query): Query<BTreeMap<String, String>>,
) -> Result<Json<Value>, AppError> {
    let token = require_token(&headers, &uri)?;
    let query: Vec<(String, String)> = query.into_iter().collect();
    let response = state
        .backend
        .get_with_fallbacks(WORKOUT_LOG_PATHS, &query, &token)
        .await?;

    Ok(Json(Value::Array(session_items(response, &original_path(&headers, &uri))?)))
}

#[derive(Serialize)]
pub struct UserStateResponse {
    state: UserDataState,
}

/// Whether the user has any routines or logged sessions
pub async fn user_state_handler(
    extract::State(state): extract::State<Arc<State>>,
    headers: HeaderMap,
    uri: OriginalUri,
) -> Result<Json<UserStateResponse>, AppError> {
    let token = require_token(&headers, &uri)?;

    if let Some(cached) = state.cached_user_state(&token) {
        debug!("User state served from cache: {cached:?}");
        return Ok(Json(UserStateResponse { state: cached }));
    }

    let original = original_path(&headers, &uri);
    let first_only = vec![("limit".to_string(), "1".to_string())];
    let (routines, sessions) = tokio::join!(
        async {
            let response = state.backend.get(ROUTINE_PATH, &first_only, &token).await?;
            count_items(response, &original)
        },
        async {
            let response = state
                .backend
                .get_with_fallbacks(WORKOUT_LOG_PATHS, &first_only, &token)
                .await?;
            count_items(response, &original)
        }
    );

    let user_state = classify_user_state(routines, sessions);
    info!("Classified user as {user_state:?}");
    state.remember_user_state(&token, user_state);

    Ok(Json(UserStateResponse { state: user_state }))
}

/// Media and CMS content for one exercise
///
/// Either half may be null when its service has nothing or is failing.
pub async fn exercise_details_handler(
    extract::State(state): extract::State<Arc<State>>,
    headers: HeaderMap,
    uri: OriginalUri,
    Path(exercise_id): Path<String>,
) -> Result<Json<ExerciseDetails>, AppError> {
    let token = require_token(&headers, &uri)?;
    if exercise_id.is_empty()
        || !exercise_id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return Err(AppError::BadRequest(format!(
            "Invalid exercise id {exercise_id:?}"
        )));
    }

    let lookup = SessionLookup::new(&state.backend, &token);
    let details = enrich_exercise(&exercise_id, &lookup, &lookup).await;
    if details.is_empty() {
        warn!("No media or content available for {exercise_id}");
    }
    Ok(Json(details))
}

#[derive(Deserialize)]
pub struct DashboardQuery {
    weeks: Option<u32>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardResponse {
    weekly_volume: Vec<WeeklyVolume>,
    weekly_comparison: WeeklyComparison,
    personal_records: Vec<PersonalRecord>,
    recent_workouts: Vec<SessionSummary>,
}

/// Dashboard cards computed from the user's session history
pub async fn dashboard_handler(
    extract::State(state): extract::State<Arc<State>>,
    headers: HeaderMap,
    uri: OriginalUri,
    Query(query): Query<DashboardQuery>,
) -> Result<Json<DashboardResponse>, AppError> {
    let token = require_token(&headers, &uri)?;
    let response = state
        .backend
        .get_with_fallbacks(WORKOUT_LOG_PATHS, &[], &token)
        .await?;

    let items = session_items(response, &original_path(&headers, &uri))?;
    let sessions = normalize_sessions(Value::Array(items))
        .map_err(|e| AppError::Internal(e.to_string()))?;

    let now = Utc::now();
    let weeks = query.weeks.unwrap_or(DEFAULT_DASHBOARD_WEEKS);
    let range = DateRange::last_weeks(weeks, now);

    Ok(Json(DashboardResponse {
        weekly_volume: aggregate_by_week(&sessions, &range, now),
        weekly_comparison: aggregate_weekly_metrics(&sessions, now),
        personal_records: calculate_personal_records(&sessions, &range, now, &state.stats),
        recent_workouts: summarize_recent(&sessions, now, RECENT_WORKOUTS),
    }))
}

/// Map backend failures onto gateway errors
///
/// `None` means the backend has nothing for this user (404).
fn check_response(
    response: BackendResponse,
    original: &str,
) -> Result<Option<BackendResponse>, AppError> {
    let status = response.status;

    if status == StatusCode::NOT_FOUND {
        debug!("Backend has no data for {original}");
        return Ok(None);
    }
    if status == StatusCode::UNAUTHORIZED
        || status == StatusCode::FORBIDDEN
        || (status.is_server_error() && response.looks_unauthorized())
    {
        warn!("Backend rejected the session token ({status})");
        return Err(AppError::unauthorized(original));
    }
    if !status.is_success() {
        return Err(AppError::Backend {
            status,
            message: response.message(),
        });
    }
    Ok(Some(response))
}

/// Normalized list of session entries; non-JSON bodies count as empty
fn session_items(response: BackendResponse, original: &str) -> Result<Vec<Value>, AppError> {
    let Some(response) = check_response(response, original)? else {
        return Ok(Vec::new());
    };

    match response.json() {
        Some(value) => Ok(envelope_items(value).unwrap_or_default()),
        None => {
            warn!("Backend returned non-JSON session logs, treating as empty");
            Ok(Vec::new())
        }
    }
}

fn count_items(response: BackendResponse, original: &str) -> Result<usize, AppError> {
    let Some(response) = check_response(response, original)? else {
        return Ok(0);
    };
    let value = response.json().ok_or_else(|| AppError::Backend {
        status: StatusCode::BAD_GATEWAY,
        message: "Backend returned a non-JSON list".into(),
    })?;
    Ok(envelope_items(value).map(|items| items.len()).unwrap_or(0))
}
