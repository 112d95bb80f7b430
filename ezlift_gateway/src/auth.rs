//! Session cookie exchange.
//!
//! The browser posts a Firebase ID token once; the backend verifies it and
//! hands back its own JWT, which lives in an HttpOnly cookie from then on.

use std::sync::Arc;

use axum::{
    Json,
    extract::{self, OriginalUri},
    http::{HeaderMap, HeaderValue, header},
    response::{AppendHeaders, IntoResponse},
};
use base64::{
    Engine,
    engine::general_purpose::{STANDARD, URL_SAFE_NO_PAD},
};
use chrono::Utc;
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::{info, warn};

use super::{error::AppError, state::State};

pub const SESSION_COOKIE: &str = "session-token";
pub const USER_COOKIE: &str = "user-info";

/// Cookie lifetime when the JWT carries no usable `exp`
pub const DEFAULT_MAX_AGE_SECS: i64 = 60 * 60;

/// Header a proxy sets to the page the user was trying to reach
pub const ORIGINAL_PATH_HEADER: &str = "x-original-path";

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionRequest {
    id_token: Option<String>,
}

pub async fn create_session_handler(
    extract::State(state): extract::State<Arc<State>>,
    Json(payload): Json<SessionRequest>,
) -> Result<impl IntoResponse, AppError> {
    let id_token = payload
        .id_token
        .filter(|t| !t.trim().is_empty())
        .ok_or_else(|| AppError::BadRequest("idToken is required".into()))?;

    let verified = state.backend.verify(&id_token).await?;
    if !verified.status.is_success() {
        warn!("Token verification rejected: {}", verified.status);
        return Err(AppError::unauthorized("/"));
    }

    let body = verified.json().unwrap_or(Value::Null);
    let token = ["token", "sessionToken", "jwt"]
        .iter()
        .find_map(|key| body.get(*key).and_then(Value::as_str))
        .ok_or_else(|| AppError::Backend {
            status: axum::http::StatusCode::BAD_GATEWAY,
            message: "Verification response carried no token".into(),
        })?
        .to_string();
    let user = body.get("user").cloned().unwrap_or(Value::Null);

    let max_age = token_max_age(&token, Utc::now().timestamp());
    let secure = state.config.production;
    let user_info = STANDARD.encode(user.to_string());

    // A new sign-in must not reuse a stale classification
    state.forget_user_state(&token);
    info!("Session established, expires in {max_age}s");

    Ok((
        AppendHeaders([
            (header::SET_COOKIE, session_cookie(SESSION_COOKIE, &token, max_age, secure)?),
            (header::SET_COOKIE, session_cookie(USER_COOKIE, &user_info, max_age, secure)?),
        ]),
        Json(json!({ "success": true, "user": user })),
    ))
}

pub async fn session_status_handler(headers: HeaderMap) -> impl IntoResponse {
    let authenticated = cookie_value(&headers, SESSION_COOKIE).is_some();
    Json(json!({ "authenticated": authenticated }))
}

pub async fn delete_session_handler(
    extract::State(state): extract::State<Arc<State>>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, AppError> {
    if let Some(token) = cookie_value(&headers, SESSION_COOKIE) {
        state.forget_user_state(&token);
    }
    let secure = state.config.production;

    Ok((
        AppendHeaders([
            (header::SET_COOKIE, session_cookie(SESSION_COOKIE, "", 0, secure)?),
            (header::SET_COOKIE, session_cookie(USER_COOKIE, "", 0, secure)?),
        ]),
        Json(json!({ "success": true })),
    ))
}

/// Session token from the cookie, or a 401 pointing back at this page
pub fn require_token(headers: &HeaderMap, uri: &OriginalUri) -> Result<String, AppError> {
    cookie_value(headers, SESSION_COOKIE)
        .ok_or_else(|| AppError::unauthorized(&original_path(headers, uri)))
}

/// Page to return to after login: the proxy's hint, else this request
pub fn original_path(headers: &HeaderMap, uri: &OriginalUri) -> String {
    headers
        .get(ORIGINAL_PATH_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
        .unwrap_or_else(|| {
            uri.path_and_query()
                .map(|pq| pq.as_str().to_string())
                .unwrap_or_else(|| uri.path().to_string())
        })
}

/// Value of cookie `name`, ignoring empty values
pub fn cookie_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|line| line.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, value)| *key == name && !value.is_empty())
        .map(|(_, value)| value.to_string())
}

fn session_cookie(
    name: &str,
    value: &str,
    max_age: i64,
    secure: bool,
) -> Result<HeaderValue, AppError> {
    let mut cookie = format!("{name}={value}; Path=/; Max-Age={max_age}; HttpOnly; SameSite=Lax");
    if secure {
        cookie.push_str("; Secure");
    }
    HeaderValue::from_str(&cookie)
        .map_err(|e| AppError::Internal(format!("Invalid cookie value: {e}")))
}

/// Seconds until the JWT's `exp`, or the default lifetime
///
/// The signature is not checked; the backend owns validation.
pub fn token_max_age(token: &str, now: i64) -> i64 {
    jwt_expiry(token)
        .map(|exp| (exp - now).max(0))
        .unwrap_or(DEFAULT_MAX_AGE_SECS)
}

fn jwt_expiry(token: &str) -> Option<i64> {
    let payload = token.split('.').nth(1)?;
    let bytes = URL_SAFE_NO_PAD.decode(payload.trim_end_matches('=')).ok()?;
    let claims: Value = serde_json::from_slice(&bytes).ok()?;
    claims.get("exp").and_then(Value::as_i64)
}
