//! HTTP client for the EZLift backend service.

use std::time::Duration;

use axum::http::StatusCode;
use ezlift_core::{
    ContentLookup, MediaLookup,
    enrichment::{ExerciseContent, ExerciseMedia},
};
use futures::future::BoxFuture;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use tracing::{debug, warn};

use crate::error::AppError;

/// Header carrying the backend session token
pub const JWT_HEADER: &str = "x-jwt-token";

/// Backend paths tried in order for session logs
pub const WORKOUT_LOG_PATHS: &[&str] = &["/api/workout-log", "/workout-log", "/api/logs"];

pub const ROUTINE_PATH: &str = "/api/routine";

pub const VERIFY_PATH: &str = "/verify";

/// Media service path, followed by `/<exercise id>`
pub const MEDIA_PATH: &str = "/api/media/exercises";

/// CMS content path, followed by `/<exercise id>`
pub const CONTENT_PATH: &str = "/api/content/exercises";

/// Status and raw body of a backend reply
#[derive(Debug)]
pub struct BackendResponse {
    pub status: StatusCode,
    pub body: String,
}

impl BackendResponse {
    pub fn json(&self) -> Option<Value> {
        serde_json::from_str(&self.body).ok()
    }

    /// Best human-readable error message from the body
    pub fn message(&self) -> String {
        if let Some(value) = self.json() {
            for key in ["error", "message"] {
                if let Some(text) = value.get(key).and_then(Value::as_str) {
                    return text.to_string();
                }
            }
        }
        self.body.chars().take(200).collect()
    }

    /// Server errors whose body says the token was rejected
    pub fn looks_unauthorized(&self) -> bool {
        let body = self.body.to_lowercase();
        ["unauthorized", "jwt", "token expired", "invalid token"]
            .iter()
            .any(|marker| body.contains(marker))
    }
}

#[derive(Clone)]
pub struct BackendClient {
    http: reqwest::Client,
    base_url: String,
}

impl BackendClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, AppError> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Authenticated GET against `path`
    pub async fn get(
        &self,
        path: &str,
        query: &[(String, String)],
        token: &str,
    ) -> Result<BackendResponse, AppError> {
        let url = format!("{}{}", self.base_url, path);
        debug!("GET {url}");

        let response = self
            .http
            .get(&url)
            .query(query)
            .header(JWT_HEADER, token)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        Ok(BackendResponse { status, body })
    }

    /// GET the first of `paths` that the backend actually serves
    ///
    /// A 404 or 405 moves on to the next path; the last path's answer is
    /// returned whatever it is.
    pub async fn get_with_fallbacks(
        &self,
        paths: &[&str],
        query: &[(String, String)],
        token: &str,
    ) -> Result<BackendResponse, AppError> {
        let mut last = None;
        for path in paths {
            let response = self.get(path, query, token).await?;
            if matches!(
                response.status,
                StatusCode::NOT_FOUND | StatusCode::METHOD_NOT_ALLOWED
            ) {
                warn!("Backend answered {} for {path}, trying next path", response.status);
                last = Some(response);
                continue;
            }
            return Ok(response);
        }

        last.ok_or_else(|| AppError::Internal("No backend paths configured".into()))
    }

    /// Exchange a Firebase ID token for a backend session
    pub async fn verify(&self, id_token: &str) -> Result<BackendResponse, AppError> {
        let url = format!("{}{}", self.base_url, VERIFY_PATH);
        let response = self
            .http
            .post(&url)
            .json(&json!({ "idToken": id_token }))
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        Ok(BackendResponse { status, body })
    }
}

/// Media and content lookups made with one user's session token
#[derive(Clone)]
pub struct SessionLookup {
    backend: BackendClient,
    token: String,
}

impl SessionLookup {
    pub fn new(backend: &BackendClient, token: &str) -> Self {
        Self {
            backend: backend.clone(),
            token: token.to_string(),
        }
    }

    async fn fetch<T: DeserializeOwned>(self, path: String) -> ezlift_core::Result<Option<T>> {
        let response = self
            .backend
            .get(&path, &[], &self.token)
            .await
            .map_err(|e| ezlift_core::Error::Other(e.to_string()))?;

        if response.status == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !response.status.is_success() {
            return Err(ezlift_core::Error::Other(format!(
                "{path} answered {}: {}",
                response.status,
                response.message()
            )));
        }
        Ok(Some(serde_json::from_str(&response.body)?))
    }
}

impl MediaLookup for SessionLookup {
    fn media(
        &self,
        exercise_id: String,
    ) -> BoxFuture<'static, ezlift_core::Result<Option<ExerciseMedia>>> {
        Box::pin(self.clone().fetch(format!("{MEDIA_PATH}/{exercise_id}")))
    }
}

impl ContentLookup for SessionLookup {
    fn content(
        &self,
        exercise_id: String,
    ) -> BoxFuture<'static, ezlift_core::Result<Option<ExerciseContent>>> {
        Box::pin(self.clone().fetch(format!("{CONTENT_PATH}/{exercise_id}")))
    }
}
