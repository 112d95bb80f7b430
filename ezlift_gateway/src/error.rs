use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use reqwest::Url;
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Not authenticated")]
    Unauthorized { redirect: String },

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Backend returned {status}: {message}")]
    Backend { status: StatusCode, message: String },

    #[error("Backend unreachable: {0}")]
    Upstream(#[from] reqwest::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// 401 that sends the browser to login and back to `original_path`
    pub fn unauthorized(original_path: &str) -> Self {
        AppError::Unauthorized {
            redirect: login_redirect(original_path),
        }
    }
}

/// `/login?redirect=<original_path>`, with the path query-encoded
pub fn login_redirect(original_path: &str) -> String {
    let mut url = match Url::parse("http://localhost/login") {
        Ok(url) => url,
        Err(_) => return "/login".to_string(),
    };
    url.query_pairs_mut().append_pair("redirect", original_path);

    match url.query() {
        Some(query) => format!("{}?{}", url.path(), query),
        None => url.path().to_string(),
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::Unauthorized { .. } => StatusCode::UNAUTHORIZED,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Backend { status, .. } => *status,
            AppError::Upstream(_) => StatusCode::BAD_GATEWAY,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = match &self {
            AppError::Unauthorized { redirect } => {
                json!({ "error": self.to_string(), "redirect": redirect })
            }
            _ => json!({ "error": self.to_string() }),
        };

        (status, Json(body)).into_response()
    }
}
