//! HTTP gateway between the EZLift web client and the backend API.
//!
//! # Responsibilities
//! - Exchange a Firebase ID token for a backend session stored in HttpOnly cookies
//! - Forward routine and session-log reads with the session token attached
//! - Smooth over backend quirks: missing log endpoints, 404 for empty lists,
//!   token rejections reported as server errors, enveloped list payloads
//! - Classify users as new or existing, cached per session
//! - Serve dashboard statistics computed by `ezlift_core`
//! - Combine exercise media and CMS content into one detail response
//!
//! Every 401 carries a `redirect` to `/login?redirect=<page>` so the client
//! can send the user back where they were after signing in again.
//!
//! # Configuration
//!
//! | Variable | Default |
//! |---|---|
//! | `EZLIFT_PORT` | `3000` |
//! | `EZLIFT_BACKEND_URL` | `http://localhost:8080` |
//! | `EZLIFT_PRODUCTION` | `false` |
//! | `EZLIFT_USER_STATE_TTL_SECS` | `600` |
//! | `EZLIFT_REQUEST_TIMEOUT_SECS` | `15` |
//! | `EZLIFT_ALLOWED_ORIGIN` | unset |

use std::{sync::Arc, time::Duration};

use axum::{
    Router,
    http::{HeaderValue, Method, Request, header::CONTENT_TYPE},
    routing::get,
};
#[cfg(unix)]
use tokio::signal::unix::{SignalKind, signal};
use tokio::{net::TcpListener, signal::ctrl_c};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, info_span, warn};
use uuid::Uuid;

pub mod auth;
pub mod backend;
pub mod config;
pub mod error;
pub mod routes;
pub mod state;

use auth::{create_session_handler, delete_session_handler, session_status_handler};
use config::Config;
use error::AppError;
use routes::{
    dashboard_handler, exercise_details_handler, user_state_handler, workout_handler,
    workout_log_handler,
};
use state::State;

pub fn build_router(state: Arc<State>) -> Router {
    let mut cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE])
        .max_age(Duration::from_secs(60 * 60));

    if let Some(origin) = &state.config.allowed_origin {
        match origin.parse::<HeaderValue>() {
            Ok(origin) => cors = cors.allow_origin(origin).allow_credentials(true),
            Err(e) => warn!("Ignoring invalid EZLIFT_ALLOWED_ORIGIN {origin:?}: {e}"),
        }
    }

    let trace = TraceLayer::new_for_http().make_span_with(|request: &Request<_>| {
        info_span!(
            "request",
            id = %Uuid::new_v4(),
            method = %request.method(),
            path = %request.uri().path(),
        )
    });

    Router::new()
        .route(
            "/api/auth/session",
            get(session_status_handler)
                .post(create_session_handler)
                .delete(delete_session_handler),
        )
        .route("/api/workout", get(workout_handler))
        .route("/api/workout-log", get(workout_log_handler))
        .route("/api/user-state", get(user_state_handler))
        .route("/api/dashboard", get(dashboard_handler))
        .route("/api/exercises/{id}/details", get(exercise_details_handler))
        .layer(trace)
        .layer(cors)
        .with_state(state)
}

pub async fn start_server(config: Config) -> Result<(), AppError> {
    info!("Initializing state...");
    let address = format!("0.0.0.0:{}", config.port);
    let state = State::new(config)?;

    info!("Starting server...");
    let app = build_router(state);

    info!("Binding to {address}");
    let listener = TcpListener::bind(&address)
        .await
        .map_err(|e| AppError::Internal(format!("Failed to bind {address}: {e}")))?;
    info!("Server running on {address}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| AppError::Internal(format!("Server error: {e}")))?;

    info!("Server shut down");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {e}");
            std::future::pending::<()>().await;
        }

        info!("Received Ctrl+C, shutting down");
    };

    #[cfg(unix)]
    let terminate = async {
        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                warn!("Failed to install terminate handler: {e}");
                std::future::pending::<()>().await;
            }
        }

        info!("Received terminate signal, shutting down");
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
