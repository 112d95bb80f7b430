use std::{env, fmt::Display, str::FromStr, time::Duration};

use ezlift_core::config::CacheConfig;
use tracing::{info, warn};

/// Gateway settings, read from the environment
#[derive(Clone, Debug)]
pub struct Config {
    pub port: u16,
    pub backend_url: String,
    /// Adds `Secure` to session cookies
    pub production: bool,
    pub user_state_ttl: Duration,
    pub request_timeout: Duration,
    pub allowed_origin: Option<String>,
}

impl Config {
    pub fn load() -> Self {
        let cache = CacheConfig::default();
        Self {
            port: try_load("EZLIFT_PORT", 3000),
            backend_url: try_load("EZLIFT_BACKEND_URL", "http://localhost:8080".to_string())
                .trim_end_matches('/')
                .to_string(),
            production: try_load("EZLIFT_PRODUCTION", false),
            user_state_ttl: Duration::from_secs(try_load(
                "EZLIFT_USER_STATE_TTL_SECS",
                cache.user_state_ttl_secs,
            )),
            request_timeout: Duration::from_secs(try_load("EZLIFT_REQUEST_TIMEOUT_SECS", 15)),
            allowed_origin: var("EZLIFT_ALLOWED_ORIGIN").ok(),
        }
    }

    /// Local settings pointing at `backend_url`, used by tests and tooling
    pub fn for_backend(backend_url: &str) -> Self {
        Self {
            port: 0,
            backend_url: backend_url.trim_end_matches('/').to_string(),
            production: false,
            user_state_ttl: CacheConfig::default().user_state_ttl(),
            request_timeout: Duration::from_secs(15),
            allowed_origin: None,
        }
    }
}

fn var(key: &str) -> Result<String, ()> {
    env::var(key).map_err(|_| {
        info!("Environment variable {key} not set");
    })
}

fn try_load<T: FromStr + Display>(key: &str, default: T) -> T
where
    T::Err: Display,
{
    match var(key) {
        Ok(raw) => raw.parse().unwrap_or_else(|e| {
            warn!("Invalid {key} value {raw:?}: {e}, using default: {default}");
            default
        }),
        Err(()) => {
            info!("{key} not set, using default: {default}");
            default
        }
    }
}
