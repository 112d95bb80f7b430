use std::sync::{Arc, Mutex, MutexGuard};

use ezlift_core::{TtlLruCache, UserDataState, config::StatsConfig};

use super::{backend::BackendClient, config::Config, error::AppError};

/// Upper bound on distinct session tokens remembered for user-state
const USER_STATE_CAPACITY: usize = 1024;

pub struct State {
    pub config: Config,
    pub backend: BackendClient,
    pub stats: StatsConfig,
    user_states: Mutex<TtlLruCache<String, UserDataState>>,
}

impl State {
    pub fn new(config: Config) -> Result<Arc<Self>, AppError> {
        let backend = BackendClient::new(&config.backend_url, config.request_timeout)?;
        let user_states = Mutex::new(TtlLruCache::new(
            USER_STATE_CAPACITY,
            config.user_state_ttl,
        ));

        Ok(Arc::new(Self {
            config,
            backend,
            stats: StatsConfig::default(),
            user_states,
        }))
    }

    pub fn cached_user_state(&self, token: &str) -> Option<UserDataState> {
        self.user_states().get(&token.to_string())
    }

    pub fn remember_user_state(&self, token: &str, state: UserDataState) {
        self.user_states().insert(token.to_string(), state);
    }

    pub fn forget_user_state(&self, token: &str) {
        self.user_states().invalidate(&token.to_string());
    }

    fn user_states(&self) -> MutexGuard<'_, TtlLruCache<String, UserDataState>> {
        // A panic while holding the lock leaves the cache usable
        self.user_states
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
