//! Configuration file support for EZLift.
//!
//! Configuration is loaded from `$XDG_CONFIG_HOME/ezlift/config.toml`.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Application configuration
#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub data: DataConfig,

    #[serde(default)]
    pub stats: StatsConfig,

    #[serde(default)]
    pub cache: CacheConfig,
}

/// Data storage configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DataConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
        }
    }
}

/// Dashboard statistics parameters
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct StatsConfig {
    #[serde(default = "default_personal_record_limit")]
    pub personal_record_limit: usize,

    /// Records set within this many days are flagged as recent
    #[serde(default = "default_recent_record_days")]
    pub recent_record_days: i64,
}

impl Default for StatsConfig {
    fn default() -> Self {
        Self {
            personal_record_limit: default_personal_record_limit(),
            recent_record_days: default_recent_record_days(),
        }
    }
}

/// Cache lifetimes and sizes
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CacheConfig {
    #[serde(default = "default_exercise_ttl_secs")]
    pub exercise_ttl_secs: u64,

    #[serde(default = "default_search_ttl_secs")]
    pub search_ttl_secs: u64,

    #[serde(default = "default_search_capacity")]
    pub search_capacity: usize,

    #[serde(default = "default_search_debounce_ms")]
    pub search_debounce_ms: u64,

    #[serde(default = "default_user_state_ttl_secs")]
    pub user_state_ttl_secs: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            exercise_ttl_secs: default_exercise_ttl_secs(),
            search_ttl_secs: default_search_ttl_secs(),
            search_capacity: default_search_capacity(),
            search_debounce_ms: default_search_debounce_ms(),
            user_state_ttl_secs: default_user_state_ttl_secs(),
        }
    }
}

impl CacheConfig {
    pub fn exercise_ttl(&self) -> Duration {
        Duration::from_secs(self.exercise_ttl_secs)
    }

    pub fn search_ttl(&self) -> Duration {
        Duration::from_secs(self.search_ttl_secs)
    }

    pub fn search_debounce(&self) -> Duration {
        Duration::from_millis(self.search_debounce_ms)
    }

    pub fn user_state_ttl(&self) -> Duration {
        Duration::from_secs(self.user_state_ttl_secs)
    }
}

/// Upper bound for `stats.recent_record_days` (about a century)
const MAX_RECENT_RECORD_DAYS: i64 = 36_500;

// Default value functions
fn default_data_dir() -> PathBuf {
    let base = dirs::data_local_dir().unwrap_or_else(|| {
        let home = std::env::var("HOME")
            .expect("HOME environment variable not set");
        PathBuf::from(home).join(".local/share")
    });
    base.join("ezlift")
}

fn default_personal_record_limit() -> usize {
    5
}

fn default_recent_record_days() -> i64 {
    7
}

fn default_exercise_ttl_secs() -> u64 {
    10 * 60
}

fn default_search_ttl_secs() -> u64 {
    5 * 60
}

fn default_search_capacity() -> usize {
    50
}

fn default_search_debounce_ms() -> u64 {
    300
}

fn default_user_state_ttl_secs() -> u64 {
    10 * 60
}

impl Config {
    /// Load configuration from the standard config path
    pub fn load() -> Result<Self> {
        let config_path = Self::default_config_path();
        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            tracing::info!(
                "No config file found at {:?}, using defaults",
                config_path
            );
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        config.validate()?;
        tracing::info!("Loaded config from {:?}", path);
        Ok(config)
    }

    /// Reject values that would make the statistics meaningless
    pub fn validate(&self) -> Result<()> {
        if self.stats.personal_record_limit == 0 {
            return Err(Error::Config(
                "stats.personal_record_limit must be at least 1".into(),
            ));
        }
        if !(0..=MAX_RECENT_RECORD_DAYS).contains(&self.stats.recent_record_days) {
            return Err(Error::Config(format!(
                "stats.recent_record_days must be between 0 and {}",
                MAX_RECENT_RECORD_DAYS
            )));
        }
        if self.cache.search_capacity == 0 {
            return Err(Error::Config(
                "cache.search_capacity must be at least 1".into(),
            ));
        }
        Ok(())
    }

    /// Get the default config file path
    pub fn default_config_path() -> PathBuf {
        let base = dirs::config_dir().unwrap_or_else(|| {
            let home = std::env::var("HOME")
                .expect("HOME environment variable not set");
            PathBuf::from(home).join(".config")
        });
        base.join("ezlift").join("config.toml")
    }

    /// Path of the cached exercise library inside the data directory
    pub fn exercise_cache_path(&self) -> PathBuf {
        self.data.data_dir.join("cache").join("exercises.json")
    }

    /// Save the current configuration to a specific path
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(path, contents)?;
        tracing::info!("Saved config to {:?}", path);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.stats.personal_record_limit, 5);
        assert_eq!(config.stats.recent_record_days, 7);
        assert_eq!(config.cache.search_debounce(), Duration::from_millis(300));
        assert_eq!(config.cache.user_state_ttl(), Duration::from_secs(600));
    }

    #[test]
    fn test_partial_config() {
        let toml_str = r#"
[stats]
personal_record_limit = 3
"#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.stats.personal_record_limit, 3);
        assert_eq!(config.stats.recent_record_days, 7); // default
        assert_eq!(config.cache.search_capacity, 50);
    }

    #[test]
    fn test_zero_record_limit_rejected() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("config.toml");
        std::fs::write(&path, "[stats]\npersonal_record_limit = 0\n").unwrap();

        match Config::load_from(&path) {
            Err(Error::Config(msg)) => assert!(msg.contains("personal_record_limit")),
            other => panic!("Expected config error, got {:?}", other),
        }
    }

    #[test]
    fn test_recent_record_days_bounded() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("config.toml");

        std::fs::write(&path, "[stats]\nrecent_record_days = 9223372036854775807\n").unwrap();
        match Config::load_from(&path) {
            Err(Error::Config(msg)) => assert!(msg.contains("recent_record_days")),
            other => panic!("Expected config error, got {:?}", other),
        }

        std::fs::write(&path, "[stats]\nrecent_record_days = -1\n").unwrap();
        assert!(Config::load_from(&path).is_err());

        std::fs::write(&path, "[stats]\nrecent_record_days = 30\n").unwrap();
        assert_eq!(Config::load_from(&path).unwrap().stats.recent_record_days, 30);
    }

    #[test]
    fn test_save_and_reload() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("nested").join("config.toml");

        let mut config = Config::default();
        config.cache.search_ttl_secs = 42;
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.cache.search_ttl_secs, 42);
        assert_eq!(loaded.data.data_dir, config.data.data_dir);
    }
}
