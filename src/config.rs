//! Configuration file handling
//!
//! Settings live in `config.toml` in the XDG config directory
//! (`~/.config/courtside/` on Linux). Every field is optional; a missing file
//! means all defaults.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use serde::Deserialize;
use thiserror::Error;

use crate::data::DEFAULT_LEAGUES;
use crate::loader::{FetchMode, RetryPolicy, DEFAULT_BASE_DELAY, DEFAULT_MAX_RETRIES};
use crate::refresh::RefreshConfig;

/// Default content API endpoint
pub const DEFAULT_API_BASE_URL: &str = "https://api.courtside.app/v1";

/// Errors that can occur while loading configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The config file exists but couldn't be read
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The config file isn't valid TOML or has wrongly typed fields
    #[error("Failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    /// The values parse but don't make sense together
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Top-level configuration
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Base URL of the content API
    pub api_base_url: String,
    /// Leagues available in the UI, in display order
    pub leagues: Vec<String>,
    /// League shown on startup
    pub default_league: String,
    /// Per-request timeout in seconds
    pub request_timeout_secs: u64,
    /// Whether loads of the same league may fetch concurrently
    pub fetch_mode: FetchMode,
    pub retry: RetrySettings,
    pub cache: CacheSettings,
    pub refresh: RefreshSettings,
}

/// `[retry]` section
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct RetrySettings {
    /// Retries after the first attempt (default: 2)
    pub max_retries: u32,
    /// Linear backoff unit in milliseconds (default: 500)
    pub base_delay_ms: u64,
}

/// `[cache]` section
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct CacheSettings {
    /// Minutes a saved collection counts as fresh (default: 5)
    pub ttl_minutes: u32,
    /// Hours after which an entry is evicted (default: 168)
    pub max_stale_hours: u32,
}

/// `[refresh]` section
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct RefreshSettings {
    /// Whether the visible league reloads periodically (default: true)
    pub enabled: bool,
    /// Seconds between automatic reloads (default: 60)
    pub interval_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            leagues: DEFAULT_LEAGUES.iter().map(|l| l.to_string()).collect(),
            default_league: DEFAULT_LEAGUES[0].to_string(),
            request_timeout_secs: 10,
            fetch_mode: FetchMode::default(),
            retry: RetrySettings::default(),
            cache: CacheSettings::default(),
            refresh: RefreshSettings::default(),
        }
    }
}

impl Default for RetrySettings {
    fn default() -> Self {
        Self {
            max_retries: DEFAULT_MAX_RETRIES,
            base_delay_ms: DEFAULT_BASE_DELAY.as_millis() as u64,
        }
    }
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            ttl_minutes: 5,
            max_stale_hours: 24 * 7,
        }
    }
}

impl Default for RefreshSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            interval_secs: 60,
        }
    }
}

impl RetrySettings {
    pub fn policy(&self) -> RetryPolicy {
        RetryPolicy::new(self.max_retries, Duration::from_millis(self.base_delay_ms))
    }
}

impl CacheSettings {
    pub fn ttl(&self) -> chrono::Duration {
        chrono::Duration::minutes(i64::from(self.ttl_minutes))
    }

    pub fn max_stale(&self) -> chrono::Duration {
        chrono::Duration::hours(i64::from(self.max_stale_hours))
    }
}

impl RefreshSettings {
    pub fn refresh_config(&self) -> RefreshConfig {
        RefreshConfig {
            interval: Duration::from_secs(self.interval_secs),
            enabled: self.enabled,
        }
    }
}

impl Config {
    /// Path of the config file in the XDG config directory
    pub fn default_path() -> Option<PathBuf> {
        let project_dirs = ProjectDirs::from("", "", "courtside")?;
        Some(project_dirs.config_dir().join("config.toml"))
    }

    /// Loads configuration
    ///
    /// An explicit `path` must exist. Without one the default location is used,
    /// and a missing file there yields the defaults.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let config = match path {
            Some(path) => Self::from_file(path)?,
            None => match Self::default_path() {
                Some(path) if path.exists() => Self::from_file(&path)?,
                _ => Self::default(),
            },
        };
        config.validate()?;
        Ok(config)
    }

    /// Reads and parses a config file without validating it
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Checks the values make sense together
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.leagues.is_empty() {
            return Err(ConfigError::Invalid("at least one league is required".to_string()));
        }
        if self.leagues.iter().any(|l| l.trim().is_empty()) {
            return Err(ConfigError::Invalid("league ids must not be empty".to_string()));
        }
        if !self.leagues.contains(&self.default_league) {
            return Err(ConfigError::Invalid(format!(
                "default_league '{}' is not one of the configured leagues",
                self.default_league
            )));
        }
        if self.request_timeout_secs == 0 {
            return Err(ConfigError::Invalid("request_timeout_secs must be positive".to_string()));
        }
        if self.refresh.enabled && self.refresh.interval_secs == 0 {
            return Err(ConfigError::Invalid("refresh interval_secs must be positive".to_string()));
        }
        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Case-insensitive match of a league id against the configured leagues
    pub fn find_league(&self, requested: &str) -> Option<&str> {
        self.leagues
            .iter()
            .find(|l| l.eq_ignore_ascii_case(requested))
            .map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write_config(contents: &str) -> (TempDir, PathBuf) {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let path = temp_dir.path().join("config.toml");
        fs::write(&path, contents).expect("Failed to write config");
        (temp_dir, path)
    }

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.leagues, vec!["NBA", "NFL", "MLB", "NHL"]);
        assert_eq!(config.default_league, "NBA");
        assert_eq!(config.fetch_mode, FetchMode::Concurrent);
        assert_eq!(config.retry.policy(), RetryPolicy::default());
        assert_eq!(config.cache.ttl(), chrono::Duration::minutes(5));
        assert!(config.refresh.enabled);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_empty_file_yields_defaults() {
        let (_dir, path) = write_config("");
        let config = Config::load(Some(&path)).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_partial_file_overrides_only_given_fields() {
        let (_dir, path) = write_config(
            r#"
api_base_url = "http://localhost:8080"
fetch_mode = "single_flight"

[retry]
max_retries = 4

[refresh]
enabled = false
"#,
        );

        let config = Config::load(Some(&path)).unwrap();

        assert_eq!(config.api_base_url, "http://localhost:8080");
        assert_eq!(config.fetch_mode, FetchMode::SingleFlight);
        assert_eq!(config.retry.max_retries, 4);
        assert_eq!(config.retry.base_delay_ms, 500);
        assert!(!config.refresh.enabled);
        assert_eq!(config.refresh.interval_secs, 60);
        assert_eq!(config.leagues.len(), 4);
    }

    #[test]
    fn test_missing_explicit_file_is_an_error() {
        let temp_dir = TempDir::new().unwrap();
        let result = Config::load(Some(&temp_dir.path().join("nope.toml")));
        assert!(matches!(result, Err(ConfigError::Read { .. })));
    }

    #[test]
    fn test_malformed_file_is_a_parse_error() {
        let (_dir, path) = write_config("leagues = \"NBA\"");
        let result = Config::load(Some(&path));
        assert!(matches!(result, Err(ConfigError::Parse { .. })));
    }

    #[test]
    fn test_default_league_must_be_configured() {
        let (_dir, path) = write_config(
            r#"
leagues = ["EPL", "MLS"]
default_league = "NBA"
"#,
        );

        let err = Config::load(Some(&path)).unwrap_err();

        assert!(err.to_string().contains("default_league"));
    }

    #[test]
    fn test_empty_leagues_rejected() {
        let config = Config {
            leagues: Vec::new(),
            ..Config::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_find_league_is_case_insensitive() {
        let config = Config::default();
        assert_eq!(config.find_league("nhl"), Some("NHL"));
        assert_eq!(config.find_league("EPL"), None);
    }

    #[test]
    fn test_refresh_config_conversion() {
        let settings = RefreshSettings {
            enabled: true,
            interval_secs: 30,
        };
        let refresh = settings.refresh_config();
        assert_eq!(refresh.interval, Duration::from_secs(30));
        assert!(refresh.enabled);
    }
}
