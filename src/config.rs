//! Client configuration
//!
//! Defaults, then an optional TOML file (`ETESTI_CONFIG`), then env overrides.

use crate::error::{AppResult, ConfigError};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

/// Client configuration
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// REST API base URL (`exams`, `questions`, ... hang off it)
    pub api_base_url: String,
    /// Per-request timeout in seconds
    pub request_timeout_secs: u64,
    // --- identity provider ---
    pub firebase_api_key: String,
    pub identity_base_url: String,
    /// File standing in for browser local storage
    pub storage_path: String,
    /// Directory holding `schools.json` and `cities.json`
    pub reference_data_dir: String,
    /// Max entries per entity-cache map
    pub cache_capacity: usize,
    /// Session timer cadence
    pub tick_interval_ms: u64,
    /// Grace window after the timer hits zero
    pub auto_submit_grace_secs: u64,
    /// Print request payloads and per-tick timer logs
    pub verbose_logging: bool,
    /// Fallback tracing filter when `RUST_LOG` is unset
    pub log_filter: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: "http://localhost:3000/api".to_string(),
            request_timeout_secs: 30,
            firebase_api_key: String::new(),
            identity_base_url: "https://identitytoolkit.googleapis.com/v1".to_string(),
            storage_path: "etesti_storage.json".to_string(),
            reference_data_dir: "public".to_string(),
            cache_capacity: 64,
            tick_interval_ms: 1000,
            auto_submit_grace_secs: 10,
            verbose_logging: false,
            log_filter: "info".to_string(),
        }
    }
}

impl Config {
    /// Defaults overridden by environment variables.
    ///
    /// Unparsable numeric/bool values keep the default.
    pub fn from_env() -> Self {
        Self::default().with_env_overrides()
    }

    /// Reads `ETESTI_CONFIG` (TOML) when set, then applies env overrides.
    pub fn load() -> AppResult<Self> {
        let base = match std::env::var("ETESTI_CONFIG") {
            Ok(path) => Self::from_toml_file(Path::new(&path))?,
            Err(_) => Self::default(),
        };
        Ok(base.with_env_overrides())
    }

    /// Parses a TOML file; missing keys take their defaults.
    pub fn from_toml_file(path: &Path) -> AppResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::FileRead {
            path: path.display().to_string(),
            source: e,
        })?;
        Self::from_toml_str(&content).map_err(|e| match e {
            crate::error::AppError::Config(ConfigError::TomlParse { source, .. }) => {
                ConfigError::TomlParse {
                    path: path.display().to_string(),
                    source,
                }
                .into()
            }
            other => other,
        })
    }

    pub fn from_toml_str(content: &str) -> AppResult<Self> {
        toml::from_str(content).map_err(|e| {
            ConfigError::TomlParse {
                path: String::new(),
                source: e,
            }
            .into()
        })
    }

    fn with_env_overrides(self) -> Self {
        Self {
            api_base_url: env_string("ETESTI_API_BASE_URL").unwrap_or(self.api_base_url),
            request_timeout_secs: env_parse("ETESTI_REQUEST_TIMEOUT_SECS")
                .unwrap_or(self.request_timeout_secs),
            firebase_api_key: env_string("ETESTI_FIREBASE_API_KEY")
                .unwrap_or(self.firebase_api_key),
            identity_base_url: env_string("ETESTI_IDENTITY_BASE_URL")
                .unwrap_or(self.identity_base_url),
            storage_path: env_string("ETESTI_STORAGE_PATH").unwrap_or(self.storage_path),
            reference_data_dir: env_string("ETESTI_REFERENCE_DATA_DIR")
                .unwrap_or(self.reference_data_dir),
            cache_capacity: env_parse("ETESTI_CACHE_CAPACITY").unwrap_or(self.cache_capacity),
            tick_interval_ms: env_parse("ETESTI_TICK_INTERVAL_MS").unwrap_or(self.tick_interval_ms),
            auto_submit_grace_secs: env_parse("ETESTI_AUTO_SUBMIT_GRACE_SECS")
                .unwrap_or(self.auto_submit_grace_secs),
            verbose_logging: env_parse("ETESTI_VERBOSE_LOGGING").unwrap_or(self.verbose_logging),
            log_filter: self.log_filter,
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms.max(1))
    }
}

fn env_string(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.is_empty())
}

fn env_parse<T: std::str::FromStr>(name: &str) -> Option<T> {
    std::env::var(name).ok().and_then(|v| v.parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let config = Config::default();
        assert_eq!(config.request_timeout_secs, 30);
        assert_eq!(config.auto_submit_grace_secs, 10);
        assert_eq!(config.tick_interval(), Duration::from_secs(1));
    }

    #[test]
    fn toml_missing_keys_fall_back_to_defaults() {
        let config = Config::from_toml_str(
            r#"
            api_base_url = "https://api.e-testi.rs"
            cache_capacity = 8
            "#,
        )
        .unwrap();

        assert_eq!(config.api_base_url, "https://api.e-testi.rs");
        assert_eq!(config.cache_capacity, 8);
        assert_eq!(config.request_timeout_secs, 30);
        assert_eq!(config.storage_path, "etesti_storage.json");
    }

    #[test]
    fn malformed_toml_is_a_config_error() {
        let err = Config::from_toml_str("cache_capacity = \"lots\"").unwrap_err();
        assert!(matches!(
            err,
            crate::error::AppError::Config(ConfigError::TomlParse { .. })
        ));
    }
}
