use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

use crate::discourse::{MonitorParams, QueryContext};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),
    #[error("invalid value for {name}: {message}")]
    InvalidValue { name: String, message: String },
    #[error("failed to parse {name} as integer: {source}")]
    ParseInt {
        name: String,
        #[source]
        source: std::num::ParseIntError,
    },
}

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    // Forum
    pub base_url: String,
    pub api_key: Option<String>,
    pub api_username: Option<String>,
    pub request_timeout: Duration,
    pub batch_size: u32,

    // Monitor
    pub monitor_category: Option<i64>,
    pub monitor_tag: Option<String>,
    pub poll_interval: Duration,
    pub state_path: PathBuf,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if required environment variables are missing or invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            // Forum
            base_url: required_env("DISCOURSE_BASE_URL")?,
            api_key: optional_env("DISCOURSE_API_KEY"),
            api_username: optional_env("DISCOURSE_API_USERNAME"),
            request_timeout: Duration::from_secs(parse_env_u64("REQUEST_TIMEOUT_SECS", 30)?),
            batch_size: parse_env_u32("BATCH_SIZE", 30)?,

            // Monitor
            monitor_category: parse_env_opt_i64("MONITOR_CATEGORY")?,
            monitor_tag: optional_env("MONITOR_TAG"),
            poll_interval: Duration::from_secs(parse_env_u64("POLL_INTERVAL_SECS", 60)?),
            state_path: PathBuf::from(env_or_default(
                "STATE_PATH",
                "./data/monitor-state.json",
            )),
        })
    }

    /// Validate that the configuration is usable.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.base_url.is_empty() {
            return Err(ConfigError::InvalidValue {
                name: "DISCOURSE_BASE_URL".to_string(),
                message: "cannot be empty".to_string(),
            });
        }
        if let Err(e) = url::Url::parse(&self.base_url) {
            return Err(ConfigError::InvalidValue {
                name: "DISCOURSE_BASE_URL".to_string(),
                message: e.to_string(),
            });
        }
        if self.batch_size == 0 {
            return Err(ConfigError::InvalidValue {
                name: "BATCH_SIZE".to_string(),
                message: "must be at least 1".to_string(),
            });
        }
        if self.request_timeout.is_zero() {
            return Err(ConfigError::InvalidValue {
                name: "REQUEST_TIMEOUT_SECS".to_string(),
                message: "must be at least 1".to_string(),
            });
        }
        Ok(())
    }

    /// Build the per-call query context handed to the ingestion operations.
    #[must_use]
    pub fn query_context(&self) -> QueryContext {
        QueryContext {
            base_url: self.base_url.clone(),
            timeout: self.request_timeout,
            batch_size: self.batch_size,
            api_key: self.api_key.clone(),
            api_username: self.api_username.clone(),
        }
    }

    #[must_use]
    pub fn monitor_params(&self) -> MonitorParams {
        MonitorParams {
            category: self.monitor_category,
            tag: self.monitor_tag.clone(),
        }
    }
}

fn required_env(name: &str) -> Result<String, ConfigError> {
    std::env::var(name).map_err(|_| ConfigError::MissingEnvVar(name.to_string()))
}

fn optional_env(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|s| !s.is_empty())
}

fn env_or_default(name: &str, default: &str) -> String {
    std::env::var(name)
        .ok()
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| default.to_string())
}

fn parse_env_u64(name: &str, default: u64) -> Result<u64, ConfigError> {
    match std::env::var(name) {
        Ok(val) if !val.is_empty() => val.parse().map_err(|e| ConfigError::ParseInt {
            name: name.to_string(),
            source: e,
        }),
        _ => Ok(default),
    }
}

fn parse_env_u32(name: &str, default: u32) -> Result<u32, ConfigError> {
    match std::env::var(name) {
        Ok(val) if !val.is_empty() => val.parse().map_err(|e| ConfigError::ParseInt {
            name: name.to_string(),
            source: e,
        }),
        _ => Ok(default),
    }
}

fn parse_env_opt_i64(name: &str) -> Result<Option<i64>, ConfigError> {
    optional_env(name)
        .map(|val| {
            val.parse().map_err(|e| ConfigError::ParseInt {
                name: name.to_string(),
                source: e,
            })
        })
        .transpose()
}
