//! Process configuration read from the environment

use crate::generator::PollPolicy;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_GENERATOR_URL: &str = "http://localhost:8000";
pub const DEFAULT_TELEGRAM_API_URL: &str = "https://api.telegram.org";
pub const DEFAULT_LOG_FILE: &str = "logs.log";
const DEFAULT_POLL_INTERVAL_MS: u64 = 1000;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} is not set")]
    Missing(&'static str),
    #[error("{name} has an invalid value {value:?}: {reason}")]
    Invalid {
        name: &'static str,
        value: String,
        reason: String,
    },
}

#[derive(Clone)]
pub struct Config {
    pub api_token: String,
    pub generator_url: String,
    pub telegram_api_url: String,
    pub poll_policy: PollPolicy,
}

// Keeps the token out of logs
impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("api_token", &"<redacted>")
            .field("generator_url", &self.generator_url)
            .field("telegram_api_url", &self.telegram_api_url)
            .field("poll_policy", &self.poll_policy)
            .finish()
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let api_token = lookup("API_TOKEN")
            .filter(|token| !token.trim().is_empty())
            .ok_or(ConfigError::Missing("API_TOKEN"))?;

        let generator_url = lookup("GENERATOR_URL")
            .filter(|url| !url.is_empty())
            .unwrap_or_else(|| DEFAULT_GENERATOR_URL.to_string());
        let telegram_api_url = lookup("TELEGRAM_API_URL")
            .filter(|url| !url.is_empty())
            .unwrap_or_else(|| DEFAULT_TELEGRAM_API_URL.to_string());

        let interval_ms = parse_number::<u64>(&lookup, "POLL_INTERVAL_MS")?
            .unwrap_or(DEFAULT_POLL_INTERVAL_MS);
        if interval_ms == 0 {
            return Err(ConfigError::Invalid {
                name: "POLL_INTERVAL_MS",
                value: "0".to_string(),
                reason: "must be positive".to_string(),
            });
        }
        let max_attempts = parse_number::<u32>(&lookup, "GENERATOR_MAX_POLLS")?;
        if max_attempts == Some(0) {
            return Err(ConfigError::Invalid {
                name: "GENERATOR_MAX_POLLS",
                value: "0".to_string(),
                reason: "must be positive; leave unset to poll without limit".to_string(),
            });
        }

        Ok(Self {
            api_token,
            generator_url,
            telegram_api_url,
            poll_policy: PollPolicy {
                interval: Duration::from_millis(interval_ms),
                max_attempts,
            },
        })
    }
}

fn parse_number<T>(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &'static str,
) -> Result<Option<T>, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(name).filter(|raw| !raw.trim().is_empty()) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|e: T::Err| ConfigError::Invalid {
                name,
                value: raw,
                reason: e.to_string(),
            }),
    }
}

/// Log file path; `LOG_FILE=""` turns file logging off
pub fn log_file_from_env() -> Option<PathBuf> {
    log_file_from(std::env::var("LOG_FILE").ok())
}

fn log_file_from(value: Option<String>) -> Option<PathBuf> {
    match value {
        None => Some(PathBuf::from(DEFAULT_LOG_FILE)),
        Some(path) if path.is_empty() => None,
        Some(path) => Some(PathBuf::from(path)),
    }
}
