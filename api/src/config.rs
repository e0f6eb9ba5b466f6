//! Environment configuration
//!
//! Values come from the process environment; `main` loads an optional `.env`
//! file first. Only `YOUTUBE_API_KEY` and `DATABASE_URL` are required.

use chrono::{DateTime, Utc};
use std::str::FromStr;
use std::time::Duration;

use crate::constants::{
    DEFAULT_FETCH_INTERVAL_SECS, DEFAULT_PUBLISHED_AFTER, DEFAULT_SEARCH_KEYWORD,
    DEFAULT_YOUTUBE_API_BASE_URL, FETCH_MAX_RESULTS,
};
use crate::services::ingest::{FailurePolicy, IngestConfig};

const DEFAULT_PORT: u16 = 3000;
const DEFAULT_DATABASE_MAX_CONNECTIONS: u32 = 5;
const DEFAULT_BACKOFF_MAX_SECS: u64 = 300;
const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),
    #[error("invalid {key}={value:?}: {reason}")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },
}

pub struct AppConfig {
    pub youtube_api_key: String,
    pub youtube_api_base_url: String,
    pub database_url: String,
    pub database_max_connections: u32,
    pub port: u16,
    pub http_timeout: Duration,
    pub ingest: IngestConfig,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup; empty values count as unset
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let youtube_api_key = get("YOUTUBE_API_KEY").ok_or(ConfigError::Missing("YOUTUBE_API_KEY"))?;
        let database_url = get("DATABASE_URL").ok_or(ConfigError::Missing("DATABASE_URL"))?;

        let youtube_api_base_url = get("YOUTUBE_API_BASE_URL")
            .unwrap_or_else(|| DEFAULT_YOUTUBE_API_BASE_URL.to_string());
        let keyword = get("SEARCH_KEYWORD").unwrap_or_else(|| DEFAULT_SEARCH_KEYWORD.to_string());

        let published_after_raw =
            get("PUBLISHED_AFTER").unwrap_or_else(|| DEFAULT_PUBLISHED_AFTER.to_string());
        let published_after = DateTime::parse_from_rfc3339(&published_after_raw)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|e| ConfigError::Invalid {
                key: "PUBLISHED_AFTER",
                value: published_after_raw.clone(),
                reason: e.to_string(),
            })?;

        let port = parse_or(&get, "PORT", DEFAULT_PORT)?;
        let database_max_connections =
            parse_or(&get, "DATABASE_MAX_CONNECTIONS", DEFAULT_DATABASE_MAX_CONNECTIONS)?;
        let interval_secs = parse_or(&get, "FETCH_INTERVAL_SECS", DEFAULT_FETCH_INTERVAL_SECS)?;
        let backoff_max_secs = parse_or(&get, "INGEST_BACKOFF_MAX_SECS", DEFAULT_BACKOFF_MAX_SECS)?;
        let http_timeout_secs = parse_or(&get, "HTTP_TIMEOUT_SECS", DEFAULT_HTTP_TIMEOUT_SECS)?;

        if interval_secs == 0 {
            return Err(ConfigError::Invalid {
                key: "FETCH_INTERVAL_SECS",
                value: "0".to_string(),
                reason: "must be at least 1".to_string(),
            });
        }
        let interval = Duration::from_secs(interval_secs);

        let failure_policy = match get("INGEST_FAILURE_POLICY")
            .map(|v| v.trim().to_ascii_lowercase())
            .as_deref()
        {
            None | Some("halt") => FailurePolicy::Halt,
            Some("backoff") => FailurePolicy::Backoff {
                base: interval,
                max: Duration::from_secs(backoff_max_secs).max(interval),
            },
            Some(other) => {
                return Err(ConfigError::Invalid {
                    key: "INGEST_FAILURE_POLICY",
                    value: other.to_string(),
                    reason: "expected \"halt\" or \"backoff\"".to_string(),
                });
            }
        };

        Ok(Self {
            youtube_api_key,
            youtube_api_base_url,
            database_url,
            database_max_connections,
            port,
            http_timeout: Duration::from_secs(http_timeout_secs),
            ingest: IngestConfig {
                keyword,
                published_after,
                max_results: FETCH_MAX_RESULTS,
                interval,
                failure_policy,
            },
        })
    }
}

fn parse_or<T, G>(get: &G, key: &'static str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
    G: Fn(&str) -> Option<String>,
{
    match get(key) {
        None => Ok(default),
        Some(value) => value.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
            key,
            reason: e.to_string(),
            value,
        }),
    }
}
