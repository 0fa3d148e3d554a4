//! Configuration Module
//!
//! Handles loading and managing store and gateway configuration from environment variables.

use std::env;
use std::time::Duration;

use crate::remote::DEFAULT_TIMEOUT;

/// Store and gateway configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// Versioned base URL of the remote progress service
    pub api_base_url: String,
    /// Optional bearer token sent with every remote call
    pub api_token: Option<String>,
    /// Course whose progress the store serves
    pub course_id: String,
    /// Age in milliseconds after which a cached entry is stale
    pub cache_max_age_ms: u64,
    /// Maximum number of cached entries
    pub cache_max_size: usize,
    /// Wall-clock bound on each remote call in milliseconds
    pub request_timeout_ms: u64,
    /// Local gateway port
    pub server_port: u16,
    /// Expired-entry sweep frequency in seconds
    pub cleanup_interval: u64,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `API_BASE_URL` - Progress service base URL (default: http://localhost:8000/api/v1)
    /// - `API_TOKEN` - Bearer token (default: none)
    /// - `COURSE_ID` - Course served by the store (default: "default")
    /// - `CACHE_MAX_AGE_MS` - Cache TTL in milliseconds (default: 300000)
    /// - `CACHE_MAX_SIZE` - Maximum cache entries (default: 100)
    /// - `REQUEST_TIMEOUT_MS` - Remote call timeout (default: 7000)
    /// - `SERVER_PORT` - Gateway port (default: 3000)
    /// - `CLEANUP_INTERVAL` - Sweep frequency in seconds (default: 30)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            api_base_url: env::var("API_BASE_URL")
                .ok()
                .filter(|v| !v.is_empty())
                .unwrap_or(defaults.api_base_url),
            api_token: env::var("API_TOKEN").ok().filter(|v| !v.is_empty()),
            course_id: env::var("COURSE_ID")
                .ok()
                .filter(|v| !v.is_empty())
                .unwrap_or(defaults.course_id),
            cache_max_age_ms: parse_var("CACHE_MAX_AGE_MS").unwrap_or(defaults.cache_max_age_ms),
            cache_max_size: parse_var("CACHE_MAX_SIZE").unwrap_or(defaults.cache_max_size),
            request_timeout_ms: parse_var("REQUEST_TIMEOUT_MS")
                .unwrap_or(defaults.request_timeout_ms),
            server_port: parse_var("SERVER_PORT").unwrap_or(defaults.server_port),
            cleanup_interval: parse_var("CLEANUP_INTERVAL").unwrap_or(defaults.cleanup_interval),
        }
    }

    pub fn cache_max_age(&self) -> Duration {
        Duration::from_millis(self.cache_max_age_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

fn parse_var<T: std::str::FromStr>(name: &str) -> Option<T> {
    env::var(name).ok().and_then(|v| v.parse().ok())
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: "http://localhost:8000/api/v1".to_string(),
            api_token: None,
            course_id: "default".to_string(),
            cache_max_age_ms: 5 * 60 * 1000,
            cache_max_size: 100,
            request_timeout_ms: DEFAULT_TIMEOUT.as_millis() as u64,
            server_port: 3000,
            cleanup_interval: 30,
        }
    }
}
