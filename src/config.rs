use std::str::FromStr;
use std::time::Duration;

use dotenvy::dotenv;
use tracing::{debug, info};

use crate::error::AppError;

pub const DEFAULT_API_URL: &str = "http://localhost:8000";

fn default_max_file_size() -> usize {
    // 10 MB in bytes
    10 * 1024 * 1024
}

#[derive(Debug, Clone)]
pub struct Config {
    pub api_url: String,
    pub session_cookie: Option<String>,
    pub max_file_size: usize,
    pub overlay_delay: Duration,
    pub preview_delay: Duration,
    pub request_timeout: Option<Duration>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            session_cookie: None,
            max_file_size: default_max_file_size(),
            overlay_delay: Duration::from_millis(600),
            preview_delay: Duration::from_millis(400),
            request_timeout: None,
        }
    }
}

impl Config {
    pub fn new() -> Result<Self, AppError> {
        // Load .env file first
        dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a config from an arbitrary key lookup so tests don't touch the
    /// process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Config::default();

        let api_url = lookup("CX_API_URL")
            .or_else(|| lookup("NEXT_PUBLIC_API_URL"))
            .map(|url| url.trim().trim_end_matches('/').to_string())
            .filter(|url| !url.is_empty())
            .unwrap_or_else(|| {
                info!("CX_API_URL not set, using default: {}", DEFAULT_API_URL);
                defaults.api_url.clone()
            });

        let session_cookie = lookup("CX_SESSION_COOKIE").filter(|c| !c.trim().is_empty());

        let max_file_size = parse_or(&lookup, "CX_MAX_FILE_SIZE", defaults.max_file_size)?;
        let overlay_ms = parse_or(&lookup, "CX_OVERLAY_DELAY_MS", 600u64)?;
        let preview_ms = parse_or(&lookup, "CX_PREVIEW_DELAY_MS", 400u64)?;
        let request_timeout = match lookup("CX_REQUEST_TIMEOUT_SECS") {
            Some(raw) => Some(Duration::from_secs(parse_value("CX_REQUEST_TIMEOUT_SECS", &raw)?)),
            None => None,
        };

        debug!(%api_url, max_file_size, overlay_ms, preview_ms, "configuration loaded");

        Ok(Config {
            api_url,
            session_cookie,
            max_file_size,
            overlay_delay: Duration::from_millis(overlay_ms),
            preview_delay: Duration::from_millis(preview_ms),
            request_timeout,
        })
    }

    pub fn with_api_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = api_url.into().trim_end_matches('/').to_string();
        self
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T, AppError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        Some(raw) => parse_value(key, &raw),
        None => Ok(default),
    }
}

fn parse_value<T>(key: &str, raw: &str) -> Result<T, AppError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim()
        .parse()
        .map_err(|e| AppError::Config(format!("Invalid {} value {:?}: {}", key, raw, e)))
}
