//! Client configuration.
//!
//! The only externally meaningful setting is the BFF base URL; the request
//! timeout is optional and defaults to reqwest's behavior.

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;

use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "http://localhost:8001";

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("base URL is empty")]
    EmptyBaseUrl,
    #[error("base URL must start with http:// or https://: {0}")]
    InvalidBaseUrl(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Normalized BFF address without a trailing slash.
    pub base_url: String,
    pub request_timeout: Option<Duration>,
}

impl Config {
    /// Validate and normalize a base URL.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` when the URL is blank or not http(s).
    pub fn new(base_url: &str) -> Result<Self, ConfigError> {
        Ok(Self { base_url: normalize_base_url(base_url)?, request_timeout: None })
    }

    #[must_use]
    pub fn with_timeout_secs(mut self, secs: Option<u64>) -> Self {
        self.request_timeout = secs.filter(|s| *s > 0).map(Duration::from_secs);
        self
    }
}

impl Default for Config {
    fn default() -> Self {
        Self { base_url: DEFAULT_BASE_URL.to_owned(), request_timeout: None }
    }
}

fn normalize_base_url(raw: &str) -> Result<String, ConfigError> {
    let trimmed = raw.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        return Err(ConfigError::EmptyBaseUrl);
    }
    let has_scheme = ["http://", "https://"].iter().any(|scheme| {
        trimmed.len() > scheme.len() && trimmed.get(..scheme.len()).is_some_and(|head| head.eq_ignore_ascii_case(scheme))
    });
    if !has_scheme {
        return Err(ConfigError::InvalidBaseUrl(raw.to_owned()));
    }
    Ok(trimmed.to_owned())
}
