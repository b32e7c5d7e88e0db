use std::time::Duration;

use thiserror::Error;

pub const DEFAULT_API_URL: &str = "https://lanyard.org/api/v1";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

pub const API_URL_ENV: &str = "LANYARD_API_URL";
pub const TIMEOUT_ENV: &str = "LANYARD_TIMEOUT_SECS";

/// Lanyard API client configuration
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClientConfig {
    /// Base URL, without a trailing slash
    pub url: String,
    /// Per-request timeout
    pub timeout: Duration,
    pub user_agent: String,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid {var}: {value:?}")]
    InvalidValue { var: &'static str, value: String },
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_API_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
            user_agent: concat!("lanyard-rs/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl ClientConfig {
    pub fn with_url(url: impl Into<String>) -> Self {
        Self::default().url(url)
    }

    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Reads overrides from `LANYARD_API_URL` and `LANYARD_TIMEOUT_SECS`.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(url) = lookup(API_URL_ENV).filter(|u| !u.is_empty()) {
            config = config.url(url);
        }

        if let Some(secs) = lookup(TIMEOUT_ENV).filter(|s| !s.is_empty()) {
            let secs: u64 = secs.parse().map_err(|_| ConfigError::InvalidValue {
                var: TIMEOUT_ENV,
                value: secs.clone(),
            })?;
            config = config.timeout(Duration::from_secs(secs));
        }

        Ok(config)
    }
}
