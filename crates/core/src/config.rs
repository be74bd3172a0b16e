use std::time::Duration;

use url::Url;

use crate::error::{CatalogError, Result};

/// Base URL used when nothing is configured (local development backend).
pub const DEFAULT_BASE_URL: &str = "http://localhost:8080";

/// Environment variable holding the backend base URL.
pub const BASE_URL_ENV: &str = "API_URL";

/// Environment variable holding the request timeout in seconds.
pub const TIMEOUT_ENV: &str = "API_TIMEOUT_SECS";

/// The backend waits up to 25s for ffmpeg to produce a playlist before it
/// answers `/start`, so the client timeout has to sit above that.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

pub const DEFAULT_USER_AGENT: &str = concat!("hls-catalog/", env!("CARGO_PKG_VERSION"));

/// Connection settings for the relay backend.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// Absolute base URL of the backend, without a trailing slash.
    pub base_url: String,
    /// Per-request timeout.
    pub request_timeout: Duration,
    /// `User-Agent` header sent with every request.
    pub user_agent: String,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

impl GatewayConfig {
    /// Config pointing at `base_url`, other settings at their defaults.
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: trim_base(base_url),
            ..Self::default()
        }
    }

    /// Build a config from `API_URL` / `API_TIMEOUT_SECS`.
    ///
    /// See [`from_vars`](Self::from_vars) for how the values are read.
    pub fn from_env() -> Self {
        Self::from_vars(
            std::env::var(BASE_URL_ENV).ok(),
            std::env::var(TIMEOUT_ENV).ok(),
        )
    }

    /// Build a config from raw base URL and timeout values.
    ///
    /// Missing or blank values fall back to the defaults. A timeout that is
    /// not a positive number of seconds is ignored with a warning.
    pub fn from_vars(base_url: Option<String>, timeout_secs: Option<String>) -> Self {
        let mut config = match base_url {
            Some(base) if !base.trim().is_empty() => Self::new(&base),
            _ => Self::default(),
        };

        if let Some(raw) = timeout_secs.filter(|raw| !raw.trim().is_empty()) {
            match raw.trim().parse::<u64>() {
                Ok(secs) if secs > 0 => config.request_timeout = Duration::from_secs(secs),
                _ => tracing::warn!(value = %raw, "ignoring invalid {TIMEOUT_ENV}"),
            }
        }

        config
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Check that the base URL is absolute and has a host, and that the
    /// timeout is non-zero.
    pub fn validate(&self) -> Result<()> {
        if self.request_timeout.is_zero() {
            return Err(CatalogError::validation("request timeout must be non-zero"));
        }
        let url = Url::parse(&self.base_url)?;
        if !url.has_host() {
            return Err(url::ParseError::EmptyHost.into());
        }
        Ok(())
    }
}

fn trim_base(base: &str) -> String {
    base.trim().trim_end_matches('/').to_string()
}
