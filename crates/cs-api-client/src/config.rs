//! Backend API client configuration.
//!
//! Points at the production backend by default. Override via environment
//! variables or explicit construction for staging and tests.

use url::Url;

use cs_core::UserId;

/// Production backend base URL.
pub const DEFAULT_API_URL: &str = "https://api.corona-school.de/api/";

/// Default request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Configuration for connecting to the backend.
///
/// Custom `Debug` implementation redacts the `api_token` field
/// to prevent credential leakage in log output.
#[derive(Clone)]
pub struct ApiConfig {
    /// Base URL all endpoint paths are appended to. Always ends in `/`.
    pub base_url: Url,
    /// Session token sent in the `token` header.
    pub api_token: String,
    /// The authenticated user.
    pub user_id: UserId,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl std::fmt::Debug for ApiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiConfig")
            .field("base_url", &self.base_url)
            .field("api_token", &"[REDACTED]")
            .field("user_id", &self.user_id)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl ApiConfig {
    /// Build a configuration from explicit values.
    pub fn new(base_url: Url, api_token: &str, user_id: UserId) -> Result<Self, ConfigError> {
        if api_token.trim().is_empty() {
            return Err(ConfigError::MissingToken);
        }
        Ok(Self {
            base_url: with_trailing_slash(base_url),
            api_token: api_token.to_string(),
            user_id,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        })
    }

    /// Load configuration from environment variables.
    ///
    /// Variables:
    /// - `CS_API_URL` (default: `https://api.corona-school.de/api/`)
    /// - `CS_API_TOKEN` (required)
    /// - `CS_USER_ID` (required)
    /// - `CS_TIMEOUT_SECS` (default: 30)
    pub fn from_env() -> Result<Self, ConfigError> {
        let api_token = std::env::var("CS_API_TOKEN").map_err(|_| ConfigError::MissingToken)?;
        let user_id = std::env::var("CS_USER_ID")
            .ok()
            .and_then(|raw| UserId::new(raw).ok())
            .ok_or(ConfigError::MissingUser)?;

        let mut config = Self::new(env_url("CS_API_URL", DEFAULT_API_URL)?, &api_token, user_id)?;
        config.timeout_secs = std::env::var("CS_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(DEFAULT_TIMEOUT_SECS);
        Ok(config)
    }

    /// Create a configuration pointing to a local mock server (for testing).
    pub fn local_mock(base: &str, token: &str, user: &str) -> Result<Self, ConfigError> {
        let url = Url::parse(base).map_err(|e| ConfigError::InvalidUrl(base.to_string(), e.to_string()))?;
        let user_id = UserId::new(user).map_err(|_| ConfigError::MissingUser)?;
        let mut config = Self::new(url, token, user_id)?;
        config.timeout_secs = 5;
        Ok(config)
    }

    /// Replace the base URL, keeping token and user.
    pub fn with_base_url(mut self, base_url: Url) -> Self {
        self.base_url = with_trailing_slash(base_url);
        self
    }

    /// Absolute URL of `path` below the base.
    pub(crate) fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path.trim_start_matches('/'))
    }
}

fn env_url(var: &str, default: &str) -> Result<Url, ConfigError> {
    let raw = std::env::var(var).unwrap_or_else(|_| default.to_string());
    Url::parse(&raw).map_err(|e| ConfigError::InvalidUrl(var.to_string(), e.to_string()))
}

fn with_trailing_slash(mut url: Url) -> Url {
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("CS_API_TOKEN environment variable is required")]
    MissingToken,
    #[error("CS_USER_ID environment variable is required")]
    MissingUser,
    #[error("invalid URL for {0}: {1}")]
    InvalidUrl(String, String),
}
