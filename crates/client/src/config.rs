//! Client configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `CLEMENTINE_BACKEND_URL` - Base URL of the REST backend
//!   (e.g., <http://localhost:8080>)
//!
//! ## Optional
//! - `CLEMENTINE_STATE_DIR` - Directory for persisted client state
//!   (default: `.clementine`)
//! - `CLEMENTINE_HTTP_TIMEOUT_SECS` - Per-request timeout (default: 30)
//! - `CLEMENTINE_AUTH_NOTICE_COOLDOWN_MS` - Minimum interval between
//!   duplicate sign-in notices after 401s (default: 3000)

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;
use url::Url;

const DEFAULT_STATE_DIR: &str = ".clementine";
const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;
const DEFAULT_AUTH_NOTICE_COOLDOWN_MS: u64 = 3_000;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Storefront client configuration.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the REST backend; API calls go to `<base_url>/api/...`.
    pub base_url: Url,
    /// Directory holding the persisted `token`, `cart.json`, and `theme`.
    pub state_dir: PathBuf,
    /// Per-request HTTP timeout.
    pub http_timeout: Duration,
    /// Cooldown window between duplicate auth-failure notices.
    pub auth_notice_cooldown: Duration,
}

impl ClientConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let base_url = parse_base_url(&get_required_env("CLEMENTINE_BACKEND_URL")?)
            .map_err(|e| ConfigError::InvalidEnvVar("CLEMENTINE_BACKEND_URL".to_string(), e))?;
        let state_dir = PathBuf::from(get_env_or_default("CLEMENTINE_STATE_DIR", DEFAULT_STATE_DIR));
        let http_timeout = Duration::from_secs(parse_u64(
            "CLEMENTINE_HTTP_TIMEOUT_SECS",
            DEFAULT_HTTP_TIMEOUT_SECS,
        )?);
        let auth_notice_cooldown = Duration::from_millis(parse_u64(
            "CLEMENTINE_AUTH_NOTICE_COOLDOWN_MS",
            DEFAULT_AUTH_NOTICE_COOLDOWN_MS,
        )?);

        Ok(Self {
            base_url,
            state_dir,
            http_timeout,
            auth_notice_cooldown,
        })
    }

    /// The API root all endpoint paths are appended to, without a
    /// trailing slash (e.g., `http://localhost:8080/api`).
    #[must_use]
    pub fn api_root(&self) -> String {
        format!("{}/api", self.base_url.as_str().trim_end_matches('/'))
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Parse an optional numeric environment variable, falling back to `default`.
fn parse_u64(key: &str, default: u64) -> Result<u64, ConfigError> {
    match std::env::var(key) {
        Ok(raw) => raw
            .parse::<u64>()
            .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string())),
        Err(_) => Ok(default),
    }
}

/// Validate and normalize the backend base URL.
fn parse_base_url(raw: &str) -> Result<Url, String> {
    let url = Url::parse(raw).map_err(|e| e.to_string())?;
    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(format!("unsupported scheme '{}'", url.scheme()));
    }
    if url.host_str().is_none() {
        return Err("URL must have a host".to_string());
    }
    Ok(url)
}
