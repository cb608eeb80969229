//! Client configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! All variables are optional and fall back to local-development defaults:
//! - `SHOPFRONT_API_BASE` - Base URL of the backend API (default: `http://127.0.0.1:8000/api/`)
//! - `SHOPFRONT_STORAGE_DIR` - Directory for durable local snapshots (default: `.shopfront`)
//! - `SHOPFRONT_HTTP_TIMEOUT_SECS` - Per-request timeout in seconds (default: 30)

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;
use url::Url;

const DEFAULT_API_BASE: &str = "http://127.0.0.1:8000/api/";
const DEFAULT_STORAGE_DIR: &str = ".shopfront";
const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Client configuration.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the backend API; resource paths are joined onto it.
    ///
    /// Always ends with a trailing slash so relative joins keep the base
    /// path segment.
    pub api_base: Url,
    /// Directory holding the durable snapshots (user, tokens, cart, orders).
    pub storage_dir: PathBuf,
    /// Timeout applied to every HTTP request.
    pub http_timeout: Duration,
}

impl ClientConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is present but cannot be parsed.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let api_base = parse_api_base(&get_env_or_default("SHOPFRONT_API_BASE", DEFAULT_API_BASE))
            .map_err(|e| ConfigError::InvalidEnvVar("SHOPFRONT_API_BASE".to_string(), e))?;
        let storage_dir =
            PathBuf::from(get_env_or_default("SHOPFRONT_STORAGE_DIR", DEFAULT_STORAGE_DIR));
        let timeout_secs = get_env_or_default(
            "SHOPFRONT_HTTP_TIMEOUT_SECS",
            &DEFAULT_HTTP_TIMEOUT_SECS.to_string(),
        )
        .parse::<u64>()
        .map_err(|e| {
            ConfigError::InvalidEnvVar("SHOPFRONT_HTTP_TIMEOUT_SECS".to_string(), e.to_string())
        })?;

        Ok(Self {
            api_base,
            storage_dir,
            http_timeout: Duration::from_secs(timeout_secs),
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Parse the API base URL, normalizing it to end with a trailing slash.
///
/// `Url::join` treats `http://host/api` and `http://host/api/` differently;
/// only the latter keeps `api` as a path segment when joining `products/`.
fn parse_api_base(raw: &str) -> Result<Url, String> {
    let normalized = if raw.ends_with('/') {
        raw.to_string()
    } else {
        format!("{raw}/")
    };
    let url = Url::parse(&normalized).map_err(|e| e.to_string())?;
    if url.cannot_be_a_base() {
        return Err("URL cannot serve as a base".to_string());
    }
    Ok(url)
}
