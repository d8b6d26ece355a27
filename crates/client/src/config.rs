//! Client configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `TIENDA_API_URL` - Base URL of the Tienda API (e.g., `https://tienda.example.com/api`)
//!
//! ## Optional
//! - `TIENDA_SESSION_FILE` - Where to persist the session token
//!   (default: `$HOME/.tienda/session.json`)
//! - `TIENDA_REQUEST_TIMEOUT_SECS` - Per-request timeout (default: 30)

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;
use url::Url;

const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Tienda client configuration.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the Tienda API.
    pub api_base_url: Url,
    /// Path of the persisted session file.
    pub session_file: PathBuf,
    /// Per-request timeout.
    pub request_timeout: Duration,
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

        let api_base_url = require_env("TIENDA_API_URL")?;
        let api_base_url = Self::parse_base_url(&api_base_url)?;

        let session_file = match std::env::var("TIENDA_SESSION_FILE") {
            Ok(path) => PathBuf::from(path),
            Err(_) => default_session_file()?,
        };

        let request_timeout = match std::env::var("TIENDA_REQUEST_TIMEOUT_SECS") {
            Ok(raw) => {
                let secs: u64 = raw.parse().map_err(|_| {
                    ConfigError::InvalidEnvVar(
                        "TIENDA_REQUEST_TIMEOUT_SECS".to_owned(),
                        format!("not a number of seconds: {raw}"),
                    )
                })?;
                Duration::from_secs(secs)
            }
            Err(_) => Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
        };

        Ok(Self {
            api_base_url,
            session_file,
            request_timeout,
        })
    }

    /// Parse and validate the API base URL.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidEnvVar` if the value is not an http(s)
    /// URL.
    pub fn parse_base_url(raw: &str) -> Result<Url, ConfigError> {
        let url = Url::parse(raw).map_err(|e| {
            ConfigError::InvalidEnvVar("TIENDA_API_URL".to_owned(), e.to_string())
        })?;

        if !matches!(url.scheme(), "http" | "https") {
            return Err(ConfigError::InvalidEnvVar(
                "TIENDA_API_URL".to_owned(),
                format!("unsupported scheme: {}", url.scheme()),
            ));
        }

        Ok(url)
    }
}

fn require_env(name: &str) -> Result<String, ConfigError> {
    std::env::var(name).map_err(|_| ConfigError::MissingEnvVar(name.to_owned()))
}

fn default_session_file() -> Result<PathBuf, ConfigError> {
    let home = std::env::var("HOME")
        .map_err(|_| ConfigError::MissingEnvVar("HOME (or TIENDA_SESSION_FILE)".to_owned()))?;
    Ok(PathBuf::from(home).join(".tienda").join("session.json"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_http_and_https_urls() {
        assert!(ClientConfig::parse_base_url("https://tienda.example.com/api").is_ok());
        assert!(ClientConfig::parse_base_url("http://localhost:3000/api").is_ok());
    }

    #[test]
    fn rejects_other_schemes_and_garbage() {
        assert!(ClientConfig::parse_base_url("ftp://tienda.example.com").is_err());
        assert!(ClientConfig::parse_base_url("not a url").is_err());
    }

    #[test]
    fn config_error_display() {
        let err = ConfigError::MissingEnvVar("TIENDA_API_URL".to_owned());
        assert_eq!(
            err.to_string(),
            "Missing environment variable: TIENDA_API_URL"
        );
    }
}
