//! Client configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `WEALTHPROXIES_API_URL` - Base URL of the storefront backend
//!
//! ## Optional
//! - `WEALTHPROXIES_STORAGE_DIR` - Directory for durable key-value storage
//!   (default: `.wealthproxies`)

use std::path::PathBuf;

use thiserror::Error;
use url::Url;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Client application configuration.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the storefront backend API.
    pub api_base_url: Url,
    /// Directory for durable key-value storage.
    pub storage_dir: PathBuf,
}

impl ClientConfig {
    /// Build a configuration directly, bypassing the environment.
    #[must_use]
    pub const fn new(api_base_url: Url, storage_dir: PathBuf) -> Self {
        Self {
            api_base_url,
            storage_dir,
        }
    }

    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if `WEALTHPROXIES_API_URL` is missing or is not
    /// a valid absolute URL.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let raw_url = std::env::var("WEALTHPROXIES_API_URL")
            .map_err(|_| ConfigError::MissingEnvVar("WEALTHPROXIES_API_URL".to_string()))?;
        let api_base_url = Url::parse(&raw_url).map_err(|e| {
            ConfigError::InvalidEnvVar("WEALTHPROXIES_API_URL".to_string(), e.to_string())
        })?;

        let storage_dir = std::env::var("WEALTHPROXIES_STORAGE_DIR")
            .map_or_else(|_| PathBuf::from(".wealthproxies"), PathBuf::from);

        Ok(Self {
            api_base_url,
            storage_dir,
        })
    }

    /// Base URL with any trailing slash removed, for endpoint formatting.
    #[must_use]
    pub fn api_base(&self) -> String {
        self.api_base_url
            .as_str()
            .trim_end_matches('/')
            .to_string()
    }
}
