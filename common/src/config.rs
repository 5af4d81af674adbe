//! Application configuration.
//!
//! Loaded from environment variables with sane defaults, so every binary
//! can be pointed at a different remote API without a config file.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Default base URL of the remote cluster-management API.
pub const DEFAULT_API_URL: &str = "http://127.0.0.1:10001";

/// Default per-request timeout in seconds.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Application configuration shared by all binaries.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Name of the service this config was loaded for (used in logs).
    pub service: String,
    /// Base URL of the remote cluster-management API.
    pub api_url: String,
    /// Per-request timeout in seconds for all HTTP calls.
    pub request_timeout_secs: u64,
    /// Directory holding durable client state (session, preferences).
    pub storage_dir: PathBuf,
}

impl AppConfig {
    /// Loads configuration for a named service from the environment.
    ///
    /// Recognized variables: `API_URL`, `REQUEST_TIMEOUT_SECS`,
    /// `STORAGE_DIR`. Unset or unparsable values fall back to defaults.
    pub fn load_with_service(service: &str) -> Self {
        let api_url = std::env::var("API_URL")
            .ok()
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| DEFAULT_API_URL.to_string());

        let request_timeout_secs = std::env::var("REQUEST_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS);

        let storage_dir = std::env::var("STORAGE_DIR")
            .ok()
            .filter(|v| !v.is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(default_storage_dir);

        let config = Self {
            service: service.to_string(),
            api_url,
            request_timeout_secs,
            storage_dir,
        };

        tracing::debug!(
            service = %config.service,
            api_url = %config.api_url,
            storage_dir = %config.storage_dir.display(),
            "Configuration loaded"
        );
        config
    }

    /// Returns the API base URL without a trailing slash.
    pub fn api_base(&self) -> &str {
        self.api_url.trim_end_matches('/')
    }
}

fn default_storage_dir() -> PathBuf {
    std::env::temp_dir().join("clusterdash")
}
