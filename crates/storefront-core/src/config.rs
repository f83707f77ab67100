//! Configuration management for the storefront auth core.

use crate::{CoreError, CoreResult, Paths};
use serde::{Deserialize, Serialize};
use std::path::Path;
use url::Url;

/// Default auth API base URL (can be overridden at compile time via the
/// STOREFRONT_API_URL env var).
pub const DEFAULT_API_BASE_URL: &str = match option_env!("STOREFRONT_API_URL") {
    Some(url) => url,
    None => "http://localhost:8000/api/auth",
};

/// Default log level.
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Main configuration.
///
/// Loaded once at boot and read-only thereafter. The session signing secret
/// is only ever sourced from the environment — it is never written to or read
/// from the config file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,
    /// Auth API base URL.
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,
    /// Secret used by the edge layer to verify session tokens.
    /// Env-only (STOREFRONT_SESSION_SECRET); never persisted.
    #[serde(skip)]
    pub session_secret: Option<String>,
}

fn default_api_base_url() -> String {
    DEFAULT_API_BASE_URL.to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: DEFAULT_LOG_LEVEL.to_string(),
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            session_secret: None,
        }
    }
}

impl Config {
    /// Create a new Config with default values, then override from environment.
    pub fn new() -> Self {
        let mut config = Self::default();
        config.load_from_env();
        config
    }

    /// Load configuration from the config file, falling back to defaults,
    /// then apply environment overrides.
    pub fn load(paths: &Paths) -> CoreResult<Self> {
        let config_path = paths.config_file();

        let mut config = if config_path.exists() {
            Self::load_from_file(&config_path)?
        } else {
            Self::default()
        };

        config.load_from_env();

        Ok(config)
    }

    /// Load configuration from a specific file.
    pub fn load_from_file(path: &Path) -> CoreResult<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to the config file. The session secret is skipped
    /// by serde and never lands on disk.
    pub fn save(&self, paths: &Paths) -> CoreResult<()> {
        paths.ensure_dirs()?;
        let config_path = paths.config_file();
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(config_path, content)?;
        Ok(())
    }

    /// Override configuration from environment variables.
    fn load_from_env(&mut self) {
        if let Ok(log_level) = std::env::var("STOREFRONT_LOG_LEVEL") {
            self.log_level = log_level;
        }
        if let Ok(api_url) = std::env::var("STOREFRONT_API_URL") {
            if !api_url.trim().is_empty() {
                self.api_base_url = api_url;
            }
        }
        if let Ok(secret) = std::env::var("STOREFRONT_SESSION_SECRET") {
            if !secret.trim().is_empty() {
                self.session_secret = Some(secret);
            }
        }
    }

    /// Get the auth API base URL as a parsed URL.
    pub fn api_base_url(&self) -> CoreResult<Url> {
        Url::parse(&self.api_base_url).map_err(CoreError::from)
    }

    /// Get the session secret, failing if it was not provided.
    ///
    /// Only the edge layer needs this; client-side code never touches it.
    pub fn session_secret(&self) -> CoreResult<&str> {
        self.session_secret
            .as_deref()
            .ok_or_else(|| CoreError::Config("STOREFRONT_SESSION_SECRET is not set".to_string()))
    }
}
