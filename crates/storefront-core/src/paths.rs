//! File system paths for the storefront client runtime.

use crate::{CoreError, CoreResult};
use std::path::PathBuf;

/// Manages file system paths for client-side state.
#[derive(Debug, Clone)]
pub struct Paths {
    /// Base directory for runtime files (~/.storefront)
    base_dir: PathBuf,
}

impl Paths {
    /// Create a new Paths instance rooted at `~/.storefront`.
    pub fn new() -> CoreResult<Self> {
        let home = dirs::home_dir()
            .ok_or_else(|| CoreError::Path("Could not determine home directory".to_string()))?;

        Ok(Self {
            base_dir: home.join(".storefront"),
        })
    }

    /// Create a new Paths instance with a custom base directory.
    pub fn with_base_dir(base_dir: PathBuf) -> Self {
        Self { base_dir }
    }

    /// Get the base directory (~/.storefront).
    pub fn base_dir(&self) -> &PathBuf {
        &self.base_dir
    }

    /// Get the config file path (~/.storefront/config.json).
    pub fn config_file(&self) -> PathBuf {
        self.base_dir.join("config.json")
    }

    /// Get the persisted-state file path (~/.storefront/state.json).
    ///
    /// This is the file-backed analogue of the browser's localStorage, used
    /// by the storage crate's file backend.
    pub fn state_file(&self) -> PathBuf {
        self.base_dir.join("state.json")
    }

    /// Get the logs directory (~/.storefront/logs).
    pub fn logs_dir(&self) -> PathBuf {
        self.base_dir.join("logs")
    }

    /// Ensure all required directories exist.
    pub fn ensure_dirs(&self) -> CoreResult<()> {
        std::fs::create_dir_all(&self.base_dir)?;
        std::fs::create_dir_all(self.logs_dir())?;
        Ok(())
    }
}
