//! Configuration management.

use crate::error::StoreError;
use crate::persistence::default_storage_path;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Storage key the cart snapshot lives under.
pub const CART_STORAGE_KEY: &str = "GoMarketplace:products";

/// Environment variable overriding [`StoreConfig::storage_path`].
pub const STORAGE_PATH_ENV: &str = "GOMARKET_STORAGE";

/// Cart store configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Key-value storage file used by the file backend.
    #[serde(default = "default_storage_path")]
    pub storage_path: PathBuf,
    /// Key the cart snapshot is stored under.
    #[serde(default = "default_storage_key")]
    pub storage_key: String,
    /// Fail hydration on a malformed snapshot instead of starting empty.
    #[serde(default)]
    pub strict_snapshots: bool,
    /// Log level for the `gomarket` crates when `RUST_LOG` is unset.
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_storage_key() -> String {
    CART_STORAGE_KEY.to_string()
}

/// Accepted values for [`StoreConfig::log_level`].
pub const LOG_LEVELS: [&str; 6] = ["off", "error", "warn", "info", "debug", "trace"];

fn default_log_level() -> String {
    "warn".to_string()
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            storage_path: default_storage_path(),
            storage_key: default_storage_key(),
            strict_snapshots: false,
            log_level: default_log_level(),
        }
    }
}

impl StoreConfig {
    /// Loads configuration from a specific path.
    ///
    /// A missing file yields the defaults.
    ///
    /// # Errors
    ///
    /// Returns error if the file exists but cannot be read or parsed, or if
    /// the resulting configuration is invalid.
    pub fn load_from(path: &Path) -> Result<Self, StoreError> {
        if !path.exists() {
            debug!(path = %path.display(), "Config file not found, using defaults");
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)?;
        let config: StoreConfig = serde_json::from_str(&content)?;
        config.validate()?;

        info!(path = %path.display(), "Loaded configuration");
        Ok(config)
    }

    /// Saves configuration to a specific path.
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be written.
    pub fn save_to(&self, path: &Path) -> Result<(), StoreError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;

        info!(path = %path.display(), "Saved configuration");
        Ok(())
    }

    /// Applies `GOMARKET_STORAGE` when it is set.
    #[must_use]
    pub fn with_env_overrides(self) -> Self {
        let storage = std::env::var_os(STORAGE_PATH_ENV).map(PathBuf::from);
        self.with_storage_override(storage)
    }

    /// Replaces the storage path when `storage` is present and non-empty.
    #[must_use]
    pub fn with_storage_override(mut self, storage: Option<PathBuf>) -> Self {
        if let Some(path) = storage.filter(|p| !p.as_os_str().is_empty()) {
            debug!(path = %path.display(), "Storage path overridden");
            self.storage_path = path;
        }
        self
    }

    /// Checks the configuration for values the store cannot work with.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Config`] for an empty storage key or an unknown
    /// log level.
    pub fn validate(&self) -> Result<(), StoreError> {
        if self.storage_key.trim().is_empty() {
            return Err(StoreError::Config("storage_key must not be empty".to_string()));
        }
        if !LOG_LEVELS.contains(&self.log_level.to_ascii_lowercase().as_str()) {
            return Err(StoreError::Config(format!(
                "log_level must be one of {}, got {:?}",
                LOG_LEVELS.join(", "),
                self.log_level
            )));
        }
        Ok(())
    }

    /// Tracing filter directive for [`StoreConfig::log_level`].
    pub fn log_directive(&self) -> String {
        format!("gomarket={}", self.log_level.to_ascii_lowercase())
    }
}
