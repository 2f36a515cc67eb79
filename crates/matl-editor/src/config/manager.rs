//! Configuration manager for loading, saving, and managing app configuration

use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::RwLock;

use super::AppConfig;

/// Shared configuration manager type
pub type SharedConfig = Arc<RwLock<ConfigManager>>;

/// Configuration error types
#[derive(Debug, Clone, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(String),
    #[error("Serialization error: {0}")]
    Serialize(String),
    #[error("Deserialization error: {0}")]
    Deserialize(String),
}

/// Loads, holds and saves the application configuration
pub struct ConfigManager {
    config: AppConfig,
    config_path: PathBuf,
    dirty: bool,
}

impl ConfigManager {
    /// Create a new configuration manager, loading from disk if available
    pub fn new() -> Self {
        Self::with_path(Self::config_dir().join("config.ron"))
    }

    /// Create a configuration manager backed by a specific file
    pub fn with_path(config_path: PathBuf) -> Self {
        let config = Self::load_from_path(&config_path).unwrap_or_else(|| {
            tracing::info!("No config file found, using defaults");
            AppConfig::new()
        });

        Self {
            config,
            config_path,
            dirty: false,
        }
    }

    /// Get the OS-standard configuration directory
    fn config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("matl-editor")
    }

    fn load_from_path(path: &Path) -> Option<AppConfig> {
        let content = std::fs::read_to_string(path).ok()?;
        match ron::from_str(&content) {
            Ok(config) => {
                tracing::info!("Loaded config from {:?}", path);
                Some(config)
            }
            Err(e) => {
                tracing::warn!("Failed to parse config file: {}", e);
                None
            }
        }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Get a mutable reference to the configuration (marks as dirty)
    pub fn config_mut(&mut self) -> &mut AppConfig {
        self.dirty = true;
        &mut self.config
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Save the configuration to disk if it changed
    pub fn save(&mut self) -> Result<(), ConfigError> {
        if !self.dirty {
            return Ok(());
        }

        if let Some(parent) = self.config_path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| ConfigError::Io(e.to_string()))?;
        }

        let content = ron::ser::to_string_pretty(&self.config, ron::ser::PrettyConfig::default())
            .map_err(|e| ConfigError::Serialize(e.to_string()))?;

        std::fs::write(&self.config_path, &content).map_err(|e| ConfigError::Io(e.to_string()))?;

        tracing::info!("Saved config to {:?}", self.config_path);
        self.dirty = false;
        Ok(())
    }

    /// Re-read the configuration file, discarding unsaved changes
    pub fn reload(&mut self) -> Result<(), ConfigError> {
        let content =
            std::fs::read_to_string(&self.config_path).map_err(|e| ConfigError::Io(e.to_string()))?;
        self.config = ron::from_str(&content).map_err(|e| ConfigError::Deserialize(e.to_string()))?;
        self.dirty = false;
        tracing::info!("Reloaded config from {:?}", self.config_path);
        Ok(())
    }

    /// Reset configuration to defaults
    pub fn reset_to_defaults(&mut self) {
        self.config = AppConfig::new();
        self.dirty = true;
    }

    pub fn config_file_path(&self) -> &Path {
        &self.config_path
    }
}

impl Default for ConfigManager {
    fn default() -> Self {
        Self::new()
    }
}

/// Create a new shared configuration manager
pub fn create_shared_config() -> SharedConfig {
    Arc::new(RwLock::new(ConfigManager::new()))
}
