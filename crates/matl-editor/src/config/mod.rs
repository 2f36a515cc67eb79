//! Application configuration
//!
//! Viewport settings, fallback render state for material records and the
//! extra texture names offered by the editor.

mod manager;

pub use manager::{ConfigError, ConfigManager, SharedConfig, create_shared_config};

use matl_renderer::{MaterialDefaults, RendererConfig};
use serde::{Deserialize, Serialize};

use crate::session::texture_names_with;

/// Editor preferences
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct EditorConfig {
    /// Texture names offered in addition to the built-in defaults
    #[serde(default)]
    pub extra_texture_names: Vec<String>,
}

impl EditorConfig {
    /// Built-in default texture names followed by the configured extras
    pub fn default_texture_names(&self) -> Vec<String> {
        texture_names_with(&self.extra_texture_names)
    }
}

/// Complete application configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct AppConfig {
    /// Configuration format version
    #[serde(default)]
    pub version: u32,
    #[serde(default)]
    pub renderer: RendererConfig,
    /// Render state for records without rasterizer or blend state
    #[serde(default)]
    pub materials: MaterialDefaults,
    #[serde(default)]
    pub editor: EditorConfig,
}

impl AppConfig {
    /// Current configuration version
    pub const CURRENT_VERSION: u32 = 1;

    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self {
            version: Self::CURRENT_VERSION,
            ..Default::default()
        }
    }
}
