//! Material editor
//!
//! Editable copies of a model's material records, live-synced to the viewport's
//! render materials and saved back to material files.

pub mod config;
pub mod editable;
pub mod logging;
pub mod session;
pub mod sync;

pub use config::{AppConfig, ConfigError, ConfigManager, EditorConfig, SharedConfig, create_shared_config};
pub use editable::{
    BooleanParam, EditError, EditableMaterial, FloatParam, MaterialChange, MaterialField,
    MaterialObserver, TextureSamplerParam, Vec4Param, id_color,
};
pub use session::{
    DEFAULT_TEXTURE_NAMES, MaterialCollection, MaterialEditor, SaveError, texture_names_with,
    update_matl,
};
pub use sync::RenderMaterialSync;
