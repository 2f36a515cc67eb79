//! Model binding entries
//!
//! A [`Modl`] correlates mesh regions to material labels. It only names
//! things; resolving the names happens in the renderer.

use serde::{Deserialize, Serialize};

/// Binding table for one model
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Modl {
    pub model_name: String,
    pub skeleton_file_name: String,
    pub material_file_names: Vec<String>,
    pub entries: Vec<ModlEntry>,
}

impl Modl {
    /// Create a binding table from entries
    pub fn new(model_name: impl Into<String>, entries: Vec<ModlEntry>) -> Self {
        Self {
            model_name: model_name.into(),
            entries,
            ..Default::default()
        }
    }
}

/// Links one submesh (by name and sub-index) to a material label
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ModlEntry {
    pub mesh_name: String,
    pub sub_index: u64,
    pub material_label: String,
}

impl ModlEntry {
    pub fn new(mesh_name: impl Into<String>, sub_index: u64, material_label: impl Into<String>) -> Self {
        Self {
            mesh_name: mesh_name.into(),
            sub_index,
            material_label: material_label.into(),
        }
    }

    /// Check whether this entry refers to the given submesh
    pub fn matches(&self, mesh_name: &str, sub_index: u64) -> bool {
        self.mesh_name == mesh_name && self.sub_index == sub_index
    }
}
