//! Material editing session
//!
//! A [`MaterialEditor`] holds one [`MaterialCollection`] per opened model. Each
//! collection mirrors the model's material file, one editable material per
//! record, and is live-synced to the model's render materials. Saving copies
//! the edited values back into the material records and writes them out.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use matl_core::{Matl, MatlEntry, MatlWriter, ParamData, SerializeError};
use matl_renderer::{MaterialDefaults, ModelAsset, TextureHandle};

use crate::editable::EditableMaterial;
use crate::sync::RenderMaterialSync;

/// Texture names every material can use, in addition to the model's own.
pub const DEFAULT_TEXTURE_NAMES: &[&str] = &[
    "#replace_cubemap",
    "/common/shader/sfxpbs/default_black",
    "/common/shader/sfxpbs/default_color",
    "/common/shader/sfxpbs/default_color2",
    "/common/shader/sfxpbs/default_color3",
    "/common/shader/sfxpbs/default_color4",
    "/common/shader/sfxpbs/default_diffuse2",
    "/common/shader/sfxpbs/default_gray",
    "/common/shader/sfxpbs/default_metallicbg",
    "/common/shader/sfxpbs/default_normal",
    "/common/shader/sfxpbs/default_params",
    "/common/shader/sfxpbs/default_params_r000_g025_b100",
    "/common/shader/sfxpbs/default_params_r100_g025_b100",
    "/common/shader/sfxpbs/default_params2",
    "/common/shader/sfxpbs/default_params3",
    "/common/shader/sfxpbs/default_white",
    "/common/shader/sfxpbs/fighter/default_normal",
    "/common/shader/sfxpbs/fighter/default_params",
];

/// Save errors
#[derive(Debug, Clone, thiserror::Error)]
pub enum SaveError {
    #[error("No material collection selected")]
    NoCollectionSelected,
    #[error("Unknown material collection: {0}")]
    UnknownCollection(String),
    #[error(transparent)]
    Serialize(#[from] SerializeError),
}

/// Editable materials of one model.
pub struct MaterialCollection {
    /// Name the model was opened under
    pub name: String,
    pub materials: Vec<EditableMaterial>,
    asset: Arc<ModelAsset>,
}

impl MaterialCollection {
    /// Build a collection for a model. Returns `None` if it has no material records.
    ///
    /// A record is live-synced when it is the one its label resolved to; shadowed
    /// duplicates are editable but only affect the saved file.
    pub fn from_asset(name: impl Into<String>, asset: &Arc<ModelAsset>, defaults: &MaterialDefaults) -> Option<Self> {
        let matl = asset.matl.as_ref()?;
        let textures: Arc<HashMap<String, TextureHandle>> = Arc::new(asset.textures.clone());

        let materials = matl
            .entries
            .iter()
            .enumerate()
            .map(|(index, entry)| {
                let mut editable = EditableMaterial::from_entry(entry, index, defaults);
                if let Some(render) = asset.materials.get(&entry.material_label) {
                    if render.read().index() == index {
                        RenderMaterialSync::attach(&mut editable, render, Arc::clone(&textures));
                    }
                }
                editable
            })
            .collect();

        Some(Self {
            name: name.into(),
            materials,
            asset: Arc::clone(asset),
        })
    }

    pub fn asset(&self) -> &Arc<ModelAsset> {
        &self.asset
    }

    /// Find a material by label and shader label
    pub fn find(&self, material_label: &str, shader_label: &str) -> Option<&EditableMaterial> {
        self.materials
            .iter()
            .find(|m| m.name == material_label && m.shader_label == shader_label)
    }

    pub fn find_mut(&mut self, material_label: &str, shader_label: &str) -> Option<&mut EditableMaterial> {
        self.materials
            .iter_mut()
            .find(|m| m.name == material_label && m.shader_label == shader_label)
    }

    /// The model's material records with this collection's values applied.
    pub fn updated_matl(&self) -> Option<Matl> {
        self.asset
            .matl
            .as_ref()
            .map(|matl| update_matl(matl, &self.materials))
    }
}

/// Copy edited values into every record with a matching editable material.
///
/// Records are matched on material label and shader label; for duplicate labels
/// the editable created from the same record position is preferred. Records
/// with no match are left untouched.
pub fn update_matl(matl: &Matl, materials: &[EditableMaterial]) -> Matl {
    let mut updated = matl.clone();
    for (index, entry) in updated.entries.iter_mut().enumerate() {
        let matches = |m: &&EditableMaterial| {
            m.name == entry.material_label && m.shader_label == entry.shader_label
        };
        let material = materials
            .iter()
            .filter(matches)
            .find(|m| m.index == index)
            .or_else(|| materials.iter().find(matches));

        if let Some(material) = material {
            update_attributes(entry, material);
        }
    }
    updated
}

fn update_attributes(entry: &mut MatlEntry, material: &EditableMaterial) {
    for attribute in &mut entry.attributes {
        let id = attribute.param_id.to_string();
        match &mut attribute.data {
            ParamData::Boolean(value) => {
                if let Some(param) = material.booleans().iter().find(|p| p.param_id == id) {
                    *value = param.value;
                }
            }
            ParamData::Float(value) => {
                if let Some(param) = material.floats().iter().find(|p| p.param_id == id) {
                    *value = param.value;
                }
            }
            ParamData::Vector4(value) => {
                if let Some(param) = material.vectors().iter().find(|p| p.param_id == id) {
                    *value = param.value.into();
                }
            }
            ParamData::String(value) => {
                if let Some(param) = material.textures().iter().find(|p| p.param_id == id) {
                    value.clone_from(&param.value);
                }
            }
            ParamData::Sampler(sampler) => {
                if let Some(param) = material.textures().iter().find(|p| p.sampler_param_id == id) {
                    // Border color is not editable and keeps its stored value
                    let border_color = sampler.border_color;
                    *sampler = param.sampler.clone();
                    sampler.border_color = border_color;
                }
            }
            ParamData::RasterizerState(state) => {
                state.cull_mode = material.cull_mode();
                state.fill_mode = material.fill_mode();
            }
            ParamData::BlendState(state) => {
                state.source_color = material.source_color();
                state.destination_color = material.destination_color();
            }
        }
    }
}

/// Editing session over every opened model.
pub struct MaterialEditor {
    collections: Vec<MaterialCollection>,
    current: Option<usize>,
    possible_texture_names: Vec<String>,
}

impl MaterialEditor {
    /// Open a session. Models without material records are skipped.
    ///
    /// The possible texture names are `default_texture_names` followed by each
    /// model's texture names.
    pub fn new(
        models: impl IntoIterator<Item = (String, Arc<ModelAsset>)>,
        default_texture_names: &[String],
        defaults: &MaterialDefaults,
    ) -> Self {
        let mut possible_texture_names = default_texture_names.to_vec();
        let mut collections = Vec::new();

        for (name, asset) in models {
            let Some(collection) = MaterialCollection::from_asset(name.as_str(), &asset, defaults) else {
                tracing::debug!("Skipping '{}': no material records", name);
                continue;
            };
            possible_texture_names.extend(asset.texture_names());
            collections.push(collection);
        }

        tracing::info!("Opened {} material collections", collections.len());

        Self {
            current: if collections.is_empty() { None } else { Some(0) },
            collections,
            possible_texture_names,
        }
    }

    pub fn collections(&self) -> &[MaterialCollection] {
        &self.collections
    }

    pub fn collection(&self, name: &str) -> Option<&MaterialCollection> {
        self.collections.iter().find(|c| c.name == name)
    }

    pub fn collection_mut(&mut self, name: &str) -> Option<&mut MaterialCollection> {
        self.collections.iter_mut().find(|c| c.name == name)
    }

    pub fn possible_texture_names(&self) -> &[String] {
        &self.possible_texture_names
    }

    pub fn current_collection(&self) -> Option<&MaterialCollection> {
        self.current.and_then(|i| self.collections.get(i))
    }

    pub fn current_collection_mut(&mut self) -> Option<&mut MaterialCollection> {
        self.current.and_then(|i| self.collections.get_mut(i))
    }

    /// Select the collection to edit and save. Returns false for unknown names.
    pub fn select_collection(&mut self, name: &str) -> bool {
        match self.collections.iter().position(|c| c.name == name) {
            Some(index) => {
                self.current = Some(index);
                true
            }
            None => false,
        }
    }

    /// Save the selected collection.
    pub fn save_current(&self, path: &Path, writer: &dyn MatlWriter) -> Result<Matl, SaveError> {
        let collection = self.current_collection().ok_or(SaveError::NoCollectionSelected)?;
        Self::save(collection, path, writer)
    }

    /// Save a collection by name.
    pub fn save_collection(&self, name: &str, path: &Path, writer: &dyn MatlWriter) -> Result<Matl, SaveError> {
        let collection = self
            .collection(name)
            .ok_or_else(|| SaveError::UnknownCollection(name.to_string()))?;
        Self::save(collection, path, writer)
    }

    fn save(collection: &MaterialCollection, path: &Path, writer: &dyn MatlWriter) -> Result<Matl, SaveError> {
        let matl = collection
            .updated_matl()
            .ok_or_else(|| SaveError::UnknownCollection(collection.name.clone()))?;
        writer.write_matl(&matl, path)?;
        tracing::info!("Saved '{}' to {:?}", collection.name, path);
        Ok(matl)
    }
}

/// Default texture names plus any configured extras, without duplicates.
pub fn texture_names_with(extra: &[String]) -> Vec<String> {
    let mut names: Vec<String> = DEFAULT_TEXTURE_NAMES.iter().map(|s| s.to_string()).collect();
    for name in extra {
        if !names.contains(name) {
            names.push(name.clone());
        }
    }
    names
}

#[cfg(test)]
mod tests {
    use super::*;
    use matl_core::{
        FilteringType, MatlBlendFactor, MatlBlendState, MatlCullMode, MatlRasterizerState,
        MatlSampler, MatlVector4, MatlWrapMode, Modl, ModlEntry, ParamId, RonFormat, load_matl,
    };
    use matl_renderer::{MeshHandle, RenderModel, SubMesh};
    use parking_lot::Mutex;

    /// Writer that keeps the last saved records in memory
    #[derive(Default)]
    struct MemoryWriter {
        saved: Mutex<Option<Matl>>,
    }

    impl MatlWriter for MemoryWriter {
        fn write_matl(&self, matl: &Matl, _path: &Path) -> Result<(), SerializeError> {
            *self.saved.lock() = Some(matl.clone());
            Ok(())
        }
    }

    fn matl() -> Matl {
        Matl::new(vec![
            MatlEntry::new("mat_skin", "SFX_PBS_skin")
                .with_attribute(ParamId::CustomBoolean(1), ParamData::Boolean(true))
                .with_attribute(ParamId::CustomFloat(8), ParamData::Float(0.4))
                .with_attribute(
                    ParamId::CustomVector(0),
                    ParamData::Vector4(MatlVector4::new(1.0, 0.9, 0.8, 1.0)),
                )
                .with_attribute(ParamId::Texture(0), ParamData::String("skin_col".into()))
                .with_attribute(
                    ParamId::Sampler(0),
                    ParamData::Sampler(MatlSampler {
                        wrap_s: MatlWrapMode::ClampToEdge,
                        texture_filtering_type: FilteringType::AnisotropicFiltering,
                        max_anisotropy: 8,
                        border_color: MatlVector4::new(0.0, 0.0, 0.0, 1.0),
                        ..Default::default()
                    }),
                )
                .with_attribute(ParamId::Texture(4), ParamData::String("diffuse".into()))
                .with_attribute(
                    ParamId::RasterizerState(0),
                    ParamData::RasterizerState(MatlRasterizerState {
                        cull_mode: MatlCullMode::Front,
                        depth_bias: 0.5,
                        ..Default::default()
                    }),
                )
                .with_attribute(
                    ParamId::BlendState(0),
                    ParamData::BlendState(MatlBlendState {
                        source_color: MatlBlendFactor::SourceAlpha,
                        destination_color: MatlBlendFactor::OneMinusSourceAlpha,
                        alpha_sample_to_coverage: true,
                    }),
                ),
            MatlEntry::new("mat_eye", "SFX_PBS_eye")
                .with_attribute(ParamId::CustomFloat(8), ParamData::Float(0.2)),
        ])
    }

    fn asset(matl: Option<Matl>) -> Arc<ModelAsset> {
        let model = RenderModel::new(vec![
            SubMesh::new("body", 0, MeshHandle::from_raw(1)),
            SubMesh::new("eye", 0, MeshHandle::from_raw(2)),
        ]);
        let modl = Modl::new(
            "fighter",
            vec![
                ModlEntry::new("body", 0, "mat_skin"),
                ModlEntry::new("eye", 0, "mat_eye"),
            ],
        );
        let textures = HashMap::from([("skin_col".to_string(), TextureHandle::from_raw(1))]);
        Arc::new(ModelAsset::new(
            Some(model),
            matl,
            Some(modl),
            textures,
            &MaterialDefaults::default(),
        ))
    }

    fn editor() -> MaterialEditor {
        MaterialEditor::new(
            vec![
                ("fighter/model.numdlb".to_string(), asset(Some(matl()))),
                ("stage/model.numdlb".to_string(), asset(None)),
            ],
            &texture_names_with(&[]),
            &MaterialDefaults::default(),
        )
    }

    #[test]
    fn test_models_without_matl_skipped() {
        let editor = editor();
        assert_eq!(editor.collections().len(), 1);
        assert_eq!(
            editor.current_collection().map(|c| c.name.as_str()),
            Some("fighter/model.numdlb")
        );
        assert_eq!(editor.collections()[0].materials.len(), 2);
    }

    #[test]
    fn test_possible_texture_names() {
        let editor = editor();
        let names = editor.possible_texture_names();
        assert_eq!(names[0], DEFAULT_TEXTURE_NAMES[0]);
        assert_eq!(names.last().map(String::as_str), Some("skin_col"));
        assert_eq!(names.len(), DEFAULT_TEXTURE_NAMES.len() + 1);
    }

    #[test]
    fn test_save_without_edits_reproduces_matl() {
        let editor = editor();
        let writer = MemoryWriter::default();
        let saved = editor.save_current(Path::new("out.ron"), &writer).unwrap();

        assert_eq!(saved, matl());
        assert_eq!(writer.saved.lock().as_ref(), Some(&matl()));
    }

    #[test]
    fn test_save_with_edits() {
        let mut editor = editor();
        {
            let collection = editor.current_collection_mut().unwrap();
            let skin = collection.find_mut("mat_skin", "SFX_PBS_skin").unwrap();
            skin.set_float(0, 0.75).unwrap();
            skin.set_texture(0, "skin_col2").unwrap();
            skin.set_cull_mode(MatlCullMode::None).unwrap();
            skin.set_source_color(MatlBlendFactor::One).unwrap();
        }

        let saved = editor
            .save_current(Path::new("out.ron"), &MemoryWriter::default())
            .unwrap();
        let skin = &saved.entries[0];

        assert_eq!(
            skin.attribute(ParamId::CustomFloat(8)).map(|a| &a.data),
            Some(&ParamData::Float(0.75))
        );
        assert_eq!(
            skin.attribute(ParamId::Texture(0)).map(|a| &a.data),
            Some(&ParamData::String("skin_col2".into()))
        );
        let rasterizer = skin.rasterizer_state().unwrap();
        assert_eq!(rasterizer.cull_mode, MatlCullMode::None);
        assert_eq!(rasterizer.depth_bias, 0.5);
        let blend = skin.blend_state().unwrap();
        assert_eq!(blend.source_color, MatlBlendFactor::One);
        assert!(blend.alpha_sample_to_coverage);

        // Texture4 had no sampler and is not editable, so it is unchanged
        assert_eq!(
            skin.attribute(ParamId::Texture(4)).map(|a| &a.data),
            Some(&ParamData::String("diffuse".into()))
        );
        assert_eq!(saved.entries[1], matl().entries[1]);
    }

    #[test]
    fn test_edits_reach_render_material() {
        let mut editor = editor();
        let collection = editor.current_collection_mut().unwrap();
        collection.materials[1].set_float(0, 0.9).unwrap();

        let render = &collection.asset().materials["mat_eye"];
        assert_eq!(render.read().float(ParamId::CustomFloat(8)), Some(0.9));
    }

    #[test]
    fn test_shadowed_duplicate_not_synced() {
        let matl = Matl::new(vec![
            MatlEntry::new("mat_a", "s").with_attribute(ParamId::CustomFloat(0), ParamData::Float(0.1)),
            MatlEntry::new("mat_a", "s").with_attribute(ParamId::CustomFloat(0), ParamData::Float(0.2)),
        ]);
        let asset = asset(Some(matl));
        let collection = MaterialCollection::from_asset("m", &asset, &MaterialDefaults::default()).unwrap();

        assert_eq!(collection.materials[0].observer_count(), 0);
        assert_eq!(collection.materials[1].observer_count(), 1);
    }

    #[test]
    fn test_update_matl_prefers_same_position() {
        let matl = Matl::new(vec![
            MatlEntry::new("mat_a", "s").with_attribute(ParamId::CustomFloat(0), ParamData::Float(0.1)),
            MatlEntry::new("mat_a", "s").with_attribute(ParamId::CustomFloat(0), ParamData::Float(0.2)),
        ]);
        let defaults = MaterialDefaults::default();
        let mut materials: Vec<EditableMaterial> = matl
            .entries
            .iter()
            .enumerate()
            .map(|(i, e)| EditableMaterial::from_entry(e, i, &defaults))
            .collect();
        materials[1].set_float(0, 0.9).unwrap();

        let updated = update_matl(&matl, &materials);
        assert_eq!(updated.entries[0], matl.entries[0]);
        assert_eq!(
            updated.entries[1].attribute(ParamId::CustomFloat(0)).map(|a| &a.data),
            Some(&ParamData::Float(0.9))
        );
    }

    #[test]
    fn test_save_errors() {
        let editor = MaterialEditor::new(Vec::new(), &[], &MaterialDefaults::default());
        assert!(matches!(
            editor.save_current(Path::new("out.ron"), &RonFormat),
            Err(SaveError::NoCollectionSelected)
        ));
        assert!(matches!(
            editor.save_collection("missing", Path::new("out.ron"), &RonFormat),
            Err(SaveError::UnknownCollection(_))
        ));
    }

    #[test]
    fn test_save_to_file_round_trip() {
        let editor = editor();
        let path = std::env::temp_dir().join(format!("matl-{}.ron", uuid::Uuid::new_v4()));
        editor.save_current(&path, &RonFormat).unwrap();
        let loaded = load_matl(&path).unwrap();
        let _ = std::fs::remove_file(&path);
        assert_eq!(loaded, matl());
    }

    #[test]
    fn test_select_collection() {
        let mut editor = editor();
        assert!(!editor.select_collection("stage/model.numdlb"));
        assert!(editor.select_collection("fighter/model.numdlb"));
    }
}
