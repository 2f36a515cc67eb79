//! Material resolution
//!
//! Turns the entries of a material file into [`RenderMaterial`]s keyed by label.

use std::collections::HashMap;
use std::sync::Arc;

use glam::Vec4;
use matl_core::{Matl, MatlEntry, ParamData, ParamId};
use parking_lot::RwLock;

use crate::convert::{GpuStateError, ToWgpu};
use crate::material::{MaterialDefaults, RenderMaterial, SamplerData, SharedMaterial, TextureBinding};
use crate::resources::TextureHandle;

/// A material entry that could not be translated to GPU state.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("Material '{label}' (entry {index}): {source}")]
pub struct MaterialError {
    pub label: String,
    pub index: usize,
    #[source]
    pub source: GpuStateError,
}

/// Outcome of resolving one material file.
#[derive(Debug, Default)]
pub struct ResolvedMaterials {
    /// One material per distinct label. Later entries replace earlier ones.
    pub materials: HashMap<String, SharedMaterial>,
    pub errors: Vec<MaterialError>,
}

/// Build a render material from one entry.
///
/// Texture slots are only included when the entry has the paired sampler.
pub fn create_material(
    entry: &MatlEntry,
    index: usize,
    textures: &HashMap<String, TextureHandle>,
    defaults: &MaterialDefaults,
) -> Result<RenderMaterial, GpuStateError> {
    let mut material = RenderMaterial::new(&entry.material_label, &entry.shader_label, index);

    let rasterizer = entry.rasterizer_state();
    let cull_mode = rasterizer.map_or(defaults.cull_mode, |r| r.cull_mode);
    let fill_mode = rasterizer.map_or(defaults.fill_mode, |r| r.fill_mode);
    material.set_cull_mode(cull_mode.to_wgpu()?);
    material.set_fill_mode(fill_mode.to_wgpu()?);

    let blend = entry.blend_state();
    let source = blend.map_or(defaults.source_color, |b| b.source_color);
    let destination = blend.map_or(defaults.destination_color, |b| b.destination_color);
    material.set_source_color(source.to_wgpu()?);
    material.set_destination_color(destination.to_wgpu()?);

    for attribute in &entry.attributes {
        match (&attribute.param_id, &attribute.data) {
            (id @ ParamId::CustomBoolean(_), ParamData::Boolean(value)) => {
                material.update_boolean(*id, *value);
            }
            (id @ ParamId::CustomFloat(_), ParamData::Float(value)) => {
                material.update_float(*id, *value);
            }
            (id @ ParamId::CustomVector(_), ParamData::Vector4(value)) => {
                material.update_vector(*id, Vec4::from_array(value.to_array()));
            }
            (id @ ParamId::Texture(_), ParamData::String(name)) => {
                let Some(sampler) = entry.sampler_for(*id) else {
                    tracing::debug!(
                        "Skipping {} of '{}': no paired sampler",
                        id,
                        entry.material_label
                    );
                    continue;
                };
                let sampler = SamplerData::from_matl(sampler)?;
                let handle = lookup_texture(textures, name);
                material.update_texture(*id, TextureBinding::new(name.clone(), handle));
                if let Some(sampler_id) = id.sampler() {
                    material.update_sampler(sampler_id, sampler);
                }
            }
            // Samplers are read through their texture; states were applied above
            (_, ParamData::Sampler(_))
            | (_, ParamData::RasterizerState(_))
            | (_, ParamData::BlendState(_)) => {}
            (id, data) => {
                tracing::debug!(
                    "Ignoring {:?} value for {} in '{}'",
                    data.data_type(),
                    id,
                    entry.material_label
                );
            }
        }
    }

    Ok(material)
}

/// Find a texture by name. Names in material records are case-insensitive.
pub fn lookup_texture(textures: &HashMap<String, TextureHandle>, name: &str) -> Option<TextureHandle> {
    textures.get(name).copied().or_else(|| {
        textures
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, handle)| *handle)
    })
}

/// Resolve every entry of a material file.
///
/// Entries are processed in file order and the last entry with a label wins,
/// even if it fails: a failed entry removes any earlier material with the same
/// label so its submeshes fall back to the placeholder. A missing file produces
/// an empty result.
pub fn resolve_materials(
    matl: Option<&Matl>,
    textures: &HashMap<String, TextureHandle>,
    defaults: &MaterialDefaults,
) -> ResolvedMaterials {
    let mut resolved = ResolvedMaterials::default();
    let Some(matl) = matl else {
        return resolved;
    };

    for (index, entry) in matl.entries.iter().enumerate() {
        match create_material(entry, index, textures, defaults) {
            Ok(material) => {
                if resolved
                    .materials
                    .insert(entry.material_label.clone(), Arc::new(RwLock::new(material)))
                    .is_some()
                {
                    tracing::debug!("Material '{}' redefined at entry {}", entry.material_label, index);
                }
            }
            Err(source) => {
                tracing::warn!(
                    "Failed to create material '{}' (entry {}): {}",
                    entry.material_label,
                    index,
                    source
                );
                resolved.materials.remove(&entry.material_label);
                resolved.errors.push(MaterialError {
                    label: entry.material_label.clone(),
                    index,
                    source,
                });
            }
        }
    }

    tracing::info!(
        "Resolved {} materials ({} failed)",
        resolved.materials.len(),
        resolved.errors.len()
    );
    resolved
}

#[cfg(test)]
mod tests {
    use super::*;
    use matl_core::{
        MatlBlendFactor, MatlBlendState, MatlCullMode, MatlRasterizerState, MatlSampler,
        MatlVector4, MatlWrapMode,
    };

    fn textures() -> HashMap<String, TextureHandle> {
        HashMap::from([("eye_col".to_string(), TextureHandle::from_raw(1))])
    }

    #[test]
    fn test_missing_matl_is_empty() {
        let resolved = resolve_materials(None, &textures(), &MaterialDefaults::default());
        assert!(resolved.materials.is_empty());
        assert!(resolved.errors.is_empty());
    }

    #[test]
    fn test_duplicate_labels_last_wins() {
        let matl = Matl::new(vec![
            MatlEntry::new("mat_a", "shader_1"),
            MatlEntry::new("mat_b", "shader_2"),
            MatlEntry::new("mat_a", "shader_3"),
        ]);
        let resolved = resolve_materials(Some(&matl), &textures(), &MaterialDefaults::default());

        assert_eq!(resolved.materials.len(), 2);
        let a = resolved.materials["mat_a"].read();
        assert_eq!(a.shader_label(), "shader_3");
        assert_eq!(a.index(), 2);
    }

    #[test]
    fn test_texture_requires_paired_sampler() {
        let entry = MatlEntry::new("mat_eye", "eye")
            .with_attribute(ParamId::Texture(0), ParamData::String("eye_col".into()))
            .with_attribute(ParamId::Sampler(0), ParamData::Sampler(MatlSampler::default()))
            .with_attribute(ParamId::Texture(1), ParamData::String("eye_nor".into()));

        let material =
            create_material(&entry, 0, &textures(), &MaterialDefaults::default()).unwrap();

        let slot = material.texture(ParamId::Texture(0)).unwrap();
        assert_eq!(slot.handle, Some(TextureHandle::from_raw(1)));
        assert!(material.sampler(ParamId::Sampler(0)).is_some());
        assert!(material.texture(ParamId::Texture(1)).is_none());
    }

    #[test]
    fn test_unknown_texture_name_has_no_handle() {
        let entry = MatlEntry::new("mat", "shader")
            .with_attribute(ParamId::Texture(2), ParamData::String("missing".into()))
            .with_attribute(ParamId::Sampler(2), ParamData::Sampler(MatlSampler::default()));
        let material =
            create_material(&entry, 0, &textures(), &MaterialDefaults::default()).unwrap();
        assert_eq!(material.texture(ParamId::Texture(2)).unwrap().handle, None);
    }

    #[test]
    fn test_states_and_defaults() {
        let entry = MatlEntry::new("mat", "shader")
            .with_attribute(ParamId::CustomVector(0), ParamData::Vector4(MatlVector4::new(1.0, 0.0, 0.0, 1.0)))
            .with_attribute(
                ParamId::RasterizerState(0),
                ParamData::RasterizerState(MatlRasterizerState {
                    cull_mode: MatlCullMode::None,
                    ..Default::default()
                }),
            );
        let defaults = MaterialDefaults {
            source_color: MatlBlendFactor::SourceAlpha,
            ..Default::default()
        };

        let material = create_material(&entry, 5, &textures(), &defaults).unwrap();
        assert_eq!(material.cull_mode(), None);
        assert_eq!(material.source_color(), wgpu::BlendFactor::SrcAlpha);
        assert_eq!(material.destination_color(), wgpu::BlendFactor::Zero);
        assert_eq!(material.vector(ParamId::CustomVector(0)), Some(Vec4::new(1.0, 0.0, 0.0, 1.0)));
        assert_eq!(material.index(), 5);
    }

    #[test]
    fn test_unsupported_value_is_reported() {
        let matl = Matl::new(vec![
            MatlEntry::new("mat_a", "shader_1"),
            MatlEntry::new("mat_bad", "shader_2").with_attribute(
                ParamId::BlendState(0),
                ParamData::BlendState(MatlBlendState {
                    source_color: MatlBlendFactor::Other(99),
                    ..Default::default()
                }),
            ),
        ]);
        let resolved = resolve_materials(Some(&matl), &textures(), &MaterialDefaults::default());

        assert!(resolved.materials.contains_key("mat_a"));
        assert!(!resolved.materials.contains_key("mat_bad"));
        assert_eq!(resolved.errors.len(), 1);
        assert_eq!(resolved.errors[0].source, GpuStateError::BlendFactor(99));
        assert_eq!(resolved.errors[0].index, 1);
    }

    #[test]
    fn test_failed_redefinition_shadows_earlier() {
        let bad_sampler = MatlSampler {
            wrap_s: MatlWrapMode::Other(8),
            ..Default::default()
        };
        let matl = Matl::new(vec![
            MatlEntry::new("mat_a", "shader_1"),
            MatlEntry::new("mat_a", "shader_2")
                .with_attribute(ParamId::Texture(0), ParamData::String("eye_col".into()))
                .with_attribute(ParamId::Sampler(0), ParamData::Sampler(bad_sampler)),
        ]);
        let resolved = resolve_materials(Some(&matl), &textures(), &MaterialDefaults::default());
        assert!(resolved.materials.is_empty());
        assert_eq!(resolved.errors[0].source, GpuStateError::WrapMode(8));
    }
}
