//! Editable materials
//!
//! The editing surface works on [`EditableMaterial`]s: plain copies of a material
//! record's values. Every setter notifies the registered [`MaterialObserver`]s
//! with a [`MaterialChange`] naming what changed.

use std::sync::Arc;

use matl_core::{
    MatlBlendFactor, MatlCullMode, MatlEntry, MatlFillMode, MatlSampler, ParamData, ParamDataType,
};
use matl_renderer::{GpuStateError, MaterialDefaults};

#[derive(Debug, Clone, PartialEq)]
pub struct BooleanParam {
    pub param_id: String,
    pub value: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FloatParam {
    pub param_id: String,
    pub value: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Vec4Param {
    pub param_id: String,
    pub value: [f32; 4],
}

/// A texture slot edited together with its paired sampler.
#[derive(Debug, Clone, PartialEq)]
pub struct TextureSamplerParam {
    pub param_id: String,
    pub sampler_param_id: String,
    /// Texture name
    pub value: String,
    pub sampler: MatlSampler,
}

/// Material-level fields. There is one rasterizer and one blend state per material.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MaterialField {
    CullMode,
    FillMode,
    SourceColor,
    DestinationColor,
}

/// What changed on an editable material. Indices refer to the parameter lists.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MaterialChange {
    Boolean(usize),
    Float(usize),
    Vector(usize),
    TextureSampler(usize),
    Material(MaterialField),
}

/// Receives change notifications from an editable material.
pub trait MaterialObserver: Send + Sync {
    fn on_change(&self, material: &EditableMaterial, change: MaterialChange) -> Result<(), GpuStateError>;
}

/// Edit errors
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EditError {
    #[error("No {kind} parameter at index {index}")]
    NoSuchParam { kind: &'static str, index: usize },
    #[error(transparent)]
    GpuState(#[from] GpuStateError),
}

/// Stable display color for the material at `index`.
///
/// Hues step by the golden angle so neighbouring indices stay distinguishable.
pub fn id_color(index: usize) -> [u8; 3] {
    const GOLDEN_ANGLE: f32 = 137.507_77;
    let hue = (index as f32 * GOLDEN_ANGLE) % 360.0;
    hsv_to_rgb(hue, 0.7, 0.9)
}

fn hsv_to_rgb(hue: f32, saturation: f32, value: f32) -> [u8; 3] {
    let c = value * saturation;
    let h = hue / 60.0;
    let x = c * (1.0 - (h % 2.0 - 1.0).abs());
    let (r, g, b) = match h as u32 {
        0 => (c, x, 0.0),
        1 => (x, c, 0.0),
        2 => (0.0, c, x),
        3 => (0.0, x, c),
        4 => (x, 0.0, c),
        _ => (c, 0.0, x),
    };
    let m = value - c;
    let to_byte = |v: f32| ((v + m) * 255.0).round().clamp(0.0, 255.0) as u8;
    [to_byte(r), to_byte(g), to_byte(b)]
}

/// A material as shown to the editing surface.
pub struct EditableMaterial {
    pub name: String,
    pub shader_label: String,
    /// Position of the record in its material file
    pub index: usize,
    pub id_color: [u8; 3],
    cull_mode: MatlCullMode,
    fill_mode: MatlFillMode,
    source_color: MatlBlendFactor,
    destination_color: MatlBlendFactor,
    booleans: Vec<BooleanParam>,
    floats: Vec<FloatParam>,
    vectors: Vec<Vec4Param>,
    textures: Vec<TextureSamplerParam>,
    observers: Vec<Arc<dyn MaterialObserver>>,
}

impl std::fmt::Debug for EditableMaterial {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EditableMaterial")
            .field("name", &self.name)
            .field("shader_label", &self.shader_label)
            .field("index", &self.index)
            .field("observers", &self.observers.len())
            .finish_non_exhaustive()
    }
}

impl EditableMaterial {
    /// Copy the values of a material record.
    ///
    /// Texture slots without a paired sampler are left out.
    pub fn from_entry(entry: &MatlEntry, index: usize, defaults: &MaterialDefaults) -> Self {
        let rasterizer = entry.rasterizer_state();
        let blend = entry.blend_state();

        let booleans = entry
            .attributes_of(ParamDataType::Boolean)
            .filter_map(|a| match a.data {
                ParamData::Boolean(value) => Some(BooleanParam {
                    param_id: a.param_id.to_string(),
                    value,
                }),
                _ => None,
            })
            .collect();

        let floats = entry
            .attributes_of(ParamDataType::Float)
            .filter_map(|a| match a.data {
                ParamData::Float(value) => Some(FloatParam {
                    param_id: a.param_id.to_string(),
                    value,
                }),
                _ => None,
            })
            .collect();

        let vectors = entry
            .attributes_of(ParamDataType::Vector4)
            .filter_map(|a| match &a.data {
                ParamData::Vector4(value) => Some(Vec4Param {
                    param_id: a.param_id.to_string(),
                    value: value.to_array(),
                }),
                _ => None,
            })
            .collect();

        let textures = entry
            .attributes_of(ParamDataType::String)
            .filter_map(|a| {
                let ParamData::String(name) = &a.data else {
                    return None;
                };
                let sampler_id = a.param_id.sampler()?;
                let sampler = entry.sampler_for(a.param_id)?;
                Some(TextureSamplerParam {
                    param_id: a.param_id.to_string(),
                    sampler_param_id: sampler_id.to_string(),
                    value: name.clone(),
                    sampler: sampler.clone(),
                })
            })
            .collect();

        Self {
            name: entry.material_label.clone(),
            shader_label: entry.shader_label.clone(),
            index,
            id_color: id_color(index),
            cull_mode: rasterizer.map_or(defaults.cull_mode, |r| r.cull_mode),
            fill_mode: rasterizer.map_or(defaults.fill_mode, |r| r.fill_mode),
            source_color: blend.map_or(defaults.source_color, |b| b.source_color),
            destination_color: blend.map_or(defaults.destination_color, |b| b.destination_color),
            booleans,
            floats,
            vectors,
            textures,
            observers: Vec::new(),
        }
    }

    /// Register an observer for every subsequent change
    pub fn subscribe(&mut self, observer: Arc<dyn MaterialObserver>) {
        self.observers.push(observer);
    }

    pub fn observer_count(&self) -> usize {
        self.observers.len()
    }

    pub fn cull_mode(&self) -> MatlCullMode {
        self.cull_mode
    }

    pub fn fill_mode(&self) -> MatlFillMode {
        self.fill_mode
    }

    pub fn source_color(&self) -> MatlBlendFactor {
        self.source_color
    }

    pub fn destination_color(&self) -> MatlBlendFactor {
        self.destination_color
    }

    pub fn booleans(&self) -> &[BooleanParam] {
        &self.booleans
    }

    pub fn floats(&self) -> &[FloatParam] {
        &self.floats
    }

    pub fn vectors(&self) -> &[Vec4Param] {
        &self.vectors
    }

    pub fn textures(&self) -> &[TextureSamplerParam] {
        &self.textures
    }

    #[cfg(test)]
    pub(crate) fn floats_mut(&mut self) -> &mut Vec<FloatParam> {
        &mut self.floats
    }

    pub fn set_boolean(&mut self, index: usize, value: bool) -> Result<(), EditError> {
        let param = self
            .booleans
            .get_mut(index)
            .ok_or(EditError::NoSuchParam { kind: "boolean", index })?;
        param.value = value;
        self.notify(MaterialChange::Boolean(index))
    }

    pub fn set_float(&mut self, index: usize, value: f32) -> Result<(), EditError> {
        let param = self
            .floats
            .get_mut(index)
            .ok_or(EditError::NoSuchParam { kind: "float", index })?;
        param.value = value;
        self.notify(MaterialChange::Float(index))
    }

    pub fn set_vector(&mut self, index: usize, value: [f32; 4]) -> Result<(), EditError> {
        let param = self
            .vectors
            .get_mut(index)
            .ok_or(EditError::NoSuchParam { kind: "vector", index })?;
        param.value = value;
        self.notify(MaterialChange::Vector(index))
    }

    pub fn set_texture(&mut self, index: usize, name: impl Into<String>) -> Result<(), EditError> {
        let param = self
            .textures
            .get_mut(index)
            .ok_or(EditError::NoSuchParam { kind: "texture", index })?;
        param.value = name.into();
        self.notify(MaterialChange::TextureSampler(index))
    }

    pub fn set_sampler(&mut self, index: usize, sampler: MatlSampler) -> Result<(), EditError> {
        let param = self
            .textures
            .get_mut(index)
            .ok_or(EditError::NoSuchParam { kind: "texture", index })?;
        param.sampler = sampler;
        self.notify(MaterialChange::TextureSampler(index))
    }

    pub fn set_cull_mode(&mut self, cull_mode: MatlCullMode) -> Result<(), EditError> {
        self.cull_mode = cull_mode;
        self.notify(MaterialChange::Material(MaterialField::CullMode))
    }

    pub fn set_fill_mode(&mut self, fill_mode: MatlFillMode) -> Result<(), EditError> {
        self.fill_mode = fill_mode;
        self.notify(MaterialChange::Material(MaterialField::FillMode))
    }

    pub fn set_source_color(&mut self, factor: MatlBlendFactor) -> Result<(), EditError> {
        self.source_color = factor;
        self.notify(MaterialChange::Material(MaterialField::SourceColor))
    }

    pub fn set_destination_color(&mut self, factor: MatlBlendFactor) -> Result<(), EditError> {
        self.destination_color = factor;
        self.notify(MaterialChange::Material(MaterialField::DestinationColor))
    }

    /// Tell every observer; the first failure is returned after all have run.
    ///
    /// The edited value is kept either way.
    fn notify(&self, change: MaterialChange) -> Result<(), EditError> {
        let mut result = Ok(());
        for observer in &self.observers {
            if let Err(e) = observer.on_change(self, change) {
                tracing::warn!("Failed to apply {:?} to '{}': {}", change, self.name, e);
                if result.is_ok() {
                    result = Err(e.into());
                }
            }
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use matl_core::{MatlRasterizerState, MatlVector4, ParamId};
    use parking_lot::Mutex;

    #[derive(Default)]
    struct Recorder {
        changes: Mutex<Vec<MaterialChange>>,
    }

    impl MaterialObserver for Recorder {
        fn on_change(&self, _material: &EditableMaterial, change: MaterialChange) -> Result<(), GpuStateError> {
            self.changes.lock().push(change);
            Ok(())
        }
    }

    fn entry() -> MatlEntry {
        MatlEntry::new("mat_skin", "SFX_PBS_skin")
            .with_attribute(ParamId::CustomBoolean(1), ParamData::Boolean(true))
            .with_attribute(ParamId::CustomFloat(8), ParamData::Float(0.5))
            .with_attribute(
                ParamId::CustomVector(0),
                ParamData::Vector4(MatlVector4::new(1.0, 1.0, 1.0, 1.0)),
            )
            .with_attribute(ParamId::Texture(0), ParamData::String("skin_col".into()))
            .with_attribute(ParamId::Sampler(0), ParamData::Sampler(MatlSampler::default()))
            .with_attribute(ParamId::Texture(4), ParamData::String("diffuse".into()))
            .with_attribute(
                ParamId::RasterizerState(0),
                ParamData::RasterizerState(MatlRasterizerState {
                    cull_mode: MatlCullMode::Front,
                    ..Default::default()
                }),
            )
    }

    #[test]
    fn test_from_entry() {
        let material = EditableMaterial::from_entry(&entry(), 2, &MaterialDefaults::default());

        assert_eq!(material.name, "mat_skin");
        assert_eq!(material.index, 2);
        assert_eq!(material.booleans()[0].param_id, "CustomBoolean1");
        assert_eq!(material.floats()[0].value, 0.5);
        assert_eq!(material.vectors()[0].value, [1.0; 4]);
        // Texture4 has no paired sampler
        assert_eq!(material.textures().len(), 1);
        assert_eq!(material.textures()[0].sampler_param_id, "Sampler0");
        assert_eq!(material.cull_mode(), MatlCullMode::Front);
        assert_eq!(material.source_color(), MatlBlendFactor::One);
    }

    #[test]
    fn test_setters_notify() {
        let mut material = EditableMaterial::from_entry(&entry(), 0, &MaterialDefaults::default());
        let recorder = Arc::new(Recorder::default());
        material.subscribe(recorder.clone());

        material.set_float(0, 0.25).unwrap();
        material.set_texture(0, "skin_col2").unwrap();
        material.set_fill_mode(MatlFillMode::Line).unwrap();

        assert_eq!(
            *recorder.changes.lock(),
            vec![
                MaterialChange::Float(0),
                MaterialChange::TextureSampler(0),
                MaterialChange::Material(MaterialField::FillMode),
            ]
        );
        assert_eq!(material.floats()[0].value, 0.25);
    }

    #[test]
    fn test_set_missing_param() {
        let mut material = EditableMaterial::from_entry(&entry(), 0, &MaterialDefaults::default());
        assert_eq!(
            material.set_boolean(3, false),
            Err(EditError::NoSuchParam {
                kind: "boolean",
                index: 3
            })
        );
    }

    #[test]
    fn test_id_color_stable_and_distinct() {
        assert_eq!(id_color(3), id_color(3));
        assert_ne!(id_color(0), id_color(1));
        assert_ne!(id_color(1), id_color(2));
    }
}
