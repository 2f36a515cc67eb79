//! Material records
//!
//! A [`Matl`] is the ordered list of material entries read from a model's
//! material file. Entries are not required to have unique labels.

use serde::{Deserialize, Serialize};

use crate::param::ParamId;
use crate::state::{
    FilteringType, MatlBlendFactor, MatlCullMode, MatlFillMode, MatlMagFilter, MatlMinFilter,
    MatlWrapMode,
};

/// Ordered material records for one model
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Matl {
    pub entries: Vec<MatlEntry>,
}

impl Matl {
    /// Create material records from entries in file order
    pub fn new(entries: Vec<MatlEntry>) -> Self {
        Self { entries }
    }

    /// Check if there are no entries
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// A single material record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatlEntry {
    pub material_label: String,
    pub shader_label: String,
    pub attributes: Vec<MatlAttribute>,
}

impl MatlEntry {
    /// Create an entry without attributes
    pub fn new(material_label: impl Into<String>, shader_label: impl Into<String>) -> Self {
        Self {
            material_label: material_label.into(),
            shader_label: shader_label.into(),
            attributes: Vec::new(),
        }
    }

    /// Append an attribute
    pub fn with_attribute(mut self, param_id: ParamId, data: ParamData) -> Self {
        self.attributes.push(MatlAttribute { param_id, data });
        self
    }

    /// First attribute with the given parameter id
    pub fn attribute(&self, param_id: ParamId) -> Option<&MatlAttribute> {
        self.attributes.iter().find(|a| a.param_id == param_id)
    }

    /// Attributes of one data type, in record order
    pub fn attributes_of(&self, data_type: ParamDataType) -> impl Iterator<Item = &MatlAttribute> {
        self.attributes
            .iter()
            .filter(move |a| a.data.data_type() == data_type)
    }

    /// The material's rasterizer state, if it has one.
    ///
    /// A material holds at most one; the first is used if an asset has more.
    pub fn rasterizer_state(&self) -> Option<&MatlRasterizerState> {
        self.attributes.iter().find_map(|a| match &a.data {
            ParamData::RasterizerState(state) => Some(state),
            _ => None,
        })
    }

    /// The material's blend state, if it has one.
    pub fn blend_state(&self) -> Option<&MatlBlendState> {
        self.attributes.iter().find_map(|a| match &a.data {
            ParamData::BlendState(state) => Some(state),
            _ => None,
        })
    }

    /// Sampler paired with a texture parameter
    pub fn sampler_for(&self, texture: ParamId) -> Option<&MatlSampler> {
        let sampler_id = texture.sampler()?;
        self.attributes
            .iter()
            .filter(|a| a.param_id == sampler_id)
            .find_map(|a| match &a.data {
                ParamData::Sampler(sampler) => Some(sampler),
                _ => None,
            })
    }
}

/// A typed material attribute
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatlAttribute {
    pub param_id: ParamId,
    pub data: ParamData,
}

/// Attribute value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ParamData {
    Float(f32),
    Boolean(bool),
    Vector4(MatlVector4),
    /// Texture name
    String(String),
    Sampler(MatlSampler),
    RasterizerState(MatlRasterizerState),
    BlendState(MatlBlendState),
}

impl ParamData {
    /// Data type tag of this value
    pub fn data_type(&self) -> ParamDataType {
        match self {
            ParamData::Float(_) => ParamDataType::Float,
            ParamData::Boolean(_) => ParamDataType::Boolean,
            ParamData::Vector4(_) => ParamDataType::Vector4,
            ParamData::String(_) => ParamDataType::String,
            ParamData::Sampler(_) => ParamDataType::Sampler,
            ParamData::RasterizerState(_) => ParamDataType::RasterizerState,
            ParamData::BlendState(_) => ParamDataType::BlendState,
        }
    }
}

/// Data type tag of an attribute
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParamDataType {
    Float,
    Boolean,
    Vector4,
    String,
    Sampler,
    RasterizerState,
    BlendState,
}

/// Four component vector value
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct MatlVector4 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub w: f32,
}

impl MatlVector4 {
    pub fn new(x: f32, y: f32, z: f32, w: f32) -> Self {
        Self { x, y, z, w }
    }

    pub fn to_array(&self) -> [f32; 4] {
        [self.x, self.y, self.z, self.w]
    }
}

impl From<[f32; 4]> for MatlVector4 {
    fn from(v: [f32; 4]) -> Self {
        Self::new(v[0], v[1], v[2], v[3])
    }
}

/// Texture sampler settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatlSampler {
    pub wrap_s: MatlWrapMode,
    pub wrap_t: MatlWrapMode,
    pub wrap_r: MatlWrapMode,
    pub min_filter: MatlMinFilter,
    pub mag_filter: MatlMagFilter,
    pub texture_filtering_type: FilteringType,
    pub border_color: MatlVector4,
    pub lod_bias: f32,
    pub max_anisotropy: u32,
}

impl Default for MatlSampler {
    fn default() -> Self {
        Self {
            wrap_s: MatlWrapMode::Repeat,
            wrap_t: MatlWrapMode::Repeat,
            wrap_r: MatlWrapMode::Repeat,
            min_filter: MatlMinFilter::LinearMipmapLinear,
            mag_filter: MatlMagFilter::Linear,
            texture_filtering_type: FilteringType::Default,
            border_color: MatlVector4::default(),
            lod_bias: 0.0,
            max_anisotropy: 1,
        }
    }
}

/// Rasterizer state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatlRasterizerState {
    pub fill_mode: MatlFillMode,
    pub cull_mode: MatlCullMode,
    pub depth_bias: f32,
}

impl Default for MatlRasterizerState {
    fn default() -> Self {
        Self {
            fill_mode: MatlFillMode::Solid,
            cull_mode: MatlCullMode::Back,
            depth_bias: 0.0,
        }
    }
}

/// Blend state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatlBlendState {
    pub source_color: MatlBlendFactor,
    pub destination_color: MatlBlendFactor,
    pub alpha_sample_to_coverage: bool,
}

impl Default for MatlBlendState {
    fn default() -> Self {
        Self {
            source_color: MatlBlendFactor::One,
            destination_color: MatlBlendFactor::Zero,
            alpha_sample_to_coverage: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn skin() -> MatlEntry {
        MatlEntry::new("mat_skin", "SFX_PBS_0100000008008269_opaque")
            .with_attribute(ParamId::CustomFloat(8), ParamData::Float(0.5))
            .with_attribute(ParamId::Texture(0), ParamData::String("def_skin_col".into()))
            .with_attribute(ParamId::Sampler(0), ParamData::Sampler(MatlSampler::default()))
            .with_attribute(ParamId::Texture(4), ParamData::String("def_skin_nor".into()))
            .with_attribute(
                ParamId::RasterizerState(0),
                ParamData::RasterizerState(MatlRasterizerState {
                    cull_mode: MatlCullMode::Front,
                    ..Default::default()
                }),
            )
    }

    #[test]
    fn test_sampler_for() {
        let entry = skin();
        assert!(entry.sampler_for(ParamId::Texture(0)).is_some());
        assert!(entry.sampler_for(ParamId::Texture(4)).is_none());
        assert!(entry.sampler_for(ParamId::CustomFloat(8)).is_none());
    }

    #[test]
    fn test_states() {
        let entry = skin();
        assert_eq!(
            entry.rasterizer_state().map(|r| r.cull_mode),
            Some(MatlCullMode::Front)
        );
        assert!(entry.blend_state().is_none());
    }

    #[test]
    fn test_attributes_of() {
        let entry = skin();
        let textures: Vec<ParamId> = entry
            .attributes_of(ParamDataType::String)
            .map(|a| a.param_id)
            .collect();
        assert_eq!(textures, vec![ParamId::Texture(0), ParamId::Texture(4)]);
    }
}
