//! GPU-facing material state
//!
//! A [`RenderMaterial`] is created from one material record and is what the draw
//! path reads every frame. It is shared between the submeshes bound to it and the
//! editor sync bridge through [`SharedMaterial`]; every mutation bumps a revision
//! so renderables only re-upload after a change.

use std::collections::BTreeMap;
use std::sync::Arc;

use glam::Vec4;
use matl_core::{
    CUSTOM_BOOLEAN_COUNT, CUSTOM_FLOAT_COUNT, CUSTOM_VECTOR_COUNT, FilteringType, MatlBlendFactor,
    MatlCullMode, MatlFillMode, MatlSampler, ParamId, TEXTURE_COUNT,
};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use crate::convert::{GpuStateError, ToWgpu};
use crate::resources::TextureHandle;

/// Material shared by every submesh it is bound to.
pub type SharedMaterial = Arc<RwLock<RenderMaterial>>;

/// Upper bound for anisotropic filtering.
pub const MAX_ANISOTROPY: u16 = 16;

/// Render state applied when a material record carries no rasterizer or blend state.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MaterialDefaults {
    pub cull_mode: MatlCullMode,
    pub fill_mode: MatlFillMode,
    pub source_color: MatlBlendFactor,
    pub destination_color: MatlBlendFactor,
}

impl Default for MaterialDefaults {
    fn default() -> Self {
        Self {
            cull_mode: MatlCullMode::Back,
            fill_mode: MatlFillMode::Solid,
            source_color: MatlBlendFactor::One,
            destination_color: MatlBlendFactor::Zero,
        }
    }
}

/// A texture slot: the name from the material record and the resource it resolved to.
///
/// `handle` is `None` when no texture with that name was loaded; the draw path
/// then binds the default texture.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextureBinding {
    pub name: String,
    pub handle: Option<TextureHandle>,
}

impl TextureBinding {
    pub fn new(name: impl Into<String>, handle: Option<TextureHandle>) -> Self {
        Self {
            name: name.into(),
            handle,
        }
    }
}

/// Sampler settings in GPU terms.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SamplerData {
    pub address_mode_u: wgpu::AddressMode,
    pub address_mode_v: wgpu::AddressMode,
    pub address_mode_w: wgpu::AddressMode,
    pub mag_filter: wgpu::FilterMode,
    pub min_filter: wgpu::FilterMode,
    pub mipmap_filter: wgpu::FilterMode,
    pub lod_bias: f32,
    /// Always 1 unless the record asks for anisotropic filtering.
    pub max_anisotropy: u16,
    pub border_color: [f32; 4],
}

impl Default for SamplerData {
    fn default() -> Self {
        Self {
            address_mode_u: wgpu::AddressMode::Repeat,
            address_mode_v: wgpu::AddressMode::Repeat,
            address_mode_w: wgpu::AddressMode::Repeat,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::FilterMode::Linear,
            lod_bias: 0.0,
            max_anisotropy: 1,
            border_color: [0.0; 4],
        }
    }
}

impl SamplerData {
    /// Translate sampler settings from a material record.
    pub fn from_matl(sampler: &MatlSampler) -> Result<Self, GpuStateError> {
        let (min_filter, mipmap_filter) = sampler.min_filter.to_wgpu()?;
        let max_anisotropy = match sampler.texture_filtering_type {
            FilteringType::AnisotropicFiltering => {
                sampler.max_anisotropy.clamp(1, MAX_ANISOTROPY as u32) as u16
            }
            _ => 1,
        };

        Ok(Self {
            address_mode_u: sampler.wrap_s.to_wgpu()?,
            address_mode_v: sampler.wrap_t.to_wgpu()?,
            address_mode_w: sampler.wrap_r.to_wgpu()?,
            mag_filter: sampler.mag_filter.to_wgpu()?,
            min_filter,
            mipmap_filter,
            lod_bias: sampler.lod_bias,
            max_anisotropy,
            border_color: sampler.border_color.to_array(),
        })
    }

    /// Check if any axis samples the border color
    pub fn uses_border(&self) -> bool {
        [self.address_mode_u, self.address_mode_v, self.address_mode_w]
            .contains(&wgpu::AddressMode::ClampToBorder)
    }

    /// Closest predefined border color
    pub fn border_color(&self) -> wgpu::SamplerBorderColor {
        let [r, g, b, a] = self.border_color;
        if a < 0.5 {
            wgpu::SamplerBorderColor::TransparentBlack
        } else if r.min(g).min(b) >= 0.5 {
            wgpu::SamplerBorderColor::OpaqueWhite
        } else {
            wgpu::SamplerBorderColor::OpaqueBlack
        }
    }

    /// Sampler descriptor for these settings.
    ///
    /// Anisotropy is only applied when every filter is linear, which wgpu requires.
    pub fn descriptor(&self) -> wgpu::SamplerDescriptor<'static> {
        let all_linear = self.mag_filter == wgpu::FilterMode::Linear
            && self.min_filter == wgpu::FilterMode::Linear
            && self.mipmap_filter == wgpu::FilterMode::Linear;

        wgpu::SamplerDescriptor {
            label: Some("Material Sampler"),
            address_mode_u: self.address_mode_u,
            address_mode_v: self.address_mode_v,
            address_mode_w: self.address_mode_w,
            mag_filter: self.mag_filter,
            min_filter: self.min_filter,
            mipmap_filter: self.mipmap_filter,
            anisotropy_clamp: if all_linear { self.max_anisotropy.max(1) } else { 1 },
            border_color: self.uses_border().then(|| self.border_color()),
            ..Default::default()
        }
    }
}

/// Mutable render state for one material.
#[derive(Debug, Clone)]
pub struct RenderMaterial {
    material_label: String,
    shader_label: String,
    index: usize,
    cull_mode: Option<wgpu::Face>,
    fill_mode: wgpu::PolygonMode,
    source_color: wgpu::BlendFactor,
    destination_color: wgpu::BlendFactor,
    booleans: BTreeMap<ParamId, bool>,
    floats: BTreeMap<ParamId, f32>,
    vectors: BTreeMap<ParamId, Vec4>,
    textures: BTreeMap<ParamId, TextureBinding>,
    samplers: BTreeMap<ParamId, SamplerData>,
    revision: u64,
    binding_revision: u64,
}

impl RenderMaterial {
    /// Create a material with no parameters and the default render state.
    pub fn new(material_label: impl Into<String>, shader_label: impl Into<String>, index: usize) -> Self {
        Self {
            material_label: material_label.into(),
            shader_label: shader_label.into(),
            index,
            cull_mode: Some(wgpu::Face::Back),
            fill_mode: wgpu::PolygonMode::Fill,
            source_color: wgpu::BlendFactor::One,
            destination_color: wgpu::BlendFactor::Zero,
            booleans: BTreeMap::new(),
            floats: BTreeMap::new(),
            vectors: BTreeMap::new(),
            textures: BTreeMap::new(),
            samplers: BTreeMap::new(),
            revision: 0,
            binding_revision: 0,
        }
    }

    /// Fallback for submeshes no binding entry resolved.
    pub fn placeholder() -> Self {
        Self::new("", "", 0)
    }

    pub fn is_placeholder(&self) -> bool {
        self.material_label.is_empty() && self.shader_label.is_empty()
    }

    pub fn material_label(&self) -> &str {
        &self.material_label
    }

    pub fn shader_label(&self) -> &str {
        &self.shader_label
    }

    /// Position of the source record within its material file
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn cull_mode(&self) -> Option<wgpu::Face> {
        self.cull_mode
    }

    pub fn fill_mode(&self) -> wgpu::PolygonMode {
        self.fill_mode
    }

    pub fn source_color(&self) -> wgpu::BlendFactor {
        self.source_color
    }

    pub fn destination_color(&self) -> wgpu::BlendFactor {
        self.destination_color
    }

    pub fn boolean(&self, id: ParamId) -> Option<bool> {
        self.booleans.get(&id).copied()
    }

    pub fn float(&self, id: ParamId) -> Option<f32> {
        self.floats.get(&id).copied()
    }

    pub fn vector(&self, id: ParamId) -> Option<Vec4> {
        self.vectors.get(&id).copied()
    }

    pub fn texture(&self, id: ParamId) -> Option<&TextureBinding> {
        self.textures.get(&id)
    }

    pub fn sampler(&self, id: ParamId) -> Option<&SamplerData> {
        self.samplers.get(&id)
    }

    /// Texture slots with their paired sampler, in slot order
    pub fn texture_slots(&self) -> impl Iterator<Item = (ParamId, &TextureBinding, Option<&SamplerData>)> {
        self.textures.iter().map(|(id, binding)| {
            let sampler = id.sampler().and_then(|s| self.samplers.get(&s));
            (*id, binding, sampler)
        })
    }

    /// Incremented on every change.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Incremented when a texture or sampler changes.
    pub fn binding_revision(&self) -> u64 {
        self.binding_revision
    }

    pub fn set_cull_mode(&mut self, cull_mode: Option<wgpu::Face>) {
        self.cull_mode = cull_mode;
        self.touch();
    }

    pub fn set_fill_mode(&mut self, fill_mode: wgpu::PolygonMode) {
        self.fill_mode = fill_mode;
        self.touch();
    }

    pub fn set_source_color(&mut self, factor: wgpu::BlendFactor) {
        self.source_color = factor;
        self.touch();
    }

    pub fn set_destination_color(&mut self, factor: wgpu::BlendFactor) {
        self.destination_color = factor;
        self.touch();
    }

    pub fn update_boolean(&mut self, id: ParamId, value: bool) {
        self.booleans.insert(id, value);
        self.touch();
    }

    pub fn update_float(&mut self, id: ParamId, value: f32) {
        self.floats.insert(id, value);
        self.touch();
    }

    pub fn update_vector(&mut self, id: ParamId, value: Vec4) {
        self.vectors.insert(id, value);
        self.touch();
    }

    pub fn update_texture(&mut self, id: ParamId, binding: TextureBinding) {
        self.textures.insert(id, binding);
        self.touch_binding();
    }

    pub fn update_sampler(&mut self, id: ParamId, sampler: SamplerData) {
        self.samplers.insert(id, sampler);
        self.touch_binding();
    }

    fn touch(&mut self) {
        self.revision += 1;
    }

    fn touch_binding(&mut self) {
        self.binding_revision += 1;
        self.touch();
    }

    /// Pack scalar and vector parameters for the material uniform buffer.
    pub fn uniform(&self) -> MaterialUniform {
        let mut uniform = MaterialUniform::default();

        for (id, value) in &self.vectors {
            if let ParamId::CustomVector(i) = *id {
                if let Some(slot) = uniform.custom_vector.get_mut(i as usize) {
                    *slot = value.to_array();
                }
            }
        }
        for (id, value) in &self.floats {
            if let ParamId::CustomFloat(i) = *id {
                if let Some(slot) = uniform.custom_float.get_mut(i as usize) {
                    slot[0] = *value;
                }
            }
        }
        for (id, value) in &self.booleans {
            if let ParamId::CustomBoolean(i) = *id {
                if let Some(slot) = uniform.custom_boolean.get_mut(i as usize) {
                    slot[0] = u32::from(*value);
                }
            }
        }
        for (id, binding) in &self.textures {
            if let ParamId::Texture(i) = *id {
                if let Some(slot) = uniform.has_texture.get_mut(i as usize) {
                    slot[0] = u32::from(binding.handle.is_some());
                }
            }
        }

        uniform
    }
}

/// Material parameters as laid out in the material uniform buffer.
///
/// Every element is padded to 16 bytes to match WGSL uniform array stride.
#[repr(C)]
#[derive(Debug, Clone, Copy, bytemuck::Pod, bytemuck::Zeroable)]
pub struct MaterialUniform {
    pub custom_vector: [[f32; 4]; CUSTOM_VECTOR_COUNT as usize],
    pub custom_float: [[f32; 4]; CUSTOM_FLOAT_COUNT as usize],
    pub custom_boolean: [[u32; 4]; CUSTOM_BOOLEAN_COUNT as usize],
    pub has_texture: [[u32; 4]; TEXTURE_COUNT as usize],
}

impl Default for MaterialUniform {
    fn default() -> Self {
        bytemuck::Zeroable::zeroed()
    }
}
