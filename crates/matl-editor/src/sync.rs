//! Editor to viewport synchronization
//!
//! [`RenderMaterialSync`] is the only writer of a live [`RenderMaterial`]. It
//! holds a weak reference, so closing a model while the editor is open simply
//! turns further edits into no-ops.

use std::collections::HashMap;
use std::sync::{Arc, Weak};

use glam::Vec4;
use matl_core::ParamId;
use matl_renderer::{
    GpuStateError, RenderMaterial, SamplerData, SharedMaterial, TextureBinding, TextureHandle,
    ToWgpu, lookup_texture,
};
use parking_lot::RwLock;

use crate::editable::{EditableMaterial, MaterialChange, MaterialField, MaterialObserver};

/// Applies editable material changes to the paired render material.
pub struct RenderMaterialSync {
    target: Weak<RwLock<RenderMaterial>>,
    textures: Arc<HashMap<String, TextureHandle>>,
}

impl RenderMaterialSync {
    pub fn new(target: &SharedMaterial, textures: Arc<HashMap<String, TextureHandle>>) -> Self {
        Self {
            target: Arc::downgrade(target),
            textures,
        }
    }

    /// Register a sync bridge from `editable` to `target`.
    pub fn attach(
        editable: &mut EditableMaterial,
        target: &SharedMaterial,
        textures: Arc<HashMap<String, TextureHandle>>,
    ) {
        editable.subscribe(Arc::new(Self::new(target, textures)));
    }

    fn apply_texture(
        &self,
        target: &RwLock<RenderMaterial>,
        material: &EditableMaterial,
        index: usize,
    ) -> Result<(), GpuStateError> {
        let Some(param) = material.textures().get(index) else {
            return Ok(());
        };
        let Some(texture_id) = parse_id(&param.param_id) else {
            return Ok(());
        };
        let Some(sampler_id) = parse_id(&param.sampler_param_id) else {
            return Ok(());
        };

        let sampler = SamplerData::from_matl(&param.sampler)?;
        let handle = lookup_texture(&self.textures, &param.value);

        let mut target = target.write();
        target.update_texture(texture_id, TextureBinding::new(param.value.clone(), handle));
        target.update_sampler(sampler_id, sampler);
        Ok(())
    }

    fn apply_field(
        target: &RwLock<RenderMaterial>,
        material: &EditableMaterial,
        field: MaterialField,
    ) -> Result<(), GpuStateError> {
        match field {
            MaterialField::CullMode => {
                let cull_mode = material.cull_mode().to_wgpu()?;
                target.write().set_cull_mode(cull_mode);
            }
            MaterialField::FillMode => {
                let fill_mode = material.fill_mode().to_wgpu()?;
                target.write().set_fill_mode(fill_mode);
            }
            MaterialField::SourceColor => {
                let factor = material.source_color().to_wgpu()?;
                target.write().set_source_color(factor);
            }
            MaterialField::DestinationColor => {
                let factor = material.destination_color().to_wgpu()?;
                target.write().set_destination_color(factor);
            }
        }
        Ok(())
    }
}

/// Parameter ids that do not parse are not live-editable.
fn parse_id(param_id: &str) -> Option<ParamId> {
    match param_id.parse() {
        Ok(id) => Some(id),
        Err(e) => {
            tracing::debug!("Not synchronizing parameter: {}", e);
            None
        }
    }
}

impl MaterialObserver for RenderMaterialSync {
    fn on_change(&self, material: &EditableMaterial, change: MaterialChange) -> Result<(), GpuStateError> {
        let Some(target) = self.target.upgrade() else {
            tracing::debug!("Render material for '{}' is gone", material.name);
            return Ok(());
        };

        match change {
            MaterialChange::Boolean(i) => {
                if let Some(param) = material.booleans().get(i) {
                    if let Some(id) = parse_id(&param.param_id) {
                        target.write().update_boolean(id, param.value);
                    }
                }
            }
            MaterialChange::Float(i) => {
                if let Some(param) = material.floats().get(i) {
                    if let Some(id) = parse_id(&param.param_id) {
                        target.write().update_float(id, param.value);
                    }
                }
            }
            MaterialChange::Vector(i) => {
                if let Some(param) = material.vectors().get(i) {
                    if let Some(id) = parse_id(&param.param_id) {
                        target.write().update_vector(id, Vec4::from_array(param.value));
                    }
                }
            }
            MaterialChange::TextureSampler(i) => self.apply_texture(&target, material, i)?,
            MaterialChange::Material(field) => Self::apply_field(&target, material, field)?,
        }
        Ok(())
    }
}
