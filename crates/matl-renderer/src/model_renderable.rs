//! Renderable for a loaded model asset

use std::sync::Arc;

use crate::bounds::BoundingSphere;
use crate::context::RenderContext;
use crate::gpu_resources;
use crate::model::ModelAsset;
use crate::renderable::{FrameContext, FrameResources, Renderable, RenderableKind, RenderableSource};
use crate::resources::GpuResources;
use crate::shaders::PipelineKey;

/// Per-submesh GPU state, rebuilt when the bound material changes.
struct SubMeshGpu {
    uniform_buffer: wgpu::Buffer,
    revision: Option<u64>,
    binding_revision: Option<u64>,
    bind_group: Option<wgpu::BindGroup>,
    key: Option<PipelineKey>,
    pipeline: Option<wgpu::RenderPipeline>,
}

/// Draws every visible submesh of a [`ModelAsset`] with its bound material.
pub struct ModelRenderable {
    asset: Arc<ModelAsset>,
    sub_meshes: Vec<SubMeshGpu>,
}

impl ModelRenderable {
    pub fn new(ctx: &RenderContext, asset: Arc<ModelAsset>) -> Self {
        let count = asset.model.as_ref().map_or(0, |m| m.sub_meshes.len());
        let sub_meshes = (0..count)
            .map(|_| SubMeshGpu {
                uniform_buffer: gpu_resources::create_material_buffer(ctx.device()),
                revision: None,
                binding_revision: None,
                bind_group: None,
                key: None,
                pipeline: None,
            })
            .collect();

        Self { asset, sub_meshes }
    }

    pub fn asset(&self) -> &Arc<ModelAsset> {
        &self.asset
    }
}

impl Renderable for ModelRenderable {
    fn kind(&self) -> RenderableKind {
        RenderableKind::Model
    }

    fn bounding_sphere(&self) -> Option<BoundingSphere> {
        self.asset.bounding_sphere()
    }

    fn prepare(&mut self, frame: &mut FrameResources<'_>) {
        let Some(model) = self.asset.model.as_ref() else {
            return;
        };

        for (mesh, gpu) in model.sub_meshes.iter().zip(self.sub_meshes.iter_mut()) {
            let Some(material) = mesh.material() else {
                continue;
            };
            let material = material.read();

            if gpu.revision != Some(material.revision()) {
                frame.ctx.write_buffer(
                    &gpu.uniform_buffer,
                    0,
                    bytemuck::cast_slice(&[material.uniform()]),
                );
                gpu.revision = Some(material.revision());
            }

            if gpu.binding_revision != Some(material.binding_revision()) || gpu.bind_group.is_none() {
                gpu.bind_group = frame.shaders.create_material_bind_group(
                    frame.ctx,
                    &material,
                    &gpu.uniform_buffer,
                    &mut frame.resources.textures,
                );
                gpu.binding_revision = Some(material.binding_revision());
            }

            let key = PipelineKey::for_material(&material);
            if gpu.key.as_ref() != Some(&key) {
                gpu.pipeline = frame.shaders.create_pipeline(frame.ctx, &key);
                if gpu.pipeline.is_none() {
                    tracing::debug!("No pipeline for shader '{}'", key.shader_label);
                }
                gpu.key = Some(key);
            }
        }
    }

    fn render<'a>(&'a self, pass: &mut wgpu::RenderPass<'a>, frame: &FrameContext<'a>) {
        let Some(model) = self.asset.model.as_ref() else {
            return;
        };

        for (mesh, gpu) in model.sub_meshes.iter().zip(self.sub_meshes.iter()) {
            if !mesh.visible {
                continue;
            }
            let (Some(pipeline), Some(bind_group)) = (&gpu.pipeline, &gpu.bind_group) else {
                continue;
            };
            let Some(gpu_mesh) = frame.resources.meshes.get(mesh.mesh) else {
                continue;
            };

            pass.set_pipeline(pipeline);
            pass.set_bind_group(0, frame.ctx.camera_bind_group(), &[]);
            pass.set_bind_group(1, bind_group, &[]);
            pass.set_vertex_buffer(0, gpu_mesh.vertex_buffer.slice(..));

            match &gpu_mesh.index_buffer {
                Some(index_buffer) if gpu_mesh.is_indexed() => {
                    pass.set_index_buffer(index_buffer.slice(..), wgpu::IndexFormat::Uint32);
                    pass.draw_indexed(0..gpu_mesh.index_count, 0, 0..1);
                }
                _ => pass.draw(0..gpu_mesh.vertex_count, 0..1),
            }
        }
    }
}

impl RenderableSource for Arc<ModelAsset> {
    fn kind(&self) -> RenderableKind {
        RenderableKind::Model
    }

    fn create_renderable(&self, ctx: &RenderContext, resources: &mut GpuResources) -> Box<dyn Renderable> {
        resources.textures.ensure_default(ctx);
        Box::new(ModelRenderable::new(ctx, Arc::clone(self)))
    }
}
