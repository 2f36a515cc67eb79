//! Shader container interface
//!
//! Shader source and compilation live outside this crate. The viewport asks a
//! [`ShaderLibrary`] for pipelines keyed by shader label and render state.

use crate::context::RenderContext;
use crate::material::RenderMaterial;
use crate::resources::TextureManager;

/// Fixed-function state a pipeline is built with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RenderState {
    pub depth_compare: wgpu::CompareFunction,
    pub cull_mode: Option<wgpu::Face>,
    pub polygon_mode: wgpu::PolygonMode,
    pub blend: wgpu::BlendState,
}

impl RenderState {
    /// State every frame starts from: less-or-equal depth test, alpha blending,
    /// back-face culling.
    pub const FRAME_DEFAULT: RenderState = RenderState {
        depth_compare: wgpu::CompareFunction::LessEqual,
        cull_mode: Some(wgpu::Face::Back),
        polygon_mode: wgpu::PolygonMode::Fill,
        blend: wgpu::BlendState::ALPHA_BLENDING,
    };

    /// Frame state with the material's culling, fill and color blend applied.
    pub fn for_material(material: &RenderMaterial) -> Self {
        let mut state = Self::FRAME_DEFAULT;
        state.cull_mode = material.cull_mode();
        state.polygon_mode = material.fill_mode();
        state.blend.color = wgpu::BlendComponent {
            src_factor: material.source_color(),
            dst_factor: material.destination_color(),
            operation: wgpu::BlendOperation::Add,
        };
        state
    }

    pub fn primitive(&self) -> wgpu::PrimitiveState {
        wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleList,
            front_face: wgpu::FrontFace::Ccw,
            cull_mode: self.cull_mode,
            polygon_mode: self.polygon_mode,
            ..Default::default()
        }
    }

    pub fn depth_stencil(&self, format: wgpu::TextureFormat) -> wgpu::DepthStencilState {
        wgpu::DepthStencilState {
            format,
            depth_write_enabled: true,
            depth_compare: self.depth_compare,
            stencil: wgpu::StencilState::default(),
            bias: wgpu::DepthBiasState::default(),
        }
    }

    pub fn color_target(&self, format: wgpu::TextureFormat) -> wgpu::ColorTargetState {
        wgpu::ColorTargetState {
            format,
            blend: Some(self.blend),
            write_mask: wgpu::ColorWrites::ALL,
        }
    }
}

impl Default for RenderState {
    fn default() -> Self {
        Self::FRAME_DEFAULT
    }
}

/// Pipeline cache key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PipelineKey {
    pub shader_label: String,
    pub state: RenderState,
}

impl PipelineKey {
    pub fn for_material(material: &RenderMaterial) -> Self {
        Self {
            shader_label: material.shader_label().to_string(),
            state: RenderState::for_material(material),
        }
    }
}

/// Supplies compiled programs by name.
pub trait ShaderLibrary: Send {
    /// Whether programs have been set up.
    fn is_ready(&self) -> bool;

    /// Compile and set up programs. Called lazily before the first frame.
    fn set_up(&mut self, ctx: &RenderContext);

    /// Recompile every program.
    fn reload(&mut self, ctx: &RenderContext);

    /// Pipeline for a shader label and render state.
    ///
    /// Returns `None` if the shader is unknown; the submesh is then not drawn.
    fn create_pipeline(&self, ctx: &RenderContext, key: &PipelineKey) -> Option<wgpu::RenderPipeline>;

    /// Bind group holding the material's uniform buffer, textures and samplers.
    fn create_material_bind_group(
        &self,
        ctx: &RenderContext,
        material: &RenderMaterial,
        uniform_buffer: &wgpu::Buffer,
        textures: &mut TextureManager,
    ) -> Option<wgpu::BindGroup>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_default_state() {
        let state = RenderState::default();
        assert_eq!(state.depth_compare, wgpu::CompareFunction::LessEqual);
        assert_eq!(state.cull_mode, Some(wgpu::Face::Back));
        assert_eq!(state.blend.color.src_factor, wgpu::BlendFactor::SrcAlpha);
        assert_eq!(
            state.blend.color.dst_factor,
            wgpu::BlendFactor::OneMinusSrcAlpha
        );
    }

    #[test]
    fn test_material_state_overrides() {
        let mut material = RenderMaterial::new("mat", "shader", 0);
        material.set_cull_mode(None);
        material.set_fill_mode(wgpu::PolygonMode::Line);

        let key = PipelineKey::for_material(&material);
        assert_eq!(key.shader_label, "shader");
        assert_eq!(key.state.cull_mode, None);
        assert_eq!(key.state.polygon_mode, wgpu::PolygonMode::Line);
        assert_eq!(key.state.blend.color.src_factor, wgpu::BlendFactor::One);
        assert_eq!(key.state.blend.color.dst_factor, wgpu::BlendFactor::Zero);
        // Alpha keeps the frame blend
        assert_eq!(key.state.blend.alpha, wgpu::BlendState::ALPHA_BLENDING.alpha);

        material.set_cull_mode(Some(wgpu::Face::Back));
        assert_ne!(PipelineKey::for_material(&material), key);
    }
}
