//! Material Viewer Renderer
//!
//! WGPU-based viewport rendering with live material state.
//!
//! # Architecture
//!
//! - [`resolve::resolve_materials`] - Material records to [`RenderMaterial`]s
//! - [`model::bind_materials`] - Assigns resolved materials to submeshes
//! - [`material::RenderMaterial`] - Mutable GPU-facing material state
//! - [`ownership::RenderLoopControl`] - Scoped ownership of the GPU context
//! - [`scene::ViewportScene`] - Renderable set, texture preview and camera framing
//! - [`viewport::ViewportRenderer`] - GPU resources, drawing and capture
//!
//! # Example
//!
//! ```ignore
//! use matl_renderer::{ModelAsset, ViewportRenderer};
//!
//! let asset = Arc::new(ModelAsset::new(Some(model), matl, modl, textures, &defaults));
//! renderer.add_renderable_node("fighter/model.numdlb", &asset);
//! renderer.render_nodes(None);
//! let screenshot = renderer.get_screenshot()?;
//! ```

pub mod bounds;
pub mod camera;
pub mod capture;
pub mod config;
pub mod context;
pub mod convert;
pub mod gpu_resources;
pub mod material;
pub mod model;
pub mod model_renderable;
pub mod ownership;
pub mod renderable;
pub mod resolve;
pub mod resources;
pub mod scene;
pub mod shaders;
pub mod viewport;

// Re-exports for convenience
pub use bounds::BoundingSphere;
pub use camera::{Camera, CameraUniform};
pub use capture::CaptureError;
pub use config::RendererConfig;
pub use context::RenderContext;
pub use convert::{GpuStateError, ToWgpu};
pub use material::{
    MaterialDefaults, MaterialUniform, RenderMaterial, SamplerData, SharedMaterial, TextureBinding,
};
pub use model::{BindingSummary, ModelAsset, RenderModel, SubMesh, bind_materials};
pub use model_renderable::ModelRenderable;
pub use ownership::{ContextGuard, ContextState, RenderLoopControl};
pub use renderable::{
    FrameContext, FrameResources, Renderable, RenderableKind, RenderableSet, RenderableSource,
};
pub use resolve::{
    MaterialError, ResolvedMaterials, create_material, lookup_texture, resolve_materials,
};
pub use resources::{
    BoundedCache, GpuMesh, GpuResources, GpuTexture, MeshData, MeshHandle, MeshManager, ModelVertex,
    TextureHandle, TextureManager,
};
pub use scene::ViewportScene;
pub use shaders::{PipelineKey, RenderState, ShaderLibrary};
pub use viewport::ViewportRenderer;
