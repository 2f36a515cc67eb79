//! GPU resource management.
//!
//! Handle-based storage for meshes, textures and samplers shared by every
//! renderable in the viewport.

mod cache;
mod mesh;
mod texture;

pub use cache::BoundedCache;
pub use mesh::*;
pub use texture::*;

/// Every GPU resource owned by the viewport.
#[derive(Default)]
pub struct GpuResources {
    pub meshes: MeshManager,
    pub textures: TextureManager,
}

impl GpuResources {
    pub fn new() -> Self {
        Self::default()
    }

    /// Release all meshes, textures and samplers.
    pub fn clear(&mut self) {
        self.meshes.clear();
        self.textures.clear();
    }
}
