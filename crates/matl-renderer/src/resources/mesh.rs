//! Mesh resource management.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::bounds::BoundingSphere;
use crate::context::RenderContext;

/// Handle to a mesh stored in the MeshManager.
///
/// Handles are lightweight and can be copied freely.
/// The actual mesh data is stored in the MeshManager.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct MeshHandle(u64);

impl MeshHandle {
    /// Returns the raw handle value.
    pub fn raw(&self) -> u64 {
        self.0
    }

    /// Creates a handle from a raw value.
    pub fn from_raw(value: u64) -> Self {
        Self(value)
    }
}

/// Vertex layout shared by every model shader.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct ModelVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub uv: [f32; 2],
}

impl ModelVertex {
    const ATTRIBUTES: [wgpu::VertexAttribute; 3] =
        wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x3, 2 => Float32x2];

    /// Vertex buffer layout for pipelines.
    pub fn desc() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<ModelVertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBUTES,
        }
    }
}

/// GPU mesh data.
pub struct GpuMesh {
    pub vertex_buffer: wgpu::Buffer,
    /// Index buffer (optional, for indexed drawing).
    pub index_buffer: Option<wgpu::Buffer>,
    pub vertex_count: u32,
    /// Number of indices (0 if not indexed).
    pub index_count: u32,
    pub bounds: Option<BoundingSphere>,
}

impl GpuMesh {
    /// Returns true if this mesh uses indexed drawing.
    pub fn is_indexed(&self) -> bool {
        self.index_buffer.is_some() && self.index_count > 0
    }
}

/// CPU mesh data for uploading to GPU.
#[derive(Debug, Clone)]
pub struct MeshData {
    pub vertices: Vec<ModelVertex>,
    pub indices: Option<Vec<u32>>,
    /// `None` when there are no vertices.
    pub bounds: Option<BoundingSphere>,
}

impl MeshData {
    /// Creates a new mesh data from vertices (non-indexed).
    pub fn new(vertices: Vec<ModelVertex>) -> Self {
        let bounds = Self::compute_bounds(&vertices);
        Self {
            vertices,
            indices: None,
            bounds,
        }
    }

    /// Creates a new indexed mesh data.
    pub fn indexed(vertices: Vec<ModelVertex>, indices: Vec<u32>) -> Self {
        let bounds = Self::compute_bounds(&vertices);
        Self {
            vertices,
            indices: Some(indices),
            bounds,
        }
    }

    fn compute_bounds(vertices: &[ModelVertex]) -> Option<BoundingSphere> {
        BoundingSphere::from_points(vertices.iter().map(|v| glam::Vec3::from(v.position)))
    }
}

/// Manager for GPU mesh resources.
pub struct MeshManager {
    meshes: HashMap<MeshHandle, GpuMesh>,
    next_handle: AtomicU64,
}

impl MeshManager {
    /// Creates a new mesh manager.
    pub fn new() -> Self {
        Self {
            meshes: HashMap::new(),
            next_handle: AtomicU64::new(1),
        }
    }

    /// Uploads mesh data to the GPU and returns a handle.
    pub fn create(&mut self, ctx: &RenderContext, data: &MeshData) -> MeshHandle {
        let handle = MeshHandle(self.next_handle.fetch_add(1, Ordering::Relaxed));

        let vertex_buffer = ctx.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Mesh Vertex Buffer"),
            contents: bytemuck::cast_slice(&data.vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });

        let index_buffer = data.indices.as_ref().map(|indices| {
            ctx.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("Mesh Index Buffer"),
                contents: bytemuck::cast_slice(indices),
                usage: wgpu::BufferUsages::INDEX,
            })
        });

        let gpu_mesh = GpuMesh {
            vertex_buffer,
            index_buffer,
            vertex_count: data.vertices.len() as u32,
            index_count: data.indices.as_ref().map(|i| i.len() as u32).unwrap_or(0),
            bounds: data.bounds,
        };

        self.meshes.insert(handle, gpu_mesh);
        handle
    }

    /// Gets a mesh by handle.
    pub fn get(&self, handle: MeshHandle) -> Option<&GpuMesh> {
        self.meshes.get(&handle)
    }

    /// Removes a mesh from the manager.
    ///
    /// The GPU resources will be released when the GpuMesh is dropped.
    pub fn remove(&mut self, handle: MeshHandle) -> Option<GpuMesh> {
        self.meshes.remove(&handle)
    }

    pub fn contains(&self, handle: MeshHandle) -> bool {
        self.meshes.contains_key(&handle)
    }

    pub fn len(&self) -> usize {
        self.meshes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.meshes.is_empty()
    }

    /// Clears all meshes from the manager.
    pub fn clear(&mut self) {
        self.meshes.clear();
    }
}

impl Default for MeshManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vertex(x: f32, y: f32, z: f32) -> ModelVertex {
        ModelVertex {
            position: [x, y, z],
            normal: [0.0, 1.0, 0.0],
            uv: [0.0, 0.0],
        }
    }

    #[test]
    fn test_mesh_data_bounds() {
        let data = MeshData::indexed(
            vec![vertex(-2.0, 0.0, 0.0), vertex(2.0, 0.0, 0.0), vertex(0.0, 1.0, 0.0)],
            vec![0, 1, 2],
        );
        let bounds = data.bounds.unwrap();
        assert!((bounds.center.y - 0.5).abs() < 1e-6);
        assert!((bounds.radius - 4.25_f32.sqrt()).abs() < 1e-5);
        assert!(MeshData::new(Vec::new()).bounds.is_none());
    }

    #[test]
    fn test_vertex_stride() {
        assert_eq!(ModelVertex::desc().array_stride, 32);
    }
}
