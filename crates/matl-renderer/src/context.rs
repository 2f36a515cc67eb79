//! Render context that encapsulates GPU resources.
//!
//! The RenderContext owns the device handles and the camera uniform shared by
//! every pipeline. Consumers go through it instead of holding wgpu objects.

use std::sync::Arc;

use wgpu::util::DeviceExt;

use crate::camera::CameraUniform;
use crate::gpu_resources;

/// Color format of the offscreen viewport target.
pub const COLOR_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8Unorm;
/// Depth format of the offscreen viewport target.
pub const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

/// Render context containing GPU resources and state.
pub struct RenderContext {
    device: Arc<wgpu::Device>,
    queue: Arc<wgpu::Queue>,
    color_format: wgpu::TextureFormat,
    depth_format: wgpu::TextureFormat,
    camera_bind_group_layout: wgpu::BindGroupLayout,
    camera_buffer: wgpu::Buffer,
    camera_bind_group: wgpu::BindGroup,
    width: u32,
    height: u32,
}

impl RenderContext {
    /// Creates a new render context.
    pub fn new(device: Arc<wgpu::Device>, queue: Arc<wgpu::Queue>, width: u32, height: u32) -> Self {
        let camera_bind_group_layout = gpu_resources::create_camera_bind_group_layout(&device);

        let camera_uniform = CameraUniform::default();
        let camera_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Camera Buffer"),
            contents: bytemuck::cast_slice(&[camera_uniform]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let camera_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Camera Bind Group"),
            layout: &camera_bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: camera_buffer.as_entire_binding(),
            }],
        });

        Self {
            device,
            queue,
            color_format: COLOR_FORMAT,
            depth_format: DEPTH_FORMAT,
            camera_bind_group_layout,
            camera_buffer,
            camera_bind_group,
            width: width.max(1),
            height: height.max(1),
        }
    }

    pub fn device(&self) -> &wgpu::Device {
        &self.device
    }

    pub fn queue(&self) -> &wgpu::Queue {
        &self.queue
    }

    /// Returns the color target format.
    pub fn color_format(&self) -> wgpu::TextureFormat {
        self.color_format
    }

    /// Returns the depth texture format.
    pub fn depth_format(&self) -> wgpu::TextureFormat {
        self.depth_format
    }

    pub fn camera_bind_group_layout(&self) -> &wgpu::BindGroupLayout {
        &self.camera_bind_group_layout
    }

    pub fn camera_bind_group(&self) -> &wgpu::BindGroup {
        &self.camera_bind_group
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Width over height of the viewport.
    pub fn aspect(&self) -> f32 {
        self.width as f32 / self.height as f32
    }

    /// Updates the camera uniform buffer.
    pub fn update_camera(&self, uniform: &CameraUniform) {
        self.queue
            .write_buffer(&self.camera_buffer, 0, bytemuck::cast_slice(&[*uniform]));
    }

    /// Updates the viewport dimensions.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.width = width.max(1);
        self.height = height.max(1);
    }

    /// Block until all submitted GPU work has finished.
    pub fn wait_idle(&self) {
        self.device.poll(wgpu::Maintain::Wait);
    }

    /// Creates a buffer initialized with data.
    pub fn create_buffer_init(&self, desc: &wgpu::util::BufferInitDescriptor) -> wgpu::Buffer {
        self.device.create_buffer_init(desc)
    }

    /// Writes data to a buffer.
    pub fn write_buffer(&self, buffer: &wgpu::Buffer, offset: u64, data: &[u8]) {
        self.queue.write_buffer(buffer, offset, data);
    }

    /// Creates a texture with the given descriptor.
    pub fn create_texture(&self, desc: &wgpu::TextureDescriptor) -> wgpu::Texture {
        self.device.create_texture(desc)
    }
}
