//! Viewport renderer
//!
//! Owns the GPU context for the viewport. Every operation that touches GPU
//! state takes a [`ContextGuard`] from the shared [`RenderLoopControl`], so the
//! render loop never draws while objects are being created or read back.
//!
//! The host's render loop locks the renderer and then calls
//! [`ViewportRenderer::render_loop_frame`]; ad hoc callers lock the renderer and
//! call the other methods. Both paths take the renderer lock before the frame
//! lock, so they cannot deadlock.

use std::sync::Arc;

use image::RgbaImage;

use crate::camera::Camera;
use crate::capture::{self, CaptureError};
use crate::config::RendererConfig;
use crate::context::RenderContext;
use crate::gpu_resources;
use crate::ownership::RenderLoopControl;
use crate::renderable::{FrameContext, FrameResources, Renderable, RenderableSet, RenderableSource};
use crate::resources::GpuResources;
use crate::scene::ViewportScene;
use crate::shaders::ShaderLibrary;

/// Offscreen color and depth attachments.
struct RenderTargets {
    color: (wgpu::Texture, wgpu::TextureView),
    depth: (wgpu::Texture, wgpu::TextureView),
}

impl RenderTargets {
    fn new(device: &wgpu::Device, width: u32, height: u32) -> Self {
        Self {
            color: gpu_resources::create_color_target(device, width, height),
            depth: gpu_resources::create_depth_texture(device, width, height),
        }
    }
}

/// Draws loaded renderables into an offscreen target.
pub struct ViewportRenderer {
    ctx: RenderContext,
    resources: GpuResources,
    shaders: Box<dyn ShaderLibrary>,
    control: Arc<RenderLoopControl>,
    scene: ViewportScene,
    config: RendererConfig,
    targets: RenderTargets,
}

impl ViewportRenderer {
    /// Create a renderer. The render loop starts idle; call
    /// [`RenderLoopControl::resume`] once the host is ready to draw.
    pub fn new(
        device: Arc<wgpu::Device>,
        queue: Arc<wgpu::Queue>,
        shaders: Box<dyn ShaderLibrary>,
        config: RendererConfig,
        width: u32,
        height: u32,
    ) -> Self {
        let ctx = RenderContext::new(device, queue, width, height);
        let targets = RenderTargets::new(ctx.device(), ctx.width(), ctx.height());

        let scene = ViewportScene::new(ctx.aspect(), &config);

        tracing::info!("Viewport renderer created ({}x{})", ctx.width(), ctx.height());

        Self {
            ctx,
            resources: GpuResources::new(),
            shaders,
            control: Arc::new(RenderLoopControl::new()),
            scene,
            config,
            targets,
        }
    }

    /// Control shared with the host's render loop
    pub fn control(&self) -> &Arc<RenderLoopControl> {
        &self.control
    }

    pub fn camera(&self) -> &Camera {
        self.scene.camera()
    }

    pub fn camera_mut(&mut self) -> &mut Camera {
        self.scene.camera_mut()
    }

    pub fn scene(&self) -> &ViewportScene {
        &self.scene
    }

    /// GPU resources owned by the viewport
    pub fn resources(&self) -> &GpuResources {
        &self.resources
    }

    pub fn config(&self) -> &RendererConfig {
        &self.config
    }

    /// Apply new settings to the camera and clear color
    pub fn apply_config(&mut self, config: RendererConfig) {
        self.scene.camera_mut().apply_config(&config);
        self.config = config;
    }

    pub fn renderables(&self) -> &RenderableSet {
        self.scene.renderables()
    }

    /// View of the color target for the host to display
    pub fn color_view(&self) -> &wgpu::TextureView {
        &self.targets.color.1
    }

    pub fn size(&self) -> (u32, u32) {
        (self.ctx.width(), self.ctx.height())
    }

    /// Recreate the render targets for a new viewport size.
    pub fn resize(&mut self, width: u32, height: u32) {
        let control = Arc::clone(&self.control);
        let _guard = control.acquire();

        self.ctx.resize(width, height);
        self.targets = RenderTargets::new(self.ctx.device(), self.ctx.width(), self.ctx.height());
        self.scene.camera_mut().update_aspect(self.ctx.aspect());
    }

    /// Run `f` with exclusive access to the GPU context and resources.
    ///
    /// Loaders use this to upload meshes and textures. The render loop is paused
    /// for the duration and restored afterwards, even if `f` fails.
    pub fn with_gpu<R>(&mut self, f: impl FnOnce(&RenderContext, &mut GpuResources) -> R) -> R {
        let control = Arc::clone(&self.control);
        let _guard = control.acquire();
        f(&self.ctx, &mut self.resources)
    }

    /// Add a renderable for `source` under `name`.
    ///
    /// Does nothing if `name` is already present. Adding a model frames the
    /// camera around every loaded model. Returns whether a renderable was added.
    pub fn add_renderable_node(&mut self, name: &str, source: &dyn RenderableSource) -> bool {
        if self.scene.renderables().contains(name) {
            return false;
        }

        let control = Arc::clone(&self.control);
        let _guard = control.acquire();

        let ctx = &self.ctx;
        let resources = &mut self.resources;
        let added = self
            .scene
            .add(name, source.kind(), || source.create_renderable(ctx, resources));
        if added {
            tracing::info!("Added renderable '{}' ({:?})", name, source.kind());
        }
        added
    }

    /// Remove every renderable and the texture preview, release every mesh,
    /// texture and sampler, and wait for the GPU to finish with them.
    pub fn clear_renderable_nodes(&mut self) {
        let control = Arc::clone(&self.control);
        let _guard = control.acquire();

        let count = self.scene.clear();
        self.resources.clear();
        self.ctx.wait_idle();
        tracing::info!("Cleared {} renderables and their GPU resources", count);
    }

    /// Show a texture instead of the scene, or go back to the scene with `None`.
    pub fn update_texture(&mut self, source: Option<&dyn RenderableSource>) {
        let control = Arc::clone(&self.control);
        let _guard = control.acquire();

        let preview = source.map(|s| s.create_renderable(&self.ctx, &mut self.resources));
        self.scene.set_texture_preview(preview);
    }

    /// Set the global overlay drawn after the renderables.
    pub fn set_parameter_overlay(&mut self, overlay: Option<Box<dyn Renderable>>) {
        let control = Arc::clone(&self.control);
        let _guard = control.acquire();
        self.scene.set_parameter_overlay(overlay);
    }

    /// Recompile shaders.
    pub fn reload_shaders(&mut self) {
        let control = Arc::clone(&self.control);
        let _guard = control.acquire();

        self.shaders.reload(&self.ctx);
        tracing::info!("Reloaded shaders");
    }

    /// Frame the camera around every loaded model.
    ///
    /// Leaves the camera untouched when no model has bounds.
    pub fn frame_selection(&mut self) {
        if let Some(sphere) = self.scene.frame_selection() {
            tracing::debug!(
                "Framed camera on sphere at {:?} radius {}",
                sphere.center,
                sphere.radius
            );
        }
    }

    /// Draw one frame if the render loop is running.
    ///
    /// Returns whether a frame was drawn.
    pub fn render_loop_frame(&mut self, overlay: Option<&mut dyn Renderable>) -> bool {
        let control = Arc::clone(&self.control);
        let Some(_frame) = control.begin_frame() else {
            return false;
        };
        self.draw(overlay);
        true
    }

    /// Draw one frame into the offscreen target.
    pub fn render_nodes(&mut self, overlay: Option<&mut dyn Renderable>) {
        let control = Arc::clone(&self.control);
        let _guard = control.acquire();
        self.draw(overlay);
    }

    fn draw(&mut self, mut overlay: Option<&mut dyn Renderable>) {
        if !self.shaders.is_ready() {
            self.shaders.set_up(&self.ctx);
        }

        self.ctx.update_camera(&self.scene.camera().uniform());
        let (renderables, texture_preview, parameter_overlay) = self.scene.parts_mut();

        {
            let mut frame = FrameResources {
                ctx: &self.ctx,
                resources: &mut self.resources,
                shaders: &*self.shaders,
            };
            if let Some(preview) = texture_preview.as_mut() {
                preview.prepare(&mut frame);
            } else {
                for renderable in renderables.iter_mut() {
                    renderable.prepare(&mut frame);
                }
                if let Some(parameter_overlay) = parameter_overlay.as_mut() {
                    parameter_overlay.prepare(&mut frame);
                }
                if let Some(overlay) = overlay.as_deref_mut() {
                    overlay.prepare(&mut frame);
                }
            }
        }

        let mut encoder = self
            .ctx
            .device()
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Viewport Encoder"),
            });

        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Viewport Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &self.targets.color.1,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(self.config.clear_color()),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.targets.depth.1,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            let frame = FrameContext {
                ctx: &self.ctx,
                resources: &self.resources,
            };

            if let Some(preview) = texture_preview.as_deref() {
                preview.render(&mut pass, &frame);
            } else {
                for renderable in renderables.iter() {
                    renderable.render(&mut pass, &frame);
                }
                if let Some(parameter_overlay) = parameter_overlay.as_deref() {
                    parameter_overlay.render(&mut pass, &frame);
                }
                if let Some(overlay) = overlay.as_deref() {
                    overlay.render(&mut pass, &frame);
                }
            }
        }

        self.ctx.queue().submit(std::iter::once(encoder.finish()));
    }

    /// Read the last drawn frame into an image.
    pub fn get_screenshot(&self) -> Result<RgbaImage, CaptureError> {
        let control = Arc::clone(&self.control);
        let _guard = control.acquire();

        let image = capture::read_texture(
            &self.ctx,
            &self.targets.color.0,
            self.ctx.width(),
            self.ctx.height(),
        )?;
        tracing::info!("Captured {}x{} frame", image.width(), image.height());
        Ok(image)
    }
}
