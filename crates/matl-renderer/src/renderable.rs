//! Renderables drawn by the viewport
//!
//! A [`RenderableSource`] is anything the host can hand to the viewport (a
//! loaded model, a texture, a skeleton). The viewport turns it into a
//! [`Renderable`] under context ownership and keeps it in a [`RenderableSet`].

use std::collections::HashSet;

use crate::bounds::BoundingSphere;
use crate::context::RenderContext;
use crate::resources::GpuResources;
use crate::shaders::ShaderLibrary;

/// What a renderable shows. Only models take part in framing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RenderableKind {
    Model,
    Skeleton,
    Texture,
    Overlay,
}

/// Access available while preparing a frame.
pub struct FrameResources<'a> {
    pub ctx: &'a RenderContext,
    pub resources: &'a mut GpuResources,
    pub shaders: &'a dyn ShaderLibrary,
}

/// Access available while recording draw commands.
pub struct FrameContext<'a> {
    pub ctx: &'a RenderContext,
    pub resources: &'a GpuResources,
}

/// Something the viewport can draw.
pub trait Renderable: Send + Sync {
    fn kind(&self) -> RenderableKind;

    /// Bounds used for framing.
    fn bounding_sphere(&self) -> Option<BoundingSphere> {
        None
    }

    /// Update GPU data before the render pass.
    fn prepare(&mut self, _frame: &mut FrameResources<'_>) {}

    /// Record draw commands.
    fn render<'a>(&'a self, pass: &mut wgpu::RenderPass<'a>, frame: &FrameContext<'a>);
}

/// Data the host can turn into a renderable.
pub trait RenderableSource {
    fn kind(&self) -> RenderableKind;

    /// Create GPU objects. Called while the viewport owns the context.
    fn create_renderable(
        &self,
        ctx: &RenderContext,
        resources: &mut GpuResources,
    ) -> Box<dyn Renderable>;
}

/// Renderables keyed by name, drawn in insertion order.
#[derive(Default)]
pub struct RenderableSet {
    names: HashSet<String>,
    entries: Vec<(String, Box<dyn Renderable>)>,
}

impl RenderableSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a renderable unless the name is already present.
    ///
    /// `create` only runs for new names. Returns whether an insert happened.
    pub fn insert_with<F>(&mut self, name: &str, create: F) -> bool
    where
        F: FnOnce() -> Box<dyn Renderable>,
    {
        if self.names.contains(name) {
            return false;
        }
        self.names.insert(name.to_string());
        self.entries.push((name.to_string(), create()));
        true
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.names.clear();
        self.entries.clear();
    }

    /// Names in insertion order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(name, _)| name.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = &dyn Renderable> {
        self.entries.iter().map(|(_, r)| r.as_ref())
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Box<dyn Renderable>> {
        self.entries.iter_mut().map(|(_, r)| r)
    }

    /// Bounding spheres of every model
    pub fn model_spheres(&self) -> Vec<BoundingSphere> {
        self.iter()
            .filter(|r| r.kind() == RenderableKind::Model)
            .filter_map(|r| r.bounding_sphere())
            .collect()
    }
}
