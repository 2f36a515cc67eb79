//! Viewport scene bookkeeping
//!
//! Everything the viewport tracks apart from GPU objects: the renderable set,
//! the texture preview, the parameter overlay and the camera.

use crate::bounds::BoundingSphere;
use crate::camera::Camera;
use crate::config::RendererConfig;
use crate::renderable::{Renderable, RenderableKind, RenderableSet};

/// Renderables and camera of one viewport.
pub struct ViewportScene {
    renderables: RenderableSet,
    texture_preview: Option<Box<dyn Renderable>>,
    parameter_overlay: Option<Box<dyn Renderable>>,
    camera: Camera,
}

impl ViewportScene {
    pub fn new(aspect: f32, config: &RendererConfig) -> Self {
        let mut camera = Camera::new(aspect);
        camera.apply_config(config);
        Self {
            renderables: RenderableSet::new(),
            texture_preview: None,
            parameter_overlay: None,
            camera,
        }
    }

    pub fn renderables(&self) -> &RenderableSet {
        &self.renderables
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn camera_mut(&mut self) -> &mut Camera {
        &mut self.camera
    }

    /// Insert a renderable unless `name` is present.
    ///
    /// `create` only runs for new names. Adding a model frames the camera.
    pub fn add(
        &mut self,
        name: &str,
        kind: RenderableKind,
        create: impl FnOnce() -> Box<dyn Renderable>,
    ) -> bool {
        if !self.renderables.insert_with(name, create) {
            return false;
        }
        if kind == RenderableKind::Model {
            self.frame_selection();
        }
        true
    }

    /// Frame the camera around every loaded model with no margin.
    ///
    /// Returns the framed sphere, or `None` with the camera untouched when no
    /// model has bounds.
    pub fn frame_selection(&mut self) -> Option<BoundingSphere> {
        let sphere = BoundingSphere::enclosing(&self.renderables.model_spheres())?;
        self.camera.frame_bounding_sphere(&sphere, 0.0);
        Some(sphere)
    }

    /// Drop every renderable and the texture preview. Returns how many
    /// renderables were removed.
    pub fn clear(&mut self) -> usize {
        let count = self.renderables.len();
        self.renderables.clear();
        self.texture_preview = None;
        count
    }

    pub fn texture_preview(&self) -> Option<&dyn Renderable> {
        self.texture_preview.as_deref()
    }

    pub fn set_texture_preview(&mut self, preview: Option<Box<dyn Renderable>>) {
        self.texture_preview = preview;
    }

    pub fn parameter_overlay(&self) -> Option<&dyn Renderable> {
        self.parameter_overlay.as_deref()
    }

    pub fn set_parameter_overlay(&mut self, overlay: Option<Box<dyn Renderable>>) {
        self.parameter_overlay = overlay;
    }

    /// Split borrows for the draw path.
    pub(crate) fn parts_mut(
        &mut self,
    ) -> (
        &mut RenderableSet,
        &mut Option<Box<dyn Renderable>>,
        &mut Option<Box<dyn Renderable>>,
    ) {
        (
            &mut self.renderables,
            &mut self.texture_preview,
            &mut self.parameter_overlay,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderable::tests::{StubRenderable, model};
    use glam::Vec3;

    fn scene() -> ViewportScene {
        ViewportScene::new(1.0, &RendererConfig::default())
    }

    #[test]
    fn test_add_model_frames_camera() {
        let mut scene = scene();
        let eye = scene.camera().eye;
        assert!(scene.add("a", RenderableKind::Model, || model(10.0, 2.0)));
        assert_ne!(scene.camera().eye, eye);
        assert_eq!(scene.camera().target, Vec3::new(10.0, 0.0, 0.0));
    }

    #[test]
    fn test_add_duplicate_is_noop() {
        let mut scene = scene();
        scene.add("a", RenderableKind::Model, || model(0.0, 1.0));

        let eye = Vec3::new(1.0, 2.0, 3.0);
        scene.camera_mut().eye = eye;

        let mut created = false;
        assert!(!scene.add("a", RenderableKind::Model, || {
            created = true;
            model(50.0, 1.0)
        }));
        assert!(!created);
        assert_eq!(scene.renderables().len(), 1);
        assert_eq!(scene.camera().eye, eye);
    }

    #[test]
    fn test_add_other_kind_does_not_frame() {
        let mut scene = scene();
        let eye = scene.camera().eye;
        scene.add("skel", RenderableKind::Skeleton, || {
            Box::new(StubRenderable {
                kind: RenderableKind::Skeleton,
                sphere: Some(BoundingSphere::new(Vec3::ZERO, 5.0)),
            })
        });
        assert_eq!(scene.camera().eye, eye);
    }

    #[test]
    fn test_frame_selection_empty_keeps_camera() {
        let mut scene = scene();
        let eye = scene.camera().eye;
        let target = scene.camera().target;
        assert!(scene.frame_selection().is_none());
        assert_eq!(scene.camera().eye, eye);
        assert_eq!(scene.camera().target, target);
    }

    #[test]
    fn test_frame_selection_encloses_all_models_without_margin() {
        let mut scene = scene();
        scene.add("a", RenderableKind::Model, || model(-5.0, 1.0));
        scene.add("b", RenderableKind::Model, || model(5.0, 1.0));

        let sphere = scene.frame_selection().unwrap();
        assert!(sphere.center.length() < 1e-5);
        assert!((sphere.radius - 6.0).abs() < 1e-5);

        let camera = scene.camera();
        let half_fov = 0.5 * camera.fov_y().min(camera.fov_x());
        let distance = (camera.eye - camera.target).length();
        assert!((distance - 6.0 / half_fov.sin()).abs() < 1e-3);
    }

    #[test]
    fn test_clear_drops_renderables_and_preview() {
        let mut scene = scene();
        scene.add("a", RenderableKind::Model, || model(0.0, 1.0));
        scene.set_texture_preview(Some(Box::new(StubRenderable {
            kind: RenderableKind::Texture,
            sphere: None,
        })));

        assert_eq!(scene.clear(), 1);
        assert!(scene.renderables().is_empty());
        assert!(scene.texture_preview().is_none());
        assert!(scene.add("a", RenderableKind::Model, || model(0.0, 1.0)));
    }
}
