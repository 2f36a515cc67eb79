//! Viewport camera

use glam::{Mat4, Vec3};

use crate::bounds::BoundingSphere;
use crate::config::RendererConfig;

/// Default vertical field of view in degrees.
pub const DEFAULT_FOV_DEGREES: f32 = 30.0;
/// Default near clip plane.
pub const DEFAULT_NEAR_PLANE: f32 = 1.0;
/// Default far clip plane, large enough for whole stages.
pub const DEFAULT_FAR_PLANE: f32 = 500_000.0;

/// Perspective camera looking from `eye` towards `target`.
#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    pub eye: Vec3,
    pub target: Vec3,
    pub up: Vec3,
    aspect: f32,
    fov_y: f32,
    near: f32,
    far: f32,
}

impl Camera {
    /// Create a camera looking down -Z at the origin.
    pub fn new(aspect: f32) -> Self {
        Self {
            eye: Vec3::new(0.0, 0.0, 50.0),
            target: Vec3::ZERO,
            up: Vec3::Y,
            aspect: sanitize_aspect(aspect),
            fov_y: DEFAULT_FOV_DEGREES.to_radians(),
            near: DEFAULT_NEAR_PLANE,
            far: DEFAULT_FAR_PLANE,
        }
    }

    pub fn aspect(&self) -> f32 {
        self.aspect
    }

    pub fn update_aspect(&mut self, aspect: f32) {
        self.aspect = sanitize_aspect(aspect);
    }

    /// Vertical field of view in radians
    pub fn fov_y(&self) -> f32 {
        self.fov_y
    }

    pub fn set_fov_degrees(&mut self, degrees: f32) {
        self.fov_y = degrees.clamp(1.0, 179.0).to_radians();
    }

    pub fn near(&self) -> f32 {
        self.near
    }

    pub fn set_near(&mut self, near: f32) {
        self.near = near.max(f32::EPSILON);
    }

    pub fn far(&self) -> f32 {
        self.far
    }

    pub fn set_far(&mut self, far: f32) {
        self.far = far.max(self.near + f32::EPSILON);
    }

    /// Apply the projection settings from configuration
    pub fn apply_config(&mut self, config: &RendererConfig) {
        self.set_fov_degrees(config.fov_degrees);
        self.set_near(config.near_plane);
        self.set_far(config.far_plane);
    }

    /// Unit vector from eye to target
    pub fn forward(&self) -> Vec3 {
        (self.target - self.eye).try_normalize().unwrap_or(Vec3::NEG_Z)
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.eye, self.target, self.up)
    }

    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov_y, self.aspect, self.near, self.far)
    }

    pub fn view_projection(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }

    /// Horizontal field of view in radians, derived from the aspect ratio
    pub fn fov_x(&self) -> f32 {
        2.0 * ((self.fov_y * 0.5).tan() * self.aspect).atan()
    }

    /// Move the camera so `sphere` fills the view.
    ///
    /// The view direction is kept; the eye backs off along it until the sphere fits
    /// in both the vertical and horizontal field of view, plus `margin`.
    pub fn frame_bounding_sphere(&mut self, sphere: &BoundingSphere, margin: f32) {
        let half_fov = 0.5 * self.fov_y.min(self.fov_x());
        let fit = sphere.radius / half_fov.sin();
        let distance = (fit + margin.max(0.0)).max(self.near * 2.0);

        let forward = self.forward();
        self.target = sphere.center;
        self.eye = sphere.center - forward * distance;

        // Keep the whole sphere inside the clip range
        let needed_far = distance + sphere.radius;
        if needed_far > self.far {
            self.far = needed_far * 1.1;
        }
    }

    /// GPU uniform for the current state
    pub fn uniform(&self) -> CameraUniform {
        CameraUniform {
            view_proj: self.view_projection().to_cols_array_2d(),
            view: self.view_matrix().to_cols_array_2d(),
            eye: self.eye.extend(1.0).to_array(),
        }
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new(1.0)
    }
}

fn sanitize_aspect(aspect: f32) -> f32 {
    if aspect.is_finite() && aspect > 0.0 {
        aspect
    } else {
        1.0
    }
}

/// Camera data as laid out in the camera uniform buffer.
#[repr(C)]
#[derive(Debug, Clone, Copy, bytemuck::Pod, bytemuck::Zeroable)]
pub struct CameraUniform {
    pub view_proj: [[f32; 4]; 4],
    pub view: [[f32; 4]; 4],
    pub eye: [f32; 4],
}

impl Default for CameraUniform {
    fn default() -> Self {
        Camera::default().uniform()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_default_far_plane() {
        let camera = Camera::new(16.0 / 9.0);
        assert_relative_eq!(camera.far(), 500_000.0);
    }

    #[test]
    fn test_frame_bounding_sphere_fits() {
        let mut camera = Camera::new(1.0);
        let sphere = BoundingSphere::new(Vec3::new(0.0, 10.0, 0.0), 5.0);
        camera.frame_bounding_sphere(&sphere, 0.0);

        assert_eq!(camera.target, sphere.center);
        let distance = camera.eye.distance(sphere.center);
        let expected = 5.0 / (0.5 * camera.fov_y()).sin();
        assert_relative_eq!(distance, expected, epsilon = 1e-3);

        // Every point on the sphere is inside the view cone
        let half = 0.5 * camera.fov_y();
        let angle = (sphere.radius / distance).asin();
        assert!(angle <= half + 1e-4);
    }

    #[test]
    fn test_frame_keeps_direction() {
        let mut camera = Camera::new(1.0);
        camera.eye = Vec3::new(10.0, 0.0, 0.0);
        camera.target = Vec3::ZERO;
        let before = camera.forward();

        camera.frame_bounding_sphere(&BoundingSphere::new(Vec3::new(1.0, 1.0, 1.0), 2.0), 1.0);
        let after = camera.forward();
        assert_relative_eq!(before.dot(after), 1.0, epsilon = 1e-5);
    }

    #[test]
    fn test_frame_wide_aspect_uses_vertical_fov() {
        let mut narrow = Camera::new(0.5);
        let mut wide = Camera::new(2.0);
        let sphere = BoundingSphere::new(Vec3::ZERO, 10.0);
        narrow.frame_bounding_sphere(&sphere, 0.0);
        wide.frame_bounding_sphere(&sphere, 0.0);

        // A narrow viewport is limited by its horizontal extent and must back off further
        assert!(narrow.eye.length() > wide.eye.length());
    }

    #[test]
    fn test_frame_extends_far_plane() {
        let mut camera = Camera::new(1.0);
        camera.frame_bounding_sphere(&BoundingSphere::new(Vec3::ZERO, 400_000.0), 0.0);
        assert!(camera.far() > camera.eye.length() + 400_000.0 - 1.0);
    }
}
