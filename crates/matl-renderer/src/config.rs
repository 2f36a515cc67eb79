//! Renderer configuration

use serde::{Deserialize, Serialize};

use crate::camera::{DEFAULT_FAR_PLANE, DEFAULT_FOV_DEGREES, DEFAULT_NEAR_PLANE};

/// Viewport settings persisted with the editor configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RendererConfig {
    /// Clear color (RGBA, 0.0-1.0)
    pub clear_color: [f32; 4],
    /// Vertical field of view in degrees
    pub fov_degrees: f32,
    pub near_plane: f32,
    pub far_plane: f32,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            clear_color: [0.25, 0.25, 0.25, 1.0],
            fov_degrees: DEFAULT_FOV_DEGREES,
            near_plane: DEFAULT_NEAR_PLANE,
            far_plane: DEFAULT_FAR_PLANE,
        }
    }
}

impl RendererConfig {
    /// Clear color as a wgpu color
    pub fn clear_color(&self) -> wgpu::Color {
        let [r, g, b, a] = self.clear_color;
        wgpu::Color {
            r: r as f64,
            g: g as f64,
            b: b as f64,
            a: a as f64,
        }
    }
}
