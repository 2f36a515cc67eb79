//! Bounding spheres used for camera framing

use glam::Vec3;

/// A sphere enclosing some geometry.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct BoundingSphere {
    pub center: Vec3,
    pub radius: f32,
}

impl BoundingSphere {
    pub fn new(center: Vec3, radius: f32) -> Self {
        Self {
            center,
            radius: radius.max(0.0),
        }
    }

    /// Sphere enclosing a set of points. Returns `None` for an empty set.
    pub fn from_points(points: impl IntoIterator<Item = Vec3>) -> Option<Self> {
        let points: Vec<Vec3> = points.into_iter().collect();
        if points.is_empty() {
            return None;
        }

        let mut min = Vec3::splat(f32::INFINITY);
        let mut max = Vec3::splat(f32::NEG_INFINITY);
        for p in &points {
            min = min.min(*p);
            max = max.max(*p);
        }

        let center = (min + max) * 0.5;
        let radius = points
            .iter()
            .map(|p| p.distance(center))
            .fold(0.0_f32, f32::max);
        Some(Self::new(center, radius))
    }

    /// Smallest sphere around the bounding box of `spheres` that contains all of them.
    ///
    /// Not the minimal enclosing sphere, but always contains every input.
    /// Returns `None` for an empty slice.
    pub fn enclosing(spheres: &[BoundingSphere]) -> Option<Self> {
        if spheres.is_empty() {
            return None;
        }

        let mut min = Vec3::splat(f32::INFINITY);
        let mut max = Vec3::splat(f32::NEG_INFINITY);
        for s in spheres {
            min = min.min(s.center - Vec3::splat(s.radius));
            max = max.max(s.center + Vec3::splat(s.radius));
        }

        let center = (min + max) * 0.5;
        let radius = spheres
            .iter()
            .map(|s| s.center.distance(center) + s.radius)
            .fold(0.0_f32, f32::max);
        Some(Self::new(center, radius))
    }

    /// Check whether `other` lies entirely inside this sphere
    pub fn contains_sphere(&self, other: &BoundingSphere, epsilon: f32) -> bool {
        self.center.distance(other.center) + other.radius <= self.radius + epsilon
    }
}
