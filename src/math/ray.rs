//! Ray type used to project a pointer onto the ground plane

use crate::core::types::{Vec3, Mat4};

/// A ray defined by origin and direction
#[derive(Clone, Copy, Debug)]
pub struct Ray {
    pub origin: Vec3,
    pub direction: Vec3,
}

impl Ray {
    /// Create a new ray (direction should be normalized)
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self { origin, direction }
    }

    /// Build a world-space ray from normalized device coordinates
    /// (`ndc_x`, `ndc_y` in [-1, 1]) and an inverse view-projection matrix.
    pub fn from_ndc(ndc_x: f32, ndc_y: f32, view_proj_inv: &Mat4) -> Self {
        let near = view_proj_inv.project_point3(Vec3::new(ndc_x, ndc_y, 0.0));
        let far = view_proj_inv.project_point3(Vec3::new(ndc_x, ndc_y, 1.0));
        Ray::new(near, (far - near).normalize_or_zero())
    }

    /// Get point along ray at parameter t
    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }

    /// Intersection with the horizontal plane `y = height`.
    /// Returns the ray parameter, or None if parallel or behind the origin.
    pub fn intersect_ground(&self, height: f32) -> Option<f32> {
        if self.direction.y.abs() < 1e-8 {
            return None;
        }
        let t = (height - self.origin.y) / self.direction.y;
        (t >= 0.0).then_some(t)
    }

    /// Project onto the ground plane and divide by the global world scale,
    /// giving a disturbance position in field space.
    pub fn disturbance_point(&self, height: f32, world_scale: f32) -> Option<Vec3> {
        let t = self.intersect_ground(height)?;
        Some(self.at(t) / world_scale)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_at() {
        let ray = Ray::new(Vec3::ZERO, Vec3::X);
        assert_eq!(ray.at(5.0), Vec3::new(5.0, 0.0, 0.0));
    }

    #[test]
    fn test_intersect_ground_hit() {
        let ray = Ray::new(Vec3::new(1.0, 4.0, 2.0), Vec3::NEG_Y);
        let t = ray.intersect_ground(0.0).unwrap();
        assert!((t - 4.0).abs() < 1e-6);
        assert_eq!(ray.at(t), Vec3::new(1.0, 0.0, 2.0));
    }

    #[test]
    fn test_intersect_ground_miss() {
        let up = Ray::new(Vec3::new(0.0, 1.0, 0.0), Vec3::Y);
        assert!(up.intersect_ground(0.0).is_none());
        let flat = Ray::new(Vec3::new(0.0, 1.0, 0.0), Vec3::X);
        assert!(flat.intersect_ground(0.0).is_none());
    }

    #[test]
    fn test_disturbance_point_scaled() {
        let ray = Ray::new(Vec3::new(5.0, 10.0, -5.0), Vec3::NEG_Y);
        let p = ray.disturbance_point(0.0, 5.0).unwrap();
        assert!((p - Vec3::new(1.0, 0.0, -1.0)).length() < 1e-6);
    }

    #[test]
    fn test_from_ndc_identity() {
        let ray = Ray::from_ndc(0.0, 0.0, &Mat4::IDENTITY);
        assert!((ray.direction - Vec3::Z).length() < 1e-6);
    }
}
