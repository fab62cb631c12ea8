use glam::{Mat4, Vec2, Vec3, Vec4};

use crate::ray::Ray;

/// Perspective camera looking from `eye` at `target`.
///
/// Projection uses a 0..1 depth range; `ray_from_ndc` inverts it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    pub eye: Vec3,
    pub target: Vec3,
    /// Vertical field of view in radians.
    pub fov_y: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            eye: Vec3::new(3.0, 3.0, 10.0),
            target: Vec3::new(0.0, 3.0, 0.0),
            fov_y: 70.0_f32.to_radians(),
            aspect: 2.0,
            near: 0.01,
            far: 10_000.0,
        }
    }
}

impl Camera {
    pub fn forward(&self) -> Vec3 {
        (self.target - self.eye).normalize_or_zero()
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.eye, self.target, Vec3::Y)
    }

    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov_y, self.aspect, self.near, self.far)
    }

    pub fn view_projection(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }

    /// Ray from the eye through a point in normalized device coordinates
    /// (x right, y up, both in [-1, 1] on screen).
    pub fn ray_from_ndc(&self, ndc: Vec2) -> Ray {
        let inv = self.view_projection().inverse();
        let far = inv * Vec4::new(ndc.x, ndc.y, 1.0, 1.0);
        let far = far.truncate() / far.w;
        Ray::new(self.eye, far - self.eye)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_camera_matrix_is_finite() {
        let cam = Camera::default();
        assert!(cam.view_projection().is_finite());
    }

    #[test]
    fn center_ray_points_at_target() {
        let cam = Camera::default();
        let ray = cam.ray_from_ndc(Vec2::ZERO);
        assert_eq!(ray.origin, cam.eye);
        assert!(ray.direction.dot(cam.forward()) > 0.9999);
    }

    #[test]
    fn right_edge_ray_leans_right() {
        let cam = Camera {
            eye: Vec3::new(0.0, 0.0, 10.0),
            target: Vec3::ZERO,
            ..Camera::default()
        };
        let ray = cam.ray_from_ndc(Vec2::new(1.0, 0.0));
        assert!(ray.direction.x > 0.0);
        assert!(ray.direction.z < 0.0);
        let up = cam.ray_from_ndc(Vec2::new(0.0, 1.0));
        assert!(up.direction.y > 0.0);
    }
}
