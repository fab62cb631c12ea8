use glam::Vec3;
use outrun_scene::Camera;

/// Orbit camera around a target point: drag to orbit, wheel to zoom.
/// Viewer-side only; the frame scheduler never sees it.
pub struct OrbitCamera {
    pub target: Vec3,
    pub distance: f32,
    /// Radians around +Y, 0 looking down -Z.
    pub yaw: f32,
    /// Radians above the horizon.
    pub pitch: f32,
    pub fov: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
    pub sensitivity: f32,
    pub zoom_step: f32,
    pub min_distance: f32,
    pub max_distance: f32,
}

impl Default for OrbitCamera {
    fn default() -> Self {
        let start = Camera::default();
        let mut camera = Self {
            target: start.target,
            distance: 1.0,
            yaw: 0.0,
            pitch: 0.0,
            fov: start.fov_y,
            aspect: 16.0 / 9.0,
            near: start.near,
            far: start.far,
            sensitivity: 0.005,
            zoom_step: 1.1,
            min_distance: 2.0,
            max_distance: 400.0,
        };
        camera.look_from(start.eye);
        camera
    }
}

impl OrbitCamera {
    /// Place the eye at `eye`, keeping the current target.
    pub fn look_from(&mut self, eye: Vec3) {
        let offset = eye - self.target;
        self.distance = offset.length().max(f32::EPSILON);
        self.yaw = offset.x.atan2(offset.z);
        self.pitch = (offset.y / self.distance).clamp(-1.0, 1.0).asin();
    }

    pub fn eye(&self) -> Vec3 {
        let (sy, cy) = self.yaw.sin_cos();
        let (sp, cp) = self.pitch.sin_cos();
        self.target + Vec3::new(sy * cp, sp, cy * cp) * self.distance
    }

    pub fn orbit(&mut self, dx: f32, dy: f32) {
        self.yaw -= dx * self.sensitivity;
        self.pitch = (self.pitch + dy * self.sensitivity)
            .clamp(-85.0_f32.to_radians(), 85.0_f32.to_radians());
    }

    /// Positive `steps` zoom in.
    pub fn zoom(&mut self, steps: f32) {
        self.distance = (self.distance / self.zoom_step.powf(steps))
            .clamp(self.min_distance, self.max_distance);
    }

    pub fn set_viewport(&mut self, width: u32, height: u32) {
        self.aspect = width as f32 / height.max(1) as f32;
    }

    /// Snapshot used for drawing and for picking rays.
    pub fn camera(&self) -> Camera {
        Camera {
            eye: self.eye(),
            target: self.target,
            fov_y: self.fov,
            aspect: self.aspect,
            near: self.near,
            far: self.far,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_matches_scene_camera() {
        let cam = OrbitCamera::default();
        let eye = cam.eye();
        assert!((eye - Vec3::new(3.0, 3.0, 10.0)).length() < 1e-4, "{eye}");
        assert!(cam.camera().view_projection().is_finite());
    }

    #[test]
    fn orbit_keeps_distance() {
        let mut cam = OrbitCamera::default();
        let d = cam.distance;
        cam.orbit(120.0, -40.0);
        assert!(((cam.eye() - cam.target).length() - d).abs() < 1e-3);
    }

    #[test]
    fn pitch_is_clamped() {
        let mut cam = OrbitCamera::default();
        cam.orbit(0.0, 1e6);
        assert!(cam.pitch <= 85.0_f32.to_radians() + 1e-6);
    }

    #[test]
    fn zoom_respects_limits() {
        let mut cam = OrbitCamera::default();
        cam.zoom(1000.0);
        assert_eq!(cam.distance, cam.min_distance);
        cam.zoom(-1000.0);
        assert_eq!(cam.distance, cam.max_distance);
    }
}
