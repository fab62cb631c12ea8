use serde::{Deserialize, Serialize};

/// Linear fog parameters, copied once from the scene settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Fog {
    pub color: [f32; 3],
    pub near: f32,
    pub far: f32,
}

impl Default for Fog {
    fn default() -> Self {
        Self {
            color: [0.0, 0.0, 0.0],
            near: 10.0,
            far: 250.0,
        }
    }
}

/// Values shared by the terrain and wire shaders. Both read the same copy,
/// which keeps the two layers scrolling in lock-step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollUniforms {
    /// Seconds since start.
    pub time: f32,
    pub speed: f32,
    /// Terrain scale along the scroll axis divided by its height segments.
    pub scale: f32,
    pub fog: Fog,
    /// Wire line thickness in the wire fragment stage.
    pub thickness: f32,
}

impl Default for ScrollUniforms {
    fn default() -> Self {
        Self {
            time: 0.0,
            speed: 47.0,
            scale: 100.0,
            fog: Fog::default(),
            thickness: 1.0,
        }
    }
}

impl ScrollUniforms {
    /// Distance scrolled so far.
    pub fn travel(&self) -> f32 {
        self.speed * self.time
    }
}
