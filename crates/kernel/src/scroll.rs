use outrun_render::{Fog, ScrollUniforms};

/// Euclidean remainder of `value` into `[0, period)`.
///
/// Computed in `f64`: scroll distances grow without bound, and an `f32`
/// remainder of a large travel quantizes to a few steps per period.
/// `rem_euclid` can round up to exactly `period` for tiny negative inputs;
/// that case folds back to 0 so the half-open range always holds.
pub fn wrap(value: f64, period: f64) -> f64 {
    let r = value.rem_euclid(period);
    if r >= period { 0.0 } else { r }
}

/// [`wrap`], narrowed to `f32` for transforms. Narrowing can round up to
/// `period`; that folds back to 0 as well.
pub fn wrap_narrow(value: f64, period: f64) -> f32 {
    let r = wrap(value, period) as f32;
    if r >= period as f32 { 0.0 } else { r }
}

/// Wrap into the symmetric window `[-half, full - half)`.
pub fn wrap_symmetric(value: f64, half: f64, full: f64) -> f64 {
    wrap(value + half, full) - half
}

/// Owner of the shared scroll uniforms.
///
/// Mutated once per frame by the scheduler; everything downstream only sees
/// copies from [`ScrollState::snapshot`]. The authoritative clock is kept in
/// `f64` and narrowed only when written into the uniforms.
#[derive(Debug, Clone)]
pub struct ScrollState {
    time: f64,
    uniforms: ScrollUniforms,
}

impl ScrollState {
    pub fn new(speed: f32, fog: Fog, thickness: f32) -> Self {
        Self {
            time: 0.0,
            uniforms: ScrollUniforms {
                time: 0.0,
                speed,
                scale: ScrollUniforms::default().scale,
                fog,
                thickness,
            },
        }
    }

    /// Advance to `time` seconds. Returns the delta from the previous time.
    pub fn advance(&mut self, time: f64) -> f32 {
        let delta = time - self.time;
        self.time = time;
        self.uniforms.time = time as f32;
        delta as f32
    }

    /// Terrain length along the scroll axis over its row count.
    pub fn set_scale(&mut self, scale_y: f32, height_segments: u32) {
        self.uniforms.scale = scale_y / height_segments as f32;
    }

    pub fn time(&self) -> f64 {
        self.time
    }

    /// Distance travelled so far.
    pub fn travel(&self) -> f64 {
        self.uniforms.speed as f64 * self.time
    }

    pub fn snapshot(&self) -> ScrollUniforms {
        self.uniforms
    }
}
