//! wgpu render backend for the drive scene.
//!
//! Draws every visible mesh node once per frame. Terrain and its wire
//! overlay go through a shared displacement vertex stage driven by the
//! scroll uniforms; everything else is lit or unlit by scene lights and fog.
//!
//! # Invariants
//! - The renderer never mutates the scene.
//! - The orbit camera is viewer state; the frame scheduler never reads it.
//! - Terrain and wire read the same uniform buffer in the same frame.

mod camera;
mod gpu;
mod shaders;

pub use camera::OrbitCamera;
pub use gpu::WgpuRenderer;

pub fn crate_info() -> &'static str {
    "outrun-render-wgpu v0.1.0"
}
