//! Rendering adapter: the narrow interface the frame scheduler submits to.
//!
//! # Invariants
//! - A renderer reads the scene; it never mutates it.
//! - Each frame receives an immutable copy of the scroll uniforms, so frame
//!   state is reproducible from `(scene, snapshot)` alone.
//!
//! `DebugTextRenderer` is a headless implementation used by the CLI and tests;
//! the wgpu backend lives in `outrun-render-wgpu`.

mod renderer;
mod uniforms;

pub use renderer::{DebugTextRenderer, FrameSnapshot, RenderPipeline, SNAPSHOT_HISTORY};
pub use uniforms::{Fog, ScrollUniforms};

pub fn crate_info() -> &'static str {
    "outrun-render v0.1.0"
}
