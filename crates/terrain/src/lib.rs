//! Procedural terrain strip geometry.
//!
//! Builds the indexed triangle grid the mountain range is shaded on, and the
//! line-segment overlay drawn on top of it.
//!
//! # Invariants
//! - A `w x h` grid has `(w+1)*(h+1)` vertices and `6*w*h` indices.
//! - Cell winding is `(a,b,d),(b,c,d)`, never reordered.
//! - The wire overlay has exactly three segments per triangle; shared edges
//!   are drawn twice.

mod grid;
mod wire;

pub use grid::{GridMesh, GridMeshBuilder, TerrainError};
pub use wire::{WireGeometry, WireOverlayBuilder, barycentric_centers};

pub fn crate_info() -> &'static str {
    "outrun-terrain v0.1.0"
}
