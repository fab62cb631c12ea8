//! Shared types for the outrun scene.
//!
//! # Invariants
//! - Node ids are unique for the lifetime of a scene.
//! - `Transform::default()` is the identity.

mod types;

pub use types::{NodeId, Transform};

pub fn crate_info() -> &'static str {
    "outrun-common v0.1.0"
}
