//! Scene graph: the authoritative set of nodes the frame loop animates and
//! the renderer draws.
//!
//! # Invariants
//! - The scene owns every node; everything else refers to nodes by `NodeId`.
//! - Child order is insertion order and never changes.
//! - Mesh data is shared behind `Arc`; instancing a prefab never copies it.

mod camera;
mod mesh;
mod prefab;
mod ray;
mod scene;

pub use camera::Camera;
pub use mesh::{MeshData, Topology};
pub use prefab::Prefab;
pub use ray::{Aabb, Hit, MeshIntersector, Ray, RayIntersector};
pub use scene::{Material, NodeKind, Scene, SceneError, SceneNode, Shading, WorldNode};

pub fn crate_info() -> &'static str {
    "outrun-scene v0.1.0"
}
