use glam::Vec3;
use outrun_common::Transform;
use outrun_scene::{Material, MeshData, NodeKind, Prefab};
use std::f32::consts::FRAC_PI_2;
use std::sync::Arc;

use crate::stage::rgba;

/// Name of the node inside the vehicle that holds the wheels, in spin order.
pub const WHEEL_CONTAINER: &str = "Car";

/// An asset that finished loading.
#[derive(Debug, Clone)]
pub enum LoadedAsset {
    Vehicle(Prefab),
    /// Template cloned into the roadside object pool.
    PropTemplate(Prefab),
}

impl LoadedAsset {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Vehicle(_) => "vehicle",
            Self::PropTemplate(_) => "prop template",
        }
    }
}

/// Source of optional scene assets.
///
/// Polled once per frame from the loop thread. Returning nothing is the
/// normal "still loading" answer; each asset is returned at most once.
pub trait AssetProvider {
    fn poll(&mut self) -> Vec<LoadedAsset>;
}

/// Procedural stand-ins for the vehicle and the palm prop, released after a
/// fixed number of polls to mimic a slow loader.
#[derive(Debug)]
pub struct StandInAssets {
    remaining: u32,
    pending: Vec<LoadedAsset>,
}

impl StandInAssets {
    pub fn new(delay_polls: u32) -> Self {
        Self {
            remaining: delay_polls,
            pending: vec![
                LoadedAsset::Vehicle(vehicle_prefab()),
                LoadedAsset::PropTemplate(palm_prefab()),
            ],
        }
    }

    /// True once every asset has been handed out.
    pub fn is_drained(&self) -> bool {
        self.pending.is_empty()
    }
}

impl AssetProvider for StandInAssets {
    fn poll(&mut self) -> Vec<LoadedAsset> {
        if self.remaining > 0 {
            self.remaining -= 1;
            return Vec::new();
        }
        std::mem::take(&mut self.pending)
    }
}

/// Boxy car: body, cabin, and a wheel container rotated a quarter turn so
/// each wheel spins about its own local Z.
pub fn vehicle_prefab() -> Prefab {
    let body = Arc::new(MeshData::cuboid("car-body", Vec3::new(2.0, 0.6, 4.4)));
    let cabin = Arc::new(MeshData::cuboid("car-cabin", Vec3::new(1.7, 0.5, 2.0)));
    let tire = Arc::new(MeshData::frustum("tire", 0.35, 0.35, 0.3, 12));

    let mut wheels = Prefab::group(WHEEL_CONTAINER)
        .with_transform(Transform::default().with_euler(0.0, FRAC_PI_2, 0.0));
    // Container frame: x = -vehicle z, z = vehicle x.
    let corners = [(-1.4, -0.9), (1.4, -0.9), (-1.4, 0.9), (1.4, 0.9)];
    for (i, (x, z)) in corners.into_iter().enumerate() {
        let tire_node = Prefab::new("tire", NodeKind::Mesh(tire.clone()))
            .with_transform(Transform::default().with_euler(FRAC_PI_2, 0.0, 0.0))
            .with_material(Material::lit(rgba(0x151515, 1.0)));
        wheels = wheels.with_child(
            Prefab::group(format!("wheel{i}"))
                .with_transform(Transform::from_position(Vec3::new(x, 0.35, z)))
                .with_child(tire_node),
        );
    }

    Prefab::group("vehicle")
        .with_child(
            Prefab::new("body", NodeKind::Mesh(body))
                .with_transform(Transform::from_position(Vec3::new(0.0, 0.65, 0.0)))
                .with_material(Material::lit(rgba(0xc0c8d8, 1.0))),
        )
        .with_child(
            Prefab::new("cabin", NodeKind::Mesh(cabin))
                .with_transform(Transform::from_position(Vec3::new(0.0, 1.2, 0.3)))
                .with_material(Material::lit(rgba(0x1a1030, 1.0))),
        )
        .with_child(wheels)
}

/// Palm: trunk plus a flat crown cone. Origin sits two units below the
/// base so the pool elevation puts it on the verge.
pub fn palm_prefab() -> Prefab {
    let trunk = Arc::new(MeshData::frustum("palm-trunk", 0.15, 0.3, 6.0, 8));
    let crown = Arc::new(MeshData::frustum("palm-crown", 0.0, 2.5, 1.2, 8));
    Prefab::group("palm")
        .with_child(
            Prefab::new("trunk", NodeKind::Mesh(trunk))
                .with_transform(Transform::from_position(Vec3::new(0.0, 5.0, 0.0)))
                .with_material(Material::lit(rgba(0x3b2a1e, 1.0))),
        )
        .with_child(
            Prefab::new("crown", NodeKind::Mesh(crown))
                .with_transform(Transform::from_position(Vec3::new(0.0, 8.3, 0.0)))
                .with_material(Material::lit(rgba(0x1f6b3a, 1.0))),
        )
}
