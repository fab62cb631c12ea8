use glam::Vec3;
use outrun_common::{NodeId, Transform};
use outrun_scene::{Material, MeshData, NodeKind, Scene, SceneNode, Shading};
use outrun_terrain::{GridMeshBuilder, WireOverlayBuilder};
use std::f32::consts::{FRAC_PI_2, PI, TAU};
use std::sync::Arc;

use crate::config::DriveConfig;
use crate::error::KernelError;
use crate::pool::ObjectPool;
use crate::slot::Slot;

/// `0xRRGGBB` to float RGB in `[0, 1]`.
pub fn rgb(hex: u32) -> [f32; 3] {
    [
        ((hex >> 16) & 0xff) as f32 / 255.0,
        ((hex >> 8) & 0xff) as f32 / 255.0,
        (hex & 0xff) as f32 / 255.0,
    ]
}

pub fn rgba(hex: u32, alpha: f32) -> [f32; 4] {
    let [r, g, b] = rgb(hex);
    [r, g, b, alpha]
}

/// The terrain surface and its wire overlay. They always move together.
///
/// The vertical scale is read from the mesh node's transform every frame,
/// so it is not cached here.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TerrainRig {
    pub mesh: NodeId,
    pub wire: NodeId,
    pub height_segments: u32,
}

/// Ids of everything the scheduler moves.
///
/// Nodes built by the stage are always present; slots fill in as assets
/// arrive and stay filled.
#[derive(Debug, Default)]
pub struct SceneHandles {
    pub ground: Option<NodeId>,
    pub flyer: Option<NodeId>,
    pub tractor_light: Option<NodeId>,
    pub shadow: Option<NodeId>,
    pub terrain: Slot<TerrainRig>,
    pub vehicle: Slot<NodeId>,
    pub wheels: Slot<NodeId>,
    pub props: Slot<ObjectPool>,
}

/// Builds the static part of the drive scene from a [`DriveConfig`].
pub struct Stage<'a> {
    config: &'a DriveConfig,
}

impl<'a> Stage<'a> {
    pub fn new(config: &'a DriveConfig) -> Self {
        Self { config }
    }

    /// Lights, ground, flyer, shadow proxy, and the terrain strip.
    pub fn build(&self, scene: &mut Scene) -> Result<SceneHandles, KernelError> {
        let mut handles = self.build_static(scene)?;
        self.attach_terrain(scene, &mut handles)?;
        Ok(handles)
    }

    /// Everything except the terrain, which stays pending.
    pub fn build_static(&self, scene: &mut Scene) -> Result<SceneHandles, KernelError> {
        let _span = tracing::info_span!("stage_build").entered();
        self.config.validate()?;

        add_lights(scene);
        let ground = self.add_ground(scene);
        let flyer = self.add_flyer(scene)?;

        let flyer_pos = scene.get(flyer).map(|n| n.transform.position).unwrap_or_default();
        let tractor_light = scene.add(
            SceneNode::new(
                "tractor-light",
                NodeKind::PointLight {
                    color: rgb(0x0077ff),
                    intensity: 0.4,
                    target: None,
                },
            )
            .with_transform(Transform::from_position(flyer_pos)),
        );

        let shadow_mesh = Arc::new(MeshData::plane("car-shadow", 2.2, 4.5));
        let mut shadow = SceneNode::mesh("car-shadow", shadow_mesh, Material::unlit(rgba(0x000000, 0.5)))
            .with_transform(
                Transform::from_position(Vec3::new(0.0, self.config.vehicle.shadow_lift, 0.0))
                    .with_euler(-FRAC_PI_2, 0.0, 0.0),
            );
        shadow.pickable = false;
        let shadow = scene.add(shadow);

        tracing::info!(nodes = scene.len(), "stage built");
        Ok(SceneHandles {
            ground: Some(ground),
            flyer: Some(flyer),
            tractor_light: Some(tractor_light),
            shadow: Some(shadow),
            ..SceneHandles::default()
        })
    }

    /// Generate the mountain grid, add the shaded and wire layers with one
    /// shared transform, and resolve the terrain slot.
    pub fn attach_terrain(
        &self,
        scene: &mut Scene,
        handles: &mut SceneHandles,
    ) -> Result<(), KernelError> {
        if handles.terrain.is_ready() {
            return Err(KernelError::AlreadyResolved("terrain"));
        }
        let cfg = &self.config.terrain;
        let grid = GridMeshBuilder::new(cfg.width_segments, cfg.height_segments)?.build();
        let wire = WireOverlayBuilder::build(&grid);

        let transform = Transform::from_position(Vec3::new(0.0, cfg.elevation, 0.0))
            .with_euler(FRAC_PI_2, 0.0, 0.0)
            .with_scale(Vec3::from_array(cfg.scale));

        let surface = Material {
            shading: Shading::Terrain,
            color: rgba(0x1a0b2e, 1.0),
            highlighted: false,
        };
        let lines = Material {
            shading: Shading::TerrainWire,
            color: rgba(0xff2bd6, 1.0),
            highlighted: false,
        };
        let mesh = scene.add(
            SceneNode::mesh("terrain", Arc::new(MeshData::from_grid("terrain", &grid)), surface)
                .with_transform(transform),
        );
        let mut wire_node = SceneNode::mesh(
            "terrain-wire",
            Arc::new(MeshData::from_wire("terrain-wire", &grid, &wire)),
            lines,
        )
        .with_transform(transform);
        wire_node.pickable = false;
        let wire_id = scene.add(wire_node);

        tracing::info!(
            vertices = grid.vertex_count(),
            triangles = grid.triangle_count(),
            segments = wire.segment_count(),
            "terrain attached"
        );
        handles.terrain.resolve(
            TerrainRig {
                mesh,
                wire: wire_id,
                height_segments: cfg.height_segments,
            },
            "terrain",
        )
    }

    fn add_ground(&self, scene: &mut Scene) -> NodeId {
        let g = &self.config.ground;
        let mesh = Arc::new(MeshData::cuboid("ground", Vec3::new(g.width, g.length, g.thickness)));
        scene.add(
            SceneNode::mesh("ground", mesh, Material::lit(rgba(0x202028, 1.0))).with_transform(
                Transform::from_position(Vec3::new(0.0, g.elevation, 0.0)).with_euler(-FRAC_PI_2, 0.0, 0.0),
            ),
        )
    }

    fn add_flyer(&self, scene: &mut Scene) -> Result<NodeId, KernelError> {
        let flyer = scene.add(SceneNode::group("flyer").with_transform(Transform::from_position(
            Vec3::new(0.0, self.config.flyer.altitude, 60.0),
        )));

        let parts = [
            (
                "flyer-top",
                MeshData::frustum("flyer-top", 0.0, 10.0, 3.0, 8),
                Transform::from_position(Vec3::new(0.0, 2.0, 0.0)),
                Material::lit(rgba(0x101010, 1.0)),
            ),
            (
                "flyer-bottom",
                MeshData::frustum("flyer-bottom", 0.0, 10.0, 1.0, 8),
                Transform::default().with_euler(PI, 0.0, 0.0),
                Material::lit(rgba(0x100720, 1.0)),
            ),
            (
                "flyer-opening",
                MeshData::frustum("flyer-opening", 4.0, 4.0, 1.0, 16),
                Transform::from_position(Vec3::new(0.0, -0.1, 0.0)),
                Material::lit(rgba(0x131313, 1.0)),
            ),
        ];
        for (name, mesh, transform, material) in parts {
            scene.add_child(flyer, SceneNode::mesh(name, Arc::new(mesh), material).with_transform(transform))?;
        }

        let mut beam = SceneNode::mesh(
            "tractor-beam",
            Arc::new(MeshData::frustum("tractor-beam", 0.0, 10.0, 60.0, 30)),
            Material::unlit(rgba(0xddefff, 0.05)),
        )
        .with_transform(Transform::from_position(Vec3::new(0.0, -20.0, -15.0)).with_euler(PI / 5.0, 0.0, 0.0));
        beam.pickable = false;
        scene.add_child(flyer, beam)?;

        let orb = Arc::new(MeshData::frustum("orb", 0.5, 0.5, 0.6, 8));
        const ORBS: usize = 18;
        for i in 0..ORBS {
            let theta = i as f32 / ORBS as f32 * TAU;
            let position = Vec3::new(6.5 * theta.cos(), 0.2, 6.5 * theta.sin());
            scene.add_child(
                flyer,
                SceneNode::mesh(format!("orb{i}"), orb.clone(), Material::unlit(rgba(0x9542f5, 1.0)))
                    .with_transform(Transform::from_position(position)),
            )?;
        }
        Ok(flyer)
    }
}

fn add_lights(scene: &mut Scene) {
    scene.add(SceneNode::new(
        "ambient",
        NodeKind::AmbientLight {
            color: rgb(0xffb3ab),
            intensity: 0.75,
        },
    ));
    scene.add(
        SceneNode::new(
            "sun-light",
            NodeKind::PointLight {
                color: rgb(0xffb3ab),
                intensity: 1.0,
                target: None,
            },
        )
        .with_transform(Transform::from_position(Vec3::new(250.0, 50.0, -400.0))),
    );
    // Directional lights shine from their position toward the origin.
    for (name, hex, x) in [("key-pink", 0xff21ae, 5.0), ("key-purple", 0x6814fa, -5.0)] {
        scene.add(
            SceneNode::new(
                name,
                NodeKind::DirectionalLight {
                    color: rgb(hex),
                    intensity: 1.0,
                },
            )
            .with_transform(Transform::from_position(Vec3::new(x, 5.0, -10.0))),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_colors() {
        assert_eq!(rgb(0xff0000), [1.0, 0.0, 0.0]);
        assert_eq!(rgba(0x0000ff, 0.5), [0.0, 0.0, 1.0, 0.5]);
    }

    #[test]
    fn build_resolves_terrain() {
        let mut scene = Scene::new();
        let config = DriveConfig::default();
        let handles = Stage::new(&config).build(&mut scene).unwrap();
        let rig = handles.terrain.get().copied().unwrap();
        assert_eq!(rig.height_segments, 10);

        let mesh = scene.get(rig.mesh).unwrap();
        assert_eq!(mesh.transform.scale.y, 1000.0);
        let wire = scene.get(rig.wire).unwrap();
        assert_eq!(mesh.transform, wire.transform);
        assert_eq!(wire.material.shading, Shading::TerrainWire);
        assert!(!handles.vehicle.is_ready());
        assert!(!handles.props.is_ready());
    }

    #[test]
    fn flyer_has_eighteen_orbs() {
        let mut scene = Scene::new();
        let config = DriveConfig::default();
        let handles = Stage::new(&config).build_static(&mut scene).unwrap();
        let flyer = handles.flyer.unwrap();
        let orbs = scene
            .children(flyer)
            .iter()
            .filter(|id| scene.get(**id).is_some_and(|n| n.name.starts_with("orb")))
            .count();
        assert_eq!(orbs, 18);
        assert_eq!(scene.get(flyer).unwrap().transform.position, Vec3::new(0.0, 30.0, 60.0));
        assert!(!handles.terrain.is_ready());
    }

    #[test]
    fn terrain_attaches_once() {
        let mut scene = Scene::new();
        let config = DriveConfig::default();
        let stage = Stage::new(&config);
        let mut handles = stage.build(&mut scene).unwrap();
        let before = scene.len();
        assert!(matches!(
            stage.attach_terrain(&mut scene, &mut handles),
            Err(KernelError::AlreadyResolved("terrain"))
        ));
        assert_eq!(scene.len(), before);
    }

    #[test]
    fn invalid_config_fails_fast() {
        let mut scene = Scene::new();
        let mut config = DriveConfig::default();
        config.terrain.height_segments = 0;
        assert!(Stage::new(&config).build(&mut scene).is_err());
        assert!(scene.is_empty());
    }
}
