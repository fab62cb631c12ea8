use glam::{Mat4, Vec3};
use outrun_common::NodeId;

use crate::mesh::Topology;
use crate::scene::{NodeKind, Scene};

/// Half-line with a normalized direction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    pub direction: Vec3,
}

impl Ray {
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self {
            origin,
            direction: direction.normalize_or_zero(),
        }
    }

    pub fn point_at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }
}

/// Axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    pub const EMPTY: Self = Self {
        min: Vec3::splat(f32::MAX),
        max: Vec3::splat(f32::MIN),
    };

    pub fn from_points(points: impl IntoIterator<Item = Vec3>) -> Self {
        points.into_iter().fold(Self::EMPTY, |mut b, p| {
            b.min = b.min.min(p);
            b.max = b.max.max(p);
            b
        })
    }

    pub fn is_valid(&self) -> bool {
        self.min.cmple(self.max).all()
    }

    /// Bounds of this box after an affine transform (all eight corners).
    pub fn transformed(&self, m: &Mat4) -> Self {
        if !self.is_valid() {
            return *self;
        }
        let (lo, hi) = (self.min, self.max);
        Self::from_points((0..8).map(|i| {
            let corner = Vec3::new(
                if i & 1 == 0 { lo.x } else { hi.x },
                if i & 2 == 0 { lo.y } else { hi.y },
                if i & 4 == 0 { lo.z } else { hi.z },
            );
            m.transform_point3(corner)
        }))
    }

    /// Slab test. Returns the entry distance along the ray (0 when the
    /// origin is inside), or `None` on a miss.
    pub fn intersect(&self, ray: &Ray) -> Option<f32> {
        if !self.is_valid() {
            return None;
        }
        let mut t_near = f32::MIN;
        let mut t_far = f32::MAX;

        for axis in 0..3 {
            let origin = ray.origin[axis];
            let dir = ray.direction[axis];
            if dir.abs() < 1e-10 {
                // Parallel to this slab
                if origin < self.min[axis] || origin > self.max[axis] {
                    return None;
                }
                continue;
            }
            let inv = 1.0 / dir;
            let mut t1 = (self.min[axis] - origin) * inv;
            let mut t2 = (self.max[axis] - origin) * inv;
            if t1 > t2 {
                std::mem::swap(&mut t1, &mut t2);
            }
            t_near = t_near.max(t1);
            t_far = t_far.min(t2);
            if t_near > t_far || t_far < 0.0 {
                return None;
            }
        }
        Some(t_near.max(0.0))
    }
}

/// One ray hit against a scene node.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hit {
    pub node: NodeId,
    pub distance: f32,
    pub point: Vec3,
}

/// Casts rays into a scene.
///
/// Implementations must return hits sorted nearest first; callers take the
/// first element as the picked object.
pub trait RayIntersector {
    fn intersect(&self, ray: &Ray, scene: &Scene) -> Vec<Hit>;
}

/// Default intersector: world-space bounds prefilter, then exact
/// double-sided triangle tests. Line meshes have no area and are never hit.
#[derive(Debug, Default, Clone, Copy)]
pub struct MeshIntersector;

impl RayIntersector for MeshIntersector {
    fn intersect(&self, ray: &Ray, scene: &Scene) -> Vec<Hit> {
        let mut hits = Vec::new();
        for item in scene.world_nodes() {
            let NodeKind::Mesh(mesh) = &item.node.kind else {
                continue;
            };
            if !item.node.pickable || mesh.topology != Topology::Triangles {
                continue;
            }
            if mesh.bounds().transformed(&item.world).intersect(ray).is_none() {
                continue;
            }

            let world: Vec<Vec3> = mesh
                .positions
                .iter()
                .map(|p| item.world.transform_point3(Vec3::from_array(*p)))
                .collect();
            let nearest = mesh
                .indices
                .chunks_exact(3)
                .filter_map(|t| {
                    triangle_distance(
                        ray,
                        world[t[0] as usize],
                        world[t[1] as usize],
                        world[t[2] as usize],
                    )
                })
                .min_by(f32::total_cmp);

            if let Some(distance) = nearest {
                hits.push(Hit {
                    node: item.id,
                    distance,
                    point: ray.point_at(distance),
                });
            }
        }
        hits.sort_by(|a, b| a.distance.total_cmp(&b.distance));
        hits
    }
}

/// Möller–Trumbore, both faces.
fn triangle_distance(ray: &Ray, a: Vec3, b: Vec3, c: Vec3) -> Option<f32> {
    const EPS: f32 = 1e-7;
    let e1 = b - a;
    let e2 = c - a;
    let p = ray.direction.cross(e2);
    let det = e1.dot(p);
    if det.abs() < EPS {
        return None;
    }
    let inv_det = 1.0 / det;
    let s = ray.origin - a;
    let u = s.dot(p) * inv_det;
    if !(0.0..=1.0).contains(&u) {
        return None;
    }
    let q = s.cross(e1);
    let v = ray.direction.dot(q) * inv_det;
    if v < 0.0 || u + v > 1.0 {
        return None;
    }
    let t = e2.dot(q) * inv_det;
    (t > EPS).then_some(t)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Material, MeshData, SceneNode};
    use outrun_common::Transform;
    use std::sync::Arc;

    fn unit_box() -> Arc<MeshData> {
        Arc::new(MeshData::cuboid("box", Vec3::ONE))
    }

    #[test]
    fn aabb_slab_hit_and_miss() {
        let b = Aabb {
            min: Vec3::splat(-1.0),
            max: Vec3::splat(1.0),
        };
        let toward = Ray::new(Vec3::new(0.0, 0.0, 5.0), Vec3::NEG_Z);
        assert_eq!(b.intersect(&toward), Some(4.0));
        let away = Ray::new(Vec3::new(0.0, 0.0, 5.0), Vec3::Z);
        assert_eq!(b.intersect(&away), None);
        let inside = Ray::new(Vec3::ZERO, Vec3::X);
        assert_eq!(b.intersect(&inside), Some(0.0));
    }

    #[test]
    fn empty_aabb_never_hits() {
        let ray = Ray::new(Vec3::ZERO, Vec3::X);
        assert_eq!(Aabb::EMPTY.intersect(&ray), None);
    }

    #[test]
    fn transformed_bounds_follow_translation() {
        let b = Aabb {
            min: Vec3::splat(-1.0),
            max: Vec3::splat(1.0),
        };
        let moved = b.transformed(&Mat4::from_translation(Vec3::new(10.0, 0.0, 0.0)));
        assert_eq!(moved.min, Vec3::new(9.0, -1.0, -1.0));
        assert_eq!(moved.max, Vec3::new(11.0, 1.0, 1.0));
    }

    #[test]
    fn hits_sorted_nearest_first() {
        let mut scene = Scene::new();
        let mesh = unit_box();
        let far = scene.add(SceneNode::mesh("far", mesh.clone(), Material::default()).with_transform(
            Transform::from_position(Vec3::new(0.0, 0.0, -10.0)),
        ));
        let near = scene.add(
            SceneNode::mesh("near", mesh, Material::default())
                .with_transform(Transform::from_position(Vec3::new(0.0, 0.0, -3.0))),
        );

        let ray = Ray::new(Vec3::ZERO, Vec3::NEG_Z);
        let hits = MeshIntersector.intersect(&ray, &scene);
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].node, near);
        assert_eq!(hits[1].node, far);
        assert!((hits[0].distance - 2.5).abs() < 1e-5);
    }

    #[test]
    fn invisible_and_unpickable_nodes_skipped() {
        let mut scene = Scene::new();
        let mesh = unit_box();
        let hidden = scene.add(SceneNode::mesh("hidden", mesh.clone(), Material::default()));
        scene.get_mut(hidden).unwrap().visible = false;
        let mut ghost = SceneNode::mesh("ghost", mesh, Material::default());
        ghost.pickable = false;
        scene.add(ghost);

        let ray = Ray::new(Vec3::new(0.0, 0.0, 5.0), Vec3::NEG_Z);
        assert!(MeshIntersector.intersect(&ray, &scene).is_empty());
    }

    #[test]
    fn line_meshes_are_not_hit() {
        let mut scene = Scene::new();
        let lines = MeshData::new(
            "line",
            Topology::Lines,
            vec![[-1.0, 0.0, 0.0], [1.0, 0.0, 0.0]],
            Vec::new(),
            vec![0, 1],
        );
        scene.add(SceneNode::mesh("line", Arc::new(lines), Material::default()));
        let ray = Ray::new(Vec3::new(0.0, 0.0, 5.0), Vec3::NEG_Z);
        assert!(MeshIntersector.intersect(&ray, &scene).is_empty());
    }
}
