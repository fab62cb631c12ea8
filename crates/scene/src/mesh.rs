use glam::Vec3;
use outrun_terrain::{GridMesh, WireGeometry};

use crate::ray::Aabb;

/// How a mesh's index buffer is assembled into primitives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Topology {
    Triangles,
    Lines,
}

/// CPU-side vertex and index data for one drawable mesh.
///
/// Built once and shared between nodes behind an `Arc`; a node only ever
/// stores a reference plus its own transform.
#[derive(Debug, Clone, PartialEq)]
pub struct MeshData {
    pub name: String,
    pub topology: Topology,
    pub positions: Vec<[f32; 3]>,
    pub normals: Vec<[f32; 3]>,
    pub uvs: Vec<[f32; 2]>,
    pub centers: Vec<[f32; 3]>,
    pub indices: Vec<u32>,
    bounds: Aabb,
}

impl MeshData {
    /// Assemble a mesh; missing attributes are zero-filled to the vertex count.
    pub fn new(
        name: impl Into<String>,
        topology: Topology,
        positions: Vec<[f32; 3]>,
        mut normals: Vec<[f32; 3]>,
        indices: Vec<u32>,
    ) -> Self {
        normals.resize(positions.len(), [0.0, 0.0, 0.0]);
        let bounds = Aabb::from_points(positions.iter().map(|p| Vec3::from_array(*p)));
        Self {
            name: name.into(),
            topology,
            uvs: vec![[0.0, 0.0]; positions.len()],
            centers: outrun_terrain::barycentric_centers(positions.len()),
            positions,
            normals,
            indices,
            bounds,
        }
    }

    /// Shaded terrain surface from the procedural grid.
    pub fn from_grid(name: impl Into<String>, grid: &GridMesh) -> Self {
        let positions = grid.positions().to_vec();
        Self {
            name: name.into(),
            topology: Topology::Triangles,
            bounds: Aabb::from_points(positions.iter().map(|p| Vec3::from_array(*p))),
            positions,
            normals: grid.normals().to_vec(),
            uvs: grid.uvs().to_vec(),
            centers: grid.centers().to_vec(),
            indices: grid.indices().to_vec(),
        }
    }

    /// Wire overlay over the same vertices as `grid`, so both layers displace
    /// identically in the terrain shader.
    pub fn from_wire(name: impl Into<String>, grid: &GridMesh, wire: &WireGeometry) -> Self {
        let mut mesh = Self::from_grid(name, grid);
        mesh.topology = Topology::Lines;
        mesh.indices = wire.segments().iter().flatten().copied().collect();
        mesh
    }

    /// Single quad in the XY plane facing +Z.
    pub fn plane(name: impl Into<String>, width: f32, height: f32) -> Self {
        let (hw, hh) = (width * 0.5, height * 0.5);
        let positions = vec![[-hw, -hh, 0.0], [hw, -hh, 0.0], [hw, hh, 0.0], [-hw, hh, 0.0]];
        let mut mesh = Self::new(
            name,
            Topology::Triangles,
            positions,
            vec![[0.0, 0.0, 1.0]; 4],
            vec![0, 1, 2, 2, 3, 0],
        );
        mesh.uvs = vec![[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0]];
        mesh
    }

    /// Axis-aligned box centered on the origin.
    pub fn cuboid(name: impl Into<String>, size: Vec3) -> Self {
        let h = size * 0.5;
        let faces: [([f32; 3], [[f32; 3]; 4]); 6] = [
            ([0.0, 0.0, 1.0], [[-h.x, -h.y, h.z], [h.x, -h.y, h.z], [h.x, h.y, h.z], [-h.x, h.y, h.z]]),
            ([0.0, 0.0, -1.0], [[h.x, -h.y, -h.z], [-h.x, -h.y, -h.z], [-h.x, h.y, -h.z], [h.x, h.y, -h.z]]),
            ([1.0, 0.0, 0.0], [[h.x, -h.y, h.z], [h.x, -h.y, -h.z], [h.x, h.y, -h.z], [h.x, h.y, h.z]]),
            ([-1.0, 0.0, 0.0], [[-h.x, -h.y, -h.z], [-h.x, -h.y, h.z], [-h.x, h.y, h.z], [-h.x, h.y, -h.z]]),
            ([0.0, 1.0, 0.0], [[-h.x, h.y, h.z], [h.x, h.y, h.z], [h.x, h.y, -h.z], [-h.x, h.y, -h.z]]),
            ([0.0, -1.0, 0.0], [[-h.x, -h.y, -h.z], [h.x, -h.y, -h.z], [h.x, -h.y, h.z], [-h.x, -h.y, h.z]]),
        ];

        let mut positions = Vec::with_capacity(24);
        let mut normals = Vec::with_capacity(24);
        let mut indices = Vec::with_capacity(36);
        for (normal, corners) in faces {
            let base = positions.len() as u32;
            positions.extend_from_slice(&corners);
            normals.extend_from_slice(&[normal; 4]);
            indices.extend_from_slice(&[base, base + 1, base + 2, base + 2, base + 3, base]);
        }
        Self::new(name, Topology::Triangles, positions, normals, indices)
    }

    /// Truncated cone around +Y, centered on the origin. A zero top radius
    /// gives a cone, equal radii a cylinder. Both caps are closed.
    pub fn frustum(
        name: impl Into<String>,
        radius_top: f32,
        radius_bottom: f32,
        height: f32,
        radial_segments: u32,
    ) -> Self {
        let segments = radial_segments.max(3);
        let half = height * 0.5;
        let mut positions = Vec::new();
        let mut normals = Vec::new();
        let mut indices = Vec::new();

        let slope = (radius_bottom - radius_top) / height.max(f32::EPSILON);
        for s in 0..=segments {
            let theta = s as f32 / segments as f32 * std::f32::consts::TAU;
            let (sin, cos) = theta.sin_cos();
            let n = Vec3::new(sin, slope, cos).normalize();
            positions.push([radius_top * sin, half, radius_top * cos]);
            positions.push([radius_bottom * sin, -half, radius_bottom * cos]);
            normals.push(n.to_array());
            normals.push(n.to_array());
        }
        for s in 0..segments {
            let top = 2 * s;
            let bottom = top + 1;
            indices.extend_from_slice(&[top, bottom, top + 2, bottom, bottom + 2, top + 2]);
        }

        for (y, radius, ny) in [(half, radius_top, 1.0f32), (-half, radius_bottom, -1.0)] {
            if radius <= 0.0 {
                continue;
            }
            let center = positions.len() as u32;
            positions.push([0.0, y, 0.0]);
            normals.push([0.0, ny, 0.0]);
            for s in 0..=segments {
                let theta = s as f32 / segments as f32 * std::f32::consts::TAU;
                positions.push([radius * theta.sin(), y, radius * theta.cos()]);
                normals.push([0.0, ny, 0.0]);
            }
            for s in 0..segments {
                let a = center + 1 + s;
                if ny > 0.0 {
                    indices.extend_from_slice(&[center, a, a + 1]);
                } else {
                    indices.extend_from_slice(&[center, a + 1, a]);
                }
            }
        }

        Self::new(name, Topology::Triangles, positions, normals, indices)
    }

    /// Local-space bounds of all vertices.
    pub fn bounds(&self) -> Aabb {
        self.bounds
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    /// Primitive count: triangles or line segments.
    pub fn primitive_count(&self) -> usize {
        match self.topology {
            Topology::Triangles => self.indices.len() / 3,
            Topology::Lines => self.indices.len() / 2,
        }
    }
}
