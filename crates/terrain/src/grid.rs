use crate::wire::barycentric_centers;

/// Errors from terrain geometry construction.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TerrainError {
    #[error(
        "invalid grid configuration: {width_segments}x{height_segments} segments \
         (both must be at least 1 and the vertex count must fit a u32 index)"
    )]
    InvalidConfiguration {
        width_segments: u32,
        height_segments: u32,
    },
}

/// Validated grid dimensions. Call [`GridMeshBuilder::build`] to generate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridMeshBuilder {
    width_segments: u32,
    height_segments: u32,
}

impl GridMeshBuilder {
    pub fn new(width_segments: u32, height_segments: u32) -> Result<Self, TerrainError> {
        let invalid = TerrainError::InvalidConfiguration {
            width_segments,
            height_segments,
        };
        if width_segments == 0 || height_segments == 0 {
            return Err(invalid);
        }
        // Every vertex index must be addressable by the u32 index buffer.
        (width_segments as u64 + 1)
            .checked_mul(height_segments as u64 + 1)
            .filter(|&n| n <= u32::MAX as u64)
            .ok_or(invalid)?;
        Ok(Self {
            width_segments,
            height_segments,
        })
    }

    pub fn width_segments(&self) -> u32 {
        self.width_segments
    }

    pub fn height_segments(&self) -> u32 {
        self.height_segments
    }

    /// Generate the grid: a unit square centered on the origin in the XY
    /// plane, rows running down -Y, every normal facing +Z.
    pub fn build(&self) -> GridMesh {
        let w = self.width_segments;
        let h = self.height_segments;
        let row = w + 1;
        let vertex_count = (row * (h + 1)) as usize;

        let mut positions = Vec::with_capacity(vertex_count);
        let mut normals = Vec::with_capacity(vertex_count);
        let mut uvs = Vec::with_capacity(vertex_count);
        let mut indices = Vec::with_capacity(6 * w as usize * h as usize);

        let seg_width = 1.0 / w as f32;
        let seg_height = 1.0 / h as f32;

        for i in 0..=h {
            let y = i as f32 * seg_height - 0.5;
            for j in 0..=w {
                let x = j as f32 * seg_width - 0.5;
                positions.push([x, -y, 0.0]);
                normals.push([0.0, 0.0, 1.0]);
                uvs.push([j as f32 / w as f32, 1.0 - i as f32 / h as f32]);
            }

            if i == h {
                break;
            }
            for j in 0..w {
                let a = j + row * i;
                let b = j + row * (i + 1);
                let c = j + 1 + row * (i + 1);
                let d = j + 1 + row * i;
                indices.extend_from_slice(&[a, b, d, b, c, d]);
            }
        }

        let centers = barycentric_centers(positions.len());

        tracing::debug!(
            width_segments = w,
            height_segments = h,
            vertices = positions.len(),
            indices = indices.len(),
            "built terrain grid"
        );

        GridMesh {
            width_segments: w,
            height_segments: h,
            positions,
            normals,
            uvs,
            centers,
            indices,
        }
    }
}

/// Immutable indexed triangle grid.
#[derive(Debug, Clone, PartialEq)]
pub struct GridMesh {
    width_segments: u32,
    height_segments: u32,
    positions: Vec<[f32; 3]>,
    normals: Vec<[f32; 3]>,
    uvs: Vec<[f32; 2]>,
    centers: Vec<[f32; 3]>,
    indices: Vec<u32>,
}

impl GridMesh {
    pub fn width_segments(&self) -> u32 {
        self.width_segments
    }

    pub fn height_segments(&self) -> u32 {
        self.height_segments
    }

    pub fn positions(&self) -> &[[f32; 3]] {
        &self.positions
    }

    pub fn normals(&self) -> &[[f32; 3]] {
        &self.normals
    }

    pub fn uvs(&self) -> &[[f32; 2]] {
        &self.uvs
    }

    /// Per-vertex barycentric basis used by the wire shading stage.
    pub fn centers(&self) -> &[[f32; 3]] {
        &self.centers
    }

    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn index_count(&self) -> usize {
        self.indices.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Triangles in emission order.
    pub fn triangles(&self) -> impl Iterator<Item = [u32; 3]> + '_ {
        self.indices.chunks_exact(3).map(|t| [t[0], t[1], t[2]])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid(w: u32, h: u32) -> GridMesh {
        GridMeshBuilder::new(w, h).unwrap().build()
    }

    #[test]
    fn zero_segments_rejected() {
        assert!(matches!(
            GridMeshBuilder::new(0, 4),
            Err(TerrainError::InvalidConfiguration { .. })
        ));
        assert!(GridMeshBuilder::new(4, 0).is_err());
    }

    #[test]
    fn oversized_grid_rejected() {
        assert!(GridMeshBuilder::new(u32::MAX, u32::MAX).is_err());
        assert!(GridMeshBuilder::new(u32::MAX, 1).is_err());
    }

    #[test]
    fn counts_match_segment_formula() {
        for w in 1..6u32 {
            for h in 1..6u32 {
                let mesh = grid(w, h);
                let verts = ((w + 1) * (h + 1)) as usize;
                assert_eq!(mesh.vertex_count(), verts);
                assert_eq!(mesh.normals().len(), verts);
                assert_eq!(mesh.uvs().len(), verts);
                assert_eq!(mesh.centers().len(), verts);
                assert_eq!(mesh.triangle_count(), (2 * w * h) as usize);
                assert_eq!(mesh.index_count(), (6 * w * h) as usize);
                assert!(mesh.indices().iter().all(|&i| (i as usize) < verts));
            }
        }
    }

    #[test]
    fn two_by_two_winding_is_literal() {
        let mesh = grid(2, 2);
        #[rustfmt::skip]
        let expected: Vec<u32> = vec![
            // row 0
            0, 3, 1,  3, 4, 1,
            1, 4, 2,  4, 5, 2,
            // row 1
            3, 6, 4,  6, 7, 4,
            4, 7, 5,  7, 8, 5,
        ];
        assert_eq!(mesh.indices(), expected.as_slice());
    }

    #[test]
    fn two_by_one_end_to_end() {
        let mesh = grid(2, 1);
        assert_eq!(mesh.vertex_count(), 6);
        assert_eq!(mesh.index_count(), 12);
        assert_eq!(mesh.triangles().next(), Some([0, 3, 1]));
    }

    #[test]
    fn positions_centered_with_negated_rows() {
        let mesh = grid(2, 2);
        let p = mesh.positions();
        assert_eq!(p[0], [-0.5, 0.5, 0.0]);
        assert_eq!(p[4], [0.0, 0.0, 0.0]);
        assert_eq!(p[8], [0.5, -0.5, 0.0]);
    }

    #[test]
    fn normals_face_positive_z() {
        let mesh = grid(3, 2);
        assert!(mesh.normals().iter().all(|n| *n == [0.0, 0.0, 1.0]));
    }

    #[test]
    fn uvs_span_unit_square() {
        let mesh = grid(4, 2);
        let uvs = mesh.uvs();
        assert_eq!(uvs[0], [0.0, 1.0]);
        assert_eq!(uvs[uvs.len() - 1], [1.0, 0.0]);
        assert!(
            uvs.iter()
                .all(|uv| (0.0..=1.0).contains(&uv[0]) && (0.0..=1.0).contains(&uv[1]))
        );
    }
}
