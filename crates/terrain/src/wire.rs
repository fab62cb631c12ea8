use crate::grid::GridMesh;

/// The three basis vectors assigned round-robin to vertices.
const BASIS: [[f32; 3]; 3] = [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]];

/// Per-vertex barycentric-like attribute: vertex `i` gets `BASIS[i % 3]`.
///
/// The wire fragment stage uses screen-space derivatives of this value to
/// find triangle edges without a separate line pass.
pub fn barycentric_centers(vertex_count: usize) -> Vec<[f32; 3]> {
    (0..vertex_count).map(|i| BASIS[i % 3]).collect()
}

/// Line-list geometry for the exaggerated wireframe pass.
///
/// Segments reference vertices of the source grid by index and carry their
/// own copies of the endpoint positions for upload.
#[derive(Debug, Clone, PartialEq)]
pub struct WireGeometry {
    segments: Vec<[u32; 2]>,
    positions: Vec<[f32; 3]>,
}

impl WireGeometry {
    pub fn segment_count(&self) -> usize {
        self.segments.len()
    }

    /// Segments as pairs of source-grid vertex indices.
    pub fn segments(&self) -> &[[u32; 2]] {
        &self.segments
    }

    /// Endpoint positions, two per segment, in segment order.
    pub fn positions(&self) -> &[[f32; 3]] {
        &self.positions
    }
}

/// Derives [`WireGeometry`] from a grid's triangle list.
pub struct WireOverlayBuilder;

impl WireOverlayBuilder {
    /// One segment per triangle edge. Edges shared by two triangles are
    /// emitted once for each.
    pub fn build(mesh: &GridMesh) -> WireGeometry {
        let source = mesh.positions();
        let mut segments = Vec::with_capacity(mesh.triangle_count() * 3);
        let mut positions = Vec::with_capacity(mesh.triangle_count() * 6);

        for [p, q, r] in mesh.triangles() {
            for edge in [[p, q], [q, r], [r, p]] {
                positions.push(source[edge[0] as usize]);
                positions.push(source[edge[1] as usize]);
                segments.push(edge);
            }
        }

        tracing::debug!(segments = segments.len(), "built wire overlay");
        WireGeometry {
            segments,
            positions,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::GridMeshBuilder;

    #[test]
    fn three_segments_per_triangle() {
        for (w, h) in [(1, 1), (2, 1), (8, 10), (5, 3)] {
            let mesh = GridMeshBuilder::new(w, h).unwrap().build();
            let wire = WireOverlayBuilder::build(&mesh);
            assert_eq!(wire.segment_count(), 3 * mesh.triangle_count());
            assert_eq!(wire.positions().len(), 2 * wire.segment_count());
        }
    }

    #[test]
    fn shared_edges_are_not_deduplicated() {
        // Single cell: triangles (0,2,1) and (2,3,1) share edge 2-1.
        let mesh = GridMeshBuilder::new(1, 1).unwrap().build();
        let wire = WireOverlayBuilder::build(&mesh);
        let shared = wire
            .segments()
            .iter()
            .filter(|s| (s[0] == 2 && s[1] == 1) || (s[0] == 1 && s[1] == 2))
            .count();
        assert_eq!(shared, 2);
    }

    #[test]
    fn segments_follow_triangle_edges_in_order() {
        let mesh = GridMeshBuilder::new(2, 1).unwrap().build();
        let wire = WireOverlayBuilder::build(&mesh);
        assert_eq!(&wire.segments()[..3], &[[0, 3], [3, 1], [1, 0]]);
    }

    #[test]
    fn segment_positions_match_grid() {
        let mesh = GridMeshBuilder::new(2, 2).unwrap().build();
        let wire = WireOverlayBuilder::build(&mesh);
        for (k, seg) in wire.segments().iter().enumerate() {
            assert_eq!(wire.positions()[2 * k], mesh.positions()[seg[0] as usize]);
            assert_eq!(wire.positions()[2 * k + 1], mesh.positions()[seg[1] as usize]);
        }
    }

    #[test]
    fn centers_cycle_through_basis() {
        let centers = barycentric_centers(7);
        assert_eq!(centers[0], [1.0, 0.0, 0.0]);
        assert_eq!(centers[1], [0.0, 1.0, 0.0]);
        assert_eq!(centers[2], [0.0, 0.0, 1.0]);
        assert_eq!(centers[3], [1.0, 0.0, 0.0]);
        assert_eq!(centers[6], [1.0, 0.0, 0.0]);
    }
}
