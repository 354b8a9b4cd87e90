//! Parameterized region with UV face search and raster state.

use crate::{CutTopology, RegionError, RegionResult};
use detail_mesh::SurfaceMesh;
use detail_query::{barycentric, bary_inside, snap_bary, BARY_SNAP_TOLERANCE};
use detail_raster::RasterStack;
use kiddo::{KdTree, SquaredEuclidean};
use nalgebra::Point2;

/// Result of a successful UV-domain face query.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UvFaceHit {
    /// Index of the containing face in the cut topology.
    pub face: usize,
    /// Barycentric coordinates of the query point, snapped at edges.
    pub bary: [f64; 3],
    /// The face's three local vertex indices.
    pub verts: [u32; 3],
}

/// One UV-parameterized cut of a mesh, with its raster state.
///
/// `vertex_set[i]` is the full-mesh vertex behind local vertex `i`;
/// `face_set[f]` likewise for faces. The feature and detail stacks start
/// empty and are filled by the bake crate; `filled` / `fill_ratio` track
/// detail-map coverage.
#[derive(Debug)]
pub struct ParamRegion {
    /// Full-mesh vertex index behind each local vertex.
    pub vertex_set: Vec<u32>,
    /// Full-mesh face index behind each local face.
    pub face_set: Vec<u32>,
    /// The local parameterization.
    pub cut: CutTopology,
    /// One raster per feature dimension.
    pub feature_map: RasterStack,
    /// One raster per detail channel.
    pub detail_map: RasterStack,
    /// Whether the detail map covers every raster cell.
    pub filled: bool,
    /// Fraction of raster cells with a detail measurement, in `[0, 1]`.
    pub fill_ratio: f64,
    uv_index: KdTree<f64, 2>,
}

impl ParamRegion {
    /// Assemble a region from its subsets and cut topology.
    ///
    /// # Errors
    ///
    /// Returns [`RegionError::VertexSetMismatch`] or
    /// [`RegionError::FaceSetMismatch`] if the subsets do not line up with
    /// the cut topology.
    pub fn new(vertex_set: Vec<u32>, face_set: Vec<u32>, cut: CutTopology) -> RegionResult<Self> {
        if vertex_set.len() != cut.vertex_count() {
            return Err(RegionError::VertexSetMismatch {
                vertex_set: vertex_set.len(),
                cut_vertices: cut.vertex_count(),
            });
        }
        if face_set.len() != cut.face_count() {
            return Err(RegionError::FaceSetMismatch {
                face_set: face_set.len(),
                cut_faces: cut.face_count(),
            });
        }

        let mut uv_index: KdTree<f64, 2> = KdTree::new();
        for (i, uv) in cut.uvs().iter().enumerate() {
            uv_index.add(&[uv.x, uv.y], i as u64);
        }

        Ok(Self {
            vertex_set,
            face_set,
            cut,
            feature_map: RasterStack::new(),
            detail_map: RasterStack::new(),
            filled: false,
            fill_ratio: 0.0,
            uv_index,
        })
    }

    /// Build a region covering a whole mesh from its existing UVs.
    ///
    /// Vertex and face subsets are the identity; the cut topology reuses
    /// the mesh's faces and per-vertex UV channel. Used by cross-model
    /// transfer, where each model is parameterized as a single region.
    ///
    /// # Errors
    ///
    /// Returns an error if the mesh's UV channel is missing or the mesh
    /// topology is inconsistent.
    pub fn from_full_mesh(mesh: &SurfaceMesh) -> RegionResult<Self> {
        mesh.channels.validate_uv(mesh.vertex_count())?;

        let uv: Vec<Point2<f64>> = mesh
            .channels
            .uv
            .iter()
            .map(|&[u, v]| Point2::new(f64::from(u), f64::from(v)))
            .collect();
        let cut = CutTopology::new(uv, mesh.faces.clone())?;

        #[allow(clippy::cast_possible_truncation)]
        let vertex_set: Vec<u32> = (0..mesh.vertex_count() as u32).collect();
        #[allow(clippy::cast_possible_truncation)]
        let face_set: Vec<u32> = (0..mesh.face_count() as u32).collect();
        Self::new(vertex_set, face_set, cut)
    }

    /// Find the cut triangle containing a UV point.
    ///
    /// Deterministic: candidate faces are tested in ascending face order —
    /// first the faces incident to the nearest indexed UV vertex, then all
    /// remaining faces — and the first containing triangle wins, so
    /// queries on a shared edge always resolve to the same face.
    /// Degenerate triangles never match. Returns `None` when the point
    /// falls in a cut-away gap.
    #[must_use]
    pub fn find_closest_uv_face(&self, uv: Point2<f64>) -> Option<UvFaceHit> {
        if self.cut.vertex_count() == 0 {
            return None;
        }

        let nearest = self.uv_index.nearest_one::<SquaredEuclidean>(&[uv.x, uv.y]);
        #[allow(clippy::cast_possible_truncation)]
        let seed = nearest.item as usize;
        for &face in self.cut.incident_faces(seed) {
            if let Some(hit) = self.test_face(face as usize, uv) {
                return Some(hit);
            }
        }

        // The seed vertex may not touch the containing triangle at all
        // (large faces, sparse vertices); fall back to a full scan.
        (0..self.cut.face_count()).find_map(|face| self.test_face(face, uv))
    }

    fn test_face(&self, face: usize, uv: Point2<f64>) -> Option<UvFaceHit> {
        if self.cut.is_degenerate(face) {
            return None;
        }
        let [a, b, c] = self.cut.face_uvs(face);
        let bary = snap_bary(barycentric(uv, a, b, c)?, BARY_SNAP_TOLERANCE);
        if bary_inside(bary) {
            Some(UvFaceHit {
                face,
                bary,
                verts: self.cut.face(face),
            })
        } else {
            None
        }
    }

    /// Record detail-map coverage after a bake pass.
    ///
    /// `filled` is true exactly when every cell was measured.
    pub fn set_fill(&mut self, filled_cells: usize, total_cells: usize) {
        if filled_cells == total_cells {
            self.filled = true;
            self.fill_ratio = 1.0;
        } else {
            self.filled = false;
            #[allow(clippy::cast_precision_loss)]
            {
                self.fill_ratio = filled_cells as f64 / total_cells as f64;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    /// Unit square split along the diagonal into two triangles.
    fn unit_square_region() -> ParamRegion {
        let cut = CutTopology::new(
            vec![
                Point2::new(0.0, 0.0),
                Point2::new(1.0, 0.0),
                Point2::new(1.0, 1.0),
                Point2::new(0.0, 1.0),
            ],
            vec![[0, 1, 2], [0, 2, 3]],
        )
        .unwrap();
        ParamRegion::new(vec![10, 11, 12, 13], vec![5, 6], cut).unwrap()
    }

    #[test]
    fn test_vertex_set_mismatch() {
        let cut = CutTopology::new(
            vec![Point2::new(0.0, 0.0), Point2::new(1.0, 0.0), Point2::new(0.0, 1.0)],
            vec![[0, 1, 2]],
        )
        .unwrap();
        let err = ParamRegion::new(vec![0, 1], vec![0], cut).unwrap_err();
        assert!(matches!(
            err,
            RegionError::VertexSetMismatch {
                vertex_set: 2,
                cut_vertices: 3,
            }
        ));
    }

    #[test]
    fn test_hit_lower_triangle() {
        let region = unit_square_region();
        let hit = region.find_closest_uv_face(Point2::new(0.6, 0.2)).unwrap();
        assert_eq!(hit.face, 0);
        assert_eq!(hit.verts, [0, 1, 2]);
        let sum: f64 = hit.bary.iter().sum();
        assert_relative_eq!(sum, 1.0, epsilon = 1e-12);
        assert!(hit.bary.iter().all(|&l| l >= 0.0));
    }

    #[test]
    fn test_hit_upper_triangle() {
        let region = unit_square_region();
        let hit = region.find_closest_uv_face(Point2::new(0.2, 0.6)).unwrap();
        assert_eq!(hit.face, 1);
    }

    #[test]
    fn test_shared_edge_is_deterministic() {
        let region = unit_square_region();
        // Points exactly on the diagonal belong to the first face found,
        // and repeated queries agree.
        let first = region.find_closest_uv_face(Point2::new(0.5, 0.5)).unwrap();
        for _ in 0..10 {
            let again = region.find_closest_uv_face(Point2::new(0.5, 0.5)).unwrap();
            assert_eq!(again.face, first.face);
        }
        assert_eq!(first.face, 0);
    }

    #[test]
    fn test_miss_outside_parameterization() {
        let cut = CutTopology::new(
            vec![
                Point2::new(0.0, 0.0),
                Point2::new(0.4, 0.0),
                Point2::new(0.0, 0.4),
            ],
            vec![[0, 1, 2]],
        )
        .unwrap();
        let region = ParamRegion::new(vec![0, 1, 2], vec![0], cut).unwrap();
        assert!(region.find_closest_uv_face(Point2::new(0.9, 0.9)).is_none());
    }

    #[test]
    fn test_degenerate_face_never_matches() {
        let cut = CutTopology::new(
            vec![
                Point2::new(0.0, 0.0),
                Point2::new(1.0, 0.0),
                Point2::new(0.5, 0.0),
            ],
            vec![[0, 1, 2]],
        )
        .unwrap();
        let region = ParamRegion::new(vec![0, 1, 2], vec![0], cut).unwrap();
        assert!(region.find_closest_uv_face(Point2::new(0.5, 0.0)).is_none());
    }

    #[test]
    fn test_set_fill() {
        let mut region = unit_square_region();
        region.set_fill(3, 4);
        assert!(!region.filled);
        assert_relative_eq!(region.fill_ratio, 0.75);
        region.set_fill(4, 4);
        assert!(region.filled);
        assert_relative_eq!(region.fill_ratio, 1.0);
    }

    #[test]
    fn test_from_full_mesh() {
        use detail_mesh::{SurfaceMesh, SurfaceVertex};

        let mut mesh = SurfaceMesh::new();
        mesh.vertices.push(SurfaceVertex::from_coords(0.0, 0.0, 0.0));
        mesh.vertices.push(SurfaceVertex::from_coords(1.0, 0.0, 0.0));
        mesh.vertices.push(SurfaceVertex::from_coords(0.0, 1.0, 0.0));
        mesh.faces.push([0, 1, 2]);
        mesh.channels.uv = vec![[0.0, 0.0], [1.0, 0.0], [0.0, 1.0]];

        let region = ParamRegion::from_full_mesh(&mesh).unwrap();
        assert_eq!(region.vertex_set, vec![0, 1, 2]);
        assert_eq!(region.face_set, vec![0]);
        assert!(region.find_closest_uv_face(Point2::new(0.2, 0.2)).is_some());
    }

    #[test]
    fn test_from_full_mesh_requires_uv() {
        use detail_mesh::{SurfaceMesh, SurfaceVertex};

        let mut mesh = SurfaceMesh::new();
        mesh.vertices.push(SurfaceVertex::from_coords(0.0, 0.0, 0.0));
        assert!(matches!(
            ParamRegion::from_full_mesh(&mesh),
            Err(RegionError::Mesh(_))
        ));
    }
}
