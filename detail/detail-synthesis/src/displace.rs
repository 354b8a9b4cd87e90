//! Applying a displacement raster back onto mesh vertices.

use crate::{SynthesisError, SynthesisResult};
use detail_mesh::SurfaceMesh;
use detail_raster::{uv_to_cell, RasterMap};
use detail_region::CutTopology;
use hashbrown::HashSet;
use tracing::debug;

/// Move each region vertex along its normal by the raster's displacement.
///
/// For every local vertex the cut UV is mapped to a raster cell (clamped
/// to the grid, with exactly-1.0 coordinates landing on the last cell)
/// and the scalar there is applied as
/// `position += normal * displacement`. Cells carrying
/// [`RasterMap::NO_DATA`] hold no measurement and leave the vertex
/// untouched. Returns the number of vertices updated.
///
/// # Errors
///
/// Returns [`SynthesisError::SetLengthMismatch`] when `vertex_set` and
/// `cut` disagree, or [`SynthesisError::VertexOutOfRange`] when the set
/// references a vertex outside the mesh.
pub fn apply_displacement_map(
    mesh: &mut SurfaceMesh,
    vertex_set: &[u32],
    cut: &CutTopology,
    raster: &RasterMap,
) -> SynthesisResult<usize> {
    apply_displacement_excluding(mesh, vertex_set, cut, raster, &HashSet::new())
}

/// [`apply_displacement_map`] skipping vertices in `exclude`.
///
/// The unseen part of a seen/unseen split shares seam vertices with the
/// seen part; passing the seen vertex set here ensures each shared vertex
/// moves exactly once.
///
/// # Errors
///
/// Same as [`apply_displacement_map`].
pub fn apply_displacement_excluding(
    mesh: &mut SurfaceMesh,
    vertex_set: &[u32],
    cut: &CutTopology,
    raster: &RasterMap,
    exclude: &HashSet<u32>,
) -> SynthesisResult<usize> {
    if vertex_set.len() != cut.vertex_count() {
        return Err(SynthesisError::SetLengthMismatch {
            vertex_set: vertex_set.len(),
            cut_vertices: cut.vertex_count(),
        });
    }
    for &vertex in vertex_set {
        if vertex as usize >= mesh.vertex_count() {
            return Err(SynthesisError::VertexOutOfRange {
                vertex,
                vertex_count: mesh.vertex_count(),
            });
        }
    }

    let resolution = raster.resolution();
    let mut moved = 0usize;
    for (local, &vertex) in vertex_set.iter().enumerate() {
        if exclude.contains(&vertex) {
            continue;
        }
        let uv = cut.uv(local);
        let x = uv_to_cell(uv.x, resolution);
        let y = uv_to_cell(uv.y, resolution);
        let displacement = raster.cell(x, y);
        if displacement == RasterMap::NO_DATA {
            continue;
        }

        let v = &mut mesh.vertices[vertex as usize];
        v.position += v.normal * f64::from(displacement);
        moved += 1;
    }

    debug!(moved, total = vertex_set.len(), "displacement applied");
    Ok(moved)
}

#[cfg(test)]
mod tests {
    use super::*;
    use detail_mesh::SurfaceVertex;
    use nalgebra::{Point2, Point3};

    fn make_test_setup() -> (SurfaceMesh, Vec<u32>, CutTopology) {
        let mut mesh = SurfaceMesh::new();
        mesh.vertices.push(SurfaceVertex::from_coords(0.0, 0.0, 0.0));
        mesh.vertices.push(SurfaceVertex::from_coords(1.0, 0.0, 0.0));
        mesh.vertices.push(SurfaceVertex::from_coords(1.0, 1.0, 0.0));
        mesh.vertices.push(SurfaceVertex::from_coords(0.0, 1.0, 0.0));
        mesh.faces.push([0, 1, 2]);
        mesh.faces.push([0, 2, 3]);

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
        (mesh, vec![0, 1, 2, 3], cut)
    }

    #[test]
    fn test_zero_raster_round_trip() {
        let (mut mesh, vertex_set, cut) = make_test_setup();
        let before: Vec<Point3<f64>> = mesh.vertices.iter().map(|v| v.position).collect();

        let moved =
            apply_displacement_map(&mut mesh, &vertex_set, &cut, &RasterMap::new(4)).unwrap();
        assert_eq!(moved, 4);
        for (vertex, original) in mesh.vertices.iter().zip(&before) {
            assert_eq!(vertex.position, *original);
        }
    }

    #[test]
    fn test_moves_along_normal() {
        let (mut mesh, vertex_set, cut) = make_test_setup();
        let raster = RasterMap::filled(4, 0.25);
        apply_displacement_map(&mut mesh, &vertex_set, &cut, &raster).unwrap();
        for vertex in &mesh.vertices {
            // Normals are +z; positions rise by the raster value.
            assert!((vertex.position.z - 0.25).abs() < 1e-6);
        }
    }

    #[test]
    fn test_no_data_cells_skip() {
        let (mut mesh, vertex_set, cut) = make_test_setup();
        let mut raster = RasterMap::filled(4, 0.25);
        // The UV-(0,0) vertex reads cell (0,0); mark it unmeasured.
        raster.set_cell(0, 0, RasterMap::NO_DATA);
        let moved = apply_displacement_map(&mut mesh, &vertex_set, &cut, &raster).unwrap();
        assert_eq!(moved, 3);
        assert_eq!(mesh.vertices[0].position.z, 0.0);
        assert!((mesh.vertices[1].position.z - 0.25).abs() < 1e-6);
    }

    #[test]
    fn test_uv_one_reads_last_cell() {
        let (mut mesh, vertex_set, cut) = make_test_setup();
        let mut raster = RasterMap::filled(4, RasterMap::NO_DATA);
        // Only the top-right cell carries data; the UV-(1,1) vertex must
        // clamp onto it rather than index out of bounds.
        raster.set_cell(3, 3, 0.5);
        let moved = apply_displacement_map(&mut mesh, &vertex_set, &cut, &raster).unwrap();
        assert_eq!(moved, 1);
        assert!((mesh.vertices[2].position.z - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_excluded_vertices_stay_put() {
        let (mut mesh, vertex_set, cut) = make_test_setup();
        let raster = RasterMap::filled(4, 0.25);
        let exclude: HashSet<u32> = [0, 2].into_iter().collect();
        let moved =
            apply_displacement_excluding(&mut mesh, &vertex_set, &cut, &raster, &exclude).unwrap();
        assert_eq!(moved, 2);
        assert_eq!(mesh.vertices[0].position.z, 0.0);
        assert!((mesh.vertices[1].position.z - 0.25).abs() < 1e-6);
        assert_eq!(mesh.vertices[2].position.z, 0.0);
    }

    #[test]
    fn test_set_length_mismatch() {
        let (mut mesh, _, cut) = make_test_setup();
        let err = apply_displacement_map(&mut mesh, &[0, 1], &cut, &RasterMap::new(4)).unwrap_err();
        assert!(matches!(
            err,
            SynthesisError::SetLengthMismatch {
                vertex_set: 2,
                cut_vertices: 4,
            }
        ));
    }

    #[test]
    fn test_vertex_out_of_range() {
        let (mut mesh, _, cut) = make_test_setup();
        let err = apply_displacement_map(&mut mesh, &[0, 1, 2, 9], &cut, &RasterMap::new(4))
            .unwrap_err();
        assert!(matches!(err, SynthesisError::VertexOutOfRange { vertex: 9, .. }));
    }
}
