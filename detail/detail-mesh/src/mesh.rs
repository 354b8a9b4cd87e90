//! Indexed triangle mesh with typed attribute channels.

use crate::{Aabb, MeshError, MeshResult, SurfaceVertex, VertexChannels};
use nalgebra::Point3;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// An indexed triangle mesh owned by the calling application.
///
/// The pipeline reads positions, normals and feature channels, and writes
/// positions (displacement), colors, UVs and texture tags in place. It
/// never creates or destroys the mesh it operates on.
///
/// # Example
///
/// ```
/// use detail_mesh::{SurfaceMesh, SurfaceVertex};
///
/// let mut mesh = SurfaceMesh::new();
/// mesh.vertices.push(SurfaceVertex::from_coords(0.0, 0.0, 0.0));
/// mesh.vertices.push(SurfaceVertex::from_coords(1.0, 0.0, 0.0));
/// mesh.vertices.push(SurfaceVertex::from_coords(0.0, 1.0, 0.0));
/// mesh.faces.push([0, 1, 2]);
///
/// assert_eq!(mesh.vertex_count(), 3);
/// assert_eq!(mesh.face_count(), 1);
/// ```
#[derive(Debug, Clone, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SurfaceMesh {
    /// Vertex data.
    pub vertices: Vec<SurfaceVertex>,
    /// Triangle faces as indices into the vertex array, CCW winding.
    pub faces: Vec<[u32; 3]>,
    /// Typed per-vertex attribute channels.
    pub channels: VertexChannels,
}

impl SurfaceMesh {
    /// Create an empty mesh.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of vertices.
    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Number of faces.
    #[must_use]
    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    /// Whether the mesh has no vertices.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// Check that every face index is inside the vertex buffer.
    ///
    /// # Errors
    ///
    /// Returns [`MeshError::EmptyMesh`] for a vertex-less mesh, or
    /// [`MeshError::FaceOutOfBounds`] naming the first bad face.
    pub fn validate(&self) -> MeshResult<()> {
        if self.vertices.is_empty() {
            return Err(MeshError::EmptyMesh);
        }
        let vertex_count = self.vertices.len();
        for (face_idx, face) in self.faces.iter().enumerate() {
            for &index in face {
                if index as usize >= vertex_count {
                    return Err(MeshError::FaceOutOfBounds {
                        face_idx,
                        index,
                        vertex_count,
                    });
                }
            }
        }
        Ok(())
    }

    /// Positions of a face's three corners.
    ///
    /// # Panics
    ///
    /// Panics if the face or its vertex indices are out of bounds; run
    /// [`SurfaceMesh::validate`] first on untrusted input.
    #[must_use]
    pub fn face_positions(&self, face_idx: usize) -> [Point3<f64>; 3] {
        let [a, b, c] = self.faces[face_idx];
        [
            self.vertices[a as usize].position,
            self.vertices[b as usize].position,
            self.vertices[c as usize].position,
        ]
    }

    /// Bounding box over all vertex positions.
    #[must_use]
    pub fn bounds(&self) -> Aabb {
        Aabb::from_points(self.vertices.iter().map(|v| &v.position))
    }
}

/// Build the auxiliary probe mesh by offsetting every vertex along its
/// normal.
///
/// The displacement baker recovers the offset surface's height by
/// re-intersecting this mesh; `offsets` holds one signed distance per
/// vertex.
///
/// # Errors
///
/// Returns [`MeshError::ChannelLength`] if `offsets` does not hold one
/// entry per vertex, or [`MeshError::EmptyMesh`] for an empty mesh.
pub fn displaced_copy(mesh: &SurfaceMesh, offsets: &[f64]) -> MeshResult<SurfaceMesh> {
    if mesh.is_empty() {
        return Err(MeshError::EmptyMesh);
    }
    if offsets.len() != mesh.vertex_count() {
        return Err(MeshError::ChannelLength {
            channel: "offsets",
            expected: mesh.vertex_count(),
            actual: offsets.len(),
        });
    }

    let mut out = mesh.clone();
    for (vertex, &offset) in out.vertices.iter_mut().zip(offsets) {
        vertex.position += vertex.normal * offset;
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Vector3;

    fn make_test_triangle() -> SurfaceMesh {
        let mut mesh = SurfaceMesh::new();
        mesh.vertices.push(SurfaceVertex::from_coords(0.0, 0.0, 0.0));
        mesh.vertices.push(SurfaceVertex::from_coords(1.0, 0.0, 0.0));
        mesh.vertices.push(SurfaceVertex::from_coords(0.0, 1.0, 0.0));
        mesh.faces.push([0, 1, 2]);
        mesh
    }

    #[test]
    fn test_validate_ok() {
        assert!(make_test_triangle().validate().is_ok());
    }

    #[test]
    fn test_validate_bad_face() {
        let mut mesh = make_test_triangle();
        mesh.faces.push([0, 1, 7]);
        let err = mesh.validate().unwrap_err();
        assert!(matches!(
            err,
            MeshError::FaceOutOfBounds {
                face_idx: 1,
                index: 7,
                vertex_count: 3,
            }
        ));
    }

    #[test]
    fn test_validate_empty() {
        let mesh = SurfaceMesh::new();
        assert!(matches!(mesh.validate(), Err(MeshError::EmptyMesh)));
    }

    #[test]
    fn test_displaced_copy_moves_along_normal() {
        let mesh = make_test_triangle();
        let out = displaced_copy(&mesh, &[0.5, -0.25, 0.0]).unwrap();
        assert_eq!(out.vertices[0].position, Point3::new(0.0, 0.0, 0.5));
        assert_eq!(out.vertices[1].position, Point3::new(1.0, 0.0, -0.25));
        assert_eq!(out.vertices[2].position, mesh.vertices[2].position);
        // Normals untouched
        assert_eq!(out.vertices[0].normal, Vector3::z());
    }

    #[test]
    fn test_displaced_copy_length_mismatch() {
        let mesh = make_test_triangle();
        let err = displaced_copy(&mesh, &[0.5]).unwrap_err();
        assert!(matches!(err, MeshError::ChannelLength { channel: "offsets", .. }));
    }

    #[test]
    fn test_bounds() {
        let mesh = make_test_triangle();
        let aabb = mesh.bounds();
        assert_eq!(aabb.min, Point3::new(0.0, 0.0, 0.0));
        assert_eq!(aabb.max, Point3::new(1.0, 1.0, 0.0));
    }
}
