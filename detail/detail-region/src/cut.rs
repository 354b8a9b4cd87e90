//! Local topology of a cut region.

use crate::{RegionError, RegionResult};
use nalgebra::Point2;

/// Doubled signed area below which a UV triangle is treated as degenerate.
const DEGENERATE_AREA: f64 = 1e-12;

/// The independently indexed small mesh covering one cut region.
///
/// Holds one UV coordinate per local vertex and faces of local indices.
/// UV coordinates are nominally in `[0, 1]²` but may exceed it slightly
/// due to cutting artifacts. Degenerate (zero-area) UV triangles are
/// flagged at construction and excluded from all queries, so NaN
/// barycentric results never reach the rasters.
#[derive(Debug, Clone)]
pub struct CutTopology {
    uv: Vec<Point2<f64>>,
    faces: Vec<[u32; 3]>,
    /// Faces incident to each local vertex, in ascending face order.
    vertex_faces: Vec<Vec<u32>>,
    degenerate: Vec<bool>,
}

impl CutTopology {
    /// Build a cut topology from local UV coordinates and faces.
    ///
    /// # Errors
    ///
    /// Returns [`RegionError::FaceOutOfBounds`] if a face references a
    /// vertex outside the UV list.
    pub fn new(uv: Vec<Point2<f64>>, faces: Vec<[u32; 3]>) -> RegionResult<Self> {
        let vertex_count = uv.len();
        for (face_idx, face) in faces.iter().enumerate() {
            for &index in face {
                if index as usize >= vertex_count {
                    return Err(RegionError::FaceOutOfBounds {
                        face_idx,
                        index,
                        vertex_count,
                    });
                }
            }
        }

        let mut vertex_faces = vec![Vec::new(); vertex_count];
        let mut degenerate = Vec::with_capacity(faces.len());
        for (face_idx, face) in faces.iter().enumerate() {
            #[allow(clippy::cast_possible_truncation)]
            let face_idx_u32 = face_idx as u32;
            for &index in face {
                vertex_faces[index as usize].push(face_idx_u32);
            }

            let [a, b, c] = [
                uv[face[0] as usize],
                uv[face[1] as usize],
                uv[face[2] as usize],
            ];
            let area2 = (b.x - a.x) * (c.y - a.y) - (c.x - a.x) * (b.y - a.y);
            degenerate.push(area2.abs() < DEGENERATE_AREA);
        }

        Ok(Self {
            uv,
            faces,
            vertex_faces,
            degenerate,
        })
    }

    /// Number of local vertices.
    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.uv.len()
    }

    /// Number of faces.
    #[must_use]
    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    /// UV coordinate of a local vertex.
    #[must_use]
    pub fn uv(&self, vertex: usize) -> Point2<f64> {
        self.uv[vertex]
    }

    /// All UV coordinates.
    #[must_use]
    pub fn uvs(&self) -> &[Point2<f64>] {
        &self.uv
    }

    /// Local vertex indices of a face.
    #[must_use]
    pub fn face(&self, face_idx: usize) -> [u32; 3] {
        self.faces[face_idx]
    }

    /// UV coordinates of a face's three corners.
    #[must_use]
    pub fn face_uvs(&self, face_idx: usize) -> [Point2<f64>; 3] {
        let [a, b, c] = self.faces[face_idx];
        [
            self.uv[a as usize],
            self.uv[b as usize],
            self.uv[c as usize],
        ]
    }

    /// Faces incident to a local vertex, ascending.
    #[must_use]
    pub fn incident_faces(&self, vertex: usize) -> &[u32] {
        &self.vertex_faces[vertex]
    }

    /// Whether a face has (near) zero UV area.
    #[must_use]
    pub fn is_degenerate(&self, face_idx: usize) -> bool {
        self.degenerate[face_idx]
    }
}
