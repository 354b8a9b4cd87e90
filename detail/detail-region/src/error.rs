//! Error types for parameterized regions.

use detail_mesh::MeshError;
use thiserror::Error;

/// Errors that can occur when assembling a parameterized region.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum RegionError {
    /// The vertex subset does not match the cut topology.
    #[error("vertex set has {vertex_set} entries but cut topology has {cut_vertices} vertices")]
    VertexSetMismatch {
        /// Entries in the vertex set.
        vertex_set: usize,
        /// Vertices in the cut topology.
        cut_vertices: usize,
    },

    /// The face subset does not match the cut topology.
    #[error("face set has {face_set} entries but cut topology has {cut_faces} faces")]
    FaceSetMismatch {
        /// Entries in the face set.
        face_set: usize,
        /// Faces in the cut topology.
        cut_faces: usize,
    },

    /// A cut face references a local vertex outside the UV list.
    #[error("cut face {face_idx} references invalid vertex index {index} (cut has {vertex_count} vertices)")]
    FaceOutOfBounds {
        /// The offending face.
        face_idx: usize,
        /// The invalid local vertex index.
        index: u32,
        /// Vertices in the cut topology.
        vertex_count: usize,
    },

    /// The underlying mesh is missing a required channel.
    #[error(transparent)]
    Mesh(#[from] MeshError),
}

/// Result type for region operations.
pub type RegionResult<T> = Result<T, RegionError>;
