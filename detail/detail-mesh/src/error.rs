//! Error types for mesh operations.

use thiserror::Error;

/// Errors that can occur when validating or transforming a mesh.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum MeshError {
    /// The mesh has no vertices.
    #[error("mesh has no vertices")]
    EmptyMesh,

    /// A face references a vertex index outside the vertex buffer.
    #[error("face {face_idx} references invalid vertex index {index} (mesh has {vertex_count} vertices)")]
    FaceOutOfBounds {
        /// The offending face.
        face_idx: usize,
        /// The invalid vertex index.
        index: u32,
        /// The number of vertices in the mesh.
        vertex_count: usize,
    },

    /// A vertex channel does not cover every vertex.
    #[error("channel `{channel}` has {actual} entries, expected {expected}")]
    ChannelLength {
        /// Name of the channel.
        channel: &'static str,
        /// Expected entry count (one per vertex).
        expected: usize,
        /// Actual entry count.
        actual: usize,
    },

    /// Directional occlusion vectors differ in length between vertices.
    #[error("occlusion vector at vertex {index} has {actual} components, expected {expected}")]
    RaggedOcclusion {
        /// The offending vertex.
        index: usize,
        /// Component count of the first vertex.
        expected: usize,
        /// Component count of the offending vertex.
        actual: usize,
    },
}

/// Result type for mesh operations.
pub type MeshResult<T> = Result<T, MeshError>;
