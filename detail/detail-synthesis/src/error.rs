//! Error types for the synthesis layer.

use detail_bake::BakeError;
use detail_mesh::MeshError;
use detail_query::QueryError;
use detail_raster::RasterError;
use detail_region::RegionError;
use thiserror::Error;

/// Errors raised by patch resolution, orchestration and transfer.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SynthesisError {
    /// The correspondence oracle found no filled patch to draw from.
    #[error("no corresponding filled patch for patch {patch}")]
    NoCorrespondence {
        /// The unfilled patch.
        patch: usize,
    },

    /// The oracle named a patch that is out of range or not filled.
    #[error("oracle returned invalid candidate {candidate} for patch {patch}")]
    InvalidCandidate {
        /// The unfilled patch.
        patch: usize,
        /// The candidate the oracle returned.
        candidate: usize,
    },

    /// A target face belongs to no patch during merge.
    #[error("mesh face {face} belongs to no patch")]
    UnownedFace {
        /// The orphaned full-mesh face index.
        face: u32,
    },

    /// Detail stacks disagree on channel count.
    #[error("detail stack has {actual} channels, expected {expected}")]
    ChannelMismatch {
        /// Channels expected.
        expected: usize,
        /// Channels found.
        actual: usize,
    },

    /// A required raster input is absent or empty.
    #[error("missing required input: {what}")]
    MissingInput {
        /// Name of the absent input.
        what: &'static str,
    },

    /// The vertex set does not match the cut topology.
    #[error("vertex set has {vertex_set} entries but cut topology has {cut_vertices} vertices")]
    SetLengthMismatch {
        /// Entries in the vertex set.
        vertex_set: usize,
        /// Vertices in the cut topology.
        cut_vertices: usize,
    },

    /// A region references a vertex outside the mesh.
    #[error("vertex index {vertex} is out of range for a mesh of {vertex_count} vertices")]
    VertexOutOfRange {
        /// The out-of-range full-mesh vertex index.
        vertex: u32,
        /// Vertices in the mesh.
        vertex_count: usize,
    },

    /// A mesh-level failure.
    #[error(transparent)]
    Mesh(#[from] MeshError),

    /// A raster-level failure.
    #[error(transparent)]
    Raster(#[from] RasterError),

    /// A geometric query failure.
    #[error(transparent)]
    Query(#[from] QueryError),

    /// A region construction failure.
    #[error(transparent)]
    Region(#[from] RegionError),

    /// A bake precondition failure.
    #[error(transparent)]
    Bake(#[from] BakeError),
}

/// Result type for synthesis operations.
pub type SynthesisResult<T> = Result<T, SynthesisError>;
