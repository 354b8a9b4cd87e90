//! Error types for the raster bakers.

use detail_raster::RasterError;
use thiserror::Error;

/// Errors raised by precondition checks before a raster loop starts.
///
/// Per-cell misses never produce errors; they degrade to the documented
/// sentinel values.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum BakeError {
    /// The per-vertex feature list is empty.
    #[error("feature list is empty")]
    EmptyFeatureList,

    /// The first vertex's feature vector has no components.
    #[error("feature vectors have zero components")]
    EmptyFeatureVector,

    /// A vertex's feature vector disagrees with the inferred dimension.
    #[error("feature vector {index} has {actual} components, expected {expected}")]
    FeatureDimMismatch {
        /// The offending vertex index.
        index: usize,
        /// Dimension inferred from the first vertex.
        expected: usize,
        /// Dimension actually found.
        actual: usize,
    },

    /// The region references a vertex outside the supplied data.
    #[error("region references vertex {vertex} but only {available} entries were supplied")]
    VertexOutOfRange {
        /// The out-of-range full-mesh vertex index.
        vertex: u32,
        /// Entries available in the per-vertex input.
        available: usize,
    },

    /// The detail image stack is empty.
    #[error("detail image stack is empty")]
    EmptyImageStack,

    /// Detail images disagree on dimensions.
    #[error(
        "detail image {channel} is {actual_rows}x{actual_cols}, expected {expected_rows}x{expected_cols}"
    )]
    ImageDimMismatch {
        /// The offending channel index.
        channel: usize,
        /// Expected rows, from channel 0.
        expected_rows: usize,
        /// Expected columns, from channel 0.
        expected_cols: usize,
        /// Actual rows.
        actual_rows: usize,
        /// Actual columns.
        actual_cols: usize,
    },

    /// The region's cut topology has no faces.
    #[error("region has no faces to rasterize")]
    EmptyRegion,

    /// A raster-level failure (resolution mismatch when appending).
    #[error(transparent)]
    Raster(#[from] RasterError),
}

/// Result type for bake operations.
pub type BakeResult<T> = Result<T, BakeError>;
