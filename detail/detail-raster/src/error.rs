//! Error types for raster containers.

use thiserror::Error;

/// Errors that can occur when building raster containers.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum RasterError {
    /// Raw buffer length does not match the declared dimensions.
    #[error("buffer holds {actual} values, expected {expected}")]
    SizeMismatch {
        /// Expected value count.
        expected: usize,
        /// Actual value count.
        actual: usize,
    },

    /// A map pushed into a stack has a different resolution.
    #[error("raster resolution {actual} does not match stack resolution {expected}")]
    ResolutionMismatch {
        /// Resolution of the maps already in the stack.
        expected: usize,
        /// Resolution of the offending map.
        actual: usize,
    },
}

/// Result type for raster operations.
pub type RasterResult<T> = Result<T, RasterError>;
