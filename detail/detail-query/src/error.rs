//! Error types for geometric queries.

use thiserror::Error;

/// Errors that can occur when building query structures.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum QueryError {
    /// The candidate mesh has no faces to intersect against.
    #[error("candidate mesh has no faces")]
    EmptyMesh,
}

/// Result type for geometric queries.
pub type QueryResult<T> = Result<T, QueryError>;
