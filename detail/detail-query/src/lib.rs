//! Geometric query primitives for the detail pipeline.
//!
//! This crate is the leaf of the pipeline's geometry stack. It provides:
//!
//! - [`barycentric`] / [`snap_bary`] / [`bary_inside`] - planar barycentric
//!   coordinates with the edge-tolerance snap the UV face search relies on
//! - [`SegmentTester`] - a BVH-accelerated finite-segment intersection
//!   query against a triangle mesh, used by the displacement baker to
//!   probe a high-detail auxiliary surface
//!
//! Cell-level misses are expressed as `None`/`Option` here; mapping misses
//! to raster sentinels is the caller's concern.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

mod barycentric;
mod error;
mod raycast;

pub use barycentric::{barycentric, bary_inside, snap_bary, BARY_SNAP_TOLERANCE};
pub use error::{QueryError, QueryResult};
pub use raycast::SegmentTester;
