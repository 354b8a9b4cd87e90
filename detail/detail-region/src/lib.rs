//! Parameterized mesh regions.
//!
//! A [`ParamRegion`] represents one UV-parameterized cut of a larger mesh:
//! the "seen" part, the "unseen" part, or one of N disjoint patches. It
//! carries the cut's local topology ([`CutTopology`]), the vertex/face
//! subsets mapping back to the full mesh, a k-d tree over the cut's UV
//! coordinates, and the feature/detail raster stacks the bake crates fill
//! in.
//!
//! The central query is [`ParamRegion::find_closest_uv_face`]: given a
//! point in the UV unit square, find the cut triangle containing it and
//! its barycentric coordinates. Every raster builder funnels through it.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

mod cut;
mod error;
mod region;

pub use cut::CutTopology;
pub use error::{RegionError, RegionResult};
pub use region::{ParamRegion, UvFaceHit};
