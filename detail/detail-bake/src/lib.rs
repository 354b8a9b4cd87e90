//! Raster baking over parameterized regions.
//!
//! Three builders fill a [`detail_region::ParamRegion`]'s raster stacks:
//!
//! - [`bake_feature_map`] - rasterizes per-vertex feature vectors into one
//!   channel per component; un-parameterized cells are `0.0`
//! - [`bake_detail_map`] - samples externally supplied detail images
//!   (reflectance channels) through a camera [`Projector`]; occluded or
//!   uncovered cells carry the `NO_DATA` sentinel
//! - [`bake_displacement_map`] - recovers signed surface offset by probing
//!   a high-detail auxiliary mesh with short segments along interpolated
//!   normals
//!
//! Raster loops run row-parallel. Each row is computed independently and
//! written whole, so output is bit-identical to a sequential fill no matter
//! the thread count.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

mod detail;
mod displacement;
mod error;
mod feature;

pub use detail::{bake_detail_map, Projector};
pub use displacement::bake_displacement_map;
pub use error::{BakeError, BakeResult};
pub use feature::bake_feature_map;
