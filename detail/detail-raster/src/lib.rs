//! Raster storage for UV-parameterized surface attributes.
//!
//! This crate provides the fixed-resolution grids the bake and synthesis
//! crates read and write:
//!
//! - [`RasterMap`] - A square single-channel grid over the UV unit square
//! - [`RasterStack`] - A stack of equally-sized [`RasterMap`]s (one per
//!   feature dimension or detail channel)
//! - [`ImageBuffer`] - A non-square single-channel source image
//!   (reflectance / displacement input)
//!
//! # Sentinel convention
//!
//! Two map kinds use two different "no data" markers, and the distinction
//! is deliberate:
//!
//! - **Feature maps** write `0.0` to cells outside the parameterization.
//!   Features are non-negative descriptors, so zero is a plain background.
//! - **Detail and displacement maps** write [`RasterMap::NO_DATA`]
//!   (`-1.0`) for cells with no measurement (outside the parameterization
//!   or occluded). In those maps `0.0` always means a *measured* zero,
//!   e.g. a displacement probe that intersected nothing.
//!
//! # Orientation
//!
//! UV space has `y` growing upward; raster rows grow downward with row 0
//! at the top. Writing UV cell `(x, y)` stores to row `R - y - 1`,
//! column `x`. The [`RasterMap::cell`] / [`RasterMap::set_cell`] accessors
//! take bottom-up UV cell coordinates and hide the flip.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

mod error;
mod image;
mod raster;
mod stack;

pub use error::{RasterError, RasterResult};
pub use image::ImageBuffer;
pub use raster::{uv_to_cell, RasterMap};
pub use stack::RasterStack;
