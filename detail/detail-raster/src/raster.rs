//! Square raster map over the UV unit square.

use crate::{RasterError, RasterResult};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Map a UV coordinate in `[0, 1]` to a raster cell index.
///
/// Values at exactly `1.0` land on the last cell rather than one past it;
/// out-of-range values clamp to the grid.
///
/// # Example
///
/// ```
/// use detail_raster::uv_to_cell;
///
/// assert_eq!(uv_to_cell(0.0, 512), 0);
/// assert_eq!(uv_to_cell(0.5, 512), 256);
/// assert_eq!(uv_to_cell(1.0, 512), 511);
/// assert_eq!(uv_to_cell(-0.2, 512), 0);
/// ```
#[must_use]
#[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation, clippy::cast_sign_loss)]
#[allow(clippy::cast_possible_wrap)]
pub fn uv_to_cell(u: f64, resolution: usize) -> usize {
    let cell = (u * resolution as f64).floor() as i64;
    cell.clamp(0, resolution as i64 - 1) as usize
}

/// A fixed-resolution single-channel `f32` grid over the UV unit square.
///
/// Storage is row-major with row 0 at the *top* of UV space; see the crate
/// docs for the orientation and sentinel conventions.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RasterMap {
    resolution: usize,
    data: Vec<f32>,
}

impl RasterMap {
    /// Sentinel marking "no measurement" in detail and displacement maps.
    ///
    /// Feature maps do not use this; their background is `0.0`.
    pub const NO_DATA: f32 = -1.0;

    /// Default raster resolution.
    pub const DEFAULT_RESOLUTION: usize = 512;

    /// Create a raster filled with zeros.
    #[must_use]
    pub fn new(resolution: usize) -> Self {
        Self::filled(resolution, 0.0)
    }

    /// Create a raster filled with a constant value.
    #[must_use]
    pub fn filled(resolution: usize, value: f32) -> Self {
        Self {
            resolution,
            data: vec![value; resolution * resolution],
        }
    }

    /// Wrap an existing row-major buffer (row 0 = top).
    ///
    /// # Errors
    ///
    /// Returns [`RasterError::SizeMismatch`] if the buffer does not hold
    /// `resolution * resolution` values.
    pub fn from_raw(resolution: usize, data: Vec<f32>) -> RasterResult<Self> {
        let expected = resolution * resolution;
        if data.len() != expected {
            return Err(RasterError::SizeMismatch {
                expected,
                actual: data.len(),
            });
        }
        Ok(Self { resolution, data })
    }

    /// Grid resolution (cells per side).
    #[must_use]
    pub fn resolution(&self) -> usize {
        self.resolution
    }

    /// Value at a top-origin `(row, col)` position.
    ///
    /// Returns `None` when out of bounds.
    #[must_use]
    pub fn get(&self, row: usize, col: usize) -> Option<f32> {
        if row < self.resolution && col < self.resolution {
            Some(self.data[row * self.resolution + col])
        } else {
            None
        }
    }

    /// Value at a bottom-up UV cell `(x, y)`.
    ///
    /// # Panics
    ///
    /// Panics if `x` or `y` is outside the grid.
    #[must_use]
    pub fn cell(&self, x: usize, y: usize) -> f32 {
        assert!(x < self.resolution && y < self.resolution);
        self.data[(self.resolution - y - 1) * self.resolution + x]
    }

    /// Write a bottom-up UV cell `(x, y)`.
    ///
    /// # Panics
    ///
    /// Panics if `x` or `y` is outside the grid.
    pub fn set_cell(&mut self, x: usize, y: usize, value: f32) {
        assert!(x < self.resolution && y < self.resolution);
        self.data[(self.resolution - y - 1) * self.resolution + x] = value;
    }

    /// Sample at a UV coordinate, clamped to the grid.
    ///
    /// # Example
    ///
    /// ```
    /// use detail_raster::RasterMap;
    ///
    /// let mut map = RasterMap::new(4);
    /// map.set_cell(3, 3, 7.0);
    /// // Exactly 1.0 maps to the last cell, not past it.
    /// assert_eq!(map.sample_uv(1.0, 1.0), 7.0);
    /// ```
    #[must_use]
    pub fn sample_uv(&self, u: f64, v: f64) -> f32 {
        let x = uv_to_cell(u, self.resolution);
        let y = uv_to_cell(v, self.resolution);
        self.cell(x, y)
    }

    /// Minimum and maximum over all cells, or `None` for an empty raster.
    #[must_use]
    pub fn min_max(&self) -> Option<(f32, f32)> {
        let mut iter = self.data.iter().copied();
        let first = iter.next()?;
        let mut min = first;
        let mut max = first;
        for v in iter {
            min = min.min(v);
            max = max.max(v);
        }
        Some((min, max))
    }

    /// Replace a whole top-origin row.
    ///
    /// # Panics
    ///
    /// Panics if `row` is out of bounds or `values` is not one row long.
    pub fn set_row(&mut self, row: usize, values: &[f32]) {
        assert!(row < self.resolution);
        assert_eq!(values.len(), self.resolution);
        let start = row * self.resolution;
        self.data[start..start + self.resolution].copy_from_slice(values);
    }

    /// Raw row-major cell values (row 0 = top).
    #[must_use]
    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }

    /// Scale every cell by `1 / divisor`.
    pub fn scale_by(&mut self, divisor: f32) {
        for v in &mut self.data {
            *v /= divisor;
        }
    }
}
