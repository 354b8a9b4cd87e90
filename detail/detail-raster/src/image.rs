//! Non-square source image buffers.

use crate::{RasterError, RasterResult};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A single-channel `f32` image, row-major with row 0 at the top.
///
/// Detail sources (reflectance channels, displacement scans) arrive as
/// images in screen orientation; the detail baker samples them through the
/// camera projection. Unlike [`crate::RasterMap`] these are not tied to the
/// UV unit square and need not be square.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ImageBuffer {
    rows: usize,
    cols: usize,
    data: Vec<f32>,
}

impl ImageBuffer {
    /// Create a zero-filled image.
    #[must_use]
    pub fn new(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            data: vec![0.0; rows * cols],
        }
    }

    /// Wrap an existing row-major buffer.
    ///
    /// # Errors
    ///
    /// Returns [`RasterError::SizeMismatch`] if the buffer does not hold
    /// `rows * cols` values.
    pub fn from_raw(rows: usize, cols: usize, data: Vec<f32>) -> RasterResult<Self> {
        let expected = rows * cols;
        if data.len() != expected {
            return Err(RasterError::SizeMismatch {
                expected,
                actual: data.len(),
            });
        }
        Ok(Self { rows, cols, data })
    }

    /// Number of rows.
    #[must_use]
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Number of columns.
    #[must_use]
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Pixel value at `(row, col)`.
    ///
    /// # Panics
    ///
    /// Panics when out of bounds; the baker clamps projected coordinates
    /// before sampling.
    #[must_use]
    pub fn pixel(&self, row: usize, col: usize) -> f32 {
        assert!(row < self.rows && col < self.cols);
        self.data[row * self.cols + col]
    }

    /// Write a pixel value at `(row, col)`.
    ///
    /// # Panics
    ///
    /// Panics when out of bounds.
    pub fn set_pixel(&mut self, row: usize, col: usize, value: f32) {
        assert!(row < self.rows && col < self.cols);
        self.data[row * self.cols + col] = value;
    }

    /// Morphological dilation into background pixels.
    ///
    /// Every pixel equal to `background` takes the maximum non-background
    /// value within a Chebyshev window of `radius`; pixels that already
    /// carry data are left untouched. Used on reflectance channels before
    /// baking to keep black UV-seam halos out of the sampled detail.
    #[must_use]
    pub fn dilate(&self, radius: usize, background: f32) -> Self {
        let mut out = self.clone();
        #[allow(clippy::cast_possible_wrap)]
        let r = radius as isize;
        for row in 0..self.rows {
            for col in 0..self.cols {
                if self.data[row * self.cols + col] != background {
                    continue;
                }
                let mut best: Option<f32> = None;
                #[allow(clippy::cast_possible_wrap)]
                let (row_i, col_i) = (row as isize, col as isize);
                for dr in -r..=r {
                    for dc in -r..=r {
                        let (nr, nc) = (row_i + dr, col_i + dc);
                        if nr < 0 || nc < 0 {
                            continue;
                        }
                        #[allow(clippy::cast_sign_loss)]
                        let (nr, nc) = (nr as usize, nc as usize);
                        if nr >= self.rows || nc >= self.cols {
                            continue;
                        }
                        let v = self.data[nr * self.cols + nc];
                        if v != background {
                            best = Some(best.map_or(v, |b: f32| b.max(v)));
                        }
                    }
                }
                if let Some(v) = best {
                    out.data[row * self.cols + col] = v;
                }
            }
        }
        out
    }

    /// Minimum and maximum over all pixels, or `None` for an empty image.
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
}
