//! Vertex type for surface meshes.

use nalgebra::{Point3, Vector3};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A mesh vertex with position and normal.
///
/// Unlike generic mesh containers, the detail pipeline requires a normal
/// on every vertex: displacement is measured and re-applied along it.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SurfaceVertex {
    /// Position in model space.
    pub position: Point3<f64>,
    /// Unit normal. Interpolated normals are re-normalized before use.
    pub normal: Vector3<f64>,
}

impl SurfaceVertex {
    /// Create a vertex from a position and normal.
    ///
    /// # Example
    ///
    /// ```
    /// use detail_mesh::SurfaceVertex;
    /// use nalgebra::{Point3, Vector3};
    ///
    /// let v = SurfaceVertex::new(Point3::origin(), Vector3::z());
    /// assert_eq!(v.normal, Vector3::z());
    /// ```
    #[inline]
    #[must_use]
    pub const fn new(position: Point3<f64>, normal: Vector3<f64>) -> Self {
        Self { position, normal }
    }

    /// Create a vertex at the given coordinates with a +Z normal.
    ///
    /// Intended for flat fixtures; real meshes carry their own normals.
    #[inline]
    #[must_use]
    pub fn from_coords(x: f64, y: f64, z: f64) -> Self {
        Self {
            position: Point3::new(x, y, z),
            normal: Vector3::z(),
        }
    }
}
