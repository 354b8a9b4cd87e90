//! Planar barycentric coordinates.

use nalgebra::Point2;

/// Components within this distance of zero snap to exactly zero, so that
/// queries landing on a shared triangle edge resolve the same way from
/// both sides.
pub const BARY_SNAP_TOLERANCE: f64 = 1e-4;

/// Triangles with a doubled signed area below this are degenerate and
/// answer no queries.
const DEGENERATE_AREA: f64 = 1e-12;

/// Barycentric coordinates of `p` with respect to triangle `(a, b, c)`.
///
/// Returns `[la, lb, lc]` with `la + lb + lc == 1`, or `None` for a
/// degenerate (zero-area) triangle. Coordinates are signed; a point
/// outside the triangle yields negative components.
///
/// # Example
///
/// ```
/// use detail_query::barycentric;
/// use nalgebra::Point2;
///
/// let bary = barycentric(
///     Point2::new(0.25, 0.25),
///     Point2::new(0.0, 0.0),
///     Point2::new(1.0, 0.0),
///     Point2::new(0.0, 1.0),
/// )
/// .unwrap();
/// assert!((bary[0] - 0.5).abs() < 1e-12);
/// assert!((bary[1] - 0.25).abs() < 1e-12);
/// assert!((bary[2] - 0.25).abs() < 1e-12);
/// ```
#[must_use]
pub fn barycentric(
    p: Point2<f64>,
    a: Point2<f64>,
    b: Point2<f64>,
    c: Point2<f64>,
) -> Option<[f64; 3]> {
    let v0 = b - a;
    let v1 = c - a;
    let v2 = p - a;

    let denom = v0.x * v1.y - v1.x * v0.y;
    if denom.abs() < DEGENERATE_AREA {
        return None;
    }

    let lb = (v2.x * v1.y - v1.x * v2.y) / denom;
    let lc = (v0.x * v2.y - v2.x * v0.y) / denom;
    Some([1.0 - lb - lc, lb, lc])
}

/// Snap near-zero components to exactly zero.
///
/// Without the snap, a query point on a shared edge can report a tiny
/// negative component in one triangle and a tiny positive one in its
/// neighbor, making containment flicker between adjacent pixels.
#[must_use]
pub fn snap_bary(mut bary: [f64; 3], tolerance: f64) -> [f64; 3] {
    for l in &mut bary {
        if l.abs() < tolerance {
            *l = 0.0;
        }
    }
    bary
}

/// Whether (snapped) barycentric coordinates describe a point inside the
/// triangle or on its boundary.
#[must_use]
pub fn bary_inside(bary: [f64; 3]) -> bool {
    bary[0] >= 0.0 && bary[1] >= 0.0 && bary[2] >= 0.0
}
