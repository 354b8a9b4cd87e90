//! Feature-vector rasterization.

use crate::{BakeError, BakeResult};
use detail_raster::RasterStack;
use detail_region::ParamRegion;
use nalgebra::Point2;
use rayon::prelude::*;
use tracing::debug;

/// Rasterize per-vertex feature vectors into the region's feature stack.
///
/// `features` holds one vector per full-mesh vertex; the region's vertex
/// set maps cut vertices into it. Dimension is taken from the first
/// vector and every channel gets its own raster. Each cell `(x, y)` of
/// the grid samples the UV point `(x/R, y/R)`: if a cut triangle contains
/// it the channel values are interpolated barycentrically from the
/// triangle's corners, otherwise every channel stays at `0.0`.
///
/// The region's feature stack is replaced wholesale; there is no partial
/// update. Per-channel min/max is logged as a diagnostic.
///
/// # Errors
///
/// Fails fast before the raster loop when the feature list is empty, the
/// vectors disagree in dimension, the region references a vertex outside
/// `features`, or the region has no faces.
pub fn bake_feature_map(
    region: &mut ParamRegion,
    features: &[Vec<f32>],
    resolution: usize,
) -> BakeResult<()> {
    let dim = check_features(region, features)?;
    if region.cut.face_count() == 0 {
        return Err(BakeError::EmptyRegion);
    }

    #[allow(clippy::cast_precision_loss)]
    let res_f = resolution as f64;
    let immutable = &*region;

    // One task per raster row; each row is written whole, so the result
    // does not depend on scheduling order.
    let rows: Vec<Vec<f32>> = (0..resolution)
        .into_par_iter()
        .map(|y| {
            let mut row = vec![0.0f32; dim * resolution];
            for x in 0..resolution {
                #[allow(clippy::cast_precision_loss)]
                let uv = Point2::new(x as f64 / res_f, y as f64 / res_f);
                let Some(hit) = immutable.find_closest_uv_face(uv) else {
                    continue;
                };
                for (d, slot) in row.iter_mut().skip(x).step_by(resolution).enumerate() {
                    let mut value = 0.0f64;
                    for k in 0..3 {
                        let vertex = immutable.vertex_set[hit.verts[k] as usize] as usize;
                        value += hit.bary[k] * f64::from(features[vertex][d]);
                    }
                    #[allow(clippy::cast_possible_truncation)]
                    {
                        *slot = value as f32;
                    }
                }
            }
            row
        })
        .collect();

    let mut stack = RasterStack::zeros(dim, resolution);
    for (y, row) in rows.iter().enumerate() {
        let top_row = resolution - y - 1;
        for d in 0..dim {
            stack[d].set_row(top_row, &row[d * resolution..(d + 1) * resolution]);
        }
    }

    for (d, map) in stack.maps().iter().enumerate() {
        if let Some((min, max)) = map.min_max() {
            debug!(channel = d, min, max, "feature channel baked");
        }
    }
    region.feature_map = stack;
    Ok(())
}

/// Validate the feature list and return its dimension.
fn check_features(region: &ParamRegion, features: &[Vec<f32>]) -> BakeResult<usize> {
    let Some(first) = features.first() else {
        return Err(BakeError::EmptyFeatureList);
    };
    let dim = first.len();
    if dim == 0 {
        return Err(BakeError::EmptyFeatureVector);
    }
    for (index, vector) in features.iter().enumerate() {
        if vector.len() != dim {
            return Err(BakeError::FeatureDimMismatch {
                index,
                expected: dim,
                actual: vector.len(),
            });
        }
    }
    for &vertex in &region.vertex_set {
        if vertex as usize >= features.len() {
            return Err(BakeError::VertexOutOfRange {
                vertex,
                available: features.len(),
            });
        }
    }
    Ok(dim)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use detail_region::CutTopology;

    /// Unit square split along the diagonal, identity vertex/face sets.
    fn make_test_region() -> ParamRegion {
        let cut = CutTopology::new(
            vec![
                Point2::new(0.0, 0.0),
                Point2::new(1.0, 0.0),
                Point2::new(1.0, 1.0),
                Point2::new(0.0, 1.0),
            ],
            vec![[0, 1, 2], [0, 2, 3]],
        )
        .unwrap();
        ParamRegion::new(vec![0, 1, 2, 3], vec![0, 1], cut).unwrap()
    }

    #[test]
    fn test_empty_feature_list() {
        let mut region = make_test_region();
        assert!(matches!(
            bake_feature_map(&mut region, &[], 4),
            Err(BakeError::EmptyFeatureList)
        ));
    }

    #[test]
    fn test_dim_mismatch() {
        let mut region = make_test_region();
        let features = vec![vec![0.0, 1.0], vec![0.5], vec![0.0, 0.0], vec![0.0, 0.0]];
        assert!(matches!(
            bake_feature_map(&mut region, &features, 4),
            Err(BakeError::FeatureDimMismatch {
                index: 1,
                expected: 2,
                actual: 1,
            })
        ));
    }

    #[test]
    fn test_vertex_out_of_range() {
        let mut region = make_test_region();
        let features = vec![vec![0.0]; 3];
        assert!(matches!(
            bake_feature_map(&mut region, &features, 4),
            Err(BakeError::VertexOutOfRange { vertex: 3, .. })
        ));
    }

    #[test]
    fn test_unit_square_interpolation() {
        // Corner heights {0, 1, 0, 1}: the interpolated height at (u, v)
        // is u - v on the lower triangle and v - u on the upper, so the
        // baked value at sample point (x/4, y/4) is |x - y| / 4.
        let mut region = make_test_region();
        let features = vec![vec![0.0], vec![1.0], vec![0.0], vec![1.0]];
        bake_feature_map(&mut region, &features, 4).unwrap();

        assert_eq!(region.feature_map.channels(), 1);
        let map = &region.feature_map[0];
        for x in 0..4usize {
            for y in 0..4usize {
                let expected = (x as f64 - y as f64).abs() / 4.0;
                assert_relative_eq!(
                    f64::from(map.cell(x, y)),
                    expected,
                    epsilon = 1e-6
                );
            }
        }
    }

    #[test]
    fn test_uncovered_cells_are_zero() {
        // A single small triangle leaves most of the grid uncovered.
        let cut = CutTopology::new(
            vec![
                Point2::new(0.0, 0.0),
                Point2::new(0.3, 0.0),
                Point2::new(0.0, 0.3),
            ],
            vec![[0, 1, 2]],
        )
        .unwrap();
        let mut region = ParamRegion::new(vec![0, 1, 2], vec![0], cut).unwrap();
        let features = vec![vec![5.0]; 3];
        bake_feature_map(&mut region, &features, 8).unwrap();

        let map = &region.feature_map[0];
        assert_eq!(map.cell(7, 7), 0.0);
        assert_eq!(map.cell(0, 0), 5.0);
    }

    #[test]
    fn test_rebake_is_bit_identical() {
        let mut region = make_test_region();
        let features = vec![vec![0.1, 0.9], vec![0.7, 0.2], vec![0.3, 0.4], vec![0.5, 0.6]];
        bake_feature_map(&mut region, &features, 16).unwrap();
        let first: Vec<Vec<f32>> = region
            .feature_map
            .maps()
            .iter()
            .map(|m| m.as_slice().to_vec())
            .collect();

        bake_feature_map(&mut region, &features, 16).unwrap();
        for (d, map) in region.feature_map.maps().iter().enumerate() {
            assert_eq!(map.as_slice(), first[d].as_slice());
        }
    }

    #[test]
    fn test_replaces_previous_stack() {
        let mut region = make_test_region();
        bake_feature_map(&mut region, &vec![vec![0.0, 0.0]; 4], 4).unwrap();
        assert_eq!(region.feature_map.channels(), 2);
        bake_feature_map(&mut region, &vec![vec![1.0]; 4], 4).unwrap();
        assert_eq!(region.feature_map.channels(), 1);
    }
}
