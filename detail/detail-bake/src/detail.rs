//! Detail-image rasterization through a camera projection.

use crate::{BakeError, BakeResult};
use detail_mesh::SurfaceMesh;
use detail_raster::{ImageBuffer, RasterMap, RasterStack};
use detail_region::ParamRegion;
use hashbrown::HashSet;
use nalgebra::{Point2, Point3};
use rayon::prelude::*;
use tracing::debug;

/// Camera/projection oracle mapping a 3D surface point to source-image
/// pixel coordinates, origin at the top-left.
pub trait Projector: Sync {
    /// Project a 3D point to `(pixel_x, pixel_y)` in image space.
    fn project(&self, point: &Point3<f64>) -> (f64, f64);
}

/// Rasterize a stack of detail images into the region's detail stack.
///
/// For each cell `(x, y)`: find the owning cut triangle at UV `(x/R, y/R)`.
/// When the owning full-mesh face is in `visible_faces`, the interpolated
/// 3D surface point is projected through `projector` into the images
/// (clamped to their bounds) and each channel's pixel is copied. Occluded
/// and uncovered cells get [`RasterMap::NO_DATA`] in every channel.
///
/// Updates the region's fill state: `fill_ratio` is the fraction of cells
/// copied from the images, and `filled` is set exactly when it reaches 1.
///
/// # Errors
///
/// Fails fast when the image stack is empty, the images disagree on
/// dimensions, the region has no faces, or the region references a vertex
/// outside the mesh.
pub fn bake_detail_map(
    region: &mut ParamRegion,
    images: &[ImageBuffer],
    mesh: &SurfaceMesh,
    projector: &dyn Projector,
    visible_faces: &HashSet<u32>,
    resolution: usize,
) -> BakeResult<()> {
    let Some(first) = images.first() else {
        return Err(BakeError::EmptyImageStack);
    };
    let (rows, cols) = (first.rows(), first.cols());
    for (channel, image) in images.iter().enumerate() {
        if image.rows() != rows || image.cols() != cols {
            return Err(BakeError::ImageDimMismatch {
                channel,
                expected_rows: rows,
                expected_cols: cols,
                actual_rows: image.rows(),
                actual_cols: image.cols(),
            });
        }
    }
    if region.cut.face_count() == 0 {
        return Err(BakeError::EmptyRegion);
    }
    check_vertex_range(region, mesh)?;

    let channels = images.len();
    #[allow(clippy::cast_precision_loss)]
    let res_f = resolution as f64;
    let immutable = &*region;

    let baked: Vec<(Vec<f32>, usize)> = (0..resolution)
        .into_par_iter()
        .map(|y| {
            let mut row = vec![RasterMap::NO_DATA; channels * resolution];
            let mut filled = 0usize;
            for x in 0..resolution {
                #[allow(clippy::cast_precision_loss)]
                let uv = Point2::new(x as f64 / res_f, y as f64 / res_f);
                let Some(hit) = immutable.find_closest_uv_face(uv) else {
                    continue;
                };
                let mesh_face = immutable.face_set[hit.face];
                if !visible_faces.contains(&mesh_face) {
                    continue;
                }

                let point = interpolate_position(immutable, mesh, &hit.verts, &hit.bary);
                let (px, py) = projector.project(&point);
                let col = clamp_pixel(px, cols);
                let pix_row = clamp_pixel(py, rows);
                for (d, image) in images.iter().enumerate() {
                    row[d * resolution + x] = image.pixel(pix_row, col);
                }
                filled += 1;
            }
            (row, filled)
        })
        .collect();

    let mut stack = RasterStack::zeros(channels, resolution);
    let mut filled_cells = 0usize;
    for (y, (row, filled)) in baked.iter().enumerate() {
        let top_row = resolution - y - 1;
        for d in 0..channels {
            stack[d].set_row(top_row, &row[d * resolution..(d + 1) * resolution]);
        }
        filled_cells += filled;
    }

    region.detail_map = stack;
    region.set_fill(filled_cells, resolution * resolution);
    debug!(
        filled_cells,
        fill_ratio = region.fill_ratio,
        "detail map baked"
    );
    Ok(())
}

/// Barycentric interpolation of full-mesh vertex positions.
fn interpolate_position(
    region: &ParamRegion,
    mesh: &SurfaceMesh,
    verts: &[u32; 3],
    bary: &[f64; 3],
) -> Point3<f64> {
    let mut point = Point3::origin();
    for k in 0..3 {
        let vertex = region.vertex_set[verts[k] as usize] as usize;
        point += mesh.vertices[vertex].position.coords * bary[k];
    }
    point
}

fn check_vertex_range(region: &ParamRegion, mesh: &SurfaceMesh) -> BakeResult<()> {
    for &vertex in &region.vertex_set {
        if vertex as usize >= mesh.vertex_count() {
            return Err(BakeError::VertexOutOfRange {
                vertex,
                available: mesh.vertex_count(),
            });
        }
    }
    Ok(())
}

/// Clamp a projected pixel coordinate to image bounds.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_possible_wrap)]
fn clamp_pixel(p: f64, limit: usize) -> usize {
    (p.floor() as i64).clamp(0, limit as i64 - 1) as usize
}
