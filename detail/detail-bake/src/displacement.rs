//! Signed displacement recovery by probing an auxiliary mesh.

use crate::{BakeError, BakeResult};
use detail_mesh::SurfaceMesh;
use detail_query::SegmentTester;
use detail_raster::{RasterMap, RasterStack};
use detail_region::ParamRegion;
use hashbrown::HashSet;
use nalgebra::{Point2, Point3, Vector3};
use rayon::prelude::*;
use tracing::debug;

/// Extends each probe slightly past the base surface so grazing hits at
/// the surface itself still register.
const PROBE_EPSILON: f64 = 1e-5;

/// Recover a signed displacement raster by re-intersecting a high-detail
/// auxiliary mesh.
///
/// The probe length is a tenth of the base mesh's bounding radius. For
/// each visible cell the interpolated surface position `p` and normal `n`
/// are probed twice against `probe`: outward from `p + n * length` back
/// toward `p`, and inward from `p - n * length` toward `p`. No hit on
/// either probe records `0.0` (measured zero offset); otherwise the value
/// is the signed offset along `n` of the nearer hit, negative when the
/// surface recedes below `p`. Occluded and uncovered cells get
/// [`RasterMap::NO_DATA`].
///
/// The single-channel result is appended to the region's detail stack,
/// following the reflectance channels.
///
/// # Errors
///
/// Fails fast when the region has no faces, references a vertex outside
/// the mesh, or the new channel's resolution disagrees with channels
/// already in the stack.
pub fn bake_displacement_map(
    region: &mut ParamRegion,
    probe: &SegmentTester,
    mesh: &SurfaceMesh,
    visible_faces: &HashSet<u32>,
    resolution: usize,
) -> BakeResult<()> {
    if region.cut.face_count() == 0 {
        return Err(BakeError::EmptyRegion);
    }
    for &vertex in &region.vertex_set {
        if vertex as usize >= mesh.vertex_count() {
            return Err(BakeError::VertexOutOfRange {
                vertex,
                available: mesh.vertex_count(),
            });
        }
    }

    let probe_length = mesh.bounds().radius() / 10.0;
    #[allow(clippy::cast_precision_loss)]
    let res_f = resolution as f64;
    let immutable = &*region;

    let rows: Vec<Vec<f32>> = (0..resolution)
        .into_par_iter()
        .map(|y| {
            let mut row = vec![RasterMap::NO_DATA; resolution];
            for (x, slot) in row.iter_mut().enumerate() {
                #[allow(clippy::cast_precision_loss)]
                let uv = Point2::new(x as f64 / res_f, y as f64 / res_f);
                let Some(hit) = immutable.find_closest_uv_face(uv) else {
                    continue;
                };
                if !visible_faces.contains(&immutable.face_set[hit.face]) {
                    continue;
                }

                let (position, normal) =
                    interpolate_frame(immutable, mesh, &hit.verts, &hit.bary);
                #[allow(clippy::cast_possible_truncation)]
                {
                    *slot = probe_offset(probe, position, normal, probe_length) as f32;
                }
            }
            row
        })
        .collect();

    let mut map = RasterMap::new(resolution);
    for (y, row) in rows.iter().enumerate() {
        map.set_row(resolution - y - 1, row);
    }
    if let Some((min, max)) = map.min_max() {
        debug!(min, max, probe_length, "displacement map baked");
    }
    region.detail_map.push(map)?;
    Ok(())
}

/// Signed offset along `normal` of the nearest probe hit, or `0.0` when
/// neither probe intersects.
fn probe_offset(
    probe: &SegmentTester,
    position: Point3<f64>,
    normal: Vector3<f64>,
    length: f64,
) -> f64 {
    let outward = probe.intersect(
        position + normal * length,
        position - normal * PROBE_EPSILON,
    );
    let inward = probe.intersect(
        position - normal * length,
        position + normal * PROBE_EPSILON,
    );

    let out_offset = outward.map(|hit| (hit - position).dot(&normal));
    let in_offset = inward.map(|hit| (hit - position).dot(&normal));
    match (out_offset, in_offset) {
        (Some(o), Some(i)) => {
            if o.abs() <= i.abs() {
                o
            } else {
                i
            }
        }
        (Some(o), None) => o,
        (None, Some(i)) => i,
        (None, None) => 0.0,
    }
}

/// Barycentric interpolation of position and (renormalized) normal.
fn interpolate_frame(
    region: &ParamRegion,
    mesh: &SurfaceMesh,
    verts: &[u32; 3],
    bary: &[f64; 3],
) -> (Point3<f64>, Vector3<f64>) {
    let mut position = Point3::origin();
    let mut normal = Vector3::zeros();
    for k in 0..3 {
        let vertex = region.vertex_set[verts[k] as usize] as usize;
        position += mesh.vertices[vertex].position.coords * bary[k];
        normal += mesh.vertices[vertex].normal * bary[k];
    }
    let norm = normal.norm();
    if norm > f64::EPSILON {
        normal /= norm;
    }
    (position, normal)
}
