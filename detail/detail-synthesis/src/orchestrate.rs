//! End-to-end synthesis orchestration for a seen/unseen split.

use crate::{
    apply_displacement_excluding, apply_displacement_map, SynthesisEngine, SynthesisError,
    SynthesisResult,
};
use detail_bake::{bake_detail_map, bake_feature_map, Projector};
use detail_mesh::SurfaceMesh;
use detail_raster::{ImageBuffer, RasterMap};
use detail_region::ParamRegion;
use hashbrown::HashSet;
use tracing::info;

/// Dilation radius applied to reflectance channels before baking, wide
/// enough to push black UV-seam halos out of sampling range.
const DILATION_RADIUS: usize = 15;

/// Number of reflectance channels at the front of a detail stack.
pub const REFLECTANCE_CHANNELS: usize = 3;

/// Index of the displacement channel in a full detail stack.
pub const DISPLACEMENT_CHANNEL: usize = 3;

/// Which geometric feature channels participate in a run.
///
/// Curvature only exists on models prepared for cross-model transfer, so
/// it is opt-in; all other channels are always present.
#[derive(Debug, Clone, Copy, Default)]
pub struct FeatureSet {
    /// Include the four solid-angle curvature channels.
    pub with_curvature: bool,
}

/// Assemble one feature vector per mesh vertex from the typed channels.
///
/// Channel order is fixed and shared by every synthesis path:
///
/// 1. normalized height (1)
/// 2. surface normal remapped to `(n + 1) / 2` (3)
/// 3. solid-angle curvature (4, only with [`FeatureSet::with_curvature`])
/// 4. symmetry (5)
/// 5. directional occlusion, each component divided by the component count
///
/// # Errors
///
/// Fails when a required channel is missing, wrongly sized, or the
/// occlusion vectors are ragged.
pub fn assemble_feature_vectors(
    mesh: &SurfaceMesh,
    feature_set: FeatureSet,
) -> SynthesisResult<Vec<Vec<f32>>> {
    let vertex_count = mesh.vertex_count();
    let occlusion_dim = mesh
        .channels
        .validate_features(vertex_count, feature_set.with_curvature)?;

    #[allow(clippy::cast_precision_loss)]
    let occlusion_scale = if occlusion_dim == 0 {
        1.0
    } else {
        1.0 / occlusion_dim as f32
    };

    let mut vectors = Vec::with_capacity(vertex_count);
    for (index, vertex) in mesh.vertices.iter().enumerate() {
        let channels = &mesh.channels;
        let mut vector =
            Vec::with_capacity(9 + occlusion_dim + if feature_set.with_curvature { 4 } else { 0 });
        vector.push(channels.normalized_height[index]);
        for axis in 0..3 {
            #[allow(clippy::cast_possible_truncation)]
            vector.push(((vertex.normal[axis] + 1.0) / 2.0) as f32);
        }
        if feature_set.with_curvature {
            vector.extend_from_slice(&channels.solid_angle_curvature[index]);
        }
        vector.extend_from_slice(&channels.symmetry[index]);
        for &occlusion in &channels.directional_occlusion[index] {
            vector.push(occlusion * occlusion_scale);
        }
        vectors.push(vector);
    }
    Ok(vectors)
}

/// Bake the shared feature stack into every region.
///
/// # Errors
///
/// Fails on malformed feature channels or an empty region.
pub fn prepare_feature_maps(
    mesh: &SurfaceMesh,
    regions: &mut [ParamRegion],
    feature_set: FeatureSet,
    resolution: usize,
) -> SynthesisResult<()> {
    let vectors = assemble_feature_vectors(mesh, feature_set)?;
    for region in regions.iter_mut() {
        bake_feature_map(region, &vectors, resolution)?;
    }
    info!(
        regions = regions.len(),
        channels = vectors.first().map_or(0, Vec::len),
        "feature maps prepared"
    );
    Ok(())
}

/// Bake reflectance and displacement detail into every region.
///
/// Each reflectance channel is dilated first to keep seam halos out of
/// the sampled detail; the displacement image follows the three
/// reflectance channels in the baked stack.
///
/// # Errors
///
/// Fails when the images disagree on dimensions or a region is empty.
pub fn prepare_detail_maps(
    mesh: &SurfaceMesh,
    regions: &mut [ParamRegion],
    reflectance: &[ImageBuffer; REFLECTANCE_CHANNELS],
    displacement: &ImageBuffer,
    projector: &dyn Projector,
    visible_faces: &HashSet<u32>,
    resolution: usize,
) -> SynthesisResult<()> {
    let mut images: Vec<ImageBuffer> = reflectance
        .iter()
        .map(|channel| channel.dilate(DILATION_RADIUS, 0.0))
        .collect();
    images.push(displacement.clone());

    for region in regions.iter_mut() {
        bake_detail_map(region, &images, mesh, projector, visible_faces, resolution)?;
    }
    Ok(())
}

/// Run the engine with the seen part as source and store the result in
/// the unseen part, marking it filled.
///
/// # Errors
///
/// Fails when the engine fails or returns a stack whose channel count
/// differs from the source details.
pub fn synthesize_detail(
    engine: &dyn SynthesisEngine,
    seen: &ParamRegion,
    unseen: &mut ParamRegion,
) -> SynthesisResult<()> {
    let synthesized = engine.synthesize(&seen.feature_map, &unseen.feature_map, &seen.detail_map)?;
    if synthesized.channels() != seen.detail_map.channels() {
        return Err(SynthesisError::ChannelMismatch {
            expected: seen.detail_map.channels(),
            actual: synthesized.channels(),
        });
    }
    unseen.detail_map = synthesized;
    unseen.filled = true;
    unseen.fill_ratio = 1.0;
    info!("unseen detail synthesized");
    Ok(())
}

/// Write synthesized reflectance back onto mesh attributes.
///
/// Every cut vertex of both regions gets its color sampled from its own
/// region's detail stack at the vertex's cut UV, its UV channel rewritten
/// to that cut UV, and a texture-source tag (1 for the synthesized unseen
/// part, 0 for the seen part). Unseen vertices additionally cache their
/// cut UV in the hidden-UV channel. The unseen part is written first, so
/// seam vertices shared with the seen part end up tagged as original.
///
/// Reflectance is normalized by `normalize_max` when given, otherwise by
/// this run's own maximum; the factor actually used is returned so
/// callers can carry it into subsequent runs.
///
/// # Errors
///
/// Fails when either region's detail stack has fewer than three channels
/// or references a vertex outside the mesh.
pub fn apply_synthesis_result(
    mesh: &mut SurfaceMesh,
    seen: &ParamRegion,
    unseen: &ParamRegion,
    normalize_max: Option<f64>,
) -> SynthesisResult<f64> {
    for region in [seen, unseen] {
        if region.detail_map.channels() < REFLECTANCE_CHANNELS {
            return Err(SynthesisError::MissingInput {
                what: "reflectance detail channels",
            });
        }
        for &vertex in &region.vertex_set {
            if vertex as usize >= mesh.vertex_count() {
                return Err(SynthesisError::VertexOutOfRange {
                    vertex,
                    vertex_count: mesh.vertex_count(),
                });
            }
        }
    }

    let used = normalize_max.unwrap_or_else(|| reflectance_max(&[seen, unseen]));
    let used = if used > 0.0 { used } else { 1.0 };

    mesh.channels.ensure_writeback(mesh.vertex_count());
    write_region_vertices(mesh, unseen, used, 1);
    write_region_vertices(mesh, seen, used, 0);
    info!(normalize_max = used, "synthesis result applied");
    Ok(used)
}

/// Apply the displacement channel of both regions' detail stacks.
///
/// The seen part is applied directly; the unseen part skips vertices
/// shared with the seen part, so seam vertices move exactly once.
/// Returns the total number of vertices moved.
///
/// # Errors
///
/// Fails when a region's detail stack lacks the displacement channel or
/// its vertex set is inconsistent with the mesh.
pub fn apply_displacement_channel(
    mesh: &mut SurfaceMesh,
    seen: &ParamRegion,
    unseen: &ParamRegion,
) -> SynthesisResult<usize> {
    for region in [seen, unseen] {
        if region.detail_map.channels() <= DISPLACEMENT_CHANNEL {
            return Err(SynthesisError::MissingInput {
                what: "displacement detail channel",
            });
        }
    }

    let moved_seen = apply_displacement_map(
        mesh,
        &seen.vertex_set,
        &seen.cut,
        &seen.detail_map[DISPLACEMENT_CHANNEL],
    )?;
    let seen_vertices: HashSet<u32> = seen.vertex_set.iter().copied().collect();
    let moved_unseen = apply_displacement_excluding(
        mesh,
        &unseen.vertex_set,
        &unseen.cut,
        &unseen.detail_map[DISPLACEMENT_CHANNEL],
        &seen_vertices,
    )?;
    Ok(moved_seen + moved_unseen)
}

/// Largest reflectance value across the given regions' detail stacks.
fn reflectance_max(regions: &[&ParamRegion]) -> f64 {
    let mut max = f64::MIN;
    for region in regions {
        for channel in 0..REFLECTANCE_CHANNELS {
            if let Some((_, channel_max)) = region.detail_map[channel].min_max() {
                max = max.max(f64::from(channel_max));
            }
        }
    }
    max
}

fn write_region_vertices(mesh: &mut SurfaceMesh, region: &ParamRegion, used: f64, tag: u8) {
    let channels = &mut mesh.channels;
    for (local, &vertex) in region.vertex_set.iter().enumerate() {
        let vertex = vertex as usize;
        let uv = region.cut.uv(local);

        let mut color = [0.0f32; 3];
        for (c, slot) in color.iter_mut().enumerate() {
            let sampled = region.detail_map[c].sample_uv(uv.x, uv.y);
            if sampled != RasterMap::NO_DATA {
                #[allow(clippy::cast_possible_truncation)]
                {
                    *slot = (f64::from(sampled) / used) as f32;
                }
            }
        }

        #[allow(clippy::cast_possible_truncation)]
        let uv32 = [uv.x as f32, uv.y as f32];
        channels.color[vertex] = color;
        channels.uv[vertex] = uv32;
        channels.synthesis_tag[vertex] = tag;
        if tag == 1 {
            channels.hidden_uv[vertex] = uv32;
        }
    }
}
