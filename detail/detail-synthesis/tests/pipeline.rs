//! End-to-end pipeline scenarios.

use approx::assert_relative_eq;
use detail_bake::{bake_detail_map, Projector};
use detail_mesh::{SurfaceMesh, SurfaceVertex};
use detail_raster::{ImageBuffer, RasterMap, RasterStack};
use detail_region::{CutTopology, ParamRegion};
use detail_synthesis::{
    apply_displacement_channel, apply_synthesis_result, merge_patches, prepare_detail_maps,
    prepare_feature_maps, synthesize_detail, write_obj, FeatureSet, SynthesisEngine,
    SynthesisResult,
};
use hashbrown::HashSet;
use nalgebra::{Point2, Point3};

/// Engine that returns the source details unchanged.
struct Passthrough;

impl SynthesisEngine for Passthrough {
    fn synthesize(
        &self,
        _src_features: &RasterStack,
        _tar_features: &RasterStack,
        src_details: &RasterStack,
    ) -> SynthesisResult<RasterStack> {
        Ok(src_details.clone())
    }

    fn fill(
        &self,
        _features: &RasterStack,
        details: &RasterStack,
    ) -> SynthesisResult<RasterStack> {
        Ok(details.clone())
    }
}

struct PlanarProjector {
    scale: f64,
}

impl Projector for PlanarProjector {
    fn project(&self, point: &Point3<f64>) -> (f64, f64) {
        (point.x * self.scale, point.y * self.scale)
    }
}

/// Flat unit square at z = 0 with full feature channels.
fn make_square_mesh() -> SurfaceMesh {
    let mut mesh = SurfaceMesh::new();
    mesh.vertices.push(SurfaceVertex::from_coords(0.0, 0.0, 0.0));
    mesh.vertices.push(SurfaceVertex::from_coords(1.0, 0.0, 0.0));
    mesh.vertices.push(SurfaceVertex::from_coords(1.0, 1.0, 0.0));
    mesh.vertices.push(SurfaceVertex::from_coords(0.0, 1.0, 0.0));
    mesh.faces.push([0, 1, 2]);
    mesh.faces.push([0, 2, 3]);

    mesh.channels.normalized_height = vec![0.0, 1.0, 0.0, 1.0];
    mesh.channels.symmetry = vec![[0.2; 5]; 4];
    mesh.channels.directional_occlusion = vec![vec![0.5, 0.25]; 4];
    mesh
}

/// Seen region over the lower triangle, unseen over the upper one.
fn make_split() -> (ParamRegion, ParamRegion) {
    let seen_cut = CutTopology::new(
        vec![
            Point2::new(0.0, 0.0),
            Point2::new(1.0, 0.0),
            Point2::new(1.0, 1.0),
        ],
        vec![[0, 1, 2]],
    )
    .unwrap();
    let unseen_cut = CutTopology::new(
        vec![
            Point2::new(0.0, 0.0),
            Point2::new(1.0, 1.0),
            Point2::new(0.0, 1.0),
        ],
        vec![[0, 1, 2]],
    )
    .unwrap();
    let seen = ParamRegion::new(vec![0, 1, 2], vec![0], seen_cut).unwrap();
    let unseen = ParamRegion::new(vec![0, 2, 3], vec![1], unseen_cut).unwrap();
    (seen, unseen)
}

fn constant_image(value: f32) -> ImageBuffer {
    ImageBuffer::from_raw(8, 8, vec![value; 64]).unwrap()
}

#[test]
fn test_seen_unseen_pipeline() {
    let mut mesh = make_square_mesh();
    let (mut seen, mut unseen) = make_split();
    let mut regions = [&mut seen, &mut unseen];

    // Feature maps share one vector assembly across regions.
    let feature_set = FeatureSet::default();
    for region in &mut regions {
        prepare_feature_maps(&mesh, std::slice::from_mut(*region), feature_set, 4).unwrap();
    }
    assert_eq!(seen.feature_map.channels(), 1 + 3 + 5 + 2);

    // Detail maps: only the seen face is visible.
    let reflectance = [
        constant_image(0.8),
        constant_image(0.4),
        constant_image(0.2),
    ];
    let displacement = constant_image(0.2);
    let visible: HashSet<u32> = [0].into_iter().collect();
    let projector = PlanarProjector { scale: 8.0 };
    prepare_detail_maps(
        &mesh,
        std::slice::from_mut(&mut seen),
        &reflectance,
        &displacement,
        &projector,
        &visible,
        4,
    )
    .unwrap();
    assert_eq!(seen.detail_map.channels(), 4);
    assert!(seen.fill_ratio > 0.5);
    assert!(!seen.filled);

    // Synthesize the unseen detail from the seen part.
    synthesize_detail(&Passthrough, &seen, &mut unseen).unwrap();
    assert!(unseen.filled);
    assert_relative_eq!(unseen.fill_ratio, 1.0);

    // Write-back: seam vertices end up tagged as original texture.
    let used = apply_synthesis_result(&mut mesh, &seen, &unseen, None).unwrap();
    assert_relative_eq!(used, 0.8, epsilon = 1e-6);
    assert_eq!(mesh.channels.synthesis_tag, vec![0, 0, 0, 1]);
    assert_relative_eq!(mesh.channels.color[1][0], 1.0, epsilon = 1e-6);

    // Displacement: the seen vertices move; the seam moves only once.
    let moved = apply_displacement_channel(&mut mesh, &seen, &unseen).unwrap();
    assert_eq!(moved, 3);
    for vertex_idx in [0usize, 1, 2] {
        assert_relative_eq!(mesh.vertices[vertex_idx].position.z, 0.2, epsilon = 1e-6);
    }
    // Vertex 3's cell carries no measurement in the cloned seen stack.
    assert_relative_eq!(mesh.vertices[3].position.z, 0.0);

    // The displaced geometry exports cleanly.
    let mut buffer = Vec::new();
    write_obj(&mut buffer, &mesh).unwrap();
    let text = String::from_utf8(buffer).unwrap();
    assert_eq!(text.lines().count(), 6);
    assert!(text.contains("f 1 2 3"));
}

#[test]
fn test_fill_ratio_monotone_across_passes() {
    let mesh = make_square_mesh();
    // A region over the whole square, so visibility alone drives fill.
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
    let mut seen = ParamRegion::new(vec![0, 1, 2, 3], vec![0, 1], cut).unwrap();

    let images = vec![constant_image(0.5)];
    let projector = PlanarProjector { scale: 8.0 };

    let partial: HashSet<u32> = [0].into_iter().collect();
    bake_detail_map(&mut seen, &images, &mesh, &projector, &partial, 4).unwrap();
    let first_ratio = seen.fill_ratio;
    assert!(first_ratio > 0.0 && first_ratio < 1.0);
    assert!(!seen.filled);

    let full: HashSet<u32> = [0, 1].into_iter().collect();
    bake_detail_map(&mut seen, &images, &mesh, &projector, &full, 4).unwrap();
    assert!(seen.fill_ratio >= first_ratio);
    assert_relative_eq!(seen.fill_ratio, 1.0);
    assert!(seen.filled);
}

#[test]
fn test_two_patch_affine_merge() {
    // Target: unit square split into two triangles. Patch A owns the
    // lower face with the target's own UVs; patch B owns the upper face
    // under the affine mapping uv -> uv / 2.
    let target_cut = CutTopology::new(
        vec![
            Point2::new(0.0, 0.0),
            Point2::new(1.0, 0.0),
            Point2::new(1.0, 1.0),
            Point2::new(0.0, 1.0),
        ],
        vec![[0, 1, 2], [0, 2, 3]],
    )
    .unwrap();
    let mut target = ParamRegion::new(vec![0, 1, 2, 3], vec![0, 1], target_cut).unwrap();

    let cut_a = CutTopology::new(
        vec![
            Point2::new(0.0, 0.0),
            Point2::new(1.0, 0.0),
            Point2::new(1.0, 1.0),
        ],
        vec![[0, 1, 2]],
    )
    .unwrap();
    let mut patch_a = ParamRegion::new(vec![0, 1, 2], vec![0], cut_a).unwrap();

    let cut_b = CutTopology::new(
        vec![
            Point2::new(0.0, 0.0),
            Point2::new(0.5, 0.5),
            Point2::new(0.0, 0.5),
        ],
        vec![[0, 1, 2]],
    )
    .unwrap();
    let mut patch_b = ParamRegion::new(vec![0, 2, 3], vec![1], cut_b).unwrap();

    // Gradient detail maps so the sampled location matters.
    let mut gradient = RasterMap::new(8);
    for x in 0..8usize {
        for y in 0..8usize {
            #[allow(clippy::cast_precision_loss)]
            gradient.set_cell(x, y, x as f32 + 10.0 * y as f32);
        }
    }
    patch_a.detail_map = RasterStack::from_maps(vec![gradient.clone()]).unwrap();
    patch_b.detail_map = RasterStack::from_maps(vec![gradient.clone()]).unwrap();

    merge_patches(&mut target, &[patch_a, patch_b], 4).unwrap();

    // Cell (2, 1) samples target UV (0.5, 0.25) in the lower face; patch
    // A's parameterization is the identity there.
    assert_eq!(target.detail_map[0].cell(2, 1), gradient.sample_uv(0.5, 0.25));

    // Cell (1, 2) samples target UV (0.25, 0.5) in the upper face; patch
    // B sees it at half scale, UV (0.125, 0.25).
    assert_eq!(
        target.detail_map[0].cell(1, 2),
        gradient.sample_uv(0.125, 0.25)
    );

    // The merge replaced the single-channel stack wholesale.
    assert_eq!(target.detail_map.channels(), 1);
}

#[test]
fn test_pipeline_determinism() {
    let mesh = make_square_mesh();
    let (mut first, _) = make_split();
    let (mut second, _) = make_split();

    let feature_set = FeatureSet::default();
    prepare_feature_maps(&mesh, std::slice::from_mut(&mut first), feature_set, 16).unwrap();
    prepare_feature_maps(&mesh, std::slice::from_mut(&mut second), feature_set, 16).unwrap();

    for (a, b) in first
        .feature_map
        .maps()
        .iter()
        .zip(second.feature_map.maps())
    {
        assert_eq!(a.as_slice(), b.as_slice());
    }
}
