//! Cross-model detail transfer.

use crate::{
    apply_displacement_map, prepare_detail_maps, prepare_feature_maps, FeatureSet,
    SynthesisEngine, SynthesisError, SynthesisResult, DISPLACEMENT_CHANNEL, REFLECTANCE_CHANNELS,
};
use detail_bake::Projector;
use detail_mesh::SurfaceMesh;
use detail_raster::{ImageBuffer, RasterMap, RasterStack};
use detail_region::ParamRegion;
use hashbrown::HashSet;
use tracing::info;

/// Configuration for one transfer run.
#[derive(Debug, Clone)]
pub struct TransferConfig {
    /// Raster resolution for both models' maps.
    pub resolution: usize,
    /// Reflectance normalization factor. `None` derives it from this
    /// run's own maximum; callers chaining several runs pass the factor
    /// returned by the previous one.
    pub normalize_max: Option<f64>,
}

impl Default for TransferConfig {
    fn default() -> Self {
        Self {
            resolution: RasterMap::DEFAULT_RESOLUTION,
            normalize_max: None,
        }
    }
}

/// Output rasters of a transfer run.
#[derive(Debug)]
pub struct TransferOutput {
    /// Normalized reflectance channels, ready to persist.
    pub reflectance: [RasterMap; REFLECTANCE_CHANNELS],
    /// The synthesized displacement raster.
    pub displacement: RasterMap,
    /// Normalization factor actually applied to the reflectance.
    pub normalize_max_used: f64,
    /// Target vertices moved by the displacement channel.
    pub vertices_moved: usize,
}

/// Transfer geometric detail from a source model onto a target model.
///
/// Both models are re-parameterized as fresh single regions from their
/// existing per-vertex UVs, independent of any seen/unseen split. The
/// full geometric feature stack (including curvature) is baked on both;
/// the source's detail stack comes from its reflectance and displacement
/// images with every face treated as visible. The engine runs with the
/// source as both seen and unseen input, a self-consistent baseline
/// producing a stack in the shared UV layout; its displacement channel is
/// applied to the target mesh and its reflectance channels are normalized
/// and returned for the caller to persist.
///
/// # Errors
///
/// Fails when either model lacks UVs or feature channels, the images are
/// malformed, the engine fails, or its output does not match the source
/// detail channel count.
pub fn transfer_detail(
    source: &SurfaceMesh,
    target: &mut SurfaceMesh,
    reflectance: &[ImageBuffer; REFLECTANCE_CHANNELS],
    displacement: &ImageBuffer,
    projector: &dyn Projector,
    engine: &dyn SynthesisEngine,
    config: &TransferConfig,
) -> SynthesisResult<TransferOutput> {
    let mut source_region = ParamRegion::from_full_mesh(source)?;
    let mut target_region = ParamRegion::from_full_mesh(target)?;
    let feature_set = FeatureSet {
        with_curvature: true,
    };
    prepare_feature_maps(
        source,
        std::slice::from_mut(&mut source_region),
        feature_set,
        config.resolution,
    )?;
    prepare_feature_maps(
        target,
        std::slice::from_mut(&mut target_region),
        feature_set,
        config.resolution,
    )?;

    #[allow(clippy::cast_possible_truncation)]
    let visible: HashSet<u32> = (0..source.face_count() as u32).collect();
    prepare_detail_maps(
        source,
        std::slice::from_mut(&mut source_region),
        reflectance,
        displacement,
        projector,
        &visible,
        config.resolution,
    )?;

    // Self-consistent baseline: the source stands in for both sides.
    let mut synthesized = engine.synthesize(
        &source_region.feature_map,
        &source_region.feature_map,
        &source_region.detail_map,
    )?;
    if synthesized.channels() != source_region.detail_map.channels() {
        return Err(SynthesisError::ChannelMismatch {
            expected: source_region.detail_map.channels(),
            actual: synthesized.channels(),
        });
    }
    if synthesized.channels() <= DISPLACEMENT_CHANNEL {
        return Err(SynthesisError::MissingInput {
            what: "displacement detail channel",
        });
    }

    let used = config
        .normalize_max
        .unwrap_or_else(|| synthesized_reflectance_max(&synthesized));
    let used = if used > 0.0 { used } else { 1.0 };
    for channel in 0..REFLECTANCE_CHANNELS {
        #[allow(clippy::cast_possible_truncation)]
        synthesized[channel].scale_by(used as f32);
    }

    let vertices_moved = apply_displacement_map(
        target,
        &target_region.vertex_set,
        &target_region.cut,
        &synthesized[DISPLACEMENT_CHANNEL],
    )?;

    info!(
        normalize_max = used,
        vertices_moved, "cross-model transfer complete"
    );
    Ok(TransferOutput {
        reflectance: [
            synthesized[0].clone(),
            synthesized[1].clone(),
            synthesized[2].clone(),
        ],
        displacement: synthesized[DISPLACEMENT_CHANNEL].clone(),
        normalize_max_used: used,
        vertices_moved,
    })
}

fn synthesized_reflectance_max(stack: &RasterStack) -> f64 {
    let mut max = f64::MIN;
    for channel in 0..REFLECTANCE_CHANNELS {
        if let Some((_, channel_max)) = stack[channel].min_max() {
            max = max.max(f64::from(channel_max));
        }
    }
    max
}
