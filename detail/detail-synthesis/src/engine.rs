//! Interface to the external texture-synthesis optimizer.

use crate::SynthesisResult;
use detail_raster::RasterStack;

/// The black-box synthesis optimizer.
///
/// The optimizer receives feature and detail raster stacks and returns a
/// detail stack shaped like the target features, with the same channel
/// count as the source details. It is invoked synchronously; a stalled
/// engine stalls the pipeline.
pub trait SynthesisEngine {
    /// Synthesize a target-shaped detail stack from a source region.
    ///
    /// # Errors
    ///
    /// Implementations may fail for engine-specific reasons; the pipeline
    /// propagates such failures without retrying.
    fn synthesize(
        &self,
        src_features: &RasterStack,
        tar_features: &RasterStack,
        src_details: &RasterStack,
    ) -> SynthesisResult<RasterStack>;

    /// Fill the gaps of a partially covered region from its own content.
    ///
    /// # Errors
    ///
    /// Implementations may fail for engine-specific reasons.
    fn fill(
        &self,
        features: &RasterStack,
        details: &RasterStack,
    ) -> SynthesisResult<RasterStack>;
}
