//! Detail synthesis orchestration.
//!
//! The top of the pipeline: multi-patch resolution ([`patch_synthesis`],
//! [`merge_patches`]), the seen/unseen orchestrator
//! ([`prepare_feature_maps`], [`prepare_detail_maps`],
//! [`synthesize_detail`], [`apply_synthesis_result`]), cross-model
//! transfer ([`transfer_detail`]), displacement application
//! ([`apply_displacement_map`]) and geometry export ([`write_obj`]).
//!
//! The texture-synthesis optimizer itself and the patch-matching policy
//! stay external, injected through the [`SynthesisEngine`] and
//! [`CorrespondenceOracle`] traits.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

mod displace;
mod engine;
mod error;
mod export;
mod orchestrate;
mod patch;
mod transfer;

pub use displace::{apply_displacement_excluding, apply_displacement_map};
pub use engine::SynthesisEngine;
pub use error::{SynthesisError, SynthesisResult};
pub use export::{timestamped_name, write_obj};
pub use orchestrate::{
    apply_displacement_channel, apply_synthesis_result, assemble_feature_vectors,
    prepare_detail_maps, prepare_feature_maps, synthesize_detail, FeatureSet,
    DISPLACEMENT_CHANNEL, REFLECTANCE_CHANNELS,
};
pub use patch::{merge_patches, patch_synthesis, CorrespondenceOracle};
pub use transfer::{transfer_detail, TransferConfig, TransferOutput};
