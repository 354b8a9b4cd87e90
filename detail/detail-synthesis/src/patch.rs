//! Multi-patch correspondence, fill and merge.

use crate::{SynthesisEngine, SynthesisError, SynthesisResult};
use detail_raster::{RasterMap, RasterStack};
use detail_region::ParamRegion;
use hashbrown::HashMap;
use nalgebra::Point2;
use rayon::prelude::*;
use tracing::{debug, info};

/// Fill ratio above which a patch can be self-filled from its own content.
const SELF_FILL_THRESHOLD: f64 = 0.5;

/// Picks the best filled patch to synthesize an unfilled patch from.
///
/// The matching policy (geometric similarity, user choice) lives outside
/// the pipeline; this trait injects it.
pub trait CorrespondenceOracle {
    /// Pick a source for `unfilled` among patches where `candidates` is
    /// true, or `None` when no acceptable match exists.
    fn find_matching_patch(&self, unfilled: usize, candidates: &[bool]) -> Option<usize>;
}

/// Two-pass fill of a multi-patch parameterization.
///
/// Pass 1 self-fills every unfilled patch whose detail map already covers
/// more than half its cells, using the engine's fill mode. Pass 2 walks
/// the remaining unfilled patches in index order; each queries the oracle
/// against the patches filled so far and synthesizes from the match. The
/// candidate set is recomputed after every fill, so later patches may
/// draw on earlier results; the walk is strictly sequential and its
/// outcome depends on patch order.
///
/// # Errors
///
/// Returns [`SynthesisError::NoCorrespondence`] when the oracle finds no
/// match for an unfilled patch, or [`SynthesisError::InvalidCandidate`]
/// when it names a patch that is out of range or itself unfilled.
pub fn patch_synthesis(
    regions: &mut [ParamRegion],
    engine: &dyn SynthesisEngine,
    oracle: &dyn CorrespondenceOracle,
) -> SynthesisResult<()> {
    for (index, region) in regions.iter_mut().enumerate() {
        if region.filled || region.fill_ratio <= SELF_FILL_THRESHOLD {
            continue;
        }
        debug!(patch = index, fill_ratio = region.fill_ratio, "self-filling patch");
        region.detail_map = engine.fill(&region.feature_map, &region.detail_map)?;
        region.filled = true;
        region.fill_ratio = 1.0;
    }

    for index in 0..regions.len() {
        if regions[index].filled {
            continue;
        }
        let candidates: Vec<bool> = regions.iter().map(|r| r.filled).collect();
        let candidate = oracle
            .find_matching_patch(index, &candidates)
            .ok_or(SynthesisError::NoCorrespondence { patch: index })?;
        if candidate >= regions.len() || !candidates[candidate] {
            return Err(SynthesisError::InvalidCandidate {
                patch: index,
                candidate,
            });
        }

        debug!(patch = index, source = candidate, "synthesizing patch from match");
        let synthesized = engine.synthesize(
            &regions[candidate].feature_map,
            &regions[index].feature_map,
            &regions[candidate].detail_map,
        )?;
        let region = &mut regions[index];
        region.detail_map = synthesized;
        region.filled = true;
        region.fill_ratio = 1.0;
    }

    info!(patches = regions.len(), "patch synthesis complete");
    Ok(())
}

/// Merge per-patch detail maps back into a unified target region.
///
/// For each target cell, the owning cut face is mapped to its
/// (patch, local face) identity, the cell's barycentric weights are
/// re-projected into that patch's own parameterization, and the patch's
/// detail stack is resampled at the resulting UV. Cells with no owning
/// face get [`RasterMap::NO_DATA`] in every channel.
///
/// # Errors
///
/// Returns [`SynthesisError::UnownedFace`] when a covered target face
/// belongs to no patch, [`SynthesisError::ChannelMismatch`] when patch
/// detail stacks disagree on channel count, or
/// [`SynthesisError::MissingInput`] when there are no patches or a patch
/// has an empty detail stack.
pub fn merge_patches(
    target: &mut ParamRegion,
    patches: &[ParamRegion],
    resolution: usize,
) -> SynthesisResult<()> {
    let Some(first) = patches.first() else {
        return Err(SynthesisError::MissingInput { what: "patches" });
    };
    let channels = first.detail_map.channels();
    if channels == 0 {
        return Err(SynthesisError::MissingInput {
            what: "patch detail maps",
        });
    }
    for patch in patches {
        if patch.detail_map.channels() != channels {
            return Err(SynthesisError::ChannelMismatch {
                expected: channels,
                actual: patch.detail_map.channels(),
            });
        }
    }

    // Mesh face -> (patch, local face), built once outside the cell loop.
    let mut owners: HashMap<u32, (usize, usize)> = HashMap::new();
    for (patch_idx, patch) in patches.iter().enumerate() {
        for (local, &mesh_face) in patch.face_set.iter().enumerate() {
            owners.insert(mesh_face, (patch_idx, local));
        }
    }

    #[allow(clippy::cast_precision_loss)]
    let res_f = resolution as f64;
    let immutable = &*target;

    let rows: Vec<SynthesisResult<Vec<f32>>> = (0..resolution)
        .into_par_iter()
        .map(|y| {
            let mut row = vec![RasterMap::NO_DATA; channels * resolution];
            for x in 0..resolution {
                #[allow(clippy::cast_precision_loss)]
                let uv = Point2::new(x as f64 / res_f, y as f64 / res_f);
                let Some(hit) = immutable.find_closest_uv_face(uv) else {
                    continue;
                };
                let mesh_face = immutable.face_set[hit.face];
                let &(patch_idx, local_face) = owners
                    .get(&mesh_face)
                    .ok_or(SynthesisError::UnownedFace { face: mesh_face })?;

                let patch = &patches[patch_idx];
                let [a, b, c] = patch.cut.face_uvs(local_face);
                let patch_uv = Point2::new(
                    hit.bary[0] * a.x + hit.bary[1] * b.x + hit.bary[2] * c.x,
                    hit.bary[0] * a.y + hit.bary[1] * b.y + hit.bary[2] * c.y,
                );
                for d in 0..channels {
                    row[d * resolution + x] =
                        patch.detail_map[d].sample_uv(patch_uv.x, patch_uv.y);
                }
            }
            Ok(row)
        })
        .collect();

    let mut stack = RasterStack::zeros(channels, resolution);
    for (y, row) in rows.into_iter().enumerate() {
        let row = row?;
        let top_row = resolution - y - 1;
        for d in 0..channels {
            stack[d].set_row(top_row, &row[d * resolution..(d + 1) * resolution]);
        }
    }
    target.detail_map = stack;
    Ok(())
}
