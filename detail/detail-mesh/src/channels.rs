//! Typed per-vertex attribute registry.
//!
//! The original pipeline looked attributes up by string name on every
//! access. Here every channel the core reads or writes is a concrete
//! field, validated once before any raster loop starts.

use crate::{MeshError, MeshResult};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Per-vertex attribute channels consumed and produced by the pipeline.
///
/// Feature channels (`normalized_height`, `symmetry`,
/// `directional_occlusion`, `solid_angle_curvature`) are filled by external
/// feature providers and read when assembling feature vectors. Write-back
/// channels (`color`, `uv`, `synthesis_tag`, `hidden_uv`) are produced by
/// the synthesis orchestrator.
///
/// All channels are either empty (absent) or hold exactly one entry per
/// mesh vertex; [`VertexChannels::validate_features`] enforces this.
#[derive(Debug, Clone, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct VertexChannels {
    /// Height above the model base, normalized to `[0, 1]`.
    pub normalized_height: Vec<f32>,
    /// Five-component symmetry descriptor.
    pub symmetry: Vec<[f32; 5]>,
    /// Per-direction occlusion; length is uniform across vertices.
    pub directional_occlusion: Vec<Vec<f32>>,
    /// Four-scale solid-angle curvature (cross-model transfer only).
    pub solid_angle_curvature: Vec<[f32; 4]>,
    /// RGB color in `[0, 1]`, written from the synthesized detail maps.
    pub color: Vec<[f32; 3]>,
    /// Texture coordinates, rewritten to each vertex's cut UV.
    pub uv: Vec<[f32; 2]>,
    /// Texture source tag: 0 = original texture, 1 = synthesized.
    pub synthesis_tag: Vec<u8>,
    /// Cached cut UV for vertices textured from the synthesized map.
    pub hidden_uv: Vec<[f32; 2]>,
}

impl VertexChannels {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate the feature channels against the mesh vertex count.
    ///
    /// Returns the directional-occlusion component count, which determines
    /// the tail length of assembled feature vectors.
    ///
    /// # Errors
    ///
    /// Returns [`MeshError::ChannelLength`] if a required channel does not
    /// hold one entry per vertex, or [`MeshError::RaggedOcclusion`] if the
    /// occlusion vectors differ in length between vertices. The curvature
    /// channel is only checked when `with_curvature` is set.
    pub fn validate_features(&self, vertex_count: usize, with_curvature: bool) -> MeshResult<usize> {
        check_len("normalized_height", self.normalized_height.len(), vertex_count)?;
        check_len("symmetry", self.symmetry.len(), vertex_count)?;
        check_len(
            "directional_occlusion",
            self.directional_occlusion.len(),
            vertex_count,
        )?;
        if with_curvature {
            check_len(
                "solid_angle_curvature",
                self.solid_angle_curvature.len(),
                vertex_count,
            )?;
        }

        let occlusion_dim = self
            .directional_occlusion
            .first()
            .map_or(0, Vec::len);
        for (index, occ) in self.directional_occlusion.iter().enumerate() {
            if occ.len() != occlusion_dim {
                return Err(MeshError::RaggedOcclusion {
                    index,
                    expected: occlusion_dim,
                    actual: occ.len(),
                });
            }
        }
        Ok(occlusion_dim)
    }

    /// Validate the UV channel against the mesh vertex count.
    ///
    /// # Errors
    ///
    /// Returns [`MeshError::ChannelLength`] if the channel does not hold
    /// one entry per vertex.
    pub fn validate_uv(&self, vertex_count: usize) -> MeshResult<()> {
        check_len("uv", self.uv.len(), vertex_count)
    }

    /// Size the write-back channels so the orchestrator can index them.
    ///
    /// Existing entries are preserved; missing ones default to black,
    /// zero UV and the "original texture" tag.
    pub fn ensure_writeback(&mut self, vertex_count: usize) {
        self.color.resize(vertex_count, [0.0; 3]);
        self.uv.resize(vertex_count, [0.0; 2]);
        self.synthesis_tag.resize(vertex_count, 0);
        self.hidden_uv.resize(vertex_count, [0.0; 2]);
    }
}

fn check_len(channel: &'static str, actual: usize, expected: usize) -> MeshResult<()> {
    if actual == expected {
        Ok(())
    } else {
        Err(MeshError::ChannelLength {
            channel,
            expected,
            actual,
        })
    }
}
