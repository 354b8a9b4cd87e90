//! Stacks of equally-sized raster maps.

use crate::{RasterError, RasterMap, RasterResult};
use std::ops::{Index, IndexMut};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A stack of [`RasterMap`]s sharing one resolution.
///
/// Feature maps hold one channel per feature-vector component; detail maps
/// hold one channel per detail image plus an optional displacement channel.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RasterStack {
    maps: Vec<RasterMap>,
}

impl RasterStack {
    /// Create an empty stack.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a stack of zero-filled channels.
    #[must_use]
    pub fn zeros(channels: usize, resolution: usize) -> Self {
        Self {
            maps: (0..channels).map(|_| RasterMap::new(resolution)).collect(),
        }
    }

    /// Build a stack from existing maps.
    ///
    /// # Errors
    ///
    /// Returns [`RasterError::ResolutionMismatch`] if the maps disagree on
    /// resolution.
    pub fn from_maps(maps: Vec<RasterMap>) -> RasterResult<Self> {
        let mut stack = Self::new();
        for map in maps {
            stack.push(map)?;
        }
        Ok(stack)
    }

    /// Append a channel.
    ///
    /// # Errors
    ///
    /// Returns [`RasterError::ResolutionMismatch`] if the map's resolution
    /// differs from the channels already present.
    pub fn push(&mut self, map: RasterMap) -> RasterResult<()> {
        if let Some(first) = self.maps.first() {
            if first.resolution() != map.resolution() {
                return Err(RasterError::ResolutionMismatch {
                    expected: first.resolution(),
                    actual: map.resolution(),
                });
            }
        }
        self.maps.push(map);
        Ok(())
    }

    /// Number of channels.
    #[must_use]
    pub fn channels(&self) -> usize {
        self.maps.len()
    }

    /// Whether the stack holds no channels.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.maps.is_empty()
    }

    /// Resolution shared by all channels, or `None` when empty.
    #[must_use]
    pub fn resolution(&self) -> Option<usize> {
        self.maps.first().map(RasterMap::resolution)
    }

    /// Channel by index.
    #[must_use]
    pub fn get(&self, channel: usize) -> Option<&RasterMap> {
        self.maps.get(channel)
    }

    /// All channels.
    #[must_use]
    pub fn maps(&self) -> &[RasterMap] {
        &self.maps
    }

    /// All channels, mutably.
    pub fn maps_mut(&mut self) -> &mut [RasterMap] {
        &mut self.maps
    }

    /// Drop all channels.
    pub fn clear(&mut self) {
        self.maps.clear();
    }
}

impl Index<usize> for RasterStack {
    type Output = RasterMap;

    fn index(&self, channel: usize) -> &RasterMap {
        &self.maps[channel]
    }
}

impl IndexMut<usize> for RasterStack {
    fn index_mut(&mut self, channel: usize) -> &mut RasterMap {
        &mut self.maps[channel]
    }
}
