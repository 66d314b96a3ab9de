//! Layer configuration types.

use crate::error::{LayerError, Result};

/// Layer partitioning parameters (immutable after construction).
///
/// Every layer of one map shares the same configuration so that a block
/// index addresses the same region of space in all of them.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayerConfig {
    /// World units per voxel edge.
    pub voxel_size: f32,
    /// Voxels per axis per block (typically 16).
    pub voxels_per_side: u32,
}

impl LayerConfig {
    /// Create a new layer configuration.
    ///
    /// # Arguments
    /// * `voxel_size` - World units per voxel
    /// * `voxels_per_side` - Voxels per axis per block
    #[inline]
    pub const fn new(voxel_size: f32, voxels_per_side: u32) -> Self {
        Self {
            voxel_size,
            voxels_per_side,
        }
    }

    /// Total number of voxels per block (voxels_per_side³).
    #[inline]
    pub const fn voxels_per_block(&self) -> usize {
        (self.voxels_per_side as usize)
            * (self.voxels_per_side as usize)
            * (self.voxels_per_side as usize)
    }

    /// Size of each block in world units.
    #[inline]
    pub fn block_size(&self) -> f32 {
        self.voxels_per_side as f32 * self.voxel_size
    }

    /// Check that the configuration describes a usable grid.
    pub fn validate(&self) -> Result<()> {
        if !self.voxel_size.is_finite() || self.voxel_size <= 0.0 {
            return Err(LayerError::InvalidVoxelSize {
                value: self.voxel_size,
            });
        }
        if self.voxels_per_side < 2 {
            return Err(LayerError::InvalidVoxelsPerSide {
                value: self.voxels_per_side,
            });
        }
        Ok(())
    }
}

impl core::fmt::Display for LayerConfig {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(
            f,
            "voxel_size={} voxels_per_side={}",
            self.voxel_size, self.voxels_per_side
        )
    }
}

impl Default for LayerConfig {
    fn default() -> Self {
        Self {
            voxel_size: 0.1,
            voxels_per_side: 16,
        }
    }
}
