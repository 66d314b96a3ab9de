//! Dense voxel block.

use tsdf_core::{coords, BlockIndex, Point3, VoxelIndex};

use crate::config::LayerConfig;
use crate::update::{Update, UpdateFlags};

/// A cube of `voxels_per_side³` voxels stored x-fastest.
///
/// Voxel `(x, y, z)` lives at linear index `x + y * vps + z * vps * vps`.
#[derive(Debug, Clone)]
pub struct Block<V> {
    index: BlockIndex,
    config: LayerConfig,
    voxels: Vec<V>,
    updated: UpdateFlags,
}

impl<V: Default + Clone> Block<V> {
    /// Create a block filled with default voxels and no update flags.
    pub fn new(index: BlockIndex, config: LayerConfig) -> Self {
        Self {
            index,
            config,
            voxels: vec![V::default(); config.voxels_per_block()],
            updated: UpdateFlags::NONE,
        }
    }
}

impl<V> Block<V> {
    /// Position of this block in the sparse grid.
    #[inline]
    pub fn index(&self) -> BlockIndex {
        self.index
    }

    /// Partitioning parameters shared with the owning layer.
    #[inline]
    pub fn config(&self) -> &LayerConfig {
        &self.config
    }

    /// Voxels per axis.
    #[inline]
    pub fn voxels_per_side(&self) -> u32 {
        self.config.voxels_per_side
    }

    /// World units per voxel.
    #[inline]
    pub fn voxel_size(&self) -> f32 {
        self.config.voxel_size
    }

    /// World-space minimum corner of the block.
    #[inline]
    pub fn origin(&self) -> Point3 {
        coords::block_origin(self.index, self.config.block_size())
    }

    /// Voxel at a local index, or `None` outside `[0, vps)`.
    #[inline]
    pub fn voxel(&self, index: VoxelIndex) -> Option<&V> {
        if !index.is_within(self.config.voxels_per_side) {
            return None;
        }
        self.voxels.get(index.linear_index(self.config.voxels_per_side))
    }

    /// Mutable voxel at a local index, or `None` outside `[0, vps)`.
    #[inline]
    pub fn voxel_mut(&mut self, index: VoxelIndex) -> Option<&mut V> {
        if !index.is_within(self.config.voxels_per_side) {
            return None;
        }
        self.voxels.get_mut(index.linear_index(self.config.voxels_per_side))
    }

    /// All voxels in linear order.
    #[inline]
    pub fn voxels(&self) -> &[V] {
        &self.voxels
    }

    /// All voxels in linear order, mutably.
    #[inline]
    pub fn voxels_mut(&mut self) -> &mut [V] {
        &mut self.voxels
    }

    /// World-space center of a voxel of this block.
    #[inline]
    pub fn voxel_coordinates(&self, index: VoxelIndex) -> Point3 {
        coords::voxel_coordinates(
            self.index,
            index,
            self.config.voxel_size,
            self.config.voxels_per_side,
        )
    }

    /// Local index of the voxel containing `point`. Not clamped.
    #[inline]
    pub fn voxel_index_from_point(&self, point: Point3) -> VoxelIndex {
        coords::voxel_index_from_point(
            self.index,
            point,
            self.config.voxel_size,
            self.config.voxels_per_side,
        )
    }

    /// Current update flags.
    #[inline]
    pub fn updated(&self) -> UpdateFlags {
        self.updated
    }

    /// Whether `kind` has outstanding changes.
    #[inline]
    pub fn is_updated(&self, kind: Update) -> bool {
        self.updated.contains(kind)
    }

    /// Set or clear the flag for `kind`.
    #[inline]
    pub fn set_updated(&mut self, kind: Update, value: bool) {
        self.updated.set(kind, value);
    }

    /// Mark the block changed for every consumer.
    #[inline]
    pub fn set_updated_all(&mut self) {
        self.updated.set_all();
    }
}
