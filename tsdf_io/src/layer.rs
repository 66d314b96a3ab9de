//! Layer<V> - sparse map of dense voxel blocks.
//!
//! A layer covers unbounded space with blocks allocated on demand. Lookups by
//! block index are O(1); lookups by world point decompose the point onto the
//! global voxel lattice first.

use std::collections::HashMap;

use tsdf_core::{coords, BlockIndex, Point3};

use crate::block::Block;
use crate::config::LayerConfig;
use crate::error::Result;
use crate::update::Update;

/// Sparse voxel layer with one payload type `V` per voxel.
///
/// # Architecture
///
/// 1. **Sparse level**: hash map from block index to block
/// 2. **Dense level**: each block owns a flat `Vec<V>` of its voxels
#[derive(Debug, Clone)]
pub struct Layer<V> {
    config: LayerConfig,
    blocks: HashMap<BlockIndex, Block<V>>,
}

impl<V> Layer<V> {
    /// Create an empty layer.
    ///
    /// Fails if `config` does not validate.
    pub fn new(config: LayerConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            blocks: HashMap::new(),
        })
    }

    /// Get the layer configuration.
    #[inline]
    pub fn config(&self) -> &LayerConfig {
        &self.config
    }

    /// World units per voxel.
    #[inline]
    pub fn voxel_size(&self) -> f32 {
        self.config.voxel_size
    }

    /// Voxels per axis per block.
    #[inline]
    pub fn voxels_per_side(&self) -> u32 {
        self.config.voxels_per_side
    }

    /// World units per block edge.
    #[inline]
    pub fn block_size(&self) -> f32 {
        self.config.block_size()
    }

    /// Get the number of allocated blocks.
    #[inline]
    pub fn num_blocks(&self) -> usize {
        self.blocks.len()
    }

    /// Check if a block exists at the given index.
    #[inline]
    pub fn has_block(&self, index: BlockIndex) -> bool {
        self.blocks.contains_key(&index)
    }

    /// Block at `index`, if allocated.
    #[inline]
    pub fn block(&self, index: BlockIndex) -> Option<&Block<V>> {
        self.blocks.get(&index)
    }

    /// Mutable block at `index`, if allocated.
    #[inline]
    pub fn block_mut(&mut self, index: BlockIndex) -> Option<&mut Block<V>> {
        self.blocks.get_mut(&index)
    }

    /// Remove the block at `index`, returning it if it was allocated.
    pub fn remove_block(&mut self, index: BlockIndex) -> Option<Block<V>> {
        self.blocks.remove(&index)
    }

    /// Drop every block.
    pub fn clear(&mut self) {
        self.blocks.clear();
    }

    /// Indices of all allocated blocks, in no particular order.
    pub fn allocated_blocks(&self) -> Vec<BlockIndex> {
        self.blocks.keys().copied().collect()
    }

    /// Indices of all blocks with the `kind` update flag set.
    pub fn updated_blocks(&self, kind: Update) -> Vec<BlockIndex> {
        self.blocks
            .iter()
            .filter(|(_, block)| block.is_updated(kind))
            .map(|(index, _)| *index)
            .collect()
    }

    /// Iterate over all blocks.
    pub fn iter(&self) -> impl Iterator<Item = (&BlockIndex, &Block<V>)> {
        self.blocks.iter()
    }

    /// Iterate mutably over all blocks.
    ///
    /// Each yielded block is a disjoint borrow, so callers can hand blocks
    /// to different workers.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (&BlockIndex, &mut Block<V>)> {
        self.blocks.iter_mut()
    }

    /// Index of the block containing `point`.
    #[inline]
    pub fn block_index_from_coordinates(&self, point: Point3) -> BlockIndex {
        coords::decompose_point(point, self.config.voxel_size, self.config.voxels_per_side).0
    }

    /// Block containing `point`, if allocated.
    #[inline]
    pub fn block_by_coordinates(&self, point: Point3) -> Option<&Block<V>> {
        self.block(self.block_index_from_coordinates(point))
    }

    /// Voxel containing `point`, if its block is allocated.
    pub fn voxel_by_coordinates(&self, point: Point3) -> Option<&V> {
        let (block, voxel) =
            coords::decompose_point(point, self.config.voxel_size, self.config.voxels_per_side);
        self.block(block)?.voxel(voxel)
    }
}

impl<V: Default + Clone> Layer<V> {
    /// Get the block at `index`, allocating a default-filled one if missing.
    pub fn allocate_block(&mut self, index: BlockIndex) -> &mut Block<V> {
        let config = self.config;
        self.blocks
            .entry(index)
            .or_insert_with(|| Block::new(index, config))
    }

    /// Mutable voxel containing `point`, allocating its block if missing.
    pub fn allocate_voxel_by_coordinates(&mut self, point: Point3) -> &mut V {
        let (block, voxel) =
            coords::decompose_point(point, self.config.voxel_size, self.config.voxels_per_side);
        let linear = voxel.linear_index(self.config.voxels_per_side);
        &mut self.allocate_block(block).voxels_mut()[linear]
    }
}
