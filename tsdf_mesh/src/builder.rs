//! MapBuilder pattern for constructing a VolumetricMap.
//!
//! Provides a fluent API for filling TSDF and semantic blocks from closures,
//! mostly for tests, benchmarks and offline tools.

use tsdf_core::{BlockIndex, Point3, SemanticVoxel, TsdfVoxel, VoxelIndex};
use tsdf_io::LayerConfig;

use crate::error::Result;
use crate::map::VolumetricMap;

type TsdfFn<'a> = Box<dyn Fn(Point3) -> TsdfVoxel + 'a>;
type SemanticFn<'a> = Box<dyn Fn(Point3) -> SemanticVoxel + 'a>;

/// Builder for constructing [`VolumetricMap`] instances.
///
/// Every TSDF block added is marked updated for all consumers, as if a
/// fusion step had just written it.
///
/// # Example
///
/// ```ignore
/// use tsdf_mesh::MapBuilder;
/// use tsdf_core::{BlockIndex, Point3, TsdfVoxel};
///
/// let center = Point3::splat(0.8);
/// let map = MapBuilder::new(0.1, 16)
///     .add_block_fn(BlockIndex::new(0, 0, 0), |pos| {
///         TsdfVoxel::new((pos - center).length() - 0.5, 1.0)
///     })
///     .build()?;
/// ```
pub struct MapBuilder<'a> {
    config: LayerConfig,
    with_semantics: bool,
    tsdf_blocks: Vec<(BlockIndex, TsdfFn<'a>)>,
    semantic_blocks: Vec<(BlockIndex, SemanticFn<'a>)>,
}

impl<'a> MapBuilder<'a> {
    /// Create a new builder with the specified partitioning.
    ///
    /// # Arguments
    /// * `voxel_size` - Size of each voxel in world units
    /// * `voxels_per_side` - Number of voxels per axis per block
    pub fn new(voxel_size: f32, voxels_per_side: u32) -> Self {
        Self {
            config: LayerConfig::new(voxel_size, voxels_per_side),
            with_semantics: false,
            tsdf_blocks: Vec::new(),
            semantic_blocks: Vec::new(),
        }
    }

    /// Attach a semantic layer to the built map.
    pub fn with_semantics(mut self) -> Self {
        self.with_semantics = true;
        self
    }

    /// Add a TSDF block whose voxels are computed from their center position.
    ///
    /// Adding the same index twice overwrites the earlier voxels.
    pub fn add_block_fn<F>(mut self, index: BlockIndex, voxel_fn: F) -> Self
    where
        F: Fn(Point3) -> TsdfVoxel + 'a,
    {
        self.tsdf_blocks.push((index, Box::new(voxel_fn)));
        self
    }

    /// Add TSDF blocks for every index in the inclusive box `min..=max`.
    pub fn add_block_range<F>(mut self, min: BlockIndex, max: BlockIndex, voxel_fn: F) -> Self
    where
        F: Fn(Point3) -> TsdfVoxel + Clone + 'a,
    {
        for z in min.z..=max.z {
            for y in min.y..=max.y {
                for x in min.x..=max.x {
                    self = self.add_block_fn(BlockIndex::new(x, y, z), voxel_fn.clone());
                }
            }
        }
        self
    }

    /// Add a semantic block whose labels are computed from voxel centers.
    ///
    /// Implies [`with_semantics`](Self::with_semantics).
    pub fn add_semantic_block_fn<F>(mut self, index: BlockIndex, label_fn: F) -> Self
    where
        F: Fn(Point3) -> SemanticVoxel + 'a,
    {
        self.with_semantics = true;
        self.semantic_blocks.push((index, Box::new(label_fn)));
        self
    }

    /// Get the number of TSDF blocks added so far.
    pub fn num_blocks(&self) -> usize {
        self.tsdf_blocks.len()
    }

    /// Build the final map.
    ///
    /// # Errors
    /// Returns [`MeshError::Layer`](crate::MeshError::Layer) if the
    /// partitioning is invalid.
    pub fn build(self) -> Result<VolumetricMap> {
        let mut map = VolumetricMap::new(self.config, self.with_semantics)?;
        let vps = self.config.voxels_per_side;

        for (index, voxel_fn) in &self.tsdf_blocks {
            let block = map.tsdf.allocate_block(*index);
            for linear in 0..block.voxels().len() {
                let center = block.voxel_coordinates(VoxelIndex::from_linear_index(linear, vps));
                block.voxels_mut()[linear] = voxel_fn(center);
            }
            block.set_updated_all();
        }

        if let Some(semantics) = map.semantics.as_mut() {
            for (index, label_fn) in &self.semantic_blocks {
                let block = semantics.allocate_block(*index);
                for linear in 0..block.voxels().len() {
                    let center =
                        block.voxel_coordinates(VoxelIndex::from_linear_index(linear, vps));
                    block.voxels_mut()[linear] = label_fn(center);
                }
            }
        }

        Ok(map)
    }
}
