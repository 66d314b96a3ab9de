//! Cube sampling from TSDF blocks.
//!
//! A cube is anchored at a voxel and spans it and its +x/+y/+z neighbors, in
//! the corner order of [`CORNER_OFFSETS`]. Sampling fails (returns `None`)
//! whenever any corner is unobserved, so a cube yields either a full surface
//! patch or nothing.

use tsdf_core::marching_cubes::{CubeSample, CORNER_OFFSETS};
use tsdf_core::{coords, Point3, TsdfVoxel, VoxelIndex};
use tsdf_io::{Block, Layer};

/// Sample a cube whose 8 corners all lie in `block`.
///
/// `anchor` must be below `voxels_per_side - 1` on every axis. Every corner
/// gets a vertex-cache slot.
pub fn sample_interior(
    block: &Block<TsdfVoxel>,
    anchor: VoxelIndex,
    min_weight: f32,
) -> Option<CubeSample> {
    let vps = block.voxels_per_side();
    let origin = block.voxel_coordinates(anchor);
    let mut sample = CubeSample::default();

    for (i, offset) in CORNER_OFFSETS.iter().enumerate() {
        let corner = anchor + VoxelIndex::from(*offset);
        let voxel = block.voxel(corner)?;
        sample.distances[i] = voxel.sdf_if_valid(min_weight)?;
        sample.coords[i] = corner_coordinates(origin, offset, block.voxel_size());
        sample.cache_slots[i] = Some(corner.linear_index(vps));
    }

    Some(sample)
}

/// Sample a cube that may straddle the +x/+y/+z faces of `block`.
///
/// Corners past a face are read from the neighboring block in `layer`. If
/// that block is not allocated the cube is skipped. Neighbor corners get no
/// vertex-cache slot, so vertices on their edges are not shared.
pub fn sample_border(
    layer: &Layer<TsdfVoxel>,
    block: &Block<TsdfVoxel>,
    anchor: VoxelIndex,
    min_weight: f32,
) -> Option<CubeSample> {
    let vps = block.voxels_per_side();
    let origin = block.voxel_coordinates(anchor);
    let mut sample = CubeSample::default();

    for (i, offset) in CORNER_OFFSETS.iter().enumerate() {
        let corner = anchor + VoxelIndex::from(*offset);

        let voxel = if corner.is_within(vps) {
            sample.cache_slots[i] = Some(corner.linear_index(vps));
            block.voxel(corner)?
        } else {
            let (neighbor, local) = coords::neighbor_block_index(block.index(), corner, vps);
            layer.block(neighbor)?.voxel(local)?
        };

        sample.distances[i] = voxel.sdf_if_valid(min_weight)?;
        sample.coords[i] = corner_coordinates(origin, offset, block.voxel_size());
    }

    Some(sample)
}

#[inline]
fn corner_coordinates(origin: Point3, offset: &[i32; 3], voxel_size: f32) -> Point3 {
    origin
        + Point3::new(
            offset[0] as f32 * voxel_size,
            offset[1] as f32 * voxel_size,
            offset[2] as f32 * voxel_size,
        )
}

#[cfg(test)]
mod tests {
    use super::*;
    use tsdf_core::BlockIndex;
    use tsdf_io::LayerConfig;

    fn plane_layer(indices: &[BlockIndex], weight: f32) -> Layer<TsdfVoxel> {
        let mut layer = Layer::new(LayerConfig::new(0.5, 4)).unwrap();
        for &index in indices {
            let block = layer.allocate_block(index);
            for linear in 0..64 {
                let center = block.voxel_coordinates(VoxelIndex::from_linear_index(linear, 4));
                block.voxels_mut()[linear] = TsdfVoxel::new(center.x - 1.0, weight);
            }
        }
        layer
    }

    #[test]
    fn test_interior_sample() {
        let layer = plane_layer(&[BlockIndex::new(0, 0, 0)], 1.0);
        let block = layer.block(BlockIndex::new(0, 0, 0)).unwrap();

        let sample = sample_interior(block, VoxelIndex::new(1, 0, 2), 0.5).unwrap();

        // anchor center at x = 0.75; corners 1, 2, 5, 6 step +x to 1.25
        assert!((sample.coords[0].x - 0.75).abs() < 1e-6);
        assert!((sample.coords[6].x - 1.25).abs() < 1e-6);
        assert!((sample.coords[6].z - 1.75).abs() < 1e-6);
        assert!((sample.distances[0] + 0.25).abs() < 1e-6);
        assert!((sample.distances[1] - 0.25).abs() < 1e-6);
        assert_eq!(sample.cache_slots[0], Some(1 + 2 * 16));
        assert!(sample.cache_slots.iter().all(Option::is_some));
    }

    #[test]
    fn test_interior_sample_rejects_low_weight() {
        let mut layer = plane_layer(&[BlockIndex::new(0, 0, 0)], 1.0);
        let block = layer.block_mut(BlockIndex::new(0, 0, 0)).unwrap();
        block.voxel_mut(VoxelIndex::new(1, 1, 1)).unwrap().weight = 0.1;
        let block = layer.block(BlockIndex::new(0, 0, 0)).unwrap();

        assert!(sample_interior(block, VoxelIndex::new(0, 0, 0), 0.5).is_none());
        assert!(sample_interior(block, VoxelIndex::new(1, 1, 1), 0.5).is_none());
        assert!(sample_interior(block, VoxelIndex::new(2, 2, 2), 0.5).is_some());
    }

    #[test]
    fn test_border_sample_reads_neighbor() {
        let layer = plane_layer(&[BlockIndex::new(0, 0, 0), BlockIndex::new(1, 0, 0)], 1.0);
        let block = layer.block(BlockIndex::new(0, 0, 0)).unwrap();

        let sample = sample_border(&layer, block, VoxelIndex::new(3, 1, 1), 0.5).unwrap();

        // x corners straddle the face at x = 2.0
        assert!((sample.coords[1].x - 2.25).abs() < 1e-6);
        assert!((sample.distances[1] - 1.25).abs() < 1e-6);
        assert!(sample.cache_slots[0].is_some());
        assert!(sample.cache_slots[1].is_none());
        assert!(sample.cache_slots[3].is_some());
        assert!(sample.cache_slots[6].is_none());
    }

    #[test]
    fn test_border_sample_skips_missing_neighbor() {
        let layer = plane_layer(&[BlockIndex::new(0, 0, 0)], 1.0);
        let block = layer.block(BlockIndex::new(0, 0, 0)).unwrap();

        assert!(sample_border(&layer, block, VoxelIndex::new(3, 0, 0), 0.5).is_none());
        assert!(sample_border(&layer, block, VoxelIndex::new(0, 3, 0), 0.5).is_none());
    }

    #[test]
    fn test_border_sample_rejects_low_weight_neighbor() {
        let mut layer = plane_layer(&[BlockIndex::new(0, 0, 0), BlockIndex::new(0, 0, 1)], 1.0);
        layer
            .block_mut(BlockIndex::new(0, 0, 1))
            .unwrap()
            .voxel_mut(VoxelIndex::new(1, 1, 0))
            .unwrap()
            .weight = 0.0;
        let block = layer.block(BlockIndex::new(0, 0, 0)).unwrap();

        assert!(sample_border(&layer, block, VoxelIndex::new(1, 1, 3), 0.5).is_none());
        assert!(sample_border(&layer, block, VoxelIndex::new(2, 2, 3), 0.5).is_some());
    }
}
