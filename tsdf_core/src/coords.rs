//! Coordinate mathematics for the blocked voxel grid.
//!
//! Voxel coordinates refer to voxel centers: the voxel at local index `i` of
//! block `b` sits at `origin(b) + (i + 0.5) * voxel_size`. Marching-cubes
//! corners are voxel centers, so a cube anchored at voxel `i` spans the
//! centers of `i` and `i + 1` on every axis.

use crate::types::{BlockIndex, Point3, VoxelIndex};

/// Slack added before flooring so that points lying exactly on a grid plane
/// land on the upper side despite float noise.
pub const COORDINATE_EPSILON: f32 = 1e-6;

/// World-space origin (minimum corner) of a block.
#[inline]
pub fn block_origin(block: BlockIndex, block_size: f32) -> Point3 {
    Point3::new(
        block.x as f32 * block_size,
        block.y as f32 * block_size,
        block.z as f32 * block_size,
    )
}

/// World-space center of a voxel given its block and local index.
///
/// The index does not need to be inside the block; an index one past the
/// face yields the center of the first voxel in the neighbor block.
#[inline]
pub fn voxel_coordinates(
    block: BlockIndex,
    voxel: VoxelIndex,
    voxel_size: f32,
    voxels_per_side: u32,
) -> Point3 {
    let origin = block_origin(block, voxel_size * voxels_per_side as f32);
    Point3::new(
        origin.x + (voxel.x as f32 + 0.5) * voxel_size,
        origin.y + (voxel.y as f32 + 0.5) * voxel_size,
        origin.z + (voxel.z as f32 + 0.5) * voxel_size,
    )
}

/// Block-local voxel index whose cell contains `point`.
///
/// The result is NOT clamped; callers check it with
/// [`VoxelIndex::is_within`] and fall back to a neighbor lookup otherwise.
#[inline]
pub fn voxel_index_from_point(
    block: BlockIndex,
    point: Point3,
    voxel_size: f32,
    voxels_per_side: u32,
) -> VoxelIndex {
    let origin = block_origin(block, voxel_size * voxels_per_side as f32);
    let inv = 1.0 / voxel_size;
    VoxelIndex::new(
        libm::floorf((point.x - origin.x) * inv + COORDINATE_EPSILON) as i32,
        libm::floorf((point.y - origin.y) * inv + COORDINATE_EPSILON) as i32,
        libm::floorf((point.z - origin.z) * inv + COORDINATE_EPSILON) as i32,
    )
}

/// Decompose a world-space point into the block and in-block voxel containing it.
///
/// Works on the global voxel lattice so negative coordinates and points on
/// block faces resolve consistently.
#[inline]
pub fn decompose_point(
    point: Point3,
    voxel_size: f32,
    voxels_per_side: u32,
) -> (BlockIndex, VoxelIndex) {
    let vps = voxels_per_side as i32;
    let inv = 1.0 / voxel_size;
    let gx = libm::floorf(point.x * inv + COORDINATE_EPSILON) as i32;
    let gy = libm::floorf(point.y * inv + COORDINATE_EPSILON) as i32;
    let gz = libm::floorf(point.z * inv + COORDINATE_EPSILON) as i32;

    (
        BlockIndex::new(
            euclidean_div(gx, vps),
            euclidean_div(gy, vps),
            euclidean_div(gz, vps),
        ),
        VoxelIndex::new(
            euclidean_rem(gx, vps),
            euclidean_rem(gy, vps),
            euclidean_rem(gz, vps),
        ),
    )
}

/// Remap a voxel index that may lie outside `block` into the block that owns it.
///
/// Each out-of-range component is shifted by `voxels_per_side` and the block
/// offset is adjusted by one in that direction. Indices already inside the
/// block come back unchanged with the same block.
#[inline]
pub fn neighbor_block_index(
    block: BlockIndex,
    voxel: VoxelIndex,
    voxels_per_side: u32,
) -> (BlockIndex, VoxelIndex) {
    let vps = voxels_per_side as i32;
    let mut offset = [0i32; 3];
    let mut local = voxel.as_array();

    for axis in 0..3 {
        if local[axis] < 0 {
            offset[axis] = -1;
            local[axis] += vps;
        } else if local[axis] >= vps {
            offset[axis] = 1;
            local[axis] -= vps;
        }
    }

    (block + BlockIndex::from(offset), VoxelIndex::from(local))
}

/// Euclidean division that rounds toward negative infinity.
#[inline]
const fn euclidean_div(a: i32, b: i32) -> i32 {
    let q = a / b;
    let r = a % b;
    if (r < 0 && b > 0) || (r > 0 && b < 0) {
        q - 1
    } else {
        q
    }
}

/// Euclidean remainder (always non-negative when divisor is positive).
#[inline]
const fn euclidean_rem(a: i32, b: i32) -> i32 {
    let r = a % b;
    if r < 0 {
        r + b.abs()
    } else {
        r
    }
}
