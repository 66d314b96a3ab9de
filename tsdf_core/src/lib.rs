//! # tsdf_core
//!
//! Pure algorithms for meshing blocked truncated signed distance fields.
//!
//! This crate holds the storage-free pieces: value types, voxel payloads,
//! block/voxel coordinate math, and the marching cubes triangulator with its
//! lookup tables. Grid storage lives in `tsdf_io`; the parallel integrator
//! lives in `tsdf_mesh`.
//!
//! ## Feature Flags
//!
//! - `std` (default): Enables standard library support
//!
//! ## Modules
//!
//! - [`types`]: Core data types (Point3, BlockIndex, VoxelIndex, Color, VertexId)
//! - [`voxel`]: Voxel payloads (TsdfVoxel, VertexVoxel, SemanticVoxel)
//! - [`coords`]: Coordinate conversion functions
//! - [`traits`]: Output abstraction for the triangulator (MeshBuffer)
//! - [`marching_cubes`]: Per-cube triangulation and lookup tables
//!
//! ## Usage
//!
//! ```ignore
//! use tsdf_core::prelude::*;
//!
//! let (block, voxel) = decompose_point(Point3::new(0.25, 0.5, 0.75), 0.1, 16);
//! let emitted = mesh_cube(&sample, &mut next_index, &mut mesh, &mut cache);
//! ```

#![cfg_attr(not(feature = "std"), no_std)]
#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod coords;
pub mod marching_cubes;
pub mod traits;
pub mod types;
pub mod voxel;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::coords::{
        block_origin, decompose_point, neighbor_block_index, voxel_coordinates,
        voxel_index_from_point,
    };
    pub use crate::marching_cubes::{cube_configuration, interpolate_vertex, mesh_cube, CubeSample};
    pub use crate::traits::MeshBuffer;
    pub use crate::types::{BlockIndex, Color, Point3, VertexId, VoxelIndex, NO_VERTEX};
    pub use crate::voxel::{SemanticVoxel, TsdfVoxel, VertexVoxel};
}

pub use coords::{
    block_origin, decompose_point, neighbor_block_index, voxel_coordinates, voxel_index_from_point,
};
pub use marching_cubes::{cube_configuration, interpolate_vertex, mesh_cube, CubeSample};
pub use traits::MeshBuffer;
pub use types::{BlockIndex, Color, Point3, VertexId, VoxelIndex, NO_VERTEX};
pub use voxel::{SemanticVoxel, TsdfVoxel, VertexVoxel};
