//! tsdf_io - sparse block-partitioned voxel storage.
//!
//! This crate provides the storage layer for TSDF meshing: a [`Layer<V>`] is
//! an unbounded sparse map from [`BlockIndex`] to dense [`Block<V>`]s of
//! voxels, all partitioned by one [`LayerConfig`]. Blocks carry
//! [`UpdateFlags`] so downstream consumers can process only what changed.
//!
//! # Core Types
//!
//! - [`LayerConfig`]: Voxel size and voxels per block side
//! - [`Block<V>`]: Dense cube of voxels with update flags
//! - [`Layer<V>`]: Sparse map of blocks with point lookup
//! - [`Update`] / [`UpdateFlags`]: Per-consumer change tracking
//!
//! # Example
//!
//! ```ignore
//! use tsdf_io::{Layer, LayerConfig, TsdfVoxel, Update};
//!
//! let mut tsdf: Layer<TsdfVoxel> = Layer::new(LayerConfig::new(0.05, 16))?;
//! let block = tsdf.allocate_block(BlockIndex::new(0, 0, 0));
//! block.voxels_mut()[0] = TsdfVoxel::new(-0.02, 1.0);
//! block.set_updated_all();
//!
//! for index in tsdf.updated_blocks(Update::Mesh) {
//!     // remesh `index`
//! }
//! ```

pub mod block;
pub mod config;
pub mod error;
pub mod layer;
pub mod update;

// Re-export core types from tsdf_core
pub use tsdf_core::{
    BlockIndex, Color, Point3, SemanticVoxel, TsdfVoxel, VertexVoxel, VoxelIndex,
};

pub use block::Block;
pub use config::LayerConfig;
pub use error::{LayerError, Result};
pub use layer::Layer;
pub use update::{Update, UpdateFlags};
