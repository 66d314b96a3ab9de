//! # tsdf_mesh
//!
//! Incremental, block-parallel surface extraction for sparse TSDF maps.
//!
//! This crate turns the signed distances of a [`VolumetricMap`] into one
//! indexed triangle mesh per block, re-extracting only the blocks that
//! changed. It is designed for:
//!
//! - **Incremental updates**: remesh just the blocks flagged by fusion
//! - **Parallelism**: one task per block on a fixed worker pool
//! - **Shared vertices**: vertices reused across cubes inside a block
//! - **Robustness**: unobserved voxels and missing neighbors only leave holes
//!
//! ## Quick Start
//!
//! ```ignore
//! use tsdf_mesh::{MapBuilder, MeshIntegrator, MeshIntegratorConfig};
//! use tsdf_core::{BlockIndex, Point3, TsdfVoxel};
//!
//! let center = Point3::splat(0.8);
//! let mut map = MapBuilder::new(0.1, 16)
//!     .add_block_range(BlockIndex::new(0, 0, 0), BlockIndex::new(1, 1, 1), move |pos| {
//!         TsdfVoxel::new((pos - center).length() - 0.5, 1.0)
//!     })
//!     .build()?;
//!
//! let integrator = MeshIntegrator::new(MeshIntegratorConfig::default())?;
//! let stats = integrator.generate_mesh(&mut map, true, true)?;
//! println!("{} triangles", stats.triangle_count);
//! ```
//!
//! ## Architecture
//!
//! - [`VolumetricMap`]: TSDF, vertex-cache, mesh and optional semantic layers
//!   with one shared partitioning
//! - [`MeshIntegrator`]: block selection and the interior, exterior and
//!   color phases
//! - [`MeshLayer`] / [`MeshBlock`]: per-block vertices, triangles, colors and
//!   labels
//!
//! Vertices on block seams are emitted by each block separately; the mesh
//! is watertight within a block and may carry duplicates across blocks.

#![warn(missing_docs)]
#![warn(clippy::all)]

mod builder;
mod config;
mod error;
mod integrator;
mod io;
mod map;
mod mesh;
pub mod sampler;

pub use builder::MapBuilder;
pub use config::MeshIntegratorConfig;
pub use error::{MeshError, Result};
pub use integrator::MeshIntegrator;
pub use io::{export_obj, export_obj_to_file};
pub use map::VolumetricMap;
pub use mesh::{MeshBlock, MeshLayer, MeshStats};

// Re-export types from tsdf_io
pub use tsdf_io::{Block, Layer, LayerConfig, Update, UpdateFlags};

// Re-export tsdf_core types for convenience
pub use tsdf_core::{
    BlockIndex, Color, Point3, SemanticVoxel, TsdfVoxel, VertexId, VertexVoxel, VoxelIndex,
};

/// Prelude module for convenient imports.
///
/// ```ignore
/// use tsdf_mesh::prelude::*;
/// ```
pub mod prelude {
    pub use crate::builder::MapBuilder;
    pub use crate::config::MeshIntegratorConfig;
    pub use crate::error::{MeshError, Result};
    pub use crate::integrator::MeshIntegrator;
    pub use crate::map::VolumetricMap;
    pub use crate::mesh::{MeshBlock, MeshLayer, MeshStats};

    pub use tsdf_core::{BlockIndex, Color, Point3, TsdfVoxel, VoxelIndex};
    pub use tsdf_io::Update;
}
