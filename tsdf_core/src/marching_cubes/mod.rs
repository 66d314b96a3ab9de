//! Marching Cubes triangulation.
//!
//! - Compile-time lookup tables for the 256 cube configurations
//! - Per-cube triangulation that shares vertices through a lattice-edge cache
//!
//! # Example
//!
//! ```ignore
//! use tsdf_core::marching_cubes::{mesh_cube, CubeSample};
//!
//! let mut next_index = mesh.num_vertices() as VertexId;
//! let emitted = mesh_cube(&sample, &mut next_index, &mut mesh, &mut vertex_cache);
//! ```

mod algorithm;
mod tables;

pub use algorithm::{cube_configuration, interpolate_vertex, mesh_cube, CubeSample};
pub use tables::{CORNER_OFFSETS, EDGE_OWNERS, EDGE_TABLE, EDGE_VERTICES, TRI_TABLE};
