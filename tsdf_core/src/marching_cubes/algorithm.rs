//! Marching cubes triangulation of a single cube with shared-vertex reuse.
//!
//! A cube is described by a [`CubeSample`]: the signed distances and world
//! coordinates of its 8 corners plus, per corner, an optional slot in the
//! owning block's vertex cache. Vertices are emitted into a [`MeshBuffer`]
//! and reused whenever the cache already holds a vertex for the lattice edge.

use crate::traits::MeshBuffer;
use crate::types::{Point3, VertexId, NO_VERTEX};
use crate::voxel::VertexVoxel;

use super::tables::{EDGE_OWNERS, EDGE_TABLE, EDGE_VERTICES, TRI_TABLE};

/// Distance differences below this are treated as equal.
const MIN_SDF_DIFFERENCE: f32 = 1e-10;

/// Corner data for one marching-cubes cube.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct CubeSample {
    /// Signed distance at each corner.
    pub distances: [f32; 8],
    /// World-space position of each corner.
    pub coords: [Point3; 8],
    /// Linear index of each corner in the current block's vertex cache, or
    /// `None` when the corner lives in a neighbor block and is not tracked.
    pub cache_slots: [Option<usize>; 8],
}

/// Interpolate the zero crossing along an edge.
///
/// Returns `p0 + v0 / (v0 - v1) * (p1 - p0)`. Equal distances fall back to
/// the midpoint.
///
/// # Arguments
/// * `p0` - Position of the first corner
/// * `p1` - Position of the second corner
/// * `v0` - Signed distance at the first corner
/// * `v1` - Signed distance at the second corner
#[inline]
pub fn interpolate_vertex(p0: Point3, p1: Point3, v0: f32, v1: f32) -> Point3 {
    let denom = v0 - v1;
    if libm::fabsf(denom) < MIN_SDF_DIFFERENCE {
        return p0.lerp(p1, 0.5);
    }

    let t = (v0 / denom).clamp(0.0, 1.0);
    p0.lerp(p1, t)
}

/// Compute the 8-bit cube configuration from corner distances.
///
/// Bit `i` is set iff corner `i` is strictly inside (`distance < 0`). A
/// distance of exactly zero counts as outside.
#[inline]
pub fn cube_configuration(distances: &[f32; 8]) -> usize {
    let mut index = 0;
    for (i, &d) in distances.iter().enumerate() {
        if d < 0.0 {
            index |= 1 << i;
        }
    }
    index
}

/// Triangulate one cube into `mesh`.
///
/// `next_index` is the id the next new vertex receives; it is advanced for
/// every vertex pushed. `cache` is the vertex cache of the block that owns
/// `mesh`; slots referenced by `sample.cache_slots` must be in range.
///
/// Returns the number of triangles emitted (0 to 5).
pub fn mesh_cube<M: MeshBuffer>(
    sample: &CubeSample,
    next_index: &mut VertexId,
    mesh: &mut M,
    cache: &mut [VertexVoxel],
) -> usize {
    let config = cube_configuration(&sample.distances);
    if EDGE_TABLE[config] == 0 {
        return 0;
    }

    // Cube-local memo so untracked edges are still shared within this cube.
    let mut edge_ids = [NO_VERTEX; 12];
    let tri_list = &TRI_TABLE[config];
    let mut count = 0;
    let mut i = 0;
    while i < 16 && tri_list[i] != -1 {
        let mut triangle = [0 as VertexId; 3];
        for (j, slot) in triangle.iter_mut().enumerate() {
            let edge = tri_list[i + j] as usize;
            *slot = edge_vertex(sample, edge, &mut edge_ids, next_index, mesh, cache);
        }
        mesh.push_triangle(triangle);
        count += 1;
        i += 3;
    }

    count
}

/// Resolve the vertex id for `edge`, emitting a new vertex if needed.
fn edge_vertex<M: MeshBuffer>(
    sample: &CubeSample,
    edge: usize,
    edge_ids: &mut [VertexId; 12],
    next_index: &mut VertexId,
    mesh: &mut M,
    cache: &mut [VertexVoxel],
) -> VertexId {
    if edge_ids[edge] != NO_VERTEX {
        return edge_ids[edge];
    }

    let (owner, axis) = EDGE_OWNERS[edge];
    let slot = sample.cache_slots[owner];
    if let Some(id) = slot.and_then(|s| cache[s].edge_vertex(axis)) {
        edge_ids[edge] = id;
        return id;
    }

    let (a, b) = EDGE_VERTICES[edge];
    let position = interpolate_vertex(
        sample.coords[a],
        sample.coords[b],
        sample.distances[a],
        sample.distances[b],
    );

    debug_assert_eq!(*next_index as usize, mesh.num_vertices());
    let id = *next_index;
    mesh.push_vertex(position);
    *next_index += 1;

    if let Some(s) = slot {
        cache[s].set_edge_vertex(axis, id);
    }
    edge_ids[edge] = id;
    id
}
