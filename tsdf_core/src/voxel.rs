//! Voxel payloads stored in the TSDF, vertex-cache, and semantic layers.

use crate::types::{Color, VertexId, NO_VERTEX};

/// Signed distance, confidence weight, and observed color of one voxel.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TsdfVoxel {
    /// Truncated signed distance to the nearest surface (negative inside).
    pub distance: f32,
    /// Observation weight. Zero means never observed.
    pub weight: f32,
    /// Fused surface color.
    pub color: Color,
}

impl TsdfVoxel {
    /// Create a voxel with the given distance and weight and no color.
    #[inline]
    pub const fn new(distance: f32, weight: f32) -> Self {
        Self {
            distance,
            weight,
            color: Color::new(0, 0, 0, 0),
        }
    }

    /// Whether this voxel has been observed confidently enough to be used.
    #[inline]
    pub fn is_valid(&self, min_weight: f32) -> bool {
        self.weight >= min_weight
    }

    /// The signed distance, or `None` when the weight is below `min_weight`.
    #[inline]
    pub fn sdf_if_valid(&self, min_weight: f32) -> Option<f32> {
        self.is_valid(min_weight).then_some(self.distance)
    }

    /// The color, or `None` when the weight is below `min_weight`.
    #[inline]
    pub fn color_if_valid(&self, min_weight: f32) -> Option<Color> {
        self.is_valid(min_weight).then_some(self.color)
    }
}

/// Vertex-cache entry for one lattice point.
///
/// A lattice point owns the three lattice edges that leave it along +x, +y
/// and +z. `edge_vertices[axis]` holds the id of the mesh vertex already
/// emitted on that edge during the current meshing pass. `on_surface` and
/// `vertex_id` record the first vertex emitted on any owned edge, which is
/// what downstream consumers use as the point's nearest surface vertex.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VertexVoxel {
    /// At least one owned edge carries an emitted vertex.
    pub on_surface: bool,
    /// First vertex emitted on an owned edge. Meaningful only if `on_surface`.
    pub vertex_id: VertexId,
    edge_vertices: [VertexId; 3],
}

impl Default for VertexVoxel {
    fn default() -> Self {
        Self {
            on_surface: false,
            vertex_id: NO_VERTEX,
            edge_vertices: [NO_VERTEX; 3],
        }
    }
}

impl VertexVoxel {
    /// Forget every cached vertex.
    #[inline]
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Cached vertex on the owned edge along `axis`, if any.
    #[inline]
    pub fn edge_vertex(&self, axis: usize) -> Option<VertexId> {
        if !self.on_surface {
            return None;
        }
        let id = self.edge_vertices[axis];
        (id != NO_VERTEX).then_some(id)
    }

    /// Record `id` as the vertex on the owned edge along `axis`.
    #[inline]
    pub fn set_edge_vertex(&mut self, axis: usize, id: VertexId) {
        self.edge_vertices[axis] = id;
        if !self.on_surface {
            self.on_surface = true;
            self.vertex_id = id;
        }
    }

    /// Number of owned edges carrying a cached vertex.
    #[inline]
    pub fn num_cached_vertices(&self) -> usize {
        self.edge_vertices.iter().filter(|&&id| id != NO_VERTEX).count()
    }
}

/// Semantic category of one voxel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct SemanticVoxel {
    /// Category id. Zero is "unknown".
    pub label: u32,
}

impl SemanticVoxel {
    /// Create a voxel carrying `label`.
    #[inline]
    pub const fn new(label: u32) -> Self {
        Self { label }
    }
}
