//! Per-block triangle meshes and the layer that owns them.

use std::collections::HashMap;

use tsdf_core::{BlockIndex, Color, MeshBuffer, Point3, VertexId};
use tsdf_io::LayerConfig;

use crate::error::Result;

/// Indexed triangle mesh of one block.
///
/// `indices` holds vertex-id triples; every id refers to this block's own
/// `vertices`. `colors` and `labels` run parallel to `vertices` once the
/// block has been painted.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeshBlock {
    /// Vertex positions in world coordinates.
    pub vertices: Vec<Point3>,
    /// Flat triangle list, three ids per triangle.
    pub indices: Vec<VertexId>,
    /// One color per vertex.
    pub colors: Vec<Color>,
    /// One semantic label per vertex, present when semantics are enabled.
    pub labels: Option<Vec<u32>>,
    /// Fresh geometry since downstream consumers last looked.
    pub updated: bool,
}

impl MeshBlock {
    /// Create an empty mesh, with a label sequence if `with_semantics`.
    pub fn new(with_semantics: bool) -> Self {
        Self {
            labels: with_semantics.then(Vec::new),
            ..Self::default()
        }
    }

    /// Drop all geometry, colors and labels. Keeps semantics enabled.
    pub fn clear(&mut self) {
        self.vertices.clear();
        self.indices.clear();
        self.colors.clear();
        if let Some(labels) = self.labels.as_mut() {
            labels.clear();
        }
        self.updated = false;
    }

    /// Number of triangles.
    #[inline]
    pub fn num_triangles(&self) -> usize {
        self.indices.len() / 3
    }

    /// Whether the block carries no geometry.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// Iterate over triangles as id triples.
    pub fn triangles(&self) -> impl Iterator<Item = [VertexId; 3]> + '_ {
        self.indices.chunks_exact(3).map(|t| [t[0], t[1], t[2]])
    }
}

impl MeshBuffer for MeshBlock {
    #[inline]
    fn num_vertices(&self) -> usize {
        self.vertices.len()
    }

    #[inline]
    fn push_vertex(&mut self, vertex: Point3) {
        self.vertices.push(vertex);
    }

    #[inline]
    fn push_triangle(&mut self, triangle: [VertexId; 3]) {
        self.indices.extend_from_slice(&triangle);
    }
}

/// Sparse map of per-block meshes sharing the TSDF layer's partitioning.
///
/// A mesh block lives until it is removed or the layer is cleared; it is not
/// tied to the lifetime of the TSDF block it was extracted from.
#[derive(Debug, Clone)]
pub struct MeshLayer {
    config: LayerConfig,
    blocks: HashMap<BlockIndex, MeshBlock>,
}

impl MeshLayer {
    /// Create an empty mesh layer.
    pub fn new(config: LayerConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            blocks: HashMap::new(),
        })
    }

    /// Partitioning parameters.
    #[inline]
    pub fn config(&self) -> &LayerConfig {
        &self.config
    }

    /// Number of mesh blocks.
    #[inline]
    pub fn num_blocks(&self) -> usize {
        self.blocks.len()
    }

    /// Check if a mesh block exists at `index`.
    #[inline]
    pub fn has_block(&self, index: BlockIndex) -> bool {
        self.blocks.contains_key(&index)
    }

    /// Mesh block at `index`, if allocated.
    #[inline]
    pub fn block(&self, index: BlockIndex) -> Option<&MeshBlock> {
        self.blocks.get(&index)
    }

    /// Mutable mesh block at `index`, if allocated.
    #[inline]
    pub fn block_mut(&mut self, index: BlockIndex) -> Option<&mut MeshBlock> {
        self.blocks.get_mut(&index)
    }

    /// Get the mesh block at `index`, creating an empty one if missing.
    ///
    /// An existing block gains a label sequence if `with_semantics` is set
    /// and it had none.
    pub fn allocate_block(&mut self, index: BlockIndex, with_semantics: bool) -> &mut MeshBlock {
        let block = self
            .blocks
            .entry(index)
            .or_insert_with(|| MeshBlock::new(with_semantics));
        if with_semantics && block.labels.is_none() {
            block.labels = Some(vec![0; block.vertices.len()]);
        }
        block
    }

    /// Remove the mesh block at `index`.
    pub fn remove_block(&mut self, index: BlockIndex) -> Option<MeshBlock> {
        self.blocks.remove(&index)
    }

    /// Drop every mesh block.
    pub fn clear(&mut self) {
        self.blocks.clear();
    }

    /// Indices of all mesh blocks.
    pub fn allocated_blocks(&self) -> Vec<BlockIndex> {
        self.blocks.keys().copied().collect()
    }

    /// Indices of mesh blocks with fresh geometry.
    pub fn updated_blocks(&self) -> Vec<BlockIndex> {
        self.blocks
            .iter()
            .filter(|(_, block)| block.updated)
            .map(|(index, _)| *index)
            .collect()
    }

    /// Mark every mesh block as consumed.
    pub fn clear_updated_flags(&mut self) {
        for block in self.blocks.values_mut() {
            block.updated = false;
        }
    }

    /// Iterate over all mesh blocks.
    pub fn iter(&self) -> impl Iterator<Item = (&BlockIndex, &MeshBlock)> {
        self.blocks.iter()
    }

    /// Iterate mutably over all mesh blocks. Yields disjoint borrows.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (&BlockIndex, &mut MeshBlock)> {
        self.blocks.iter_mut()
    }

    /// Concatenate every block into one mesh.
    ///
    /// Blocks are appended in ascending block-index order and their triangle
    /// ids are offset accordingly. Labels are present if any block has them;
    /// blocks without labels contribute zeros.
    pub fn combined_mesh(&self) -> MeshBlock {
        let mut order: Vec<&BlockIndex> = self.blocks.keys().collect();
        order.sort();

        let with_labels = self.blocks.values().any(|b| b.labels.is_some());
        let mut combined = MeshBlock::new(with_labels);

        for index in order {
            let block = &self.blocks[index];
            let offset = combined.vertices.len() as VertexId;

            combined.vertices.extend_from_slice(&block.vertices);
            combined
                .indices
                .extend(block.indices.iter().map(|&id| id + offset));

            combined.colors.extend_from_slice(&block.colors);
            combined
                .colors
                .resize(combined.vertices.len(), Color::default());

            if let Some(labels) = combined.labels.as_mut() {
                if let Some(block_labels) = block.labels.as_ref() {
                    labels.extend_from_slice(block_labels);
                }
                labels.resize(combined.vertices.len(), 0);
            }
        }

        combined
    }
}

/// Mesh statistics.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MeshStats {
    /// Total number of blocks counted.
    pub block_count: usize,
    /// Total number of triangles.
    pub triangle_count: usize,
    /// Total number of vertices.
    pub vertex_count: usize,
    /// Approximate surface area (sum of triangle areas).
    pub surface_area: f32,
    /// Bounding box minimum. `f32::MAX` on every axis for an empty mesh.
    pub bbox_min: Point3,
    /// Bounding box maximum. `f32::MIN` on every axis for an empty mesh.
    pub bbox_max: Point3,
}

impl Default for MeshStats {
    fn default() -> Self {
        Self {
            block_count: 0,
            triangle_count: 0,
            vertex_count: 0,
            surface_area: 0.0,
            bbox_min: Point3::splat(f32::MAX),
            bbox_max: Point3::splat(f32::MIN),
        }
    }
}

impl MeshStats {
    /// Compute statistics from a set of mesh blocks.
    pub fn from_blocks<'a>(blocks: impl IntoIterator<Item = &'a MeshBlock>) -> Self {
        let mut stats = Self::default();
        for block in blocks {
            stats.accumulate(block);
        }
        stats
    }

    /// Compute statistics over every block of a mesh layer.
    pub fn from_mesh_layer(layer: &MeshLayer) -> Self {
        Self::from_blocks(layer.blocks.values())
    }

    /// Whether no triangles were counted.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.triangle_count == 0
    }

    fn accumulate(&mut self, block: &MeshBlock) {
        self.block_count += 1;
        self.vertex_count += block.vertices.len();
        self.triangle_count += block.num_triangles();

        for &v in &block.vertices {
            self.bbox_min = self.bbox_min.min(v);
            self.bbox_max = self.bbox_max.max(v);
        }

        for [a, b, c] in block.triangles() {
            let (p0, p1, p2) = (
                block.vertices[a as usize],
                block.vertices[b as usize],
                block.vertices[c as usize],
            );
            let cross = (p1 - p0).cross(p2 - p0);
            self.surface_area += cross.length() * 0.5;
        }
    }
}
