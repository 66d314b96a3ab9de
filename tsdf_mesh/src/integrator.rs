//! Incremental block-parallel mesh extraction.
//!
//! A remesh runs in three phases over the selected blocks, each phase one
//! task per block on the integrator's worker pool:
//!
//! 1. **Interior**: cubes whose 8 corners lie inside the block.
//! 2. **Exterior**: cubes on the block's +x/+y/+z faces, reading neighbor
//!    TSDF blocks. Starts only after every interior task has finished.
//! 3. **Color**: paints each vertex from the voxel that contains it.
//!
//! Each task holds the only mutable borrow of its block's mesh and vertex
//! cache; the TSDF and semantic layers are shared read-only.

use std::collections::{HashMap, HashSet};
use std::time::Instant;

use log::{debug, trace};
use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};

use tsdf_core::{mesh_cube, BlockIndex, Color, MeshBuffer, VertexId, VoxelIndex};
use tsdf_io::{Block, Layer, SemanticVoxel, TsdfVoxel, Update, VertexVoxel};

use crate::config::MeshIntegratorConfig;
use crate::error::{MeshError, Result};
use crate::map::VolumetricMap;
use crate::mesh::{MeshBlock, MeshStats};
use crate::sampler::{sample_border, sample_interior};

/// Extracts and maintains per-block meshes of a [`VolumetricMap`].
pub struct MeshIntegrator {
    config: MeshIntegratorConfig,
    pool: ThreadPool,
}

impl MeshIntegrator {
    /// Create an integrator with its own worker pool.
    ///
    /// # Errors
    /// - `InvalidConfig` if the configuration does not validate
    /// - `ThreadPool` if the worker threads cannot be spawned
    pub fn new(config: MeshIntegratorConfig) -> Result<Self> {
        config.validate()?;
        let pool = ThreadPoolBuilder::new()
            .num_threads(config.integrator_threads)
            .thread_name(|i| format!("mesh-integrator-{}", i))
            .build()
            .map_err(|e| MeshError::ThreadPool(e.to_string()))?;

        Ok(Self { config, pool })
    }

    /// Get the integrator configuration.
    #[inline]
    pub fn config(&self) -> &MeshIntegratorConfig {
        &self.config
    }

    /// Blocks to remesh: those with pending mesh updates if `only_updated`,
    /// otherwise every allocated TSDF block.
    pub fn select_blocks_to_mesh(&self, map: &VolumetricMap, only_updated: bool) -> Vec<BlockIndex> {
        if only_updated {
            map.tsdf.updated_blocks(Update::Mesh)
        } else {
            map.tsdf.allocated_blocks()
        }
    }

    /// Select blocks and remesh them in one call.
    pub fn generate_mesh(
        &self,
        map: &mut VolumetricMap,
        only_mesh_updated_blocks: bool,
        clear_updated_flag: bool,
    ) -> Result<MeshStats> {
        let blocks = self.select_blocks_to_mesh(map, only_mesh_updated_blocks);
        self.remesh(map, &blocks, clear_updated_flag)
    }

    /// Rebuild the meshes of `blocks` from scratch.
    ///
    /// Each block's mesh and vertex cache are allocated if missing and reset,
    /// then the interior, exterior and color phases run. If
    /// `clear_updated_flag` is set, the TSDF blocks' `Mesh` update flags are
    /// cleared afterwards. Duplicate indices are processed once.
    ///
    /// Returns statistics over the remeshed blocks.
    ///
    /// # Errors
    /// - `PartitionMismatch` if the map's layers disagree on partitioning
    /// - `MissingTsdfBlock` if a requested block has no TSDF block
    ///
    /// Both are checked before any layer is touched.
    pub fn remesh(
        &self,
        map: &mut VolumetricMap,
        blocks: &[BlockIndex],
        clear_updated_flag: bool,
    ) -> Result<MeshStats> {
        let start = Instant::now();

        map.check_partitioning()?;
        if let Some(&missing) = blocks.iter().find(|&&index| !map.tsdf.has_block(index)) {
            return Err(MeshError::missing_tsdf_block(missing));
        }
        let selected: HashSet<BlockIndex> = blocks.iter().copied().collect();

        let with_semantics = map.has_semantics();
        for &index in &selected {
            map.mesh.allocate_block(index, with_semantics).clear();
            map.vertices
                .allocate_block(index)
                .voxels_mut()
                .iter_mut()
                .for_each(VertexVoxel::reset);
        }

        let VolumetricMap {
            tsdf,
            vertices,
            mesh,
            semantics,
        } = map;

        {
            let mut jobs = collect_jobs(&selected, tsdf, vertices, mesh.iter_mut())?;
            let min_weight = self.config.min_weight;
            let tsdf = &*tsdf;
            let semantics = semantics.as_ref();

            self.pool.install(|| {
                jobs.par_iter_mut()
                    .with_max_len(1)
                    .for_each(|job| job.extract_interior(min_weight));
            });

            self.pool.install(|| {
                jobs.par_iter_mut()
                    .with_max_len(1)
                    .for_each(|job| job.extract_exterior(tsdf, min_weight));
            });

            self.pool.install(|| {
                jobs.par_iter_mut()
                    .with_max_len(1)
                    .for_each(|job| job.update_colors(tsdf, semantics, min_weight));
            });

            if log::log_enabled!(log::Level::Trace) {
                jobs.sort_by_key(|job| job.index);
                for job in &jobs {
                    trace!(
                        "{:>6} vertices @ {}",
                        job.mesh.vertices.len(),
                        job.index
                    );
                }
            }
        }

        if clear_updated_flag {
            for &index in &selected {
                if let Some(block) = tsdf.block_mut(index) {
                    block.set_updated(Update::Mesh, false);
                }
            }
        }

        let stats = MeshStats::from_blocks(selected.iter().filter_map(|&index| mesh.block(index)));
        debug!(
            "remeshed {} blocks: {} vertices, {} triangles in {:.2?}",
            stats.block_count,
            stats.vertex_count,
            stats.triangle_count,
            start.elapsed()
        );

        Ok(stats)
    }
}

/// Exclusive access to one block's outputs for the duration of a remesh.
struct BlockJob<'a> {
    index: BlockIndex,
    tsdf: &'a Block<TsdfVoxel>,
    cache: &'a mut Block<VertexVoxel>,
    mesh: &'a mut MeshBlock,
}

/// Pair each selected block's TSDF, vertex-cache and mesh blocks.
fn collect_jobs<'a>(
    selected: &HashSet<BlockIndex>,
    tsdf: &'a Layer<TsdfVoxel>,
    vertices: &'a mut Layer<VertexVoxel>,
    meshes: impl Iterator<Item = (&'a BlockIndex, &'a mut MeshBlock)>,
) -> Result<Vec<BlockJob<'a>>> {
    let mut caches: HashMap<BlockIndex, &'a mut Block<VertexVoxel>> = vertices
        .iter_mut()
        .filter(|(index, _)| selected.contains(*index))
        .map(|(index, block)| (*index, block))
        .collect();

    let mut jobs = Vec::with_capacity(selected.len());
    for (&index, mesh) in meshes.filter(|(index, _)| selected.contains(*index)) {
        let tsdf = tsdf
            .block(index)
            .ok_or_else(|| MeshError::missing_tsdf_block(index))?;
        let cache = caches
            .remove(&index)
            .ok_or_else(|| MeshError::missing_tsdf_block(index))?;
        jobs.push(BlockJob {
            index,
            tsdf,
            cache,
            mesh,
        });
    }

    Ok(jobs)
}

impl BlockJob<'_> {
    /// Mesh every cube whose corners all lie in this block.
    fn extract_interior(&mut self, min_weight: f32) {
        trace!("extracting interior for block {}", self.index);
        let vps = self.tsdf.voxels_per_side() as i32;
        let mut next_index: VertexId = 0;

        for x in 0..vps - 1 {
            for y in 0..vps - 1 {
                for z in 0..vps - 1 {
                    let anchor = VoxelIndex::new(x, y, z);
                    if let Some(sample) = sample_interior(self.tsdf, anchor, min_weight) {
                        mesh_cube(
                            &sample,
                            &mut next_index,
                            &mut *self.mesh,
                            self.cache.voxels_mut(),
                        );
                    }
                }
            }
        }
    }

    /// Mesh the cubes anchored on the block's max-x, max-y and max-z planes.
    ///
    /// Each anchor is visited once: the max-x plane takes every (y, z), the
    /// max-y plane skips x = max, the max-z plane skips x = max and y = max.
    fn extract_exterior(&mut self, layer: &Layer<TsdfVoxel>, min_weight: f32) {
        trace!("extracting exterior for block {}", self.index);
        let vps = self.tsdf.voxels_per_side() as i32;
        let max = vps - 1;
        let mut next_index = self.mesh.num_vertices() as VertexId;

        let x_plane = (0..vps).flat_map(|z| (0..vps).map(move |y| VoxelIndex::new(max, y, z)));
        let y_plane = (0..vps).flat_map(|z| (0..max).map(move |x| VoxelIndex::new(x, max, z)));
        let z_plane = (0..max).flat_map(|y| (0..max).map(move |x| VoxelIndex::new(x, y, max)));

        for anchor in x_plane.chain(y_plane).chain(z_plane) {
            if let Some(sample) = sample_border(layer, self.tsdf, anchor, min_weight) {
                mesh_cube(
                    &sample,
                    &mut next_index,
                    &mut *self.mesh,
                    self.cache.voxels_mut(),
                );
            }
        }
    }

    /// Paint each vertex with the color and label of the voxel containing it.
    ///
    /// Only voxels with sufficient weight contribute; others, and vertices
    /// whose voxel lies in an unallocated block, keep the defaults.
    fn update_colors(
        &mut self,
        layer: &Layer<TsdfVoxel>,
        semantics: Option<&Layer<SemanticVoxel>>,
        min_weight: f32,
    ) {
        let num_vertices = self.mesh.vertices.len();
        self.mesh.colors.clear();
        self.mesh.colors.resize(num_vertices, Color::default());
        self.mesh.labels = semantics.map(|_| vec![0; num_vertices]);

        let vps = self.tsdf.voxels_per_side();
        let semantic_block = semantics.and_then(|layer| layer.block(self.index));

        for (i, &vertex) in self.mesh.vertices.iter().enumerate() {
            let local = self.tsdf.voxel_index_from_point(vertex);
            let (voxel, label) = if local.is_within(vps) {
                (
                    self.tsdf.voxel(local),
                    semantic_block.and_then(|block| block.voxel(local)),
                )
            } else {
                (
                    layer.voxel_by_coordinates(vertex),
                    semantics.and_then(|layer| layer.voxel_by_coordinates(vertex)),
                )
            };

            let Some(color) = voxel.and_then(|v| v.color_if_valid(min_weight)) else {
                continue;
            };
            self.mesh.colors[i] = color;
            if let (Some(labels), Some(label)) = (self.mesh.labels.as_mut(), label) {
                labels[i] = label.label;
            }
        }

        self.mesh.updated = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::MapBuilder;
    use tsdf_core::Point3;

    fn integrator(threads: usize) -> MeshIntegrator {
        MeshIntegrator::new(MeshIntegratorConfig::new(0.5, threads)).unwrap()
    }

    /// Plane x = 0.17 through a single 4³ block of 0.1 voxels.
    fn plane_map() -> VolumetricMap {
        MapBuilder::new(0.1, 4)
            .add_block_fn(BlockIndex::new(0, 0, 0), |p| {
                let mut voxel = TsdfVoxel::new(p.x - 0.17, 1.0);
                voxel.color = Color::rgb(10, 20, 30);
                voxel
            })
            .build()
            .unwrap()
    }

    #[test]
    fn test_new_rejects_zero_threads() {
        let result = MeshIntegrator::new(MeshIntegratorConfig::new(0.5, 0));
        assert!(matches!(result, Err(MeshError::InvalidConfig { .. })));
    }

    #[test]
    fn test_select_blocks() {
        let mut map = plane_map();
        map.tsdf.allocate_block(BlockIndex::new(5, 5, 5));
        let integrator = integrator(1);

        assert_eq!(integrator.select_blocks_to_mesh(&map, true).len(), 1);
        assert_eq!(integrator.select_blocks_to_mesh(&map, false).len(), 2);
    }

    #[test]
    fn test_remesh_single_block_plane() {
        let mut map = plane_map();
        let stats = integrator(2)
            .remesh(&mut map, &[BlockIndex::new(0, 0, 0)], true)
            .unwrap();

        // crossing between voxel centers 0.15 and 0.25; 3x3 interior quads
        let mesh = map.mesh.block(BlockIndex::new(0, 0, 0)).unwrap();
        assert_eq!(stats.triangle_count, 18);
        assert_eq!(mesh.vertices.len(), 16);
        assert!(mesh.updated);
        for v in &mesh.vertices {
            assert!((v.x - 0.17).abs() < 1e-5);
        }
        assert!(mesh.colors.iter().all(|&c| c == Color::rgb(10, 20, 30)));
        assert!(mesh.labels.is_none());

        let block = map.tsdf.block(BlockIndex::new(0, 0, 0)).unwrap();
        assert!(!block.is_updated(Update::Mesh));
        assert!(block.is_updated(Update::Esdf));
    }

    #[test]
    fn test_remesh_keeps_flag_when_asked() {
        let mut map = plane_map();
        integrator(1)
            .remesh(&mut map, &[BlockIndex::new(0, 0, 0)], false)
            .unwrap();
        assert!(map
            .tsdf
            .block(BlockIndex::new(0, 0, 0))
            .unwrap()
            .is_updated(Update::Mesh));
    }

    #[test]
    fn test_remesh_missing_block_mutates_nothing() {
        let mut map = plane_map();
        let result = integrator(1).remesh(
            &mut map,
            &[BlockIndex::new(0, 0, 0), BlockIndex::new(9, 0, 0)],
            true,
        );

        assert!(matches!(
            result,
            Err(MeshError::MissingTsdfBlock { x: 9, y: 0, z: 0 })
        ));
        assert_eq!(map.mesh.num_blocks(), 0);
        assert_eq!(map.vertices.num_blocks(), 0);
    }

    #[test]
    fn test_remesh_clears_previous_mesh() {
        let mut map = plane_map();
        let index = BlockIndex::new(0, 0, 0);
        map.mesh
            .allocate_block(index, false)
            .push_vertex(Point3::splat(9.0));

        integrator(1).remesh(&mut map, &[index], true).unwrap();

        let mesh = map.mesh.block(index).unwrap();
        assert!(mesh.vertices.iter().all(|v| v.x < 1.0));
    }

    #[test]
    fn test_duplicate_indices_processed_once() {
        let mut map = plane_map();
        let index = BlockIndex::new(0, 0, 0);
        let stats = integrator(2)
            .remesh(&mut map, &[index, index, index], true)
            .unwrap();
        assert_eq!(stats.block_count, 1);
        assert_eq!(stats.triangle_count, 18);
    }

    #[test]
    fn test_labels_follow_voxels() {
        let index = BlockIndex::new(0, 0, 0);
        let mut map = MapBuilder::new(0.1, 4)
            .add_block_fn(index, |p| TsdfVoxel::new(p.x - 0.17, 1.0))
            .add_semantic_block_fn(index, |p| SemanticVoxel::new(if p.y < 0.2 { 1 } else { 2 }))
            .build()
            .unwrap();

        integrator(1).generate_mesh(&mut map, true, true).unwrap();

        let mesh = map.mesh.block(index).unwrap();
        let labels = mesh.labels.as_ref().unwrap();
        assert_eq!(labels.len(), mesh.vertices.len());
        for (v, &label) in mesh.vertices.iter().zip(labels) {
            let expected = if v.y < 0.2 { 1 } else { 2 };
            assert_eq!(label, expected, "vertex {:?}", v);
        }
    }
}
