//! Boundary condition tests for mesh extraction.
//!
//! Covers degenerate block sizes, block seams and corners, negative block
//! indices, degenerate distance fields and threshold edges.

use tsdf_core::{BlockIndex, Point3, SemanticVoxel, TsdfVoxel};
use tsdf_mesh::{MapBuilder, MeshError, MeshIntegrator, MeshIntegratorConfig, VolumetricMap};

// =============================================================================
// Test Map Factories
// =============================================================================

fn integrator(min_weight: f32) -> MeshIntegrator {
    MeshIntegrator::new(MeshIntegratorConfig::new(min_weight, 2)).unwrap()
}

/// Diagonal plane x + y + z = 2.4 over a 2x2x2 block neighborhood.
///
/// The plane crosses the cube at the shared corner of all eight blocks.
fn create_diagonal_map(skip: Option<BlockIndex>) -> VolumetricMap {
    let mut builder = MapBuilder::new(0.1, 8);
    for z in 0..2 {
        for y in 0..2 {
            for x in 0..2 {
                let index = BlockIndex::new(x, y, z);
                if Some(index) == skip {
                    continue;
                }
                builder = builder.add_block_fn(index, |p| TsdfVoxel::new(p.x + p.y + p.z - 2.4, 1.0));
            }
        }
    }
    builder.build().unwrap()
}

// =============================================================================
// Block Size Tests
// =============================================================================

#[test]
fn test_two_voxels_per_side() {
    let index = BlockIndex::new(0, 0, 0);
    let mut map = MapBuilder::new(0.1, 2)
        .add_block_fn(index, |p| TsdfVoxel::new(p.x - 0.1, 1.0))
        .build()
        .unwrap();

    let stats = integrator(0.5).generate_mesh(&mut map, true, true).unwrap();

    // a single interior cube
    assert_eq!(stats.triangle_count, 2);
    assert_eq!(stats.vertex_count, 4);
    let mesh = map.mesh.block(index).unwrap();
    assert!(mesh.vertices.iter().all(|v| (v.x - 0.1).abs() < 1e-5));
}

#[test]
fn test_two_voxels_per_side_with_neighbor() {
    let left = BlockIndex::new(0, 0, 0);
    let right = BlockIndex::new(1, 0, 0);
    let mut map = MapBuilder::new(0.1, 2)
        .add_block_fn(left, |p| TsdfVoxel::new(p.x - 0.2, 1.0))
        .add_block_fn(right, |p| TsdfVoxel::new(p.x - 0.2, 1.0))
        .build()
        .unwrap();

    integrator(0.5).generate_mesh(&mut map, true, true).unwrap();

    // crossing lies between centers 0.15 and 0.25, i.e. only in the seam cube
    assert_eq!(map.mesh.block(left).unwrap().num_triangles(), 2);
    assert!(map.mesh.block(right).unwrap().is_empty());
}

// =============================================================================
// Block Corner Tests
// =============================================================================

#[test]
fn test_corner_cube_needs_all_neighbors() {
    let origin = BlockIndex::new(0, 0, 0);

    let mut full = create_diagonal_map(None);
    integrator(0.5).generate_mesh(&mut full, true, true).unwrap();
    let with_corner = full.mesh.block(origin).unwrap().num_triangles();

    let mut missing = create_diagonal_map(Some(BlockIndex::new(1, 1, 1)));
    integrator(0.5).generate_mesh(&mut missing, true, true).unwrap();
    let without_corner = missing.mesh.block(origin).unwrap().num_triangles();

    assert!(without_corner < with_corner);
}

#[test]
fn test_corner_cube_vertices_reach_neighbors() {
    let mut map = create_diagonal_map(None);
    integrator(0.5).generate_mesh(&mut map, true, true).unwrap();

    let mesh = map.mesh.block(BlockIndex::new(0, 0, 0)).unwrap();
    for v in &mesh.vertices {
        assert!((v.x + v.y + v.z - 2.4).abs() < 1e-4, "vertex {:?}", v);
    }
    // the corner cube contributes vertices past the block faces
    assert!(mesh.vertices.iter().any(|v| v.x > 0.8 || v.y > 0.8 || v.z > 0.8));
}

// =============================================================================
// Negative Index Tests
// =============================================================================

#[test]
fn test_seam_across_zero() {
    let left = BlockIndex::new(-1, 0, 0);
    let right = BlockIndex::new(0, 0, 0);
    let mut map = MapBuilder::new(0.1, 8)
        .add_block_fn(left, |p| TsdfVoxel::new(p.x + 0.03, 1.0))
        .add_block_fn(right, |p| TsdfVoxel::new(p.x + 0.03, 1.0))
        .build()
        .unwrap();

    integrator(0.5).generate_mesh(&mut map, true, true).unwrap();

    // crossing between centers -0.05 and 0.05 belongs to the left block's seam
    let left_mesh = map.mesh.block(left).unwrap();
    assert_eq!(left_mesh.num_triangles(), 98);
    assert!(left_mesh.vertices.iter().all(|v| (v.x + 0.03).abs() < 1e-5));
    assert!(map.mesh.block(right).unwrap().is_empty());
}

#[test]
fn test_negative_block_colors_from_neighbor() {
    let left = BlockIndex::new(-1, 0, 0);
    let right = BlockIndex::new(0, 0, 0);
    let mut map = MapBuilder::new(0.1, 8)
        .add_block_fn(left, |p| TsdfVoxel::new(p.x - 0.02, 1.0))
        .add_block_fn(right, |p| TsdfVoxel::new(p.x - 0.02, 1.0))
        .add_semantic_block_fn(left, |_| SemanticVoxel::new(1))
        .add_semantic_block_fn(right, |_| SemanticVoxel::new(2))
        .build()
        .unwrap();

    integrator(0.5).generate_mesh(&mut map, true, true).unwrap();

    // x = 0.02 lies in voxel 0 of the right block
    let mesh = map.mesh.block(left).unwrap();
    let labels = mesh.labels.as_ref().unwrap();
    assert!(!labels.is_empty());
    assert!(labels.iter().all(|&l| l == 2));
}

// =============================================================================
// Degenerate Field Tests
// =============================================================================

#[test]
fn test_all_zero_distances_produce_nothing() {
    let mut map = MapBuilder::new(0.1, 8)
        .add_block_range(BlockIndex::new(0, 0, 0), BlockIndex::new(1, 0, 0), |_| {
            TsdfVoxel::new(0.0, 1.0)
        })
        .build()
        .unwrap();

    let stats = integrator(0.5).generate_mesh(&mut map, true, true).unwrap();
    assert_eq!(stats.block_count, 2);
    assert_eq!(stats.triangle_count, 0);
    assert!(stats.is_empty());
}

#[test]
fn test_all_inside_produces_nothing() {
    let mut map = MapBuilder::new(0.1, 8)
        .add_block_fn(BlockIndex::new(0, 0, 0), |_| TsdfVoxel::new(-0.1, 1.0))
        .build()
        .unwrap();

    let stats = integrator(0.5).generate_mesh(&mut map, true, true).unwrap();
    assert_eq!(stats.triangle_count, 0);
    assert!(map.mesh.block(BlockIndex::new(0, 0, 0)).unwrap().updated);
}

#[test]
fn test_empty_selection() {
    let mut map = create_diagonal_map(None);
    let stats = integrator(0.5).remesh(&mut map, &[], true).unwrap();

    assert_eq!(stats.block_count, 0);
    assert_eq!(map.mesh.num_blocks(), 0);
    assert_eq!(map.vertices.num_blocks(), 0);
}

// =============================================================================
// Weight Threshold Tests
// =============================================================================

#[test]
fn test_weight_equal_to_threshold_is_valid() {
    let mut map = MapBuilder::new(0.1, 8)
        .add_block_fn(BlockIndex::new(0, 0, 0), |p| TsdfVoxel::new(p.y - 0.33, 0.25))
        .build()
        .unwrap();

    let stats = integrator(0.25).generate_mesh(&mut map, true, true).unwrap();
    assert_eq!(stats.triangle_count, 98);
}

#[test]
fn test_weight_just_below_threshold_is_invalid() {
    let mut map = MapBuilder::new(0.1, 8)
        .add_block_fn(BlockIndex::new(0, 0, 0), |p| TsdfVoxel::new(p.y - 0.33, 0.2499))
        .build()
        .unwrap();

    let stats = integrator(0.25).generate_mesh(&mut map, true, true).unwrap();
    assert_eq!(stats.triangle_count, 0);
}

#[test]
fn test_unobserved_neighbor_seam_is_skipped() {
    let left = BlockIndex::new(0, 0, 0);
    let right = BlockIndex::new(1, 0, 0);
    let mut map = MapBuilder::new(0.1, 8)
        .add_block_fn(left, |p| TsdfVoxel::new(p.y - 0.33, 1.0))
        .add_block_fn(right, |p| TsdfVoxel::new(p.y - 0.33, 0.0))
        .build()
        .unwrap();

    integrator(0.5).generate_mesh(&mut map, true, true).unwrap();

    assert_eq!(map.mesh.block(left).unwrap().num_triangles(), 98);
    assert!(map.mesh.block(right).unwrap().is_empty());
}

// =============================================================================
// Contract Violations
// =============================================================================

#[test]
fn test_remesh_unknown_block_is_error() {
    let mut map = create_diagonal_map(None);
    let err = integrator(0.5)
        .remesh(&mut map, &[BlockIndex::new(-4, 2, 0)], true)
        .unwrap_err();

    assert!(matches!(err, MeshError::MissingTsdfBlock { x: -4, y: 2, z: 0 }));
    assert!(err.to_string().contains("-4"));
}

#[test]
fn test_mismatched_layers_are_rejected() {
    let mut map = create_diagonal_map(None);
    map.mesh = tsdf_mesh::MeshLayer::new(tsdf_mesh::LayerConfig::new(0.2, 8)).unwrap();

    let err = integrator(0.5).generate_mesh(&mut map, true, true).unwrap_err();
    assert!(matches!(err, MeshError::PartitionMismatch { layer: "mesh", .. }));
    assert_eq!(map.vertices.num_blocks(), 0);
}

#[test]
fn test_vertex_positions_are_finite() {
    let center = Point3::splat(0.4);
    let mut map = MapBuilder::new(0.1, 8)
        .add_block_fn(BlockIndex::new(0, 0, 0), move |p| {
            // steep and flat regions side by side
            let d = (p - center).length() - 0.2;
            TsdfVoxel::new(if d > 0.0 { d * 1000.0 } else { d * 1e-6 }, 1.0)
        })
        .build()
        .unwrap();

    integrator(0.5).generate_mesh(&mut map, true, true).unwrap();
    let mesh = map.mesh.block(BlockIndex::new(0, 0, 0)).unwrap();
    assert!(!mesh.is_empty());
    assert!(mesh
        .vertices
        .iter()
        .all(|v| v.x.is_finite() && v.y.is_finite() && v.z.is_finite()));
}
