//! Concurrency tests for the mesh integrator.
//!
//! These tests verify that per-block results do not depend on the worker
//! count or on which other blocks are remeshed in the same call.

use std::sync::Arc;
use std::thread;

use tsdf_core::{BlockIndex, Color, Point3, TsdfVoxel};
use tsdf_mesh::{MapBuilder, MeshIntegrator, MeshIntegratorConfig, VolumetricMap};

// =============================================================================
// Test Map Factories
// =============================================================================

/// Sphere spread over a 3x3x3 block neighborhood around the origin.
fn create_sphere_map() -> VolumetricMap {
    let center = Point3::new(0.4, 0.4, 0.4);
    MapBuilder::new(0.1, 8)
        .add_block_range(BlockIndex::new(-1, -1, -1), BlockIndex::new(1, 1, 1), move |pos| {
            let mut voxel = TsdfVoxel::new((pos - center).length() - 0.3, 1.0);
            voxel.color = Color::rgb(0, 128, 255);
            voxel
        })
        .build()
        .unwrap()
}

/// Large sphere over a 5x5x5 block grid.
fn create_large_map() -> VolumetricMap {
    let center = Point3::splat(2.0);
    MapBuilder::new(0.1, 8)
        .add_block_range(BlockIndex::new(0, 0, 0), BlockIndex::new(4, 4, 4), move |pos| {
            TsdfVoxel::new((pos - center).length() - 1.5, 1.0)
        })
        .build()
        .unwrap()
}

fn integrator(threads: usize) -> MeshIntegrator {
    MeshIntegrator::new(MeshIntegratorConfig::new(0.5, threads)).unwrap()
}

fn assert_same_meshes(a: &VolumetricMap, b: &VolumetricMap) {
    assert_eq!(a.mesh.num_blocks(), b.mesh.num_blocks());
    for (index, block) in a.mesh.iter() {
        assert_eq!(b.mesh.block(*index), Some(block), "block {}", index);
    }
}

// =============================================================================
// Thread Count Independence
// =============================================================================

#[test]
fn test_thread_count_does_not_change_result() {
    let mut serial = create_sphere_map();
    let mut parallel = create_sphere_map();

    let s1 = integrator(1).generate_mesh(&mut serial, true, true).unwrap();
    let s2 = integrator(4).generate_mesh(&mut parallel, true, true).unwrap();

    assert_eq!(s1.triangle_count, s2.triangle_count);
    assert_eq!(s1.vertex_count, s2.vertex_count);
    assert_same_meshes(&serial, &parallel);
}

#[test]
fn test_many_blocks_many_threads() {
    let mut map = create_large_map();
    let stats = integrator(8).generate_mesh(&mut map, true, true).unwrap();

    assert_eq!(stats.block_count, 125);
    assert!(stats.triangle_count > 0);

    let mut reference = create_large_map();
    integrator(2).generate_mesh(&mut reference, true, true).unwrap();
    assert_same_meshes(&map, &reference);
}

#[test]
fn test_more_threads_than_blocks() {
    let mut map = MapBuilder::new(0.1, 8)
        .add_block_fn(BlockIndex::new(0, 0, 0), |p| TsdfVoxel::new(p.z - 0.42, 1.0))
        .build()
        .unwrap();

    let stats = integrator(16).generate_mesh(&mut map, true, true).unwrap();
    assert_eq!(stats.triangle_count, 98);
}

// =============================================================================
// Selection Independence
// =============================================================================

#[test]
fn test_partial_remesh_matches_full_remesh() {
    let mut full = create_sphere_map();
    integrator(4).generate_mesh(&mut full, false, true).unwrap();

    // blocks read their neighbors without remeshing them
    let mut partial = create_sphere_map();
    let subset = [
        BlockIndex::new(0, 0, 0),
        BlockIndex::new(-1, 0, 0),
        BlockIndex::new(0, 0, -1),
    ];
    integrator(4).remesh(&mut partial, &subset, true).unwrap();

    assert_eq!(partial.mesh.num_blocks(), subset.len());
    for index in subset {
        assert_eq!(partial.mesh.block(index), full.mesh.block(index));
    }
}

#[test]
fn test_repeated_remesh_is_stable() {
    let mut map = create_sphere_map();
    let integrator = integrator(4);

    integrator.generate_mesh(&mut map, false, false).unwrap();
    let first = map.mesh.clone();

    for _ in 0..5 {
        integrator.generate_mesh(&mut map, false, false).unwrap();
    }

    for (index, block) in first.iter() {
        assert_eq!(map.mesh.block(*index), Some(block));
    }
}

// =============================================================================
// Shared Integrator
// =============================================================================

#[test]
fn test_shared_integrator_across_threads() {
    let integrator = Arc::new(integrator(4));
    let mut reference = create_sphere_map();
    integrator.generate_mesh(&mut reference, true, true).unwrap();
    let reference = Arc::new(reference);

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let integrator = Arc::clone(&integrator);
            let reference = Arc::clone(&reference);
            thread::spawn(move || {
                let mut map = create_sphere_map();
                integrator.generate_mesh(&mut map, true, true).unwrap();
                assert_same_meshes(&map, &reference);
            })
        })
        .collect();

    for handle in handles {
        handle.join().expect("Thread panicked");
    }
}

#[test]
fn test_integrators_on_separate_maps() {
    let handles: Vec<_> = (1..=4)
        .map(|threads| {
            thread::spawn(move || {
                let mut map = create_sphere_map();
                integrator(threads)
                    .generate_mesh(&mut map, true, true)
                    .unwrap()
            })
        })
        .collect();

    let stats: Vec<_> = handles
        .into_iter()
        .map(|h| h.join().expect("Thread panicked"))
        .collect();

    for s in &stats[1..] {
        assert_eq!(s.triangle_count, stats[0].triangle_count);
        assert_eq!(s.vertex_count, stats[0].vertex_count);
    }
}
