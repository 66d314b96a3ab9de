//! Property-based tests for mesh extraction invariants.

use proptest::prelude::*;
use tsdf_core::{BlockIndex, Point3, TsdfVoxel, VertexVoxel, VoxelIndex};
use tsdf_mesh::{MapBuilder, MeshIntegrator, MeshIntegratorConfig, VolumetricMap};

/// Sphere inside a single isolated 8³ block.
fn make_single_block_sphere(center: Point3, radius: f32) -> VolumetricMap {
    MapBuilder::new(0.1, 8)
        .add_block_fn(BlockIndex::new(0, 0, 0), move |pos| {
            TsdfVoxel::new((pos - center).length() - radius, 1.0)
        })
        .build()
        .unwrap()
}

/// Sphere over a 2x2x2 block neighborhood.
fn make_sphere_map(center: Point3, radius: f32) -> VolumetricMap {
    MapBuilder::new(0.1, 8)
        .add_block_range(BlockIndex::new(0, 0, 0), BlockIndex::new(1, 1, 1), move |pos| {
            TsdfVoxel::new((pos - center).length() - radius, 1.0)
        })
        .build()
        .unwrap()
}

fn make_plane_map(height: f32) -> VolumetricMap {
    MapBuilder::new(0.1, 8)
        .add_block_fn(BlockIndex::new(0, 0, 0), move |pos| {
            TsdfVoxel::new(pos.y - height, 1.0)
        })
        .build()
        .unwrap()
}

fn integrator() -> MeshIntegrator {
    MeshIntegrator::new(MeshIntegratorConfig::new(0.5, 2)).unwrap()
}

proptest! {
    /// Inside an isolated block every vertex sits on a cached edge.
    #[test]
    fn cached_edges_match_vertices(
        cx in 0.25f32..0.55,
        cy in 0.25f32..0.55,
        cz in 0.25f32..0.55,
        radius in 0.1f32..0.2,
    ) {
        let index = BlockIndex::new(0, 0, 0);
        let mut map = make_single_block_sphere(Point3::new(cx, cy, cz), radius);
        integrator().generate_mesh(&mut map, true, true).unwrap();

        let mesh = map.mesh.block(index).unwrap();
        let cached: usize = map
            .vertices
            .block(index)
            .unwrap()
            .voxels()
            .iter()
            .map(VertexVoxel::num_cached_vertices)
            .sum();

        prop_assert_eq!(cached, mesh.vertices.len());
        prop_assert_eq!(mesh.colors.len(), mesh.vertices.len());
    }

    /// Triangles reference three distinct, in-range vertices.
    #[test]
    fn triangles_are_well_formed(
        cx in 0.5f32..1.1,
        cy in 0.5f32..1.1,
        cz in 0.5f32..1.1,
        radius in 0.15f32..0.4,
    ) {
        let mut map = make_sphere_map(Point3::new(cx, cy, cz), radius);
        integrator().generate_mesh(&mut map, true, true).unwrap();

        for (_, block) in map.mesh.iter() {
            let n = block.vertices.len() as u32;
            prop_assert_eq!(block.indices.len() % 3, 0);
            for [a, b, c] in block.triangles() {
                prop_assert!(a < n && b < n && c < n);
                prop_assert!(a != b && b != c && a != c);
            }
        }
    }

    /// A plane is reproduced exactly by linear interpolation.
    #[test]
    fn plane_vertices_lie_on_plane(height in 0.06f32..0.74) {
        let mut map = make_plane_map(height);
        integrator().generate_mesh(&mut map, true, true).unwrap();

        let mesh = map.mesh.block(BlockIndex::new(0, 0, 0)).unwrap();
        prop_assert!(!mesh.is_empty());
        for v in &mesh.vertices {
            prop_assert!((v.y - height).abs() < 1e-4, "vertex {:?}", v);
        }
    }

    /// Remeshing unchanged data reproduces the same meshes.
    #[test]
    fn remesh_is_idempotent(
        cx in 0.5f32..1.1,
        radius in 0.15f32..0.4,
    ) {
        let mut map = make_sphere_map(Point3::new(cx, 0.8, 0.8), radius);
        let integrator = integrator();

        integrator.generate_mesh(&mut map, false, false).unwrap();
        let first = map.mesh.clone();
        integrator.generate_mesh(&mut map, false, false).unwrap();

        for (index, block) in first.iter() {
            prop_assert_eq!(map.mesh.block(*index), Some(block));
        }
    }

    /// Dropping one voxel below the weight threshold only removes triangles,
    /// and restoring it restores the mesh.
    #[test]
    fn weight_gating_only_removes(x in 0i32..8, y in 0i32..8, z in 0i32..8) {
        let index = BlockIndex::new(0, 0, 0);
        let voxel = VoxelIndex::new(x, y, z);
        let mut map = make_plane_map(0.33);
        let integrator = integrator();

        integrator.generate_mesh(&mut map, false, true).unwrap();
        let baseline = map.mesh.block(index).unwrap().clone();

        map.tsdf.block_mut(index).unwrap().voxel_mut(voxel).unwrap().weight = 0.0;
        integrator.generate_mesh(&mut map, false, true).unwrap();
        let gated = map.mesh.block(index).unwrap().num_triangles();
        prop_assert!(gated <= baseline.num_triangles());

        map.tsdf.block_mut(index).unwrap().voxel_mut(voxel).unwrap().weight = 1.0;
        integrator.generate_mesh(&mut map, false, true).unwrap();
        prop_assert_eq!(map.mesh.block(index).unwrap(), &baseline);
    }
}

#[test]
fn test_gated_voxel_on_surface_opens_hole() {
    let index = BlockIndex::new(0, 0, 0);
    let mut map = make_plane_map(0.33);
    map.tsdf
        .block_mut(index)
        .unwrap()
        .voxel_mut(VoxelIndex::new(3, 2, 3))
        .unwrap()
        .weight = 0.0;

    integrator().generate_mesh(&mut map, true, true).unwrap();

    // the 4 surface cubes touching the voxel lose their quads
    assert_eq!(map.mesh.block(index).unwrap().num_triangles(), 98 - 8);
}

#[test]
fn test_exact_zero_counts_as_outside() {
    // voxel centers at y = 0.35 have distance exactly 0
    let index = BlockIndex::new(0, 0, 0);
    let mut map = MapBuilder::new(0.1, 8)
        .add_block_fn(index, |pos| {
            let d = if (pos.y - 0.35).abs() < 1e-4 { 0.0 } else { pos.y - 0.35 };
            TsdfVoxel::new(d, 1.0)
        })
        .build()
        .unwrap();

    integrator().generate_mesh(&mut map, true, true).unwrap();

    let mesh = map.mesh.block(index).unwrap();
    assert_eq!(mesh.num_triangles(), 98);
    for v in &mesh.vertices {
        assert!((v.y - 0.35).abs() < 1e-5, "vertex {:?}", v);
    }
}
