//! Wavefront OBJ export of a mesh layer.
//!
//! All blocks are merged with [`MeshLayer::combined_mesh`] and written as one
//! object. Vertex colors are appended to `v` lines as `r g b` in `[0, 1]`,
//! the common OBJ extension understood by most viewers.

use std::io::Write;
use std::path::Path;

use crate::error::Result;
use crate::mesh::{MeshLayer, MeshStats};

/// Write every block of `layer` as OBJ to `writer`.
///
/// Returns statistics over the written mesh.
///
/// # Example
///
/// ```ignore
/// use std::fs::File;
///
/// let mut file = File::create("scene.obj")?;
/// let stats = export_obj(&map.mesh, &mut file)?;
/// println!("wrote {} triangles", stats.triangle_count);
/// ```
pub fn export_obj<W: Write>(layer: &MeshLayer, writer: &mut W) -> Result<MeshStats> {
    let mesh = layer.combined_mesh();
    let stats = MeshStats::from_mesh_layer(layer);

    writeln!(writer, "# TSDF mesh export")?;
    writeln!(
        writer,
        "# Voxel size: {}, voxels per side: {}",
        layer.config().voxel_size,
        layer.config().voxels_per_side
    )?;
    writeln!(writer, "# Num blocks: {}", layer.num_blocks())?;
    writeln!(writer)?;

    writeln!(writer, "# {} vertices", mesh.vertices.len())?;
    for (v, c) in mesh.vertices.iter().zip(&mesh.colors) {
        writeln!(
            writer,
            "v {} {} {} {} {} {}",
            v.x,
            v.y,
            v.z,
            c.r as f32 / 255.0,
            c.g as f32 / 255.0,
            c.b as f32 / 255.0
        )?;
    }

    writeln!(writer)?;

    // OBJ uses 1-based indexing
    writeln!(writer, "# {} faces", mesh.num_triangles())?;
    for [a, b, c] in mesh.triangles() {
        writeln!(writer, "f {} {} {}", a + 1, b + 1, c + 1)?;
    }

    Ok(stats)
}

/// Write every block of `layer` as OBJ to a file.
pub fn export_obj_to_file<P: AsRef<Path>>(layer: &MeshLayer, path: P) -> Result<MeshStats> {
    let mut file = std::io::BufWriter::new(std::fs::File::create(path)?);
    let stats = export_obj(layer, &mut file)?;
    file.flush()?;
    Ok(stats)
}
