//! The set of layers one mesh integrator works on.

use tsdf_io::{Layer, LayerConfig, SemanticVoxel, TsdfVoxel, VertexVoxel};

use crate::error::{MeshError, Result};
use crate::mesh::MeshLayer;

/// TSDF, vertex-cache, mesh and optional semantic layers of one map.
///
/// All layers must share one [`LayerConfig`]. The constructors check this;
/// the fields are public so callers can feed data in directly, and
/// [`check_partitioning`](Self::check_partitioning) re-validates before
/// every remesh.
#[derive(Debug, Clone)]
pub struct VolumetricMap {
    /// Signed distances, weights and colors.
    pub tsdf: Layer<TsdfVoxel>,
    /// Per-lattice-point vertex cache, rebuilt on every remesh.
    pub vertices: Layer<VertexVoxel>,
    /// Extracted per-block meshes.
    pub mesh: MeshLayer,
    /// Per-voxel semantic labels, if enabled.
    pub semantics: Option<Layer<SemanticVoxel>>,
}

impl VolumetricMap {
    /// Create a map with empty layers.
    pub fn new(config: LayerConfig, with_semantics: bool) -> Result<Self> {
        Ok(Self {
            tsdf: Layer::new(config)?,
            vertices: Layer::new(config)?,
            mesh: MeshLayer::new(config)?,
            semantics: if with_semantics {
                Some(Layer::new(config)?)
            } else {
                None
            },
        })
    }

    /// Assemble a map from existing layers.
    ///
    /// Fails with [`MeshError::PartitionMismatch`] unless every layer shares
    /// the TSDF layer's configuration.
    pub fn from_layers(
        tsdf: Layer<TsdfVoxel>,
        vertices: Layer<VertexVoxel>,
        mesh: MeshLayer,
        semantics: Option<Layer<SemanticVoxel>>,
    ) -> Result<Self> {
        let map = Self {
            tsdf,
            vertices,
            mesh,
            semantics,
        };
        map.check_partitioning()?;
        Ok(map)
    }

    /// Partitioning shared by every layer.
    #[inline]
    pub fn config(&self) -> &LayerConfig {
        self.tsdf.config()
    }

    /// Whether a semantic layer is attached.
    #[inline]
    pub fn has_semantics(&self) -> bool {
        self.semantics.is_some()
    }

    /// Verify that every layer matches the TSDF layer's partitioning.
    pub fn check_partitioning(&self) -> Result<()> {
        let expected = self.tsdf.config();
        check_layer("vertex", expected, self.vertices.config())?;
        check_layer("mesh", expected, self.mesh.config())?;
        if let Some(semantics) = &self.semantics {
            check_layer("semantic", expected, semantics.config())?;
        }
        Ok(())
    }
}

fn check_layer(layer: &'static str, expected: &LayerConfig, got: &LayerConfig) -> Result<()> {
    if expected != got {
        return Err(MeshError::PartitionMismatch {
            layer,
            expected: expected.to_string(),
            got: got.to_string(),
        });
    }
    Ok(())
}
