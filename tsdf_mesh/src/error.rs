//! Error types for tsdf_mesh operations.

use thiserror::Error;
use tsdf_io::{BlockIndex, LayerError};

/// Errors that can occur while configuring or running the mesh integrator.
///
/// Missing data (unallocated neighbors, under-weighted voxels) is never an
/// error; it only suppresses the affected cubes. These variants cover broken
/// contracts, which are detected before any layer is modified.
#[derive(Error, Debug)]
pub enum MeshError {
    /// Invalid configuration.
    #[error("invalid configuration: {message}")]
    InvalidConfig {
        /// Description of the configuration error.
        message: String,
    },

    /// A block selected for meshing has no TSDF block.
    #[error("no TSDF block at ({x}, {y}, {z})")]
    MissingTsdfBlock {
        /// X coordinate.
        x: i32,
        /// Y coordinate.
        y: i32,
        /// Z coordinate.
        z: i32,
    },

    /// A layer does not share the TSDF layer's partitioning.
    #[error("{layer} layer partitioning mismatch: expected {expected}, got {got}")]
    PartitionMismatch {
        /// Name of the offending layer.
        layer: &'static str,
        /// TSDF layer partitioning.
        expected: String,
        /// The offending layer's partitioning.
        got: String,
    },

    /// The worker pool could not be created.
    #[error("failed to build thread pool: {0}")]
    ThreadPool(String),

    /// Configuration text could not be parsed.
    #[error("failed to parse configuration: {0}")]
    ConfigParse(String),

    /// I/O error while reading configuration or writing a mesh.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Layer construction error from tsdf_io.
    #[error("layer error: {0}")]
    Layer(#[from] LayerError),
}

impl MeshError {
    /// Missing TSDF block at `index`.
    pub fn missing_tsdf_block(index: BlockIndex) -> Self {
        MeshError::MissingTsdfBlock {
            x: index.x,
            y: index.y,
            z: index.z,
        }
    }
}

/// Result type alias for tsdf_mesh operations.
pub type Result<T> = std::result::Result<T, MeshError>;
