//! Error types for tsdf_io operations.
//!
//! Provides specific error variants for layer construction and configuration.

use core::fmt;

/// Errors that can occur during tsdf_io operations.
#[derive(Debug, Clone, PartialEq)]
pub enum LayerError {
    /// Voxel size must be finite and strictly positive.
    InvalidVoxelSize {
        /// The rejected voxel size.
        value: f32,
    },

    /// Voxels per side must be at least 2 so a block holds a full cube.
    InvalidVoxelsPerSide {
        /// The rejected value.
        value: u32,
    },
}

impl fmt::Display for LayerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LayerError::InvalidVoxelSize { value } => {
                write!(f, "voxel size must be finite and positive, got {}", value)
            }
            LayerError::InvalidVoxelsPerSide { value } => {
                write!(f, "voxels per side must be at least 2, got {}", value)
            }
        }
    }
}

impl std::error::Error for LayerError {}

/// Result type alias for tsdf_io operations.
pub type Result<T> = core::result::Result<T, LayerError>;
