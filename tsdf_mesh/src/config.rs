//! Mesh integrator configuration.
//!
//! Loaded from TOML or built in code:
//!
//! ```toml
//! min_weight = 0.0001
//! integrator_threads = 4
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{MeshError, Result};

/// Tuning parameters for [`MeshIntegrator`](crate::MeshIntegrator).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MeshIntegratorConfig {
    /// Voxels with a weight below this are treated as unobserved.
    pub min_weight: f32,
    /// Worker threads used for each extraction phase.
    pub integrator_threads: usize,
}

impl Default for MeshIntegratorConfig {
    fn default() -> Self {
        Self {
            min_weight: 1e-4,
            integrator_threads: default_threads(),
        }
    }
}

fn default_threads() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}

impl MeshIntegratorConfig {
    /// Create a configuration with explicit values.
    pub fn new(min_weight: f32, integrator_threads: usize) -> Self {
        Self {
            min_weight,
            integrator_threads,
        }
    }

    /// Check that the configuration is usable.
    pub fn validate(&self) -> Result<()> {
        if self.integrator_threads == 0 {
            return Err(MeshError::InvalidConfig {
                message: "integrator_threads must be at least 1".to_string(),
            });
        }
        if !self.min_weight.is_finite() || self.min_weight < 0.0 {
            return Err(MeshError::InvalidConfig {
                message: format!(
                    "min_weight must be finite and non-negative, got {}",
                    self.min_weight
                ),
            });
        }
        Ok(())
    }

    /// Parse and validate a configuration from TOML text.
    ///
    /// Missing keys take their default values.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: Self =
            toml::from_str(text).map_err(|e| MeshError::ConfigParse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a TOML configuration file.
    pub fn from_toml_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }
}
