//! Batcher configuration
//!
//! Initial pool capacities, tunable so steady-state frames never reallocate.
//! The defaults are sized for a typical scene of a few dozen skinned meshes;
//! hosts with known workloads should measure a frame's high-water marks and
//! configure accordingly. Supports TOML and RON config files.

use serde::{Deserialize, Serialize};

/// Configuration errors
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Parse error
    #[error("Parse error: {0}")]
    Parse(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialize(String),

    /// Unsupported format
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),
}

/// Initial sizing for the geometry and command pools
///
/// All capacities are lower bounds: pools still grow on demand, these only
/// pre-reserve storage so growth never happens mid-frame in the steady state.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchConfig {
    /// Vertices reserved in the geometry pool up front
    pub initial_vertex_capacity: usize,

    /// Indices reserved in the geometry pool up front
    pub initial_index_capacity: usize,

    /// Draw command slots constructed up front
    pub initial_command_capacity: usize,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            initial_vertex_capacity: 4096,
            initial_index_capacity: 8192,
            initial_command_capacity: 32,
        }
    }
}

impl BatchConfig {
    /// Load configuration from a TOML or RON file, selected by extension
    pub fn load_from_file(path: &str) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(ConfigError::Io)?;

        if path.ends_with(".toml") {
            toml::from_str(&contents).map_err(|e| ConfigError::Parse(e.to_string()))
        } else if path.ends_with(".ron") {
            ron::from_str(&contents).map_err(|e| ConfigError::Parse(e.to_string()))
        } else {
            Err(ConfigError::UnsupportedFormat(path.to_string()))
        }
    }

    /// Save configuration to a TOML or RON file, selected by extension
    pub fn save_to_file(&self, path: &str) -> Result<(), ConfigError> {
        let contents = if path.ends_with(".toml") {
            toml::to_string_pretty(self).map_err(|e| ConfigError::Serialize(e.to_string()))?
        } else if path.ends_with(".ron") {
            ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
                .map_err(|e| ConfigError::Serialize(e.to_string()))?
        } else {
            return Err(ConfigError::UnsupportedFormat(path.to_string()));
        };

        std::fs::write(path, contents).map_err(ConfigError::Io)
    }
}
