//! Configuration for the importer.
//!
//! Every setting has a default, so a YAML file only needs the values it
//! changes:
//!
//! ```yaml
//! http:
//!   timeout_secs: 600
//! defaults:
//!   memory_mb: 1000
//! sources:
//!   built_tiles_base_url: https://mirror.example.org/ghs/tiles
//! built_index: /data/ghs/tindex_ghs_built.geojson
//! ```
//!
//! GHS-BUILT tiles are selected from the generated `grid` unless
//! `built_index` names a published tile index in GeoJSON.

use std::fs;
use std::path::{Path, PathBuf};

use ghs_tiles::{PublishedIndex, Sources, TileGrid, TileIndex, DEFAULT_TIMEOUT_SECS};
use serde::{Deserialize, Serialize};

use crate::{ImportError, Result};

/// Default memory for raster imports in MB.
pub const DEFAULT_MEMORY_MB: u64 = 300;

/// Complete importer configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImportConfig {
    /// Remote locations of the products.
    pub sources: Sources,
    /// Generated tile grid of the GHS-BUILT product.
    pub grid: TileGrid,
    /// Published GHS-BUILT tile index (GeoJSON), used instead of `grid`.
    pub built_index: Option<PathBuf>,
    /// HTTP client settings.
    pub http: HttpConfig,
    /// Defaults for command line options.
    pub defaults: Defaults,
}

/// HTTP client settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    /// Timeout of a single request in seconds.
    pub timeout_secs: u64,
    /// User agent sent with every request.
    pub user_agent: Option<String>,
}

impl Default for HttpConfig {
    fn default() -> Self {
        HttpConfig {
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            user_agent: Some(format!("ghs-import/{}", env!("CARGO_PKG_VERSION"))),
        }
    }
}

/// Defaults for command line options.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Defaults {
    /// Memory for raster imports in MB.
    pub memory_mb: u64,
}

impl Default for Defaults {
    fn default() -> Self {
        Defaults {
            memory_mb: DEFAULT_MEMORY_MB,
        }
    }
}

impl ImportConfig {
    /// Parse a YAML document, filling in defaults for missing values.
    pub fn from_yaml_str(yaml: &str) -> std::result::Result<Self, serde_yaml::Error> {
        if yaml.trim().is_empty() {
            return Ok(ImportConfig::default());
        }
        serde_yaml::from_str(yaml)
    }

    /// Load and validate a YAML configuration file.
    pub fn load(path: &Path) -> Result<Self> {
        let config_error = |reason: String| ImportError::Config {
            path: path.to_path_buf(),
            reason,
        };

        let text = fs::read_to_string(path).map_err(|e| config_error(e.to_string()))?;
        let config = Self::from_yaml_str(&text).map_err(|e| config_error(e.to_string()))?;
        config.grid.validate().map_err(|e| config_error(e.to_string()))?;
        config.tile_index().map_err(|e| config_error(e.to_string()))?;
        if config.defaults.memory_mb == 0 {
            return Err(config_error("defaults.memory_mb must be positive".to_string()));
        }

        Ok(config)
    }

    /// Index the GHS-BUILT tiles are selected from.
    pub fn tile_index(&self) -> Result<TileIndex> {
        match &self.built_index {
            Some(path) => Ok(PublishedIndex::load(path)?.into()),
            None => Ok(self.grid.clone().into()),
        }
    }
}
