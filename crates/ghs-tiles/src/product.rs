//! The GHS built-up products and where they are published.
//!
//! Three products are supported, each distributed differently:
//!
//! | product | distribution | tile index |
//! |---|---|---|
//! | GHS-BUILT (Landsat, 30 m) | one zip per tile | EPSG:3857 index, see [`TileIndex`](crate::TileIndex) |
//! | GHS-BUILT-S1 (Sentinel-1, 20 m) | a single global zip holding a VRT | none |
//! | GHS-BUILT-S2 (Sentinel-2, 10 m) | one GeoTIFF per tile | shapefile with tile URLs |

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

const S1_ARCHIVE_URL: &str = "https://jeodpp.jrc.ec.europa.eu/ftp/jrc-opendata/GHSL/\
GHS_BUILT_S1NODSM_GLOBE_R2018A/GHS_BUILT_S1NODSM_GLOBE_R2018A_3857_20/V1-0/\
GHS_BUILT_S1NODSM_GLOBE_R2018A_3857_20_V1_0.zip";

const S1_PAYLOAD: &str = "GHS_BUILT_S1NODSM_GLOBE_R2018A/GHS_BUILT_S1NODSM_GLOBE_R2018A_3857_20/\
V1-0/GHS_BUILT_S1NODSM_GLOBE_R2018A_3857_20_V1_0.vrt";

const S2_TILE_SCHEMA_URL: &str =
    "https://ghsl.jrc.ec.europa.eu/documents/GHS_BUILT_S2comp2018_GLOBE_R2020A_tile_schema.zip";

const BUILT_TILES_BASE_URL: &str = "https://jeodpp.jrc.ec.europa.eu/ftp/jrc-opendata/GHSL/\
GHS_BUILT_LDSMT_GLOBE_R2018A/GHS_BUILT_LDSMT_GLOBE_R2018A_3857_30/V2-0/tiles";

/// One of the downloadable GHS built-up products.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Product {
    /// Multitemporal built-up grid derived from Landsat.
    GhsBuilt,
    /// Built-up grid derived from Sentinel-1.
    GhsBuiltS1,
    /// Built-up grid derived from the Sentinel-2 2018 composite.
    GhsBuiltS2,
}

impl Product {
    /// All products, in the order they are processed.
    pub const ALL: [Product; 3] = [Product::GhsBuiltS1, Product::GhsBuiltS2, Product::GhsBuilt];

    /// Short label as used on the command line and in logs.
    pub fn label(&self) -> &'static str {
        match self {
            Product::GhsBuilt => "GHS-BUILT",
            Product::GhsBuiltS1 => "GHS-BUILT-S1",
            Product::GhsBuiltS2 => "GHS-BUILT-S2",
        }
    }

    /// Human readable description for progress messages.
    pub fn description(&self) -> &'static str {
        match self {
            Product::GhsBuilt => "Landsat derived GHS built-up grid",
            Product::GhsBuiltS1 => "GHS built-up grid derived from Sentinel-1",
            Product::GhsBuiltS2 => "Sentinel-2 derived GHS built-up grid",
        }
    }

    /// Whether the product is split into tiles that have to be located.
    pub fn is_tiled(&self) -> bool {
        !matches!(self, Product::GhsBuiltS1)
    }
}

impl fmt::Display for Product {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Remote locations of the products.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Sources {
    /// Zip archive holding the global GHS-BUILT-S1 mosaic.
    pub s1_archive_url: String,
    /// Path of the GHS-BUILT-S1 VRT inside the extracted archive.
    pub s1_payload: PathBuf,
    /// Zip archive holding the GHS-BUILT-S2 tile schema shapefile.
    pub s2_tile_schema_url: String,
    /// Directory URL of the GHS-BUILT tile archives.
    pub built_tiles_base_url: String,
}

impl Default for Sources {
    fn default() -> Self {
        Sources {
            s1_archive_url: S1_ARCHIVE_URL.to_string(),
            s1_payload: PathBuf::from(S1_PAYLOAD),
            s2_tile_schema_url: S2_TILE_SCHEMA_URL.to_string(),
            built_tiles_base_url: BUILT_TILES_BASE_URL.to_string(),
        }
    }
}

impl Sources {
    /// Archive URL of a GHS-BUILT tile.
    pub fn built_tile_url(&self, tile: &str) -> String {
        format!("{}/{}.zip", self.built_tiles_base_url.trim_end_matches('/'), tile)
    }
}
