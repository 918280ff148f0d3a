//! Generated tile grid of the GHS-BUILT (Landsat) product.
//!
//! The GHS-BUILT tiles form a regular grid in Web Mercator (EPSG:3857), so
//! a grid can be described by its origin, tile size and dimensions. The grid
//! lists every cell, including cells for which no tile was published; see
//! [`TileIndex`](crate::TileIndex) for using a published index instead. [`TileGrid::to_geojson`] renders it as a GeoJSON
//! FeatureCollection that GRASS can import, with one polygon per tile and the
//! tile name in the `tile` attribute.
//!
//! ## Tile naming
//!
//! Tiles are named `<prefix>_<row>_<col>`, where rows count from the north
//! edge and columns from the west edge, both starting at 1.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::{Result, TileError};

/// Half the extent of the Web Mercator square, in meters.
pub const WEB_MERCATOR_HALF_EXTENT: f64 = 20_037_508.342_789_244;

/// Attribute holding the tile name in the generated index.
pub const TILE_ATTRIBUTE: &str = "tile";

/// Regular grid of square tiles.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TileGrid {
    /// EPSG code of the grid coordinates.
    pub epsg: u32,
    /// X coordinate of the north-west corner of tile (1, 1).
    pub origin_x: f64,
    /// Y coordinate of the north-west corner of tile (1, 1).
    pub origin_y: f64,
    /// Edge length of a tile in map units.
    pub tile_size: f64,
    /// Number of tile rows.
    pub rows: u32,
    /// Number of tile columns.
    pub cols: u32,
    /// Common prefix of the tile names.
    pub name_prefix: String,
}

impl Default for TileGrid {
    fn default() -> Self {
        TileGrid {
            epsg: 3857,
            origin_x: -WEB_MERCATOR_HALF_EXTENT,
            origin_y: WEB_MERCATOR_HALF_EXTENT,
            tile_size: 2.0 * WEB_MERCATOR_HALF_EXTENT / 36.0,
            rows: 36,
            cols: 36,
            name_prefix: "GHS_BUILT_LDSMT_GLOBE_R2018A_3857_30_V2_0".to_string(),
        }
    }
}

/// Bounding box of one tile.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TileBounds {
    /// Western edge.
    pub west: f64,
    /// Southern edge.
    pub south: f64,
    /// Eastern edge.
    pub east: f64,
    /// Northern edge.
    pub north: f64,
}

impl TileGrid {
    /// Check that the grid describes at least one tile of positive size.
    pub fn validate(&self) -> Result<()> {
        if self.rows == 0 || self.cols == 0 {
            return Err(TileError::InvalidGrid(format!(
                "grid has {} rows and {} columns",
                self.rows, self.cols
            )));
        }
        if !(self.tile_size.is_finite() && self.tile_size > 0.0) {
            return Err(TileError::InvalidGrid(format!(
                "tile size must be positive, got {}",
                self.tile_size
            )));
        }
        Ok(())
    }

    /// Name of the tile at 1-based `row` and `col`.
    pub fn tile_name(&self, row: u32, col: u32) -> String {
        format!("{}_{}_{}", self.name_prefix, row, col)
    }

    /// Bounds of the tile at 1-based `row` and `col`.
    ///
    /// Returns `None` for a row or column outside the grid, including 0.
    pub fn tile_bounds(&self, row: u32, col: u32) -> Option<TileBounds> {
        if !(1..=self.rows).contains(&row) || !(1..=self.cols).contains(&col) {
            return None;
        }
        let west = self.origin_x + (col - 1) as f64 * self.tile_size;
        let north = self.origin_y - (row - 1) as f64 * self.tile_size;
        Some(TileBounds {
            west,
            south: north - self.tile_size,
            east: west + self.tile_size,
            north,
        })
    }

    /// Total number of tiles.
    pub fn tile_count(&self) -> usize {
        self.rows as usize * self.cols as usize
    }

    /// Render the grid as a GeoJSON FeatureCollection.
    ///
    /// Each feature carries the tile name in the [`TILE_ATTRIBUTE`] property.
    /// The legacy `crs` member names the grid's EPSG code.
    pub fn to_geojson(&self) -> Result<Value> {
        self.validate()?;

        let mut features = Vec::with_capacity(self.tile_count());
        for row in 1..=self.rows {
            for col in 1..=self.cols {
                let Some(b) = self.tile_bounds(row, col) else {
                    continue;
                };
                features.push(json!({
                    "type": "Feature",
                    "properties": { TILE_ATTRIBUTE: self.tile_name(row, col) },
                    "geometry": {
                        "type": "Polygon",
                        "coordinates": [[
                            [b.west, b.south],
                            [b.east, b.south],
                            [b.east, b.north],
                            [b.west, b.north],
                            [b.west, b.south],
                        ]],
                    },
                }));
            }
        }

        Ok(json!({
            "type": "FeatureCollection",
            "name": self.name_prefix,
            "crs": {
                "type": "name",
                "properties": { "name": format!("urn:ogc:def:crs:EPSG::{}", self.epsg) },
            },
            "features": features,
        }))
    }

    /// Serialized GeoJSON, ready to be written to a file.
    pub fn to_geojson_string(&self) -> Result<String> {
        Ok(serde_json::to_string(&self.to_geojson()?)?)
    }
}
