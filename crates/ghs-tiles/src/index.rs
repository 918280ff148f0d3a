//! Tile indexes used to locate GHS-BUILT tiles.
//!
//! A [`TileIndex`] is either the generated [`TileGrid`] or a [`PublishedIndex`]
//! read from a GeoJSON FeatureCollection. A published index lists only the
//! tiles that exist on the server, each with its name in the
//! [`TILE_ATTRIBUTE`] property.

use std::fs;
use std::path::Path;

use serde_json::Value;

use crate::grid::{TileGrid, TILE_ATTRIBUTE};
use crate::{Result, TileError};

/// EPSG code of an index whose GeoJSON names no CRS.
pub const DEFAULT_INDEX_EPSG: u32 = 3857;

/// A tile index read from a GeoJSON document.
#[derive(Debug, Clone, PartialEq)]
pub struct PublishedIndex {
    epsg: u32,
    tiles: Vec<String>,
    geojson: String,
}

impl PublishedIndex {
    /// Parse and check a GeoJSON FeatureCollection.
    ///
    /// Every feature needs a geometry and a non-empty [`TILE_ATTRIBUTE`]
    /// property. The CRS is taken from the legacy `crs` member when present.
    pub fn from_geojson_str(text: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(text)?;
        if value["type"] != "FeatureCollection" {
            return Err(invalid("expected a FeatureCollection"));
        }

        let features = value["features"]
            .as_array()
            .ok_or_else(|| invalid("missing 'features' array"))?;
        let mut tiles = Vec::with_capacity(features.len());
        for (idx, feature) in features.iter().enumerate() {
            let name = feature["properties"][TILE_ATTRIBUTE]
                .as_str()
                .filter(|name| !name.is_empty())
                .ok_or_else(|| invalid(format!("feature {} has no '{}' property", idx, TILE_ATTRIBUTE)))?;
            if !feature["geometry"].is_object() {
                return Err(invalid(format!("feature {} ({}) has no geometry", idx, name)));
            }
            tiles.push(name.to_string());
        }
        if tiles.is_empty() {
            return Err(invalid("index has no features"));
        }

        let epsg = match value["crs"]["properties"]["name"].as_str() {
            Some(name) => parse_crs_name(name).ok_or_else(|| invalid(format!("unsupported CRS '{}'", name)))?,
            None => DEFAULT_INDEX_EPSG,
        };

        Ok(PublishedIndex {
            epsg,
            tiles,
            geojson: text.to_string(),
        })
    }

    /// Read an index from a GeoJSON file.
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        Self::from_geojson_str(&text)
    }

    /// EPSG code of the index geometries.
    pub fn epsg(&self) -> u32 {
        self.epsg
    }

    /// Tile names in document order.
    pub fn tiles(&self) -> &[String] {
        &self.tiles
    }

    /// Whether the index lists `tile`.
    pub fn contains(&self, tile: &str) -> bool {
        self.tiles.iter().any(|t| t == tile)
    }

    /// The document as read.
    pub fn geojson(&self) -> &str {
        &self.geojson
    }
}

/// Index the GHS-BUILT tiles are selected from.
#[derive(Debug, Clone, PartialEq)]
pub enum TileIndex {
    /// Regular grid generated from its geometry.
    Grid(TileGrid),
    /// Index read from a GeoJSON file.
    Published(PublishedIndex),
}

impl TileIndex {
    /// EPSG code of the index geometries.
    pub fn epsg(&self) -> u32 {
        match self {
            TileIndex::Grid(grid) => grid.epsg,
            TileIndex::Published(index) => index.epsg(),
        }
    }

    /// GeoJSON document to import into GRASS.
    pub fn to_geojson_string(&self) -> Result<String> {
        match self {
            TileIndex::Grid(grid) => grid.to_geojson_string(),
            TileIndex::Published(index) => Ok(index.geojson().to_string()),
        }
    }
}

impl From<TileGrid> for TileIndex {
    fn from(grid: TileGrid) -> Self {
        TileIndex::Grid(grid)
    }
}

impl From<PublishedIndex> for TileIndex {
    fn from(index: PublishedIndex) -> Self {
        TileIndex::Published(index)
    }
}

fn invalid(reason: impl Into<String>) -> TileError {
    TileError::InvalidIndex(reason.into())
}

/// EPSG code of a GeoJSON CRS name such as `urn:ogc:def:crs:EPSG::3857`.
fn parse_crs_name(name: &str) -> Option<u32> {
    if name.ends_with("CRS84") {
        return Some(4326);
    }
    let (authority, code) = name.rsplit_once(':')?;
    if !authority.to_ascii_uppercase().contains("EPSG") {
        return None;
    }
    code.parse().ok()
}
