//! The computational region of a GRASS session.

use std::collections::BTreeMap;

use crate::module::parse_key_value;
use crate::{GrassError, GrassResult};

/// Rectangular extent and resolution of the current computational region.
///
/// Read-only input: this crate never changes the user's region.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Region {
    /// Northern edge.
    pub north: f64,
    /// Southern edge.
    pub south: f64,
    /// Eastern edge.
    pub east: f64,
    /// Western edge.
    pub west: f64,
    /// North-south cell size.
    pub nsres: f64,
    /// East-west cell size.
    pub ewres: f64,
    /// Number of rows.
    pub rows: u64,
    /// Number of columns.
    pub cols: u64,
}

impl Region {
    /// Parse the shell-style output of `g.region -g`.
    pub fn parse(output: &str) -> GrassResult<Self> {
        let values = parse_key_value(output);
        Ok(Region {
            north: field(&values, "n")?,
            south: field(&values, "s")?,
            east: field(&values, "e")?,
            west: field(&values, "w")?,
            nsres: field(&values, "nsres")?,
            ewres: field(&values, "ewres")?,
            rows: field(&values, "rows")?,
            cols: field(&values, "cols")?,
        })
    }

    /// Number of cells in the region.
    pub fn cells(&self) -> u64 {
        self.rows * self.cols
    }

    /// Region width in map units.
    pub fn width(&self) -> f64 {
        self.east - self.west
    }

    /// Region height in map units.
    pub fn height(&self) -> f64 {
        self.north - self.south
    }
}

fn field<T: std::str::FromStr>(values: &BTreeMap<String, String>, key: &str) -> GrassResult<T> {
    let raw = values
        .get(key)
        .ok_or_else(|| GrassError::parse("g.region", format!("missing key '{}'", key)))?;
    raw.parse()
        .map_err(|_| GrassError::parse("g.region", format!("invalid value for '{}': {}", key, raw)))
}
