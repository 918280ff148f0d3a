//! What a run should produce.

use std::path::PathBuf;

use ghs_tiles::Product;

use crate::config::DEFAULT_MEMORY_MB;

/// Output raster names, one per requested product.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Outputs {
    /// Output of GHS-BUILT.
    pub ghs_built: Option<String>,
    /// Output of GHS-BUILT-S1.
    pub ghs_built_s1: Option<String>,
    /// Output of GHS-BUILT-S2.
    pub ghs_built_s2: Option<String>,
}

impl Outputs {
    /// Output name of `product`, if it was requested.
    pub fn get(&self, product: Product) -> Option<&str> {
        match product {
            Product::GhsBuilt => self.ghs_built.as_deref(),
            Product::GhsBuiltS1 => self.ghs_built_s1.as_deref(),
            Product::GhsBuiltS2 => self.ghs_built_s2.as_deref(),
        }
    }

    /// Set the output name of `product`.
    pub fn with(mut self, product: Product, name: impl Into<String>) -> Self {
        let slot = match product {
            Product::GhsBuilt => &mut self.ghs_built,
            Product::GhsBuiltS1 => &mut self.ghs_built_s1,
            Product::GhsBuiltS2 => &mut self.ghs_built_s2,
        };
        *slot = Some(name.into());
        self
    }

    /// Requested products in processing order.
    pub fn requested(&self) -> Vec<Product> {
        Product::ALL
            .into_iter()
            .filter(|p| self.get(*p).is_some())
            .collect()
    }

    /// Whether no product was requested.
    pub fn is_empty(&self) -> bool {
        self.requested().is_empty()
    }
}

/// Options of one import run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportOptions {
    /// Output names.
    pub outputs: Outputs,
    /// Directory to keep downloads in. A temporary directory is used and
    /// removed when not set.
    pub directory: Option<PathBuf>,
    /// Memory for raster imports in MB.
    pub memory_mb: u64,
    /// Import at the resolution of the current region.
    pub region_resolution: bool,
    /// Replace output maps that already exist.
    pub overwrite: bool,
}

impl ImportOptions {
    /// Options producing `outputs` with all other settings at their defaults.
    pub fn new(outputs: Outputs) -> Self {
        ImportOptions {
            outputs,
            directory: None,
            memory_mb: DEFAULT_MEMORY_MB,
            region_resolution: false,
            overwrite: false,
        }
    }
}
