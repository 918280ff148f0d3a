//! # ghs-import
//!
//! Downloads the Global Human Settlement built-up grids (GHS-BUILT,
//! GHS-BUILT-S1, GHS-BUILT-S2) provided by the JRC for the current GRASS
//! region and imports them as raster maps.
//!
//! ## Workflow
//!
//! - GHS-BUILT-S1 is one global archive; its VRT is imported directly
//! - GHS-BUILT-S2 tiles are looked up in the published tile schema
//! - GHS-BUILT tiles are looked up in an EPSG:3857 tile index, inside a
//!   temporary location with that projection. Tiles missing on the server
//!   are skipped
//!
//! Products covering the region with several tiles are imported tile by tile
//! and patched into the output map. Where tiles overlap, the tile downloaded
//! first wins.
//!
//! Every temporary file, folder, map and location is registered with the
//! run's [`RunContext`] and removed when the run ends, on success and on
//! failure alike.
//!
//! ## Example
//!
//! ```no_run
//! use ghs_grass::{Grass, ProcessRunner, Workspace};
//! use ghs_import::{ImportConfig, ImportOptions, Importer, Outputs, SystemMemory};
//! use ghs_tiles::{HttpDownloader, Product};
//!
//! let config = ImportConfig::default();
//! let grass = Grass::new(ProcessRunner::new());
//! let downloader = HttpDownloader::new()?;
//!
//! let options = ImportOptions::new(Outputs::default().with(Product::GhsBuiltS2, "ghs_s2"));
//! let summary = Importer::new(&grass, &downloader, &SystemMemory, &config)
//!     .run(Workspace::from_env()?, &options)?;
//! println!("imported {:?}", summary.outputs);
//! # Ok::<(), ghs_import::ImportError>(())
//! ```

pub mod cli;
pub mod config;
mod context;
mod error;
pub mod fetch;
pub mod import;
mod importer;
pub mod locate;
mod memory;
pub mod mosaic;
mod options;
pub mod resources;

pub use config::{Defaults, HttpConfig, ImportConfig, DEFAULT_MEMORY_MB};
pub use context::RunContext;
pub use error::{ImportError, Result};
pub use importer::{required_modules, Importer, RunSummary};
pub use memory::{clamp_memory, FixedMemory, MemoryProbe, SystemMemory};
pub use options::{ImportOptions, Outputs};
pub use resources::{CleanupReport, TempDataset, TempResources};
