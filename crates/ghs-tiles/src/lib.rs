//! # ghs-tiles
//!
//! Sources, tile indexes and downloads for the Global Human Settlement (GHS)
//! built-up grids published by the JRC.
//!
//! This crate provides:
//! - [`Product`] and [`Sources`] - the three built-up products and their URLs
//! - [`TileIndex`] - the GHS-BUILT tile index, either a generated [`TileGrid`]
//!   or a [`PublishedIndex`] read from GeoJSON
//! - [`HttpDownloader`] - single-attempt blocking downloads behind the [`Fetch`] trait
//! - [`ArchiveLayout`] / [`extract_zip`] - zip extraction and payload lookup
//!
//! ## Example
//!
//! ```no_run
//! use std::path::Path;
//! use ghs_tiles::{extract_zip, ArchiveLayout, Fetch, HttpDownloader, Payload, Sources};
//!
//! let sources = Sources::default();
//! let downloader = HttpDownloader::new()?;
//!
//! let url = sources.built_tile_url("GHS_BUILT_LDSMT_GLOBE_R2018A_3857_30_V2_0_10_13");
//! let layout = ArchiveLayout::for_url(&url, Path::new("/tmp/ghs"), &Payload::Extension("tif".into()))?;
//! downloader.fetch(&url, &layout.archive)?;
//! extract_zip(&layout.archive, &layout.unzip_dir)?;
//! println!("GeoTIFF at {}", layout.verify_payload()?.display());
//! # Ok::<(), ghs_tiles::TileError>(())
//! ```

mod archive;
mod download;
mod error;
mod grid;
mod index;
mod product;

pub use archive::{extract_zip, file_name_from_url, ArchiveLayout, Payload};
pub use download::{DownloadStats, Fetch, HttpDownloader, DEFAULT_TIMEOUT_SECS};
pub use error::TileError;
pub use grid::{TileBounds, TileGrid, TILE_ATTRIBUTE, WEB_MERCATOR_HALF_EXTENT};
pub use index::{PublishedIndex, TileIndex, DEFAULT_INDEX_EPSG};
pub use product::{Product, Sources};

/// Result type for tile operations.
pub type Result<T> = std::result::Result<T, TileError>;
