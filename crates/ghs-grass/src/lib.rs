//! # ghs-grass
//!
//! A small client for driving GRASS GIS modules from Rust.
//!
//! GRASS does its work in separate module executables (`g.region`, `r.import`,
//! `v.select`, ...) that find their session through a GISRC file. This crate
//! provides:
//! - [`ModuleCall`] - a typed description of one module invocation
//! - [`CommandRunner`] / [`ProcessRunner`] - execution of those invocations
//! - [`Workspace`] - an explicit session handle, passed to every call
//! - [`Grass`] - region/projection queries, dataset lookup and removal,
//!   capability checks and temporary location creation
//!
//! ## Example
//!
//! ```no_run
//! use ghs_grass::{Grass, ProcessRunner, Workspace};
//!
//! let grass = Grass::new(ProcessRunner::new());
//! let workspace = Workspace::from_env()?;
//! let region = grass.region(&workspace)?;
//! println!("{} x {} cells", region.rows, region.cols);
//! # Ok::<(), ghs_grass::GrassError>(())
//! ```

mod client;
mod error;
mod module;
mod region;
mod runner;
mod workspace;

pub use client::{DatasetKind, Grass, ProjInfo};
pub use error::{GrassError, GrassResult};
pub use module::{parse_key_value, parse_table, ModuleCall};
pub use region::Region;
pub use runner::{CommandRunner, ProcessRunner};
pub use workspace::{write_gisrc, GisEnv, Workspace, GISRC_VAR};
