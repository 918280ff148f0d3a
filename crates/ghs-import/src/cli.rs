//! Command line interface.

use std::path::PathBuf;

use clap::{ArgAction, ArgGroup, Parser};

use crate::config::ImportConfig;
use crate::options::{ImportOptions, Outputs};

/// Downloads and imports Global Human Settlement data (provided by the JRC,
/// European Commission) for the current region.
#[derive(Debug, Parser)]
#[command(name = "ghs-import", author, version, about, long_about = None)]
#[command(group(
    ArgGroup::new("outputs")
        .required(true)
        .multiple(true)
        .args(["ghs_built", "ghs_built_s1", "ghs_built_s2"])
))]
pub struct Cli {
    /// Output raster map for the Landsat derived GHS built-up grid (30 m)
    #[arg(long, value_name = "NAME")]
    pub ghs_built: Option<String>,

    /// Output raster map for the Sentinel-1 derived GHS built-up grid (20 m)
    #[arg(long, value_name = "NAME")]
    pub ghs_built_s1: Option<String>,

    /// Output raster map for the Sentinel-2 derived GHS built-up grid (10 m)
    #[arg(long, value_name = "NAME")]
    pub ghs_built_s2: Option<String>,

    /// Directory to keep downloads in. Created if missing
    #[arg(long, value_name = "DIR")]
    pub directory: Option<PathBuf>,

    /// Maximum memory for raster imports in MB [default: 300]
    #[arg(long, value_name = "MB", value_parser = clap::value_parser!(u64).range(1..))]
    pub memory: Option<u64>,

    /// Import at the resolution of the current region instead of the source resolution
    #[arg(short = 'r', long)]
    pub region_resolution: bool,

    /// Allow output maps to replace existing maps of the same name
    #[arg(long)]
    pub overwrite: bool,

    /// YAML configuration file
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// More log output (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,

    /// Only log warnings and errors
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,
}

impl Cli {
    /// Requested output names.
    pub fn outputs(&self) -> Outputs {
        Outputs {
            ghs_built: self.ghs_built.clone(),
            ghs_built_s1: self.ghs_built_s1.clone(),
            ghs_built_s2: self.ghs_built_s2.clone(),
        }
    }

    /// Run options, with defaults taken from `config`.
    pub fn import_options(&self, config: &ImportConfig) -> ImportOptions {
        ImportOptions {
            outputs: self.outputs(),
            directory: self.directory.clone(),
            memory_mb: self.memory.unwrap_or(config.defaults.memory_mb),
            region_resolution: self.region_resolution,
            overwrite: self.overwrite,
        }
    }

    /// Log filter used when `RUST_LOG` is not set.
    pub fn log_filter(&self) -> &'static str {
        if self.quiet {
            return "warn";
        }
        match self.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    }
}
