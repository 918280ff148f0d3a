//! The complete import workflow.
//!
//! ## Steps
//!
//! 1. Check that every GRASS module the requested products need is installed
//! 2. Read the current region and prepare the download directory
//! 3. Per product, in the order S1, S2, BUILT: locate tiles and download them
//! 4. Lower the import memory to what is free
//! 5. Import every downloaded raster
//! 6. Patch multi-tile products into their outputs
//!
//! All temporary artifacts are released when the run ends, however it ends.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use ghs_grass::{CommandRunner, Grass, Workspace};
use ghs_tiles::{Fetch, Product};
use tracing::{info, warn};

use crate::config::ImportConfig;
use crate::context::RunContext;
use crate::fetch::{download_built_tiles, download_s1, download_s2_tiles, prepare_download_dir};
use crate::import::{import_raster, plan_imports, Downloaded};
use crate::locate::{locate_built_tiles, locate_s2_tiles};
use crate::memory::{clamp_memory, MemoryProbe};
use crate::mosaic::{mosaic_groups, patch};
use crate::options::ImportOptions;
use crate::{ImportError, Result};

/// GRASS modules needed to produce `products`, without duplicates.
pub fn required_modules(products: &[Product]) -> Vec<&'static str> {
    let mut modules = vec!["g.region", "g.findfile", "g.remove", "r.import"];
    for product in products {
        let needed: &[&'static str] = match product {
            Product::GhsBuiltS1 => &[],
            Product::GhsBuiltS2 => &["v.import", "v.in.region", "v.select", "v.db.select", "r.patch"],
            Product::GhsBuilt => &[
                "g.gisenv",
                "g.proj",
                "v.in.region",
                "v.in.ogr",
                "v.proj",
                "v.select",
                "v.db.select",
                "r.patch",
            ],
        };
        for &module in needed {
            if !modules.contains(&module) {
                modules.push(module);
            }
        }
    }
    modules
}

/// Outcome of a successful run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    /// Number of files downloaded per requested product.
    pub tiles: BTreeMap<Product, usize>,
    /// Output maps written, in import order.
    pub outputs: Vec<String>,
    /// Memory passed to the imports in MB.
    pub memory_mb: u64,
    /// Directory the files were downloaded to.
    pub download_dir: PathBuf,
}

/// Runs imports against a GRASS installation.
pub struct Importer<'a, R: CommandRunner> {
    grass: &'a Grass<R>,
    fetcher: &'a dyn Fetch,
    memory: &'a dyn MemoryProbe,
    config: &'a ImportConfig,
    run_id: String,
    interrupt: Option<Arc<AtomicBool>>,
}

impl<'a, R: CommandRunner> Importer<'a, R> {
    /// Create an importer. The process id serves as run id.
    pub fn new(
        grass: &'a Grass<R>,
        fetcher: &'a dyn Fetch,
        memory: &'a dyn MemoryProbe,
        config: &'a ImportConfig,
    ) -> Self {
        Importer {
            grass,
            fetcher,
            memory,
            config,
            run_id: std::process::id().to_string(),
            interrupt: None,
        }
    }

    /// Use `run_id` to name temporary artifacts.
    pub fn with_run_id(mut self, run_id: impl Into<String>) -> Self {
        self.run_id = run_id.into();
        self
    }

    /// Stop at the next step once `flag` is set.
    pub fn with_interrupt(mut self, flag: Arc<AtomicBool>) -> Self {
        self.interrupt = Some(flag);
        self
    }

    /// Import the requested products into `workspace`.
    pub fn run(&self, workspace: Workspace, options: &ImportOptions) -> Result<RunSummary> {
        let products = options.outputs.requested();
        if products.is_empty() {
            return Err(ImportError::NoOutputs);
        }

        let mut ctx = RunContext::new(self.grass, workspace, self.run_id.clone());
        if let Some(flag) = &self.interrupt {
            ctx = ctx.with_interrupt(flag.clone());
        }

        self.grass
            .require_modules(ctx.workspace(), &required_modules(&products))?;

        let region = self.grass.region(ctx.workspace())?;
        info!(
            "Current region: {} rows x {} columns, {} cells",
            region.rows,
            region.cols,
            region.cells()
        );

        let dir = prepare_download_dir(&mut ctx, options.directory.as_deref())?;
        let sources = &self.config.sources;

        let mut downloads: Vec<Downloaded> = Vec::new();
        let mut tiles = BTreeMap::new();
        for product in &products {
            ctx.check_interrupt()?;
            let paths = match product {
                Product::GhsBuiltS1 => vec![download_s1(&mut ctx, self.fetcher, sources, &dir)?],
                Product::GhsBuiltS2 => {
                    let urls = locate_s2_tiles(&mut ctx, self.fetcher, sources, &dir)?;
                    download_s2_tiles(&mut ctx, self.fetcher, &urls, &dir)?
                }
                Product::GhsBuilt => {
                    let index = self.config.tile_index()?;
                    let names = locate_built_tiles(&mut ctx, &index, &dir)?;
                    download_built_tiles(&mut ctx, self.fetcher, sources, &names, &dir)?
                }
            };
            if product.is_tiled() && paths.is_empty() {
                warn!("No {} tiles overlap the current region, nothing to import", product);
            }
            tiles.insert(*product, paths.len());
            downloads.extend(paths.into_iter().map(|path| Downloaded {
                product: *product,
                path,
            }));
        }

        info!("Importing...");
        let memory_mb = clamp_memory(options.memory_mb, self.memory);
        let targets = plan_imports(&downloads, &options.outputs, ctx.run_id());
        for target in &targets {
            import_raster(&mut ctx, target, memory_mb, options)?;
        }

        let groups = mosaic_groups(&targets);
        for product in &products {
            if let (Some(inputs), Some(output)) = (groups.get(product), options.outputs.get(*product)) {
                patch(&mut ctx, inputs, output, options.overwrite)?;
            }
        }

        let mut outputs: Vec<String> = Vec::new();
        for target in &targets {
            if let Some(output) = options.outputs.get(target.product) {
                if !outputs.iter().any(|o| o == output) {
                    outputs.push(output.to_string());
                }
            }
        }

        Ok(RunSummary {
            tiles,
            outputs,
            memory_mb,
            download_dir: dir,
        })
    }
}
