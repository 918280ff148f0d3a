//! Importing downloaded rasters into the current mapset.

use std::path::PathBuf;

use ghs_grass::{CommandRunner, DatasetKind, ModuleCall};
use ghs_tiles::Product;
use tracing::debug;

use crate::context::RunContext;
use crate::options::{ImportOptions, Outputs};
use crate::Result;

/// A downloaded raster file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Downloaded {
    /// Product the file belongs to.
    pub product: Product,
    /// Local path.
    pub path: PathBuf,
}

/// Where a downloaded raster is imported to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportTarget {
    /// Product the raster belongs to.
    pub product: Product,
    /// Local path.
    pub path: PathBuf,
    /// Name of the imported map.
    pub map: String,
    /// Whether `map` is an intermediate to be patched into the output.
    pub intermediate: bool,
}

/// Assign map names to downloaded rasters.
///
/// A product with a single file is imported straight into its output name.
/// With several files each goes to `tmp_ghs_raster_<run>_<n>`, where `n` is
/// the 1-based position of the file among all downloads.
pub fn plan_imports(downloads: &[Downloaded], outputs: &Outputs, run_id: &str) -> Vec<ImportTarget> {
    let count = |product: Product| downloads.iter().filter(|d| d.product == product).count();

    downloads
        .iter()
        .enumerate()
        .filter_map(|(idx, download)| {
            let output = outputs.get(download.product)?;
            let intermediate = count(download.product) > 1;
            let map = if intermediate {
                format!("tmp_ghs_raster_{}_{}", run_id, idx + 1)
            } else {
                output.to_string()
            };
            Some(ImportTarget {
                product: download.product,
                path: download.path.clone(),
                map,
                intermediate,
            })
        })
        .collect()
}

/// Build the `r.import` call for `target`.
pub fn import_call(target: &ImportTarget, memory_mb: u64, options: &ImportOptions) -> ModuleCall {
    let mut call = ModuleCall::new("r.import")
        .option("input", target.path.display())
        .option("output", &target.map)
        .option("memory", memory_mb)
        .option("extent", "region");
    if options.region_resolution {
        call = call.option("resolution", "region").option("resample", "nearest");
    }
    // Only output names can clash with existing maps.
    if options.overwrite && !target.intermediate {
        call = call.overwrite();
    }
    call.quiet()
}

/// Import one raster into the user's session.
pub fn import_raster<R: CommandRunner>(
    ctx: &mut RunContext<'_, R>,
    target: &ImportTarget,
    memory_mb: u64,
    options: &ImportOptions,
) -> Result<()> {
    ctx.check_interrupt()?;
    let workspace = ctx.workspace().clone();
    if target.intermediate {
        ctx.register_dataset(&workspace, DatasetKind::Raster, &target.map);
    }
    debug!(map = %target.map, path = %target.path.display(), "importing");
    ctx.grass()
        .run(&workspace, &import_call(target, memory_mb, options))?;
    Ok(())
}
