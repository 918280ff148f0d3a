//! Patching tiles of one product into its output map.
//!
//! `r.patch` fills each cell from the first input that has data there, so
//! where tiles overlap the tile downloaded first wins.

use std::collections::BTreeMap;

use ghs_grass::{CommandRunner, ModuleCall};
use ghs_tiles::Product;
use tracing::info;

use crate::context::RunContext;
use crate::import::ImportTarget;
use crate::Result;

/// Intermediate maps per product, in import order.
pub fn mosaic_groups(targets: &[ImportTarget]) -> BTreeMap<Product, Vec<String>> {
    let mut groups: BTreeMap<Product, Vec<String>> = BTreeMap::new();
    for target in targets.iter().filter(|t| t.intermediate) {
        groups.entry(target.product).or_default().push(target.map.clone());
    }
    groups
}

/// Build the `r.patch` call merging `inputs` into `output`.
pub fn patch_call(inputs: &[String], output: &str, overwrite: bool) -> ModuleCall {
    let call = ModuleCall::new("r.patch")
        .option_list("input", inputs)
        .option("output", output);
    let call = if overwrite { call.overwrite() } else { call };
    call.quiet()
}

/// Patch `inputs` into `output` in the user's session.
pub fn patch<R: CommandRunner>(
    ctx: &mut RunContext<'_, R>,
    inputs: &[String],
    output: &str,
    overwrite: bool,
) -> Result<()> {
    ctx.check_interrupt()?;
    info!("Patching {} tiles into <{}>...", inputs.len(), output);
    ctx.grass()
        .run(ctx.workspace(), &patch_call(inputs, output, overwrite))?;
    Ok(())
}
