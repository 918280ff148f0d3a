//! Finding the tiles that overlap the current region.
//!
//! Both tiled products are located the same way: the current region is turned
//! into a vector map, the product's tile index is imported as a vector map,
//! and `v.select` keeps the index features overlapping the region. The last
//! attribute column of the selected features names the tile.
//!
//! The GHS-BUILT index, generated or published, is defined in EPSG:3857.
//! It is imported into a temporary location with that
//! projection and the region vector is reprojected into it.

use std::fs;
use std::path::Path;

use ghs_grass::{CommandRunner, DatasetKind, ModuleCall, Workspace};
use ghs_tiles::{Fetch, Sources, TileIndex};
use tracing::{debug, info};

use crate::context::RunContext;
use crate::fetch::download_s2_schema;
use crate::Result;

/// Create a vector map of the current region in `workspace`.
///
/// `seq` keeps the names of several region vectors of one run apart.
pub fn region_vector<R: CommandRunner>(ctx: &mut RunContext<'_, R>, workspace: &Workspace, seq: u32) -> Result<String> {
    let name = format!("tmp_region_vect_{}_{}", seq, ctx.run_id());
    ctx.register_dataset(workspace, DatasetKind::Vector, &name);
    ctx.grass()
        .run(workspace, &ModuleCall::new("v.in.region").option("output", &name).quiet())?;
    Ok(name)
}

/// Select the features of `index` overlapping `region` and return the
/// values of their last attribute column.
///
/// Values are returned once each, in the order they first appear.
pub fn select_tiles<R: CommandRunner>(
    ctx: &mut RunContext<'_, R>,
    workspace: &Workspace,
    index: &str,
    region: &str,
) -> Result<Vec<String>> {
    let selected = format!("selected_tiles_{}", ctx.run_id());
    ctx.register_dataset(workspace, DatasetKind::Vector, &selected);

    let call = ModuleCall::new("v.select")
        .option("ainput", index)
        .option("binput", region)
        .option("output", &selected)
        .option("operator", "overlap")
        .quiet();
    ctx.grass().run(workspace, &call)?;

    let rows = ctx.grass().select_attributes(workspace, &selected)?;
    Ok(last_column_unique(rows))
}

fn last_column_unique(rows: Vec<Vec<String>>) -> Vec<String> {
    let mut tiles: Vec<String> = Vec::new();
    for value in rows.into_iter().filter_map(|mut row| row.pop()) {
        if !value.is_empty() && !tiles.contains(&value) {
            tiles.push(value);
        }
    }
    tiles
}

/// URLs of the GHS-BUILT-S2 tiles overlapping the current region.
pub fn locate_s2_tiles<R: CommandRunner>(
    ctx: &mut RunContext<'_, R>,
    fetcher: &dyn Fetch,
    sources: &Sources,
    dir: &Path,
) -> Result<Vec<String>> {
    let shapefile = download_s2_schema(ctx, fetcher, sources, dir)?;
    let workspace = ctx.workspace().clone();

    let grid = format!("tmp_ghs_s2_grid_{}", ctx.run_id());
    ctx.register_dataset(&workspace, DatasetKind::Vector, &grid);
    let call = ModuleCall::new("v.import")
        .option("input", shapefile.display())
        .option("output", &grid)
        .option("extent", "region")
        .quiet();
    ctx.grass().run(&workspace, &call)?;

    ctx.check_interrupt()?;
    let region = region_vector(ctx, &workspace, 1)?;
    let urls = select_tiles(ctx, &workspace, &grid, &region)?;
    debug!(tiles = urls.len(), "located GHS-BUILT-S2 tiles");
    Ok(urls)
}

/// Names of the GHS-BUILT tiles overlapping the current region.
pub fn locate_built_tiles<R: CommandRunner>(
    ctx: &mut RunContext<'_, R>,
    index: &TileIndex,
    dir: &Path,
) -> Result<Vec<String>> {
    let workspace = ctx.workspace().clone();
    let grass = ctx.grass();
    let env = grass.gisenv(&workspace)?;
    let region = region_vector(ctx, &workspace, 2)?;

    let location = format!("temp_import_location_{}", ctx.run_id());
    let gisrc = dir.join(format!("gisrc_{}", ctx.run_id()));
    ctx.register_temp_location(env.location_path(&location), &gisrc);
    let temp_ws = grass.create_location(&workspace, &env, &location, &gisrc, index.epsg())?;
    ctx.set_temp_workspace(temp_ws.clone());

    ctx.check_interrupt()?;
    let geojson = dir.join(format!("tindex_ghs_built_{}.geojson", ctx.run_id()));
    ctx.register_file(&geojson);
    fs::write(&geojson, index.to_geojson_string()?)?;

    let index_map = format!("tindex_vectmap_{}", ctx.run_id());
    ctx.register_dataset(&temp_ws, DatasetKind::Vector, &index_map);
    let call = ModuleCall::new("v.in.ogr")
        .flags("o")
        .option("input", geojson.display())
        .option("output", &index_map)
        .quiet();
    grass.run(&temp_ws, &call)?;

    info!("Reprojecting current region to EPSG:{}...", index.epsg());
    ctx.register_dataset(&temp_ws, DatasetKind::Vector, &region);
    let call = ModuleCall::new("v.proj")
        .option("location", &env.location)
        .option("mapset", &env.mapset)
        .option("input", &region)
        .option("output", &region)
        .quiet();
    grass.run(&temp_ws, &call)?;

    let tiles = select_tiles(ctx, &temp_ws, &index_map, &region)?;
    debug!(tiles = tiles.len(), "located GHS-BUILT tiles");
    Ok(tiles)
}
