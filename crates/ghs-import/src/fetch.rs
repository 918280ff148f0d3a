//! Downloading product files into the download directory.
//!
//! Everything downloaded or extracted here is registered with the run before
//! it is written.

use std::fs;
use std::path::{Path, PathBuf};

use ghs_grass::CommandRunner;
use ghs_tiles::{extract_zip, ArchiveLayout, Fetch, Payload, Product, Sources};
use tracing::{info, warn};

use crate::context::RunContext;
use crate::{ImportError, Result};

/// Directory to download into.
///
/// A user supplied directory is created if needed and kept. Without one a
/// temporary directory is created and registered for removal.
pub fn prepare_download_dir<R: CommandRunner>(ctx: &mut RunContext<'_, R>, directory: Option<&Path>) -> Result<PathBuf> {
    match directory {
        Some(dir) => {
            fs::create_dir_all(dir)?;
            Ok(dir.to_path_buf())
        }
        None => {
            let dir = tempfile::Builder::new()
                .prefix(&format!("ghs_import_{}_", ctx.run_id()))
                .tempdir()?
                .keep();
            ctx.register_folder(&dir);
            Ok(dir)
        }
    }
}

/// Download a zip archive, extract it and return the path of its payload.
pub fn download_archive<R: CommandRunner>(
    ctx: &mut RunContext<'_, R>,
    fetcher: &dyn Fetch,
    url: &str,
    dir: &Path,
    payload: &Payload,
) -> Result<PathBuf> {
    ctx.check_interrupt()?;
    let layout = ArchiveLayout::for_url(url, dir, payload)?;

    ctx.register_file(&layout.archive);
    fetcher.fetch(url, &layout.archive)?;

    ctx.register_folder(&layout.unzip_dir);
    extract_zip(&layout.archive, &layout.unzip_dir)?;

    Ok(layout.verify_payload()?.to_path_buf())
}

/// Download a single file to `dest`.
pub fn download_file<R: CommandRunner>(
    ctx: &mut RunContext<'_, R>,
    fetcher: &dyn Fetch,
    url: &str,
    dest: &Path,
) -> Result<PathBuf> {
    ctx.check_interrupt()?;
    ctx.register_file(dest);
    fetcher.fetch(url, dest)?;
    Ok(dest.to_path_buf())
}

/// Download the global GHS-BUILT-S1 archive and return its VRT.
pub fn download_s1<R: CommandRunner>(
    ctx: &mut RunContext<'_, R>,
    fetcher: &dyn Fetch,
    sources: &Sources,
    dir: &Path,
) -> Result<PathBuf> {
    info!("Downloading {}...", Product::GhsBuiltS1.description());
    download_archive(
        ctx,
        fetcher,
        &sources.s1_archive_url,
        dir,
        &Payload::RelativePath(sources.s1_payload.clone()),
    )
}

/// Download GHS-BUILT-S2 tiles given their URLs.
///
/// Tiles are written as `tmp_s2_tile_<run>_<n>.tif` in the order of `urls`.
pub fn download_s2_tiles<R: CommandRunner>(
    ctx: &mut RunContext<'_, R>,
    fetcher: &dyn Fetch,
    urls: &[String],
    dir: &Path,
) -> Result<Vec<PathBuf>> {
    let mut paths = Vec::with_capacity(urls.len());
    for (idx, url) in urls.iter().enumerate() {
        info!(
            "Downloading {} of {} required tiles of {}...",
            idx + 1,
            urls.len(),
            Product::GhsBuiltS2.description()
        );
        let dest = dir.join(format!("tmp_s2_tile_{}_{}.tif", ctx.run_id(), idx));
        paths.push(download_file(ctx, fetcher, url, &dest)?);
    }
    Ok(paths)
}

/// Download and extract GHS-BUILT tiles given their names.
///
/// A tile the server does not have (HTTP 404) is skipped with a warning; the
/// generated grid also lists cells for which no tile was published. Any other
/// failure aborts.
pub fn download_built_tiles<R: CommandRunner>(
    ctx: &mut RunContext<'_, R>,
    fetcher: &dyn Fetch,
    sources: &Sources,
    tiles: &[String],
    dir: &Path,
) -> Result<Vec<PathBuf>> {
    let payload = Payload::Extension("tif".to_string());
    let mut paths = Vec::with_capacity(tiles.len());
    for (idx, tile) in tiles.iter().enumerate() {
        info!(
            "Downloading {} of {} required tiles of {}...",
            idx + 1,
            tiles.len(),
            Product::GhsBuilt.description()
        );
        let url = sources.built_tile_url(tile);
        match download_archive(ctx, fetcher, &url, dir, &payload) {
            Ok(path) => paths.push(path),
            Err(ImportError::Tiles(e)) if e.is_not_found() => {
                warn!("Tile {} is not published, skipping: {}", tile, e);
            }
            Err(e) => return Err(e),
        }
    }
    Ok(paths)
}

/// Download the GHS-BUILT-S2 tile schema and return its shapefile.
pub fn download_s2_schema<R: CommandRunner>(
    ctx: &mut RunContext<'_, R>,
    fetcher: &dyn Fetch,
    sources: &Sources,
    dir: &Path,
) -> Result<PathBuf> {
    info!("Downloading {} tile schema...", Product::GhsBuiltS2.label());
    download_archive(
        ctx,
        fetcher,
        &sources.s2_tile_schema_url,
        dir,
        &Payload::Extension("shp".to_string()),
    )
}
