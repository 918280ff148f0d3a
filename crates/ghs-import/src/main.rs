//! `ghs-import` binary.

use std::process::ExitCode;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use ghs_grass::{Grass, ProcessRunner, Workspace};
use ghs_import::cli::Cli;
use ghs_import::{ImportConfig, Importer, Result, RunSummary, SystemMemory};
use ghs_tiles::HttpDownloader;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

fn setup_logging(default_filter: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: &Cli) -> Result<RunSummary> {
    let config = match &cli.config {
        Some(path) => ImportConfig::load(path)?,
        None => ImportConfig::default(),
    };
    let options = cli.import_options(&config);

    let interrupt = Arc::new(AtomicBool::new(false));
    let flag = interrupt.clone();
    if let Err(e) = ctrlc::set_handler(move || flag.store(true, Ordering::Relaxed)) {
        warn!("Cannot install interrupt handler: {}", e);
    }

    let workspace = Workspace::from_env()?;
    let grass = Grass::new(ProcessRunner::new());
    let downloader = HttpDownloader::with_timeout(
        Duration::from_secs(config.http.timeout_secs),
        config.http.user_agent.as_deref(),
    )?;

    let summary = Importer::new(&grass, &downloader, &SystemMemory, &config)
        .with_interrupt(interrupt)
        .run(workspace, &options)?;

    let stats = downloader.download_stats();
    info!(
        files = stats.files_downloaded,
        bytes = stats.bytes_downloaded,
        "downloads complete"
    );
    Ok(summary)
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    setup_logging(cli.log_filter());

    match run(&cli) {
        Ok(summary) => {
            for output in &summary.outputs {
                info!("Raster map <{}> created", output);
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}
