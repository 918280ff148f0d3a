//! Error types for the import workflow.

use std::path::PathBuf;

use ghs_grass::GrassError;
use ghs_tiles::TileError;
use thiserror::Error;

/// Result type for import operations.
pub type Result<T> = std::result::Result<T, ImportError>;

/// Errors that abort an import run.
#[derive(Debug, Error)]
pub enum ImportError {
    /// A GRASS module failed or is unavailable.
    #[error(transparent)]
    Grass(#[from] GrassError),

    /// Locating, downloading or unpacking a tile failed.
    #[error(transparent)]
    Tiles(#[from] TileError),

    /// I/O error on the local filesystem.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The configuration file could not be read.
    #[error("Failed to read configuration {path}: {reason}")]
    Config {
        /// Configuration file path.
        path: PathBuf,
        /// Reason for failure.
        reason: String,
    },

    /// No output map was requested.
    #[error("At least one of the GHS-BUILT, GHS-BUILT-S1 or GHS-BUILT-S2 outputs must be requested")]
    NoOutputs,

    /// The user interrupted the run.
    #[error("Interrupted by user")]
    Interrupted,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wrapped_errors_are_transparent() {
        let err: ImportError = TileError::DownloadFailed {
            url: "https://x/y.zip".to_string(),
            reason: "HTTP 404 Not Found".to_string(),
        }
        .into();
        assert_eq!(
            err.to_string(),
            "There was a problem downloading https://x/y.zip: HTTP 404 Not Found"
        );
    }
}
