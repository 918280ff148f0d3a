//! Error types for the tiles crate.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while locating, downloading or unpacking tiles.
#[derive(Debug, Error)]
pub enum TileError {
    /// I/O error reading or writing a file.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to build the HTTP client.
    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),

    /// Failed to download a file from the remote server.
    #[error("There was a problem downloading {url}: {reason}")]
    DownloadFailed {
        /// Requested URL.
        url: String,
        /// Reason for failure.
        reason: String,
    },

    /// The server has no file at the requested URL (HTTP 404).
    #[error("{url} does not exist on the server (HTTP 404 Not Found)")]
    NotFound {
        /// Requested URL.
        url: String,
    },

    /// URL cannot be used to derive a local file name.
    #[error("Invalid URL {url}: {reason}")]
    InvalidUrl {
        /// The offending URL.
        url: String,
        /// What was wrong.
        reason: String,
    },

    /// Archive extraction failed.
    #[error("Failed to extract {path}: {reason}")]
    ExtractionFailed {
        /// Archive path.
        path: PathBuf,
        /// Reason for failure.
        reason: String,
    },

    /// The archive was extracted but the expected file is not inside it.
    #[error("Expected file {expected} not found after extracting {archive}")]
    PayloadMissing {
        /// Archive path.
        archive: PathBuf,
        /// Path the payload was expected at.
        expected: PathBuf,
    },

    /// Tile grid definition cannot produce any tiles.
    #[error("Invalid tile grid: {0}")]
    InvalidGrid(String),

    /// Tile index document is not a usable FeatureCollection.
    #[error("Invalid tile index: {0}")]
    InvalidIndex(String),

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl TileError {
    /// Whether the server reported the requested file as missing.
    pub fn is_not_found(&self) -> bool {
        matches!(self, TileError::NotFound { .. })
    }
}
