//! Blocking HTTP downloads.
//!
//! Each download is a single attempt. There is no retry and no resume: a
//! failed request, a non-success status or a failed write is returned as an
//! error. A 404 is reported as [`TileError::NotFound`] so callers can tell a
//! file that was never published from a broken transfer.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::StatusCode;
use tracing::debug;

use crate::{Result, TileError};

/// Default timeout for a single HTTP request in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 3600;

/// Something that can fetch a URL into a local file.
pub trait Fetch {
    /// Download `url` to `dest`, returning the number of bytes written.
    fn fetch(&self, url: &str, dest: &Path) -> Result<u64>;
}

/// Download statistics for a downloader.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DownloadStats {
    /// Number of files downloaded.
    pub files_downloaded: usize,
    /// Total bytes downloaded.
    pub bytes_downloaded: u64,
}

/// HTTP downloader backed by a blocking `reqwest` client.
#[derive(Debug)]
pub struct HttpDownloader {
    client: Client,
    timeout: Duration,
    files_downloaded: AtomicUsize,
    bytes_downloaded: AtomicU64,
}

impl HttpDownloader {
    /// Create a downloader with the default timeout.
    pub fn new() -> Result<Self> {
        Self::with_timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS), None)
    }

    /// Create a downloader with a request timeout and optional user agent.
    pub fn with_timeout(timeout: Duration, user_agent: Option<&str>) -> Result<Self> {
        let mut builder = Client::builder().timeout(timeout);
        if let Some(agent) = user_agent {
            builder = builder.user_agent(agent.to_string());
        }

        Ok(HttpDownloader {
            client: builder.build()?,
            timeout,
            files_downloaded: AtomicUsize::new(0),
            bytes_downloaded: AtomicU64::new(0),
        })
    }

    /// Request timeout.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Statistics for this downloader so far.
    pub fn download_stats(&self) -> DownloadStats {
        DownloadStats {
            files_downloaded: self.files_downloaded.load(Ordering::Relaxed),
            bytes_downloaded: self.bytes_downloaded.load(Ordering::Relaxed),
        }
    }

    fn failed(url: &str, reason: impl ToString) -> TileError {
        TileError::DownloadFailed {
            url: url.to_string(),
            reason: reason.to_string(),
        }
    }
}

impl Fetch for HttpDownloader {
    fn fetch(&self, url: &str, dest: &Path) -> Result<u64> {
        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent)?;
        }

        debug!(url, dest = %dest.display(), "downloading");
        let mut response = self.client.get(url).send().map_err(|e| {
            if e.is_timeout() {
                Self::failed(url, format!("timed out after {}s", self.timeout.as_secs()))
            } else {
                Self::failed(url, e)
            }
        })?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(TileError::NotFound { url: url.to_string() });
        }
        if !status.is_success() {
            return Err(Self::failed(url, format!("HTTP {}", status)));
        }

        let mut writer = BufWriter::new(File::create(dest)?);
        let bytes = response
            .copy_to(&mut writer)
            .map_err(|e| Self::failed(url, e))?;
        writer.flush()?;

        self.files_downloaded.fetch_add(1, Ordering::Relaxed);
        self.bytes_downloaded.fetch_add(bytes, Ordering::Relaxed);
        debug!(url, bytes, "download complete");

        Ok(bytes)
    }
}
