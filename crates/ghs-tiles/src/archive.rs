//! Zip archives and the location of their payload.
//!
//! A downloaded archive `<dir>/<base>.zip` is extracted into
//! `<dir>/<base>_unzipped`. The file to import is found by convention, either
//! `<base>.<ext>` at the top of that folder or a known relative path. The
//! convention is checked after extraction so a changed archive layout fails
//! here instead of deep inside the import.

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use tracing::debug;
use zip::ZipArchive;

use crate::{Result, TileError};

/// Where the interesting file sits inside an extracted archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Payload {
    /// `<archive base name>.<extension>` directly inside the extraction folder.
    Extension(String),
    /// A fixed path relative to the extraction folder.
    RelativePath(PathBuf),
}

/// Local paths involved in downloading and unpacking one archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveLayout {
    /// Where the archive is downloaded to.
    pub archive: PathBuf,
    /// Folder the archive is extracted into.
    pub unzip_dir: PathBuf,
    /// Expected location of the payload after extraction.
    pub payload: PathBuf,
}

impl ArchiveLayout {
    /// Derive the layout for downloading `url` into `dir`.
    ///
    /// The archive keeps the file name of the URL path.
    pub fn for_url(url: &str, dir: &Path, payload: &Payload) -> Result<Self> {
        let file_name = file_name_from_url(url)?;
        let base = Path::new(&file_name)
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or(&file_name)
            .to_string();

        let archive = dir.join(&file_name);
        let unzip_dir = dir.join(format!("{}_unzipped", base));
        let payload = match payload {
            Payload::Extension(ext) => unzip_dir.join(format!("{}.{}", base, ext)),
            Payload::RelativePath(rel) => unzip_dir.join(rel),
        };

        Ok(ArchiveLayout {
            archive,
            unzip_dir,
            payload,
        })
    }

    /// Return the payload path, failing if extraction did not produce it.
    pub fn verify_payload(&self) -> Result<&Path> {
        if self.payload.is_file() {
            Ok(&self.payload)
        } else {
            Err(TileError::PayloadMissing {
                archive: self.archive.clone(),
                expected: self.payload.clone(),
            })
        }
    }
}

/// Last path segment of a URL, which must be non-empty.
pub fn file_name_from_url(url: &str) -> Result<String> {
    let parsed = reqwest::Url::parse(url).map_err(|e| TileError::InvalidUrl {
        url: url.to_string(),
        reason: e.to_string(),
    })?;

    parsed
        .path_segments()
        .and_then(|mut segments| segments.next_back())
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .ok_or_else(|| TileError::InvalidUrl {
            url: url.to_string(),
            reason: "URL path has no file name".to_string(),
        })
}

/// Extract every entry of a zip archive into `dest`.
///
/// Returns the number of entries in the archive.
pub fn extract_zip(archive: &Path, dest: &Path) -> Result<usize> {
    let extraction_error = |reason: String| TileError::ExtractionFailed {
        path: archive.to_path_buf(),
        reason,
    };

    let file = File::open(archive)?;
    let mut zip = ZipArchive::new(BufReader::new(file)).map_err(|e| extraction_error(e.to_string()))?;
    let entries = zip.len();

    std::fs::create_dir_all(dest)?;
    zip.extract(dest).map_err(|e| extraction_error(e.to_string()))?;
    debug!(archive = %archive.display(), entries, "extracted");

    Ok(entries)
}
