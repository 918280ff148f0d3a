//! Explicit handles to GRASS sessions.
//!
//! A GRASS session is identified by its GISRC file, which names the database,
//! location and mapset. Instead of swapping the `GISRC` variable of the current
//! process, every module call carries the [`Workspace`] it should run in and the
//! runner sets `GISRC` on the child process only.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use crate::{GrassError, GrassResult};

/// Name of the environment variable pointing at the session file.
pub const GISRC_VAR: &str = "GISRC";

/// Handle to a GRASS session, identified by its GISRC file.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Workspace {
    gisrc: PathBuf,
}

impl Workspace {
    /// Create a handle for an existing GISRC file.
    pub fn new<P: AsRef<Path>>(gisrc: P) -> Self {
        Workspace {
            gisrc: gisrc.as_ref().to_path_buf(),
        }
    }

    /// The session the current process was started in.
    pub fn from_env() -> GrassResult<Self> {
        std::env::var_os(GISRC_VAR)
            .filter(|v| !v.is_empty())
            .map(Workspace::new)
            .ok_or(GrassError::NoSession)
    }

    /// Path of the GISRC file.
    pub fn gisrc(&self) -> &Path {
        &self.gisrc
    }
}

impl fmt::Display for Workspace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.gisrc.display())
    }
}

/// Database, location and mapset of a session (`g.gisenv`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GisEnv {
    /// GRASS database directory.
    pub gisdbase: PathBuf,
    /// Location (project) name.
    pub location: String,
    /// Mapset name.
    pub mapset: String,
}

impl GisEnv {
    /// Directory of a location inside this database.
    pub fn location_path(&self, location: &str) -> PathBuf {
        self.gisdbase.join(location)
    }
}

/// Write a GISRC file for a session in `location`/`mapset` of `gisdbase`.
///
/// Returns a handle for the new session. The location itself is not created.
pub fn write_gisrc(path: &Path, gisdbase: &Path, location: &str, mapset: &str) -> GrassResult<Workspace> {
    let contents = format!(
        "MAPSET: {}\nGISDBASE: {}\nLOCATION_NAME: {}\nGUI: text\n",
        mapset,
        gisdbase.display(),
        location
    );
    fs::write(path, contents)?;
    Ok(Workspace::new(path))
}
