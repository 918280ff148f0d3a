//! High-level operations on a GRASS session.

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::module::{parse_key_value, parse_table, ModuleCall};
use crate::region::Region;
use crate::runner::{CommandRunner, ProcessRunner};
use crate::workspace::{write_gisrc, GisEnv, Workspace};
use crate::{GrassError, GrassResult};

/// Kind of a named dataset in a mapset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DatasetKind {
    /// Raster map.
    Raster,
    /// Vector map.
    Vector,
}

impl DatasetKind {
    /// Element/type name as understood by `g.findfile` and `g.remove`.
    pub fn as_str(&self) -> &'static str {
        match self {
            DatasetKind::Raster => "raster",
            DatasetKind::Vector => "vector",
        }
    }
}

impl fmt::Display for DatasetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Projection information of a location (`g.proj -g`).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProjInfo {
    values: BTreeMap<String, String>,
}

impl ProjInfo {
    /// Parse the output of `g.proj -g`.
    pub fn parse(output: &str) -> Self {
        ProjInfo {
            values: parse_key_value(output),
        }
    }

    /// Raw value of a key.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    /// EPSG code, from either the `epsg` key (GRASS 7/8.0-8.2) or the
    /// `srid=EPSG:<code>` key (newer releases).
    pub fn epsg(&self) -> Option<u32> {
        if let Some(code) = self.get("epsg") {
            return code.trim().parse().ok();
        }
        self.get("srid")
            .and_then(|srid| srid.strip_prefix("EPSG:"))
            .and_then(|code| code.trim().parse().ok())
    }

    /// Whether this GRASS version reports the projection with an `epsg` key.
    ///
    /// Decides whether `g.proj -c` takes `epsg=<code>` or `srid=EPSG:<code>`.
    pub fn has_epsg_key(&self) -> bool {
        self.values.contains_key("epsg")
    }

    fn describe(&self) -> String {
        self.get("epsg")
            .map(|e| format!("EPSG:{}", e))
            .or_else(|| self.get("srid").map(str::to_string))
            .unwrap_or_else(|| "no EPSG code".to_string())
    }
}

/// Client for a GRASS installation.
///
/// Every operation takes the [`Workspace`] it should act on.
#[derive(Debug, Default)]
pub struct Grass<R = ProcessRunner> {
    runner: R,
}

impl<R: CommandRunner> Grass<R> {
    /// Create a client using `runner` to execute modules.
    pub fn new(runner: R) -> Self {
        Grass { runner }
    }

    /// The underlying runner.
    pub fn runner(&self) -> &R {
        &self.runner
    }

    /// Run a module and return its standard output.
    pub fn run(&self, workspace: &Workspace, call: &ModuleCall) -> GrassResult<String> {
        self.runner.run(workspace, call)
    }

    /// Current computational region.
    pub fn region(&self, workspace: &Workspace) -> GrassResult<Region> {
        let out = self.run(workspace, &ModuleCall::new("g.region").flags("g"))?;
        Region::parse(&out)
    }

    /// Database, location and mapset of a session.
    pub fn gisenv(&self, workspace: &Workspace) -> GrassResult<GisEnv> {
        let out = self.run(workspace, &ModuleCall::new("g.gisenv").flags("n"))?;
        let values = parse_key_value(&out);
        let get = |key: &str| {
            values
                .get(key)
                .cloned()
                .ok_or_else(|| GrassError::parse("g.gisenv", format!("missing {}", key)))
        };
        Ok(GisEnv {
            gisdbase: PathBuf::from(get("GISDBASE")?),
            location: get("LOCATION_NAME")?,
            mapset: get("MAPSET")?,
        })
    }

    /// Projection of the session's location.
    pub fn proj_info(&self, workspace: &Workspace) -> GrassResult<ProjInfo> {
        let out = self.run(workspace, &ModuleCall::new("g.proj").flags("g"))?;
        Ok(ProjInfo::parse(&out))
    }

    /// Whether a dataset is visible from the session's search path.
    pub fn dataset_exists(&self, workspace: &Workspace, kind: DatasetKind, name: &str) -> GrassResult<bool> {
        let call = ModuleCall::new("g.findfile")
            .option("element", kind)
            .option("file", name);
        match self.run(workspace, &call) {
            Ok(out) => Ok(parse_key_value(&out)
                .get("file")
                .is_some_and(|file| !file.is_empty())),
            // g.findfile exits with 1 when nothing is found.
            Err(GrassError::ModuleFailed { code: Some(1), .. }) => Ok(false),
            Err(e) => Err(e),
        }
    }

    /// Remove a dataset from the current mapset.
    pub fn remove_dataset(&self, workspace: &Workspace, kind: DatasetKind, name: &str) -> GrassResult<()> {
        let call = ModuleCall::new("g.remove")
            .flags("f")
            .option("type", kind)
            .option("name", name)
            .quiet();
        self.run(workspace, &call).map(|_| ())
    }

    /// Names of the given modules that cannot be started.
    pub fn missing_modules(&self, workspace: &Workspace, modules: &[&str]) -> Vec<String> {
        modules
            .iter()
            .filter(|m| !self.runner.is_available(workspace, m))
            .map(|m| m.to_string())
            .collect()
    }

    /// Fail with [`GrassError::MissingModules`] unless all modules are installed.
    pub fn require_modules(&self, workspace: &Workspace, modules: &[&str]) -> GrassResult<()> {
        let missing = self.missing_modules(workspace, modules);
        if missing.is_empty() {
            Ok(())
        } else {
            Err(GrassError::MissingModules(missing))
        }
    }

    /// Rows of a vector map's attribute table, without the header line.
    pub fn select_attributes(&self, workspace: &Workspace, map: &str) -> GrassResult<Vec<Vec<String>>> {
        let call = ModuleCall::new("v.db.select")
            .option("map", map)
            .option("separator", "pipe")
            .quiet();
        let out = self.run(workspace, &call)?;
        Ok(parse_table(&out, '|'))
    }

    /// Create a location with the given EPSG code next to the current one and
    /// return a handle for its PERMANENT mapset.
    ///
    /// The caller owns both `gisrc` and `env.location_path(location)` and is
    /// responsible for removing them.
    pub fn create_location(
        &self,
        current: &Workspace,
        env: &GisEnv,
        location: &str,
        gisrc: &Path,
        epsg: u32,
    ) -> GrassResult<Workspace> {
        let call = ModuleCall::new("g.proj")
            .flags("c")
            .option("location", location)
            .quiet();
        let call = if self.proj_info(current)?.has_epsg_key() {
            call.option("epsg", epsg)
        } else {
            call.option("srid", format!("EPSG:{}", epsg))
        };

        info!("Creating temporary location with EPSG:{}...", epsg);
        self.run(current, &call)?;

        let workspace = write_gisrc(gisrc, &env.gisdbase, location, "PERMANENT")?;
        let created = self.proj_info(&workspace)?;
        if created.epsg() != Some(epsg) {
            return Err(GrassError::LocationMismatch {
                expected: epsg,
                actual: created.describe(),
            });
        }
        debug!(location, "temporary location ready");

        Ok(workspace)
    }
}
