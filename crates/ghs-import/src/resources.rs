//! Registry of temporary artifacts created during a run.
//!
//! Every artifact is registered before it is created, so a failure half way
//! through creating it still leaves it on the list. Release is best effort:
//! each failure is logged as a warning and the remaining artifacts are still
//! removed.
//!
//! ## Release order
//!
//! 1. the temporary location directory
//! 2. the temporary session file
//! 3. vector maps, then raster maps, in the session they were created in
//! 4. files
//! 5. folders, recursively
//!
//! Maps that live in the temporary location disappear with its directory and
//! are not removed one by one.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use ghs_grass::{CommandRunner, DatasetKind, Grass, Workspace};
use tracing::{debug, info, warn};

/// A GRASS map created during the run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TempDataset {
    /// Session the map was created in.
    pub workspace: Workspace,
    /// Raster or vector.
    pub kind: DatasetKind,
    /// Map name.
    pub name: String,
}

/// Outcome of releasing the registry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CleanupReport {
    /// Number of artifacts removed.
    pub removed: usize,
    /// Warnings for artifacts that could not be removed.
    pub warnings: Vec<String>,
}

impl CleanupReport {
    fn warn(&mut self, message: String) {
        warn!("{}", message);
        self.warnings.push(message);
    }
}

/// Temporary files, folders, maps and the temporary location of one run.
#[derive(Debug, Default)]
pub struct TempResources {
    files: Vec<PathBuf>,
    folders: Vec<PathBuf>,
    datasets: Vec<TempDataset>,
    temp_location: Option<PathBuf>,
    temp_gisrc: Option<PathBuf>,
    temp_workspace: Option<Workspace>,
    released: bool,
}

impl TempResources {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a file for removal.
    pub fn register_file(&mut self, path: impl Into<PathBuf>) {
        self.files.push(path.into());
    }

    /// Register a folder for recursive removal.
    pub fn register_folder(&mut self, path: impl Into<PathBuf>) {
        self.folders.push(path.into());
    }

    /// Register a map created in `workspace`.
    pub fn register_dataset(&mut self, workspace: &Workspace, kind: DatasetKind, name: impl Into<String>) {
        self.datasets.push(TempDataset {
            workspace: workspace.clone(),
            kind,
            name: name.into(),
        });
    }

    /// Register the directory and session file of a temporary location.
    pub fn register_temp_location(&mut self, location_dir: impl Into<PathBuf>, gisrc: impl Into<PathBuf>) {
        self.temp_location = Some(location_dir.into());
        self.temp_gisrc = Some(gisrc.into());
    }

    /// Record the session of the temporary location once it exists.
    pub fn set_temp_workspace(&mut self, workspace: Workspace) {
        self.temp_workspace = Some(workspace);
    }

    /// Registered files.
    pub fn files(&self) -> &[PathBuf] {
        &self.files
    }

    /// Registered folders.
    pub fn folders(&self) -> &[PathBuf] {
        &self.folders
    }

    /// Registered maps.
    pub fn datasets(&self) -> &[TempDataset] {
        &self.datasets
    }

    /// Directory of the temporary location, if one was registered.
    pub fn temp_location(&self) -> Option<&Path> {
        self.temp_location.as_deref()
    }

    /// Whether nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
            && self.folders.is_empty()
            && self.datasets.is_empty()
            && self.temp_location.is_none()
            && self.temp_gisrc.is_none()
    }

    /// Whether [`release`](Self::release) already ran.
    pub fn is_released(&self) -> bool {
        self.released
    }

    /// Remove everything registered. Only the first call does any work.
    pub fn release<R: CommandRunner>(&mut self, grass: &Grass<R>) -> CleanupReport {
        let mut report = CleanupReport::default();
        if self.released {
            return report;
        }
        self.released = true;
        if self.is_empty() {
            return report;
        }
        info!("Cleaning up...");

        if let Some(location) = self.temp_location.take() {
            if location.is_dir() {
                match fs::remove_dir_all(&location) {
                    Ok(()) => report.removed += 1,
                    Err(e) => report.warn(format!(
                        "Cannot remove temporary location <{}>: {}",
                        location.display(),
                        e
                    )),
                }
            }
        }

        if let Some(gisrc) = self.temp_gisrc.take() {
            remove_file(&gisrc, &mut report);
        }

        let temp_workspace = self.temp_workspace.take();
        let datasets = std::mem::take(&mut self.datasets);
        for kind in [DatasetKind::Vector, DatasetKind::Raster] {
            for dataset in datasets.iter().filter(|d| d.kind == kind) {
                if temp_workspace.as_ref() == Some(&dataset.workspace) {
                    debug!(name = %dataset.name, "removed with the temporary location");
                    continue;
                }
                remove_dataset(grass, dataset, &mut report);
            }
        }

        for file in std::mem::take(&mut self.files) {
            remove_file(&file, &mut report);
        }

        for folder in std::mem::take(&mut self.folders) {
            if folder.is_dir() {
                match fs::remove_dir_all(&folder) {
                    Ok(()) => report.removed += 1,
                    Err(e) => report.warn(format!("Cannot remove folder <{}>: {}", folder.display(), e)),
                }
            }
        }

        report
    }
}

fn remove_file(path: &Path, report: &mut CleanupReport) {
    match fs::remove_file(path) {
        Ok(()) => report.removed += 1,
        // Registered before creation, so it may never have been written.
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            debug!(path = %path.display(), "already gone");
        }
        Err(e) => report.warn(format!("Cannot remove file <{}>: {}", path.display(), e)),
    }
}

fn remove_dataset<R: CommandRunner>(grass: &Grass<R>, dataset: &TempDataset, report: &mut CleanupReport) {
    match grass.dataset_exists(&dataset.workspace, dataset.kind, &dataset.name) {
        Ok(true) => match grass.remove_dataset(&dataset.workspace, dataset.kind, &dataset.name) {
            Ok(()) => report.removed += 1,
            Err(e) => report.warn(format!("Cannot remove {} map <{}>: {}", dataset.kind, dataset.name, e)),
        },
        Ok(false) => debug!(name = %dataset.name, "map does not exist"),
        Err(e) => report.warn(format!("Cannot look up {} map <{}>: {}", dataset.kind, dataset.name, e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ghs_grass::{GrassError, GrassResult, ModuleCall};
    use std::cell::RefCell;
    use std::collections::BTreeSet;
    use tempfile::TempDir;

    /// Runner that knows a fixed set of maps and records removals.
    #[derive(Default)]
    struct MapStore {
        maps: RefCell<BTreeSet<String>>,
        calls: RefCell<Vec<String>>,
        fail_remove: bool,
    }

    impl CommandRunner for MapStore {
        fn run(&self, _workspace: &Workspace, call: &ModuleCall) -> GrassResult<String> {
            self.calls.borrow_mut().push(call.to_string());
            match call.name() {
                "g.findfile" => {
                    let name = call.get("file").unwrap_or_default();
                    if self.maps.borrow().contains(name) {
                        Ok(format!("name='{}'\nfile='/db/{}'\n", name, name))
                    } else {
                        Err(GrassError::ModuleFailed {
                            module: "g.findfile".to_string(),
                            code: Some(1),
                            stderr: String::new(),
                        })
                    }
                }
                "g.remove" if self.fail_remove => Err(GrassError::ModuleFailed {
                    module: "g.remove".to_string(),
                    code: Some(1),
                    stderr: "locked".to_string(),
                }),
                "g.remove" => {
                    let name = call.get("name").unwrap_or_default().to_string();
                    self.maps.borrow_mut().remove(&name);
                    Ok(String::new())
                }
                other => panic!("unexpected module {}", other),
            }
        }

        fn is_available(&self, _workspace: &Workspace, _module: &str) -> bool {
            true
        }
    }

    fn grass_with(maps: &[&str]) -> Grass<MapStore> {
        let store = MapStore::default();
        store.maps.borrow_mut().extend(maps.iter().map(|m| m.to_string()));
        Grass::new(store)
    }

    #[test]
    fn test_empty_registry_releases_nothing() {
        let grass = grass_with(&[]);
        let mut resources = TempResources::new();
        let report = resources.release(&grass);
        assert_eq!(report, CleanupReport::default());
        assert!(grass.runner().calls.borrow().is_empty());
    }

    #[test]
    fn test_release_removes_files_and_folders() {
        let temp = TempDir::new().unwrap();
        let folder = temp.path().join("dl");
        fs::create_dir_all(folder.join("tile_unzipped")).unwrap();
        fs::write(folder.join("tile_unzipped").join("tile.tif"), b"x").unwrap();
        let file = temp.path().join("index.geojson");
        fs::write(&file, b"{}").unwrap();

        let grass = grass_with(&[]);
        let mut resources = TempResources::new();
        resources.register_folder(&folder);
        resources.register_file(&file);
        resources.register_file(temp.path().join("never_written.zip"));

        let report = resources.release(&grass);
        assert!(!folder.exists());
        assert!(!file.exists());
        assert_eq!(report.removed, 2);
        assert!(report.warnings.is_empty());
    }

    #[test]
    fn test_release_removes_vectors_before_rasters() {
        let grass = grass_with(&["tmp_raster", "tmp_vector"]);
        let ws = Workspace::new("/tmp/gisrc");
        let mut resources = TempResources::new();
        resources.register_dataset(&ws, DatasetKind::Raster, "tmp_raster");
        resources.register_dataset(&ws, DatasetKind::Vector, "tmp_vector");
        resources.register_dataset(&ws, DatasetKind::Raster, "never_created");

        let report = resources.release(&grass);
        assert_eq!(report.removed, 2);

        let removals: Vec<String> = grass
            .runner()
            .calls
            .borrow()
            .iter()
            .filter(|c| c.starts_with("g.remove"))
            .cloned()
            .collect();
        assert_eq!(
            removals,
            vec![
                "g.remove -f type=vector name=tmp_vector --quiet".to_string(),
                "g.remove -f type=raster name=tmp_raster --quiet".to_string(),
            ]
        );
    }

    #[test]
    fn test_release_skips_maps_of_removed_location() {
        let temp = TempDir::new().unwrap();
        let location = temp.path().join("temp_import_location_1");
        fs::create_dir_all(location.join("PERMANENT")).unwrap();
        let gisrc = temp.path().join("gisrc_1");
        fs::write(&gisrc, "LOCATION_NAME: temp_import_location_1\n").unwrap();

        let grass = grass_with(&["tindex"]);
        let temp_ws = Workspace::new(&gisrc);
        let mut resources = TempResources::new();
        resources.register_temp_location(&location, &gisrc);
        resources.set_temp_workspace(temp_ws.clone());
        resources.register_dataset(&temp_ws, DatasetKind::Vector, "tindex");

        let report = resources.release(&grass);
        assert!(!location.exists());
        assert!(!gisrc.exists());
        assert_eq!(report.removed, 2);
        assert!(grass.runner().calls.borrow().is_empty());
    }

    #[test]
    fn test_release_continues_after_failure() {
        let temp = TempDir::new().unwrap();
        let file = temp.path().join("a.zip");
        fs::write(&file, b"zip").unwrap();

        let mut store = MapStore::default();
        store.fail_remove = true;
        store.maps.borrow_mut().insert("tmp".to_string());
        let grass = Grass::new(store);

        let mut resources = TempResources::new();
        resources.register_dataset(&Workspace::new("/tmp/gisrc"), DatasetKind::Raster, "tmp");
        resources.register_file(&file);

        let report = resources.release(&grass);
        assert_eq!(report.warnings.len(), 1);
        assert!(report.warnings[0].contains("tmp"));
        assert!(!file.exists());
    }

    #[test]
    fn test_release_is_idempotent() {
        let grass = grass_with(&["tmp"]);
        let mut resources = TempResources::new();
        resources.register_dataset(&Workspace::new("/tmp/gisrc"), DatasetKind::Raster, "tmp");

        assert_eq!(resources.release(&grass).removed, 1);
        assert!(resources.is_released());
        let calls = grass.runner().calls.borrow().len();

        assert_eq!(resources.release(&grass), CleanupReport::default());
        assert_eq!(grass.runner().calls.borrow().len(), calls);
    }
}
