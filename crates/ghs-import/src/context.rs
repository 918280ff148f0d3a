//! Per-run state shared by every step of an import.

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use ghs_grass::{CommandRunner, DatasetKind, Grass, Workspace};

use crate::resources::{CleanupReport, TempResources};
use crate::{ImportError, Result};

/// State of one import run.
///
/// Holds the user's session, the run id used to name temporary artifacts
/// and the registry of those artifacts. Dropping the context releases the
/// registry, so cleanup runs on success, on error and while unwinding.
pub struct RunContext<'g, R: CommandRunner> {
    grass: &'g Grass<R>,
    workspace: Workspace,
    run_id: String,
    resources: TempResources,
    interrupt: Option<Arc<AtomicBool>>,
}

impl<'g, R: CommandRunner> RunContext<'g, R> {
    /// Start a run in `workspace`.
    pub fn new(grass: &'g Grass<R>, workspace: Workspace, run_id: impl Into<String>) -> Self {
        RunContext {
            grass,
            workspace,
            run_id: run_id.into(),
            resources: TempResources::new(),
            interrupt: None,
        }
    }

    /// Abort at the next step boundary once `flag` is set.
    pub fn with_interrupt(mut self, flag: Arc<AtomicBool>) -> Self {
        self.interrupt = Some(flag);
        self
    }

    /// The GRASS client.
    pub fn grass(&self) -> &'g Grass<R> {
        self.grass
    }

    /// The user's session.
    pub fn workspace(&self) -> &Workspace {
        &self.workspace
    }

    /// Suffix that makes temporary names unique to this run.
    pub fn run_id(&self) -> &str {
        &self.run_id
    }

    /// Registered temporary artifacts.
    pub fn resources(&self) -> &TempResources {
        &self.resources
    }

    /// Remove the file at `path` when the run ends.
    pub fn register_file(&mut self, path: impl Into<PathBuf>) {
        self.resources.register_file(path);
    }

    /// Remove the directory at `path` and its contents when the run ends.
    pub fn register_folder(&mut self, path: impl Into<PathBuf>) {
        self.resources.register_folder(path);
    }

    /// Remove map `name` of `kind` from `workspace` when the run ends.
    pub fn register_dataset(&mut self, workspace: &Workspace, kind: DatasetKind, name: impl Into<String>) {
        self.resources.register_dataset(workspace, kind, name);
    }

    /// Remove a temporary location directory and its GISRC file when the run ends.
    pub fn register_temp_location(&mut self, location_dir: impl Into<PathBuf>, gisrc: impl Into<PathBuf>) {
        self.resources.register_temp_location(location_dir, gisrc);
    }

    /// Session of the temporary location; its maps go with the location.
    pub fn set_temp_workspace(&mut self, workspace: Workspace) {
        self.resources.set_temp_workspace(workspace);
    }

    /// Fail with [`ImportError::Interrupted`] if an interrupt was requested.
    pub fn check_interrupt(&self) -> Result<()> {
        match &self.interrupt {
            Some(flag) if flag.load(Ordering::Relaxed) => Err(ImportError::Interrupted),
            _ => Ok(()),
        }
    }

    /// Release all temporary artifacts now.
    ///
    /// Dropping the context afterwards does nothing more.
    pub fn release(&mut self) -> CleanupReport {
        self.resources.release(self.grass)
    }
}

impl<R: CommandRunner> Drop for RunContext<'_, R> {
    fn drop(&mut self) {
        self.resources.release(self.grass);
    }
}
