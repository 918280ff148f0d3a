//! Execution of GRASS modules as child processes.

use std::process::{Command, Stdio};

use tracing::{debug, trace};

use crate::module::ModuleCall;
use crate::workspace::{Workspace, GISRC_VAR};
use crate::{GrassError, GrassResult};

/// Something that can execute GRASS modules.
///
/// The production implementation spawns processes; tests substitute a fake
/// that records calls and returns canned output.
pub trait CommandRunner {
    /// Run a module to completion in `workspace` and return its standard output.
    ///
    /// A non-zero exit status is reported as [`GrassError::ModuleFailed`].
    fn run(&self, workspace: &Workspace, call: &ModuleCall) -> GrassResult<String>;

    /// Whether `module` can be started in `workspace`.
    fn is_available(&self, workspace: &Workspace, module: &str) -> bool;
}

/// Runs GRASS modules found on `PATH` as child processes.
///
/// Each child gets `GISRC` pointing at the requested workspace; the current
/// process environment is left alone.
#[derive(Debug, Default, Clone)]
pub struct ProcessRunner;

impl ProcessRunner {
    /// Create a new process runner.
    pub fn new() -> Self {
        ProcessRunner
    }
}

impl CommandRunner for ProcessRunner {
    fn run(&self, workspace: &Workspace, call: &ModuleCall) -> GrassResult<String> {
        debug!(workspace = %workspace, "{}", call);

        let output = Command::new(call.name())
            .args(call.args())
            .env(GISRC_VAR, workspace.gisrc())
            .stdin(Stdio::null())
            .output()
            .map_err(|e| GrassError::Spawn {
                module: call.name().to_string(),
                source: e,
            })?;

        let stderr = String::from_utf8_lossy(&output.stderr);
        if !output.status.success() {
            return Err(GrassError::ModuleFailed {
                module: call.name().to_string(),
                code: output.status.code(),
                stderr: stderr.trim().to_string(),
            });
        }
        if !stderr.trim().is_empty() {
            trace!(module = call.name(), "{}", stderr.trim());
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    fn is_available(&self, workspace: &Workspace, module: &str) -> bool {
        Command::new(module)
            .arg("--help")
            .env(GISRC_VAR, workspace.gisrc())
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .map(|status| status.success())
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_executable_is_unavailable() {
        let runner = ProcessRunner::new();
        let ws = Workspace::new("/nonexistent/gisrc");
        assert!(!runner.is_available(&ws, "r.definitely.not.installed"));
    }

    #[test]
    fn test_missing_executable_fails_to_spawn() {
        let runner = ProcessRunner::new();
        let ws = Workspace::new("/nonexistent/gisrc");
        let err = runner
            .run(&ws, &ModuleCall::new("r.definitely.not.installed"))
            .unwrap_err();
        assert!(matches!(err, GrassError::Spawn { .. }));
    }
}
