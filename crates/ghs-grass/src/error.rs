//! Error types for GRASS module invocation.

use thiserror::Error;

/// Result type for GRASS operations.
pub type GrassResult<T> = Result<T, GrassError>;

/// Errors that can occur when talking to a GRASS session.
#[derive(Debug, Error)]
pub enum GrassError {
    /// I/O error while reading or writing session files.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// No GRASS session is active (GISRC is not set).
    #[error("No GRASS session found: the GISRC environment variable is not set")]
    NoSession,

    /// The module executable could not be started.
    #[error("Failed to start GRASS module {module}: {source}")]
    Spawn {
        /// Module name.
        module: String,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// The module ran but exited unsuccessfully.
    #[error("GRASS module {module} failed (exit code {code:?}): {stderr}")]
    ModuleFailed {
        /// Module name.
        module: String,
        /// Exit code, if the process was not killed by a signal.
        code: Option<i32>,
        /// Captured standard error, trimmed.
        stderr: String,
    },

    /// One or more required modules are not installed.
    #[error("Required GRASS module(s) not found: {}. Install them first, e.g. with g.extension", .0.join(", "))]
    MissingModules(Vec<String>),

    /// Module output did not have the expected shape.
    #[error("Unexpected output from {module}: {reason}")]
    Parse {
        /// Module name.
        module: String,
        /// What was wrong.
        reason: String,
    },

    /// A freshly created location does not carry the requested projection.
    #[error("Creation of temporary location failed: expected EPSG:{expected}, found {actual}")]
    LocationMismatch {
        /// Requested EPSG code.
        expected: u32,
        /// What `g.proj -g` reported instead.
        actual: String,
    },
}

impl GrassError {
    /// Build a parse error for a module.
    pub fn parse(module: &str, reason: impl Into<String>) -> Self {
        GrassError::Parse {
            module: module.to_string(),
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_modules_display() {
        let err = GrassError::MissingModules(vec!["v.in.ogr".to_string(), "r.patch".to_string()]);
        let msg = err.to_string();
        assert!(msg.contains("v.in.ogr, r.patch"));
        assert!(msg.contains("g.extension"));
    }

    #[test]
    fn test_module_failed_display() {
        let err = GrassError::ModuleFailed {
            module: "r.import".to_string(),
            code: Some(1),
            stderr: "ERROR: no data".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "GRASS module r.import failed (exit code Some(1)): ERROR: no data"
        );
    }
}
