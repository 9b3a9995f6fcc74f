//! Error types for the scanforge orchestrator.
//!
//! Every error aborts the run: there is no local recovery, no retry, and no
//! partial continuation. The binary entry point is the sole error sink.

use std::path::{Path, PathBuf};
use std::process::ExitStatus;
use thiserror::Error;

/// The main error type for pipeline operations.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// A workspace directory or file could not be created or accessed.
    #[error("{0}")]
    Filesystem(#[from] FilesystemError),

    /// An external stage exited nonzero or failed to spawn.
    #[error("{0}")]
    StageExecution(#[from] StageExecutionError),

    /// A declared input artifact did not exist when its stage was due to run.
    #[error("stage '{stage}' requires missing input artifact '{}'", path.display())]
    MissingArtifact {
        /// The stage whose precondition failed.
        stage: String,
        /// The absent artifact path.
        path: PathBuf,
    },

    /// The run was cancelled while a stage was pending or in flight.
    #[error("pipeline cancelled at stage '{stage}': {reason}")]
    Cancelled {
        /// The stage that was pending or in flight when cancellation hit.
        stage: String,
        /// The cancellation reason.
        reason: String,
    },
}

impl PipelineError {
    /// Creates a missing artifact error.
    #[must_use]
    pub fn missing_artifact(stage: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self::MissingArtifact {
            stage: stage.into(),
            path: path.into(),
        }
    }

    /// Creates a cancellation error.
    #[must_use]
    pub fn cancelled(stage: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Cancelled {
            stage: stage.into(),
            reason: reason.into(),
        }
    }

    /// Returns the stage this error is attributed to, if any.
    #[must_use]
    pub fn stage(&self) -> Option<&str> {
        match self {
            Self::Filesystem(_) => None,
            Self::StageExecution(err) => Some(&err.stage),
            Self::MissingArtifact { stage, .. } | Self::Cancelled { stage, .. } => Some(stage),
        }
    }
}

/// Error raised when a filesystem operation fails.
#[derive(Debug, Error)]
#[error("filesystem operation failed for '{}': {source}", path.display())]
pub struct FilesystemError {
    /// The path the operation targeted.
    pub path: PathBuf,
    /// The underlying I/O error.
    #[source]
    pub source: std::io::Error,
}

impl FilesystemError {
    /// Creates a new filesystem error.
    #[must_use]
    pub fn new(path: impl AsRef<Path>, source: std::io::Error) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }
}

/// Error raised when an external stage exits nonzero or cannot be spawned.
///
/// Carries the failing stage identity, the rendered command line, exit
/// information, and the tool's captured diagnostic stream.
#[derive(Debug, Clone)]
pub struct StageExecutionError {
    /// The stage that failed.
    pub stage: String,
    /// The rendered command line.
    pub command: String,
    /// The process exit code, if the process ran and exited.
    pub exit_code: Option<i32>,
    /// Captured diagnostic output (stderr), or the spawn failure text.
    pub diagnostics: String,
}

impl StageExecutionError {
    /// Creates a new stage execution error.
    #[must_use]
    pub fn new(
        stage: impl Into<String>,
        command: impl Into<String>,
        exit_code: Option<i32>,
        diagnostics: impl Into<String>,
    ) -> Self {
        Self {
            stage: stage.into(),
            command: command.into(),
            exit_code,
            diagnostics: diagnostics.into(),
        }
    }

    /// Creates an error for a process that ran and terminated unsuccessfully.
    #[must_use]
    pub fn from_status(
        stage: impl Into<String>,
        command: impl Into<String>,
        status: ExitStatus,
        diagnostics: impl Into<String>,
    ) -> Self {
        Self::new(stage, command, status.code(), diagnostics)
    }

    /// Creates an error for a process that could not be spawned at all.
    #[must_use]
    pub fn spawn_failure(
        stage: impl Into<String>,
        command: impl Into<String>,
        source: &std::io::Error,
    ) -> Self {
        Self::new(stage, command, None, format!("failed to spawn process: {source}"))
    }

    fn exit_summary(&self) -> String {
        self.exit_code
            .map_or_else(|| "no exit code".to_string(), |code| format!("exit code {code}"))
    }
}

impl std::fmt::Display for StageExecutionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "stage '{}' failed ({}): {}",
            self.stage,
            self.exit_summary(),
            self.diagnostics.trim()
        )
    }
}

impl std::error::Error for StageExecutionError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_artifact_display() {
        let err = PipelineError::missing_artifact("sparse-mapping", "/work/colmap/database.db");
        assert_eq!(
            err.to_string(),
            "stage 'sparse-mapping' requires missing input artifact '/work/colmap/database.db'"
        );
        assert_eq!(err.stage(), Some("sparse-mapping"));
    }

    #[test]
    fn test_cancelled_display() {
        let err = PipelineError::cancelled("stereo-fusion", "operator abort");
        assert_eq!(
            err.to_string(),
            "pipeline cancelled at stage 'stereo-fusion': operator abort"
        );
    }

    #[test]
    fn test_filesystem_error_display() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err = FilesystemError::new("/work/frames", io);
        assert!(err.to_string().contains("/work/frames"));
        assert!(err.to_string().contains("denied"));
    }

    #[test]
    fn test_stage_execution_error_with_exit_code() {
        let err = StageExecutionError::new(
            "feature-extraction",
            "colmap feature_extractor",
            Some(1),
            "no features found\n",
        );
        assert_eq!(
            err.to_string(),
            "stage 'feature-extraction' failed (exit code 1): no features found"
        );
    }

    #[test]
    fn test_stage_execution_error_without_exit_code() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "not found");
        let err = StageExecutionError::spawn_failure("model-export", "assimp export", &io);
        assert!(err.to_string().contains("no exit code"));
        assert!(err.diagnostics.contains("failed to spawn process"));
    }

    #[test]
    fn test_stage_attribution() {
        let exec = StageExecutionError::new("sparse-mapping", "colmap mapper", Some(2), "bad model");
        let err = PipelineError::from(exec);
        assert_eq!(err.stage(), Some("sparse-mapping"));

        let io = std::io::Error::other("disk full");
        let err = PipelineError::from(FilesystemError::new("/work", io));
        assert_eq!(err.stage(), None);
    }
}
