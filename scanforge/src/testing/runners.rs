//! Stage runner doubles.

use crate::core::{StageCommand, StageOutput};
use crate::errors::{FilesystemError, PipelineError, StageExecutionError};
use crate::workspace::ensure_dir;
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;

use crate::runner::StageRunner;

/// A stage runner double that records invocations instead of spawning
/// processes.
///
/// By default every stage succeeds and its declared output artifacts are
/// touched on disk, so downstream input preconditions hold just as they
/// would after the real tool ran. Individual stages can be scripted to fail
/// with a given exit code and diagnostic text.
#[derive(Debug)]
pub struct ScriptedStageRunner {
    invocations: Mutex<Vec<StageCommand>>,
    failures: Mutex<HashMap<String, StageExecutionError>>,
    touch_outputs: bool,
}

impl Default for ScriptedStageRunner {
    fn default() -> Self {
        Self::new()
    }
}

impl ScriptedStageRunner {
    /// Creates a runner where every stage succeeds and touches its outputs.
    #[must_use]
    pub fn new() -> Self {
        Self {
            invocations: Mutex::new(Vec::new()),
            failures: Mutex::new(HashMap::new()),
            touch_outputs: true,
        }
    }

    /// Creates a runner that succeeds without producing any artifacts.
    #[must_use]
    pub fn without_outputs() -> Self {
        Self {
            touch_outputs: false,
            ..Self::new()
        }
    }

    /// Scripts a failure for the named stage.
    #[must_use]
    pub fn fail_at(
        self,
        stage: impl Into<String>,
        exit_code: i32,
        diagnostics: impl Into<String>,
    ) -> Self {
        let stage = stage.into();
        let error = StageExecutionError::new(
            stage.clone(),
            "<scripted>",
            Some(exit_code),
            diagnostics,
        );
        self.failures.lock().insert(stage, error);
        self
    }

    /// Returns every command this runner was asked to execute, in order.
    #[must_use]
    pub fn invocations(&self) -> Vec<StageCommand> {
        self.invocations.lock().clone()
    }

    /// Returns the invoked stage names, in order.
    #[must_use]
    pub fn invoked_stages(&self) -> Vec<String> {
        self.invocations
            .lock()
            .iter()
            .map(|cmd| cmd.stage().to_string())
            .collect()
    }

    /// Returns how many times the named stage was invoked.
    #[must_use]
    pub fn invocation_count(&self, stage: &str) -> usize {
        self.invocations
            .lock()
            .iter()
            .filter(|cmd| cmd.stage() == stage)
            .count()
    }
}

#[async_trait]
impl StageRunner for ScriptedStageRunner {
    async fn run(&self, command: &StageCommand) -> Result<StageOutput, PipelineError> {
        self.invocations.lock().push(command.clone());

        if let Some(error) = self.failures.lock().get(command.stage()) {
            return Err(error.clone().into());
        }

        if self.touch_outputs {
            for path in command.outputs() {
                if let Some(parent) = path.parent() {
                    ensure_dir(parent)?;
                }
                std::fs::File::create(path)
                    .map_err(|source| FilesystemError::new(path, source))?;
            }
        }

        Ok(StageOutput::new(command.stage(), String::new(), 0.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_records_invocations_in_order() {
        let runner = ScriptedStageRunner::without_outputs();

        runner
            .run(&StageCommand::new("feature-extraction", "colmap"))
            .await
            .unwrap();
        runner
            .run(&StageCommand::new("sequential-matching", "colmap"))
            .await
            .unwrap();

        assert_eq!(
            runner.invoked_stages(),
            vec!["feature-extraction", "sequential-matching"]
        );
        assert_eq!(runner.invocation_count("feature-extraction"), 1);
        assert_eq!(runner.invocation_count("sparse-mapping"), 0);
    }

    #[tokio::test]
    async fn test_touches_declared_outputs() {
        let dir = TempDir::new().unwrap();
        let output = dir.path().join("colmap").join("database.db");
        let runner = ScriptedStageRunner::new();

        runner
            .run(&StageCommand::new("feature-extraction", "colmap").output(&output))
            .await
            .unwrap();

        assert!(output.exists());
    }

    #[tokio::test]
    async fn test_scripted_failure() {
        let runner = ScriptedStageRunner::new().fail_at("sparse-mapping", 2, "degenerate model");

        let err = runner
            .run(&StageCommand::new("sparse-mapping", "colmap"))
            .await
            .unwrap_err();

        match err {
            PipelineError::StageExecution(err) => {
                assert_eq!(err.exit_code, Some(2));
                assert!(err.diagnostics.contains("degenerate model"));
            }
            other => panic!("expected stage execution error, got: {other}"),
        }
        assert_eq!(runner.invocation_count("sparse-mapping"), 1);
    }
}
