//! Stage execution: running one external tool and capturing its result.

use crate::cancellation::CancellationToken;
use crate::core::{StageCommand, StageOutput};
use crate::errors::{PipelineError, StageExecutionError};
use async_trait::async_trait;
use std::process::Stdio;
use std::sync::Arc;
use std::time::Instant;
use tracing::debug;

/// Trait for executing one stage command.
///
/// The production implementation spawns a real process; tests substitute
/// doubles that record invocations.
#[async_trait]
pub trait StageRunner: Send + Sync {
    /// Executes the command, suspending until it terminates.
    ///
    /// Returns captured standard output on success. A nonzero exit or spawn
    /// failure is a [`StageExecutionError`]; cancellation mid-stage kills
    /// the process and surfaces [`PipelineError::Cancelled`]. Each stage is
    /// run exactly once: transient tool failures are surfaced immediately,
    /// never retried.
    async fn run(&self, command: &StageCommand) -> Result<StageOutput, PipelineError>;
}

/// Runs stage commands as child processes on the tokio runtime.
#[derive(Debug)]
pub struct ProcessStageRunner {
    cancel: Arc<CancellationToken>,
}

impl ProcessStageRunner {
    /// Creates a runner that races each child against the given token.
    #[must_use]
    pub fn new(cancel: Arc<CancellationToken>) -> Self {
        Self { cancel }
    }
}

#[async_trait]
impl StageRunner for ProcessStageRunner {
    async fn run(&self, command: &StageCommand) -> Result<StageOutput, PipelineError> {
        let started = Instant::now();
        debug!(
            stage = command.stage(),
            command = %command.display_line(),
            "spawning stage process"
        );

        let child = tokio::process::Command::new(command.program())
            .args(command.args())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|err| {
                StageExecutionError::spawn_failure(command.stage(), command.display_line(), &err)
            })?;

        // Dropping the in-flight future on the cancellation branch kills the child.
        let output = tokio::select! {
            result = child.wait_with_output() => result.map_err(|err| {
                StageExecutionError::spawn_failure(command.stage(), command.display_line(), &err)
            })?,
            () = self.cancel.cancelled() => {
                let reason = self
                    .cancel
                    .reason()
                    .unwrap_or_else(|| "cancelled".to_string());
                return Err(PipelineError::cancelled(command.stage(), reason));
            }
        };

        let duration_ms = started.elapsed().as_secs_f64() * 1000.0;

        if output.status.success() {
            let stdout = String::from_utf8_lossy(&output.stdout).to_string();
            Ok(StageOutput::new(command.stage(), stdout, duration_ms))
        } else {
            let diagnostics = String::from_utf8_lossy(&output.stderr).to_string();
            Err(StageExecutionError::from_status(
                command.stage(),
                command.display_line(),
                output.status,
                diagnostics,
            )
            .into())
        }
    }
}
