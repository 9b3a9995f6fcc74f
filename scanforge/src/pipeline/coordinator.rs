//! The pipeline coordinator: sequencing, staleness cleanup, fail-fast.

use super::stages::{frame_sampling_stage, reconstruction_stages, transcode_stage};
use crate::cancellation::CancellationToken;
use crate::config::PipelineConfig;
use crate::core::{RunReport, RunState, StageCommand, StageOutput};
use crate::errors::PipelineError;
use crate::events::{EventSink, LoggingEventSink};
use crate::runner::{ProcessStageRunner, StageRunner};
use crate::workspace::{ensure_dir, WorkspaceLayout};
use parking_lot::RwLock;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info};
use uuid::Uuid;

/// Coordinates one photogrammetry reconstruction pipeline.
///
/// The coordinator owns the canonical ordered stage list and executes it
/// strictly sequentially with a fail-fast policy: the first stage failure
/// aborts all subsequent stages, with no retries and no partial recovery.
/// A fresh invocation restarts from workspace preparation; there is no
/// resume-from-failure.
pub struct ReconstructionPipeline {
    config: PipelineConfig,
    layout: WorkspaceLayout,
    runner: Arc<dyn StageRunner>,
    events: Arc<dyn EventSink>,
    cancel: Arc<CancellationToken>,
    state: RwLock<RunState>,
}

impl ReconstructionPipeline {
    /// Creates a pipeline that spawns real external processes.
    #[must_use]
    pub fn new(config: PipelineConfig) -> Self {
        let cancel = Arc::new(CancellationToken::new());
        let layout = WorkspaceLayout::new(&config.workspace_root);
        Self {
            runner: Arc::new(ProcessStageRunner::new(cancel.clone())),
            events: Arc::new(LoggingEventSink::new()),
            state: RwLock::new(RunState::Idle),
            cancel,
            layout,
            config,
        }
    }

    /// Replaces the stage runner (used by tests to substitute doubles).
    #[must_use]
    pub fn with_runner(mut self, runner: Arc<dyn StageRunner>) -> Self {
        self.runner = runner;
        self
    }

    /// Replaces the event sink.
    #[must_use]
    pub fn with_events(mut self, events: Arc<dyn EventSink>) -> Self {
        self.events = events;
        self
    }

    /// Returns the cancellation token for this pipeline.
    ///
    /// Cancelling it terminates any in-flight external process and fails
    /// the run; partial artifacts are left in place for inspection.
    #[must_use]
    pub fn cancel_token(&self) -> Arc<CancellationToken> {
        self.cancel.clone()
    }

    /// Returns the workspace layout this pipeline runs against.
    #[must_use]
    pub fn layout(&self) -> &WorkspaceLayout {
        &self.layout
    }

    /// Returns the current run state.
    #[must_use]
    pub fn state(&self) -> RunState {
        self.state.read().clone()
    }

    /// Runs the full reconstruction pipeline.
    ///
    /// Stages the workspace, resets the stale feature database, then
    /// executes the canonical stage sequence. Returns a report carrying the
    /// exported model path on success; the first error aborts the run.
    pub async fn run(&self) -> Result<RunReport, PipelineError> {
        let run_id = Uuid::new_v4();
        let started = Instant::now();
        let started_at = chrono::Utc::now().to_rfc3339();

        self.set_state(RunState::Preparing);
        self.events.try_emit(
            "pipeline.started",
            Some(serde_json::json!({
                "run_id": run_id.to_string(),
                "root": self.layout.root().display().to_string(),
            })),
        );
        info!(root = %self.layout.root().display(), %run_id, "preparing workspace");

        if let Err(err) = self.layout.prepare() {
            return Err(self.fail("workspace", err));
        }

        match self.layout.reset_feature_database() {
            Ok(true) => {
                info!(
                    database = %self.layout.database_path().display(),
                    "removed stale feature database"
                );
                self.events.try_emit(
                    "database.reset",
                    Some(serde_json::json!({
                        "path": self.layout.database_path().display().to_string(),
                    })),
                );
            }
            Ok(false) => {}
            Err(err) => return Err(self.fail("database-reset", err)),
        }

        let stages = reconstruction_stages(&self.layout, &self.config.tools);
        let total = stages.len();
        let mut stages_completed = Vec::with_capacity(total);

        for (index, stage) in stages.iter().enumerate() {
            self.set_state(RunState::running(stage.stage()));
            info!(stage = stage.stage(), step = index + 1, total, "running stage");

            match self.execute(stage).await {
                Ok(_) => stages_completed.push(stage.stage().to_string()),
                Err(err) => return Err(self.fail(stage.stage(), err)),
            }
        }

        self.set_state(RunState::Succeeded);
        let duration_ms = started.elapsed().as_secs_f64() * 1000.0;
        self.events.try_emit(
            "pipeline.succeeded",
            Some(serde_json::json!({
                "run_id": run_id.to_string(),
                "exported_model": self.layout.exported_model().display().to_string(),
                "duration_ms": duration_ms,
            })),
        );
        info!(
            model = %self.layout.exported_model().display(),
            duration_ms,
            "reconstruction complete"
        );

        Ok(RunReport {
            run_id,
            state: RunState::Succeeded,
            stages_completed,
            duration_ms,
            exported_model: self.layout.exported_model().to_path_buf(),
            started_at,
        })
    }

    /// Remuxes the source video into the workspace. Independently invokable;
    /// never part of the default run.
    pub async fn transcode_video(&self, input: impl AsRef<Path>) -> Result<StageOutput, PipelineError> {
        ensure_dir(self.layout.root())?;
        let stage = transcode_stage(input, &self.layout, &self.config.tools);
        self.execute(&stage).await
    }

    /// Samples still frames from a video into the frame directory at the
    /// configured rate. Independently invokable; never part of the default
    /// run.
    pub async fn sample_frames(&self, video: impl AsRef<Path>) -> Result<StageOutput, PipelineError> {
        ensure_dir(self.layout.frames_dir())?;
        let stage =
            frame_sampling_stage(video, &self.layout, &self.config.tools, self.config.frame_rate);
        self.execute(&stage).await
    }

    /// Runs one stage: cancellation check, input preconditions, execution,
    /// lifecycle events.
    async fn execute(&self, stage: &StageCommand) -> Result<StageOutput, PipelineError> {
        if self.cancel.is_cancelled() {
            let reason = self.cancel.reason().unwrap_or_else(|| "cancelled".to_string());
            return Err(PipelineError::cancelled(stage.stage(), reason));
        }

        if let Some(path) = stage.missing_inputs().into_iter().next() {
            return Err(PipelineError::missing_artifact(stage.stage(), path));
        }

        self.events.try_emit(
            "stage.started",
            Some(serde_json::json!({"stage": stage.stage()})),
        );

        let result = self.runner.run(stage).await;
        match &result {
            Ok(output) => {
                self.events.try_emit(
                    "stage.completed",
                    Some(serde_json::json!({
                        "stage": stage.stage(),
                        "duration_ms": output.duration_ms,
                    })),
                );
                info!(stage = stage.stage(), duration_ms = output.duration_ms, "stage completed");
            }
            Err(err) => {
                self.events.try_emit(
                    "stage.failed",
                    Some(serde_json::json!({
                        "stage": stage.stage(),
                        "error": err.to_string(),
                    })),
                );
            }
        }
        result
    }

    /// Marks the run failed at a stage and reports the cause.
    fn fail(&self, stage: &str, err: PipelineError) -> PipelineError {
        self.set_state(RunState::failed(stage));
        self.events.try_emit(
            "pipeline.failed",
            Some(serde_json::json!({
                "stage": stage,
                "error": err.to_string(),
            })),
        );
        error!(stage, error = %err, "pipeline failed");
        err
    }

    fn set_state(&self, state: RunState) {
        *self.state.write() = state;
    }
}

impl std::fmt::Debug for ReconstructionPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReconstructionPipeline")
            .field("root", &self.layout.root())
            .field("state", &self.state())
            .finish()
    }
}
