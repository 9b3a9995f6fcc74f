//! Run and stage result types.

use super::RunState;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use uuid::Uuid;

/// The captured result of one successful stage execution.
///
/// Standard output is retained in case a later stage needs to parse it; the
/// diagnostic stream is discarded on success and only attached to failures.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StageOutput {
    /// The stage that produced this output.
    pub stage: String,
    /// Captured standard output.
    pub stdout: String,
    /// Wall-clock execution time in milliseconds.
    pub duration_ms: f64,
}

impl StageOutput {
    /// Creates a new stage output.
    #[must_use]
    pub fn new(stage: impl Into<String>, stdout: impl Into<String>, duration_ms: f64) -> Self {
        Self {
            stage: stage.into(),
            stdout: stdout.into(),
            duration_ms,
        }
    }
}

/// Summary of a completed pipeline run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    /// Unique identifier for this run.
    pub run_id: Uuid,
    /// Terminal state of the run.
    pub state: RunState,
    /// Stage names that completed, in execution order.
    pub stages_completed: Vec<String>,
    /// Total wall-clock time in milliseconds.
    pub duration_ms: f64,
    /// Path of the final interchange-format model.
    pub exported_model: PathBuf,
    /// ISO 8601 timestamp of when the run started.
    pub started_at: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_output() {
        let output = StageOutput::new("stereo-fusion", "points: 120000", 15.5);
        assert_eq!(output.stage, "stereo-fusion");
        assert_eq!(output.stdout, "points: 120000");
        assert!((output.duration_ms - 15.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_report_serializes() {
        let report = RunReport {
            run_id: Uuid::new_v4(),
            state: RunState::Succeeded,
            stages_completed: vec!["feature-extraction".to_string()],
            duration_ms: 42.0,
            exported_model: PathBuf::from("/work/colmap/model.obj"),
            started_at: "2025-01-01T00:00:00Z".to_string(),
        };

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["state"]["state"], "succeeded");
        assert_eq!(json["exported_model"], "/work/colmap/model.obj");
    }
}
