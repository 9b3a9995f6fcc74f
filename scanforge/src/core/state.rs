//! Run state machine for a pipeline execution.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The execution state of a pipeline run.
///
/// A run moves `Idle -> Preparing -> Running -> Succeeded | Failed`. Terminal
/// states have no resume transition: a fresh invocation restarts at
/// `Preparing`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum RunState {
    /// No run has started yet.
    Idle,
    /// The workspace is being staged.
    Preparing,
    /// An external stage is executing.
    Running {
        /// The stage currently in flight.
        stage: String,
    },
    /// The run completed and the exported model exists.
    Succeeded,
    /// The run aborted at a stage.
    Failed {
        /// The stage the run stopped at.
        stage: String,
    },
}

impl Default for RunState {
    fn default() -> Self {
        Self::Idle
    }
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => write!(f, "idle"),
            Self::Preparing => write!(f, "preparing"),
            Self::Running { stage } => write!(f, "running({stage})"),
            Self::Succeeded => write!(f, "succeeded"),
            Self::Failed { stage } => write!(f, "failed({stage})"),
        }
    }
}

impl RunState {
    /// Creates a running state for a stage.
    #[must_use]
    pub fn running(stage: impl Into<String>) -> Self {
        Self::Running {
            stage: stage.into(),
        }
    }

    /// Creates a failed state for a stage.
    #[must_use]
    pub fn failed(stage: impl Into<String>) -> Self {
        Self::Failed {
            stage: stage.into(),
        }
    }

    /// Returns true if the state is terminal (no further transitions).
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Succeeded | Self::Failed { .. })
    }

    /// Returns true if the run completed successfully.
    #[must_use]
    pub fn is_succeeded(&self) -> bool {
        matches!(self, Self::Succeeded)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        assert_eq!(RunState::Idle.to_string(), "idle");
        assert_eq!(RunState::Preparing.to_string(), "preparing");
        assert_eq!(RunState::running("sparse-mapping").to_string(), "running(sparse-mapping)");
        assert_eq!(RunState::Succeeded.to_string(), "succeeded");
        assert_eq!(RunState::failed("stereo-fusion").to_string(), "failed(stereo-fusion)");
    }

    #[test]
    fn test_terminal_states() {
        assert!(RunState::Succeeded.is_terminal());
        assert!(RunState::failed("mesh-texturing").is_terminal());
        assert!(!RunState::Idle.is_terminal());
        assert!(!RunState::Preparing.is_terminal());
        assert!(!RunState::running("sparse-mapping").is_terminal());
    }

    #[test]
    fn test_serialize_tagged() {
        let state = RunState::failed("feature-extraction");
        let json = serde_json::to_value(&state).unwrap();
        assert_eq!(json["state"], "failed");
        assert_eq!(json["stage"], "feature-extraction");
    }
}
