//! # Scanforge
//!
//! Orchestrator for a multi-stage photogrammetry pipeline: it turns a raw
//! 360-degree video into a textured 3D mesh by sequentially invoking
//! external video-processing and structure-from-motion tools (ffmpeg,
//! COLMAP, assimp).
//!
//! Scanforge owns *control flow only*:
//!
//! - **Workspace staging**: idempotent directory setup and a deterministic
//!   artifact layout derived from one workspace root
//! - **Stage sequencing**: a strictly linear, fail-fast chain of external
//!   tool invocations, each consuming the artifacts the previous stage
//!   produced
//! - **Re-run idempotency**: the feature database never carries state
//!   across runs
//! - **Failure propagation**: typed errors carrying the failing stage and
//!   the tool's captured diagnostics
//! - **Cancellation**: cooperative tokens that terminate in-flight tools
//!
//! The computer-vision and codec work happens entirely inside the external
//! tools; scanforge never reimplements it.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use scanforge::prelude::*;
//!
//! let config = PipelineConfig::new("/scans/run-1").with_frame_rate(4.0);
//! let pipeline = ReconstructionPipeline::new(config);
//! let report = pipeline.run().await?;
//! println!("model at {}", report.exported_model.display());
//! ```

#![forbid(unsafe_code)]
#![warn(
    clippy::all,
    clippy::pedantic,
    missing_docs,
    rust_2018_idioms
)]
#![allow(
    clippy::module_name_repetitions,
    clippy::must_use_candidate,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc
)]

pub mod cancellation;
pub mod config;
pub mod core;
pub mod errors;
pub mod events;
pub mod pipeline;
pub mod runner;
pub mod testing;
pub mod workspace;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::cancellation::CancellationToken;
    pub use crate::config::{PipelineConfig, ToolPaths};
    pub use crate::core::{RunReport, RunState, StageCommand, StageOutput};
    pub use crate::errors::{FilesystemError, PipelineError, StageExecutionError};
    pub use crate::events::{
        CollectingEventSink, EventSink, LoggingEventSink, NoOpEventSink,
    };
    pub use crate::pipeline::{
        frame_sampling_stage, reconstruction_stages, transcode_stage, ReconstructionPipeline,
    };
    pub use crate::runner::{ProcessStageRunner, StageRunner};
    pub use crate::workspace::{ensure_dir, WorkspaceLayout};
}
