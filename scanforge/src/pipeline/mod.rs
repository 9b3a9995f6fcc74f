//! Pipeline coordination.
//!
//! This module owns the canonical stage order and the fail-fast execution
//! loop that drives it.

mod coordinator;
mod stages;

pub use coordinator::ReconstructionPipeline;
pub use stages::{frame_sampling_stage, reconstruction_stages, transcode_stage};
