//! Configuration types for the reconstruction pipeline.
//!
//! All paths and tunables are explicit values passed in at construction
//! time, never ambient globals: tests inject temporary roots and multiple
//! pipelines with different roots can coexist.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// External tool binaries the pipeline invokes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolPaths {
    /// COLMAP binary (feature extraction through mesh texturing).
    #[serde(default = "default_colmap")]
    pub colmap: String,
    /// ffmpeg binary (video transcode and frame sampling).
    #[serde(default = "default_ffmpeg")]
    pub ffmpeg: String,
    /// assimp binary (model format conversion).
    #[serde(default = "default_assimp")]
    pub assimp: String,
}

fn default_colmap() -> String {
    "colmap".to_string()
}

fn default_ffmpeg() -> String {
    "ffmpeg".to_string()
}

fn default_assimp() -> String {
    "assimp".to_string()
}

impl Default for ToolPaths {
    fn default() -> Self {
        Self {
            colmap: default_colmap(),
            ffmpeg: default_ffmpeg(),
            assimp: default_assimp(),
        }
    }
}

/// Configuration for one reconstruction pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// The workspace root under which all run artifacts are laid out.
    pub workspace_root: PathBuf,
    /// Frames sampled per second of input video.
    ///
    /// Higher rates produce more frames: denser reconstruction, but slower
    /// feature extraction, matching, and every downstream stage.
    #[serde(default = "default_frame_rate")]
    pub frame_rate: f64,
    /// External tool binaries.
    #[serde(default)]
    pub tools: ToolPaths,
}

fn default_frame_rate() -> f64 {
    2.0
}

impl PipelineConfig {
    /// Creates a configuration rooted at the given workspace directory.
    #[must_use]
    pub fn new(workspace_root: impl Into<PathBuf>) -> Self {
        Self {
            workspace_root: workspace_root.into(),
            frame_rate: default_frame_rate(),
            tools: ToolPaths::default(),
        }
    }

    /// Sets the frame sampling rate.
    #[must_use]
    pub fn with_frame_rate(mut self, frame_rate: f64) -> Self {
        self.frame_rate = frame_rate;
        self
    }

    /// Sets the external tool binaries.
    #[must_use]
    pub fn with_tools(mut self, tools: ToolPaths) -> Self {
        self.tools = tools;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = PipelineConfig::new("/work");
        assert_eq!(config.workspace_root, PathBuf::from("/work"));
        assert!((config.frame_rate - 2.0).abs() < f64::EPSILON);
        assert_eq!(config.tools.colmap, "colmap");
        assert_eq!(config.tools.ffmpeg, "ffmpeg");
        assert_eq!(config.tools.assimp, "assimp");
    }

    #[test]
    fn test_builders() {
        let config = PipelineConfig::new("/scans/run-1")
            .with_frame_rate(10.0)
            .with_tools(ToolPaths {
                colmap: "/opt/colmap/bin/colmap".to_string(),
                ..ToolPaths::default()
            });

        assert!((config.frame_rate - 10.0).abs() < f64::EPSILON);
        assert_eq!(config.tools.colmap, "/opt/colmap/bin/colmap");
        assert_eq!(config.tools.ffmpeg, "ffmpeg");
    }

    #[test]
    fn test_deserialize_fills_defaults() {
        let config: PipelineConfig =
            serde_json::from_str(r#"{"workspace_root": "/work"}"#).unwrap();
        assert!((config.frame_rate - 2.0).abs() < f64::EPSILON);
        assert_eq!(config.tools.assimp, "assimp");
    }
}
