//! The canonical stage list and its dependency-derived arguments.

use crate::config::ToolPaths;
use crate::core::StageCommand;
use crate::workspace::WorkspaceLayout;
use std::path::Path;

/// Builds the canonical ordered reconstruction stages.
///
/// The chain is strictly linear: each stage consumes artifacts the previous
/// one produced, so the order is invariant and there is nothing to
/// parallelize. All paths come from one [`WorkspaceLayout`].
#[must_use]
pub fn reconstruction_stages(layout: &WorkspaceLayout, tools: &ToolPaths) -> Vec<StageCommand> {
    vec![
        StageCommand::new("feature-extraction", tools.colmap.as_str())
            .arg("feature_extractor")
            .arg("--database_path")
            .path_arg(layout.database_path())
            .arg("--image_path")
            .path_arg(layout.frames_dir())
            .input(layout.frames_dir())
            .output(layout.database_path()),
        StageCommand::new("sequential-matching", tools.colmap.as_str())
            .arg("sequential_matcher")
            .arg("--database_path")
            .path_arg(layout.database_path())
            .input(layout.database_path()),
        StageCommand::new("sparse-mapping", tools.colmap.as_str())
            .arg("mapper")
            .arg("--database_path")
            .path_arg(layout.database_path())
            .arg("--image_path")
            .path_arg(layout.frames_dir())
            .arg("--output_path")
            .path_arg(layout.sparse_dir())
            .input(layout.frames_dir())
            .input(layout.database_path())
            .output(layout.sparse_model_dir()),
        StageCommand::new("image-undistortion", tools.colmap.as_str())
            .arg("image_undistorter")
            .arg("--image_path")
            .path_arg(layout.frames_dir())
            .arg("--input_path")
            .path_arg(layout.sparse_model_dir())
            .arg("--output_path")
            .path_arg(layout.dense_dir())
            .arg("--output_type")
            .arg("COLMAP")
            .input(layout.frames_dir())
            .input(layout.sparse_model_dir()),
        StageCommand::new("stereo-matching", tools.colmap.as_str())
            .arg("patch_match_stereo")
            .arg("--workspace_path")
            .path_arg(layout.dense_dir())
            .arg("--workspace_format")
            .arg("COLMAP")
            .arg("--PatchMatchStereo.geom_consistency")
            .arg("true")
            .input(layout.dense_dir()),
        StageCommand::new("stereo-fusion", tools.colmap.as_str())
            .arg("stereo_fusion")
            .arg("--workspace_path")
            .path_arg(layout.dense_dir())
            .arg("--workspace_format")
            .arg("COLMAP")
            .arg("--input_type")
            .arg("geometric")
            .arg("--output_path")
            .path_arg(layout.dense_cloud())
            .input(layout.dense_dir())
            .output(layout.dense_cloud()),
        StageCommand::new("poisson-meshing", tools.colmap.as_str())
            .arg("poisson_mesher")
            .arg("--input_path")
            .path_arg(layout.dense_cloud())
            .arg("--output_path")
            .path_arg(layout.poisson_mesh())
            .input(layout.dense_cloud())
            .output(layout.poisson_mesh()),
        StageCommand::new("mesh-texturing", tools.colmap.as_str())
            .arg("texture_mesher")
            .arg("--input_path")
            .path_arg(layout.poisson_mesh())
            .arg("--output_path")
            .path_arg(layout.textured_mesh())
            .input(layout.poisson_mesh())
            .input(layout.dense_dir())
            .output(layout.textured_mesh()),
        StageCommand::new("model-export", tools.assimp.as_str())
            .arg("export")
            .path_arg(layout.textured_mesh())
            .path_arg(layout.exported_model())
            .input(layout.textured_mesh())
            .output(layout.exported_model()),
    ]
}

/// Builds the optional video transcode stage (container remux, no re-encode).
#[must_use]
pub fn transcode_stage(
    input: impl AsRef<Path>,
    layout: &WorkspaceLayout,
    tools: &ToolPaths,
) -> StageCommand {
    let input = input.as_ref();
    StageCommand::new("video-transcode", tools.ffmpeg.as_str())
        .arg("-y")
        .arg("-i")
        .path_arg(input)
        .arg("-c")
        .arg("copy")
        .path_arg(layout.transcoded_video())
        .input(input)
        .output(layout.transcoded_video())
}

/// Builds the optional frame sampling stage.
#[must_use]
pub fn frame_sampling_stage(
    video: impl AsRef<Path>,
    layout: &WorkspaceLayout,
    tools: &ToolPaths,
    frame_rate: f64,
) -> StageCommand {
    let video = video.as_ref();
    StageCommand::new("frame-sampling", tools.ffmpeg.as_str())
        .arg("-y")
        .arg("-i")
        .path_arg(video)
        .arg("-vf")
        .arg(format!("fps={frame_rate}"))
        .arg("-qscale:v")
        .arg("2")
        .path_arg(layout.frame_pattern())
        .input(video)
}
