//! Scanforge binary entry point.
//!
//! Wires configuration into the pipeline coordinator and reports final
//! success or failure to the invoking environment: exit code 0 with the
//! exported model path on success, nonzero with the failing stage and the
//! tool's diagnostics otherwise.

use anyhow::Context;
use clap::Parser;
use scanforge::config::{PipelineConfig, ToolPaths};
use scanforge::pipeline::ReconstructionPipeline;
use std::path::{Path, PathBuf};
use std::process;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

/// Photogrammetry pipeline orchestrator: 360-degree video to textured mesh.
#[derive(Parser)]
#[command(name = "scanforge")]
#[command(about = "Reconstruct a textured 3D mesh from sampled video frames")]
#[command(version)]
struct Cli {
    /// Workspace root under which all run artifacts are laid out.
    #[arg(long, default_value = ".")]
    root: PathBuf,

    /// Source 360-degree video. When given, transcode and frame sampling
    /// run before reconstruction; otherwise the frame directory is expected
    /// to be populated already.
    #[arg(long)]
    video: Option<PathBuf>,

    /// Frames sampled per second of input video. Higher rates give denser
    /// reconstruction but slower downstream stages.
    #[arg(long, default_value_t = 2.0)]
    frame_rate: f64,

    /// COLMAP binary.
    #[arg(long, default_value = "colmap", env = "SCANFORGE_COLMAP")]
    colmap: String,

    /// ffmpeg binary.
    #[arg(long, default_value = "ffmpeg", env = "SCANFORGE_FFMPEG")]
    ffmpeg: String,

    /// assimp binary.
    #[arg(long, default_value = "assimp", env = "SCANFORGE_ASSIMP")]
    assimp: String,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_logging();

    let config = PipelineConfig::new(cli.root)
        .with_frame_rate(cli.frame_rate)
        .with_tools(ToolPaths {
            colmap: cli.colmap,
            ffmpeg: cli.ffmpeg,
            assimp: cli.assimp,
        });

    let pipeline = ReconstructionPipeline::new(config);

    let token = pipeline.cancel_token();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            token.cancel("interrupted by signal");
        }
    });

    if let Some(video) = cli.video.as_deref() {
        if let Err(err) = prepare_frames(&pipeline, video).await {
            error!(error = %format!("{err:#}"), "frame preparation failed");
            process::exit(1);
        }
    }

    match pipeline.run().await {
        Ok(report) => {
            info!(
                model = %report.exported_model.display(),
                stages = report.stages_completed.len(),
                "pipeline succeeded"
            );
        }
        Err(err) => {
            error!(error = %err, "pipeline failed");
            process::exit(1);
        }
    }
}

/// Runs the optional prefix capabilities: remux the source video, then
/// sample frames from it at the configured rate.
async fn prepare_frames(pipeline: &ReconstructionPipeline, video: &Path) -> anyhow::Result<()> {
    info!(video = %video.display(), "preparing frames from source video");

    pipeline
        .transcode_video(video)
        .await
        .context("video transcode failed")?;

    pipeline
        .sample_frames(pipeline.layout().transcoded_video())
        .await
        .context("frame sampling failed")?;

    Ok(())
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
