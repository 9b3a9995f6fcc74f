//! Workspace staging: directory layout and idempotent setup.
//!
//! Every artifact path is derived once from a single workspace root and is
//! fixed for the lifetime of a run, so all stages agree on artifact
//! locations.

use crate::errors::{FilesystemError, PipelineError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Creates a directory (and any missing parents) if absent.
///
/// Creating an already-existing directory is a no-op, never an error; only
/// underlying I/O failures (permissions, invalid path, disk full) surface.
pub fn ensure_dir(path: impl AsRef<Path>) -> Result<(), PipelineError> {
    let path = path.as_ref();
    std::fs::create_dir_all(path).map_err(|source| FilesystemError::new(path, source))?;
    Ok(())
}

/// The fixed artifact layout under one workspace root.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkspaceLayout {
    root: PathBuf,
    transcoded_video: PathBuf,
    frames_dir: PathBuf,
    colmap_dir: PathBuf,
    database_path: PathBuf,
    sparse_dir: PathBuf,
    sparse_model_dir: PathBuf,
    dense_dir: PathBuf,
    dense_cloud: PathBuf,
    poisson_mesh: PathBuf,
    textured_mesh: PathBuf,
    exported_model: PathBuf,
}

impl WorkspaceLayout {
    /// Derives the full artifact layout from a workspace root.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        let colmap_dir = root.join("colmap");
        let sparse_dir = colmap_dir.join("sparse");
        let dense_dir = colmap_dir.join("dense");
        Self {
            transcoded_video: root.join("output.mp4"),
            frames_dir: root.join("frames"),
            database_path: colmap_dir.join("database.db"),
            sparse_model_dir: sparse_dir.join("0"),
            dense_cloud: colmap_dir.join("model.ply"),
            poisson_mesh: dense_dir.join("meshed-poisson.ply"),
            textured_mesh: dense_dir.join("meshed-textured.ply"),
            exported_model: colmap_dir.join("model.obj"),
            root,
            colmap_dir,
            sparse_dir,
            dense_dir,
        }
    }

    /// Creates every directory the pipeline needs. Idempotent.
    pub fn prepare(&self) -> Result<(), PipelineError> {
        ensure_dir(&self.frames_dir)?;
        ensure_dir(&self.colmap_dir)?;
        ensure_dir(&self.sparse_dir)?;
        ensure_dir(&self.dense_dir)?;
        Ok(())
    }

    /// Removes a feature database left behind by a prior run.
    ///
    /// Stale match data silently corrupts reconstruction, so the database
    /// must never carry state across runs. Returns whether a file was
    /// actually removed; a missing database is a no-op.
    pub fn reset_feature_database(&self) -> Result<bool, PipelineError> {
        match std::fs::remove_file(&self.database_path) {
            Ok(()) => Ok(true),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(err) => Err(FilesystemError::new(&self.database_path, err).into()),
        }
    }

    /// The workspace root.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// The transcoded video produced by the optional transcode capability.
    #[must_use]
    pub fn transcoded_video(&self) -> &Path {
        &self.transcoded_video
    }

    /// The sampled still-image directory.
    #[must_use]
    pub fn frames_dir(&self) -> &Path {
        &self.frames_dir
    }

    /// The reconstruction working directory.
    #[must_use]
    pub fn colmap_dir(&self) -> &Path {
        &self.colmap_dir
    }

    /// The feature/match database file.
    #[must_use]
    pub fn database_path(&self) -> &Path {
        &self.database_path
    }

    /// The sparse reconstruction output directory.
    #[must_use]
    pub fn sparse_dir(&self) -> &Path {
        &self.sparse_dir
    }

    /// The first sparse model produced by the mapper.
    #[must_use]
    pub fn sparse_model_dir(&self) -> &Path {
        &self.sparse_model_dir
    }

    /// The undistorted workspace for dense reconstruction.
    #[must_use]
    pub fn dense_dir(&self) -> &Path {
        &self.dense_dir
    }

    /// The fused dense point cloud.
    #[must_use]
    pub fn dense_cloud(&self) -> &Path {
        &self.dense_cloud
    }

    /// The Poisson-surfaced mesh.
    #[must_use]
    pub fn poisson_mesh(&self) -> &Path {
        &self.poisson_mesh
    }

    /// The textured mesh.
    #[must_use]
    pub fn textured_mesh(&self) -> &Path {
        &self.textured_mesh
    }

    /// The final interchange-format model.
    #[must_use]
    pub fn exported_model(&self) -> &Path {
        &self.exported_model
    }

    /// The frame filename pattern handed to the sampler.
    #[must_use]
    pub fn frame_pattern(&self) -> PathBuf {
        self.frames_dir.join("frame-%04d.jpg")
    }
}
