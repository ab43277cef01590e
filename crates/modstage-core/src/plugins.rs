//! Plugin staging: full replacement of the mods directory.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::error::StageError;
use crate::fs::{ArtifactFilter, copy_preserving_times, discover_artifacts};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PluginStagingReport {
    /// Whether a mods directory from a previous run was deleted.
    pub removed_previous: bool,
    /// Staged files inside the mods directory, in file-name order.
    pub staged: Vec<PathBuf>,
}

/// Replace `mods_dir` with every qualifying artifact in `build_output_dir`.
///
/// The old directory is deleted before discovery, so a failed discovery
/// leaves no mods directory behind rather than a stale one.
pub fn stage_plugins(
    build_output_dir: &Path,
    mods_dir: &Path,
    filter: &ArtifactFilter,
) -> Result<PluginStagingReport, StageError> {
    let mut report = PluginStagingReport::default();

    if mods_dir.exists() {
        tracing::info!("Deleting existing mods folder: {}", mods_dir.display());
        fs::remove_dir_all(mods_dir).map_err(|err| {
            StageError::io(
                format!("Failed to delete mods folder: {}", mods_dir.display()),
                err,
            )
        })?;
        report.removed_previous = true;
    }

    let artifacts = discover_artifacts(build_output_dir, filter)?;

    fs::create_dir_all(mods_dir).map_err(|err| {
        StageError::io(
            format!("Failed to create mods folder: {}", mods_dir.display()),
            err,
        )
    })?;

    for artifact in artifacts {
        let dest = mods_dir.join(&artifact.file_name);
        copy_preserving_times(&artifact.path, &dest).map_err(|err| {
            if err.kind() == io::ErrorKind::NotFound && !artifact.path.exists() {
                StageError::InputVanished {
                    name: artifact.file_name.clone(),
                    path: artifact.path.clone(),
                }
            } else {
                StageError::io(
                    format!(
                        "Failed to copy {} to {}",
                        artifact.path.display(),
                        dest.display()
                    ),
                    err,
                )
            }
        })?;
        tracing::info!("Copied {} -> {}", artifact.path.display(), dest.display());
        report.staged.push(dest);
    }

    Ok(report)
}
