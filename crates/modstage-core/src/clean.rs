//! Removal of the run workspace.

use std::fs;

use crate::error::StageError;
use crate::layout::RunWorkspace;

/// Delete the whole run workspace. Returns `false` if there was nothing to
/// delete. Inputs live outside the workspace and are never touched.
pub fn clean_workspace(workspace: &RunWorkspace) -> Result<bool, StageError> {
    if !workspace.root.exists() {
        tracing::info!("Run folder {} does not exist, nothing to clean", workspace.root.display());
        return Ok(false);
    }

    fs::remove_dir_all(&workspace.root).map_err(|err| {
        StageError::io(
            format!("Failed to delete run folder: {}", workspace.root.display()),
            err,
        )
    })?;
    tracing::info!("Deleted run folder {}", workspace.root.display());
    Ok(true)
}
