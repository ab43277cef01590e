//! Copy-if-absent staging of immutable inputs.

use std::fs;
use std::io;
use std::path::Path;

use filetime::FileTime;
use serde::Serialize;

use crate::error::StageError;
use crate::layout::InputArtifact;

/// What [`stage_if_absent`] did with an input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StageAction {
    Copied,
    Skipped,
}

/// Copy `input` to `dest` unless `dest` already exists.
///
/// An existing destination is never overwritten, even if it differs from the
/// source. A source that vanished since the precondition check is reported as
/// [`StageError::InputVanished`].
pub fn stage_if_absent(input: &InputArtifact, dest: &Path) -> Result<StageAction, StageError> {
    if dest.exists() {
        tracing::info!("{} already exists at {}, skipping copy", input.display_name, dest.display());
        return Ok(StageAction::Skipped);
    }

    if !input.path.exists() {
        return Err(vanished(input));
    }

    copy_preserving_times(&input.path, dest).map_err(|err| {
        if err.kind() == io::ErrorKind::NotFound && !input.path.exists() {
            vanished(input)
        } else {
            StageError::io(
                format!(
                    "Failed to copy {} to {}",
                    input.path.display(),
                    dest.display()
                ),
                err,
            )
        }
    })?;

    tracing::info!("Copied {} -> {}", input.path.display(), dest.display());
    Ok(StageAction::Copied)
}

/// Copy a file and carry over its access and modification times.
pub fn copy_preserving_times(src: &Path, dest: &Path) -> io::Result<u64> {
    let bytes = fs::copy(src, dest)?;
    let meta = fs::metadata(src)?;
    let atime = FileTime::from_last_access_time(&meta);
    let mtime = FileTime::from_last_modification_time(&meta);
    filetime::set_file_times(dest, atime, mtime)?;
    Ok(bytes)
}

fn vanished(input: &InputArtifact) -> StageError {
    StageError::InputVanished {
        name: input.display_name.clone(),
        path: input.path.clone(),
    }
}
