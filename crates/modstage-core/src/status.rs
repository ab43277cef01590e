//! Read-only inspection of a project's layout.
//!
//! Reports which inputs are present, what is staged in the run workspace,
//! and which build outputs would qualify as plugins on the next run. Nothing
//! here writes to disk.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::error::StageError;
use crate::fs::{ArtifactFilter, same_contents, scan_artifacts};
use crate::layout::{InputArtifact, ProjectLayout};

#[derive(Debug, Clone, Serialize)]
pub struct LayoutStatus {
    pub project_root: PathBuf,
    pub inputs: Vec<InputStatus>,
    pub workspace_exists: bool,
    pub staged: Vec<StagedStatus>,
    /// File names currently in the mods directory, `None` if it is absent.
    pub mods: Option<Vec<String>>,
    pub build_output: BuildOutputStatus,
}

#[derive(Debug, Clone, Serialize)]
pub struct InputStatus {
    pub name: String,
    pub path: PathBuf,
    pub present: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct StagedStatus {
    pub name: String,
    pub path: PathBuf,
    pub integrity: StagedIntegrity,
}

/// How a staged copy relates to its source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum StagedIntegrity {
    /// Not copied into the workspace yet.
    NotStaged,
    /// Present, contents not compared.
    Unverified,
    Matches,
    /// Differs from the source. Staging keeps it as is.
    Customized,
    /// Present, but the source is gone so it cannot be compared.
    SourceMissing,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "lowercase")]
pub enum BuildOutputStatus {
    Missing,
    Present {
        qualifying: Vec<String>,
        rejected: Vec<String>,
    },
}

impl LayoutStatus {
    /// Count of problems that would stop the next run before launch.
    pub fn issues(&self) -> usize {
        let missing_inputs = self.inputs.iter().filter(|input| !input.present).count();
        let build_problem = match &self.build_output {
            BuildOutputStatus::Missing => 1,
            BuildOutputStatus::Present { qualifying, .. } if qualifying.is_empty() => 1,
            BuildOutputStatus::Present { .. } => 0,
        };
        missing_inputs + build_problem
    }
}

/// Collect the status of `layout`. With `verify`, staged archives are
/// compared byte-for-byte against their sources.
pub fn collect_status(
    layout: &ProjectLayout,
    filter: &ArtifactFilter,
    verify: bool,
) -> Result<LayoutStatus, StageError> {
    let inputs = layout
        .required_inputs()
        .iter()
        .map(|input| InputStatus {
            name: input.display_name.clone(),
            path: input.path.clone(),
            present: input.exists(),
        })
        .collect();

    let staged = layout
        .staging_targets()
        .iter()
        .map(|(input, dest)| staged_status(input, dest, verify))
        .collect::<Result<Vec<_>, _>>()?;

    let mods = list_dir_names(&layout.workspace.mods_dir)?;

    let build_output = match scan_artifacts(&layout.build_output_dir, filter) {
        Ok(scan) => BuildOutputStatus::Present {
            qualifying: scan
                .qualifying
                .into_iter()
                .map(|artifact| artifact.file_name)
                .collect(),
            rejected: scan.rejected,
        },
        Err(StageError::MissingBuildOutputDirectory { .. }) => BuildOutputStatus::Missing,
        Err(err) => return Err(err),
    };

    Ok(LayoutStatus {
        project_root: layout.project_root.clone(),
        inputs,
        workspace_exists: layout.workspace.root.is_dir(),
        staged,
        mods,
        build_output,
    })
}

fn staged_status(
    input: &InputArtifact,
    dest: &Path,
    verify: bool,
) -> Result<StagedStatus, StageError> {
    let integrity = if !dest.exists() {
        StagedIntegrity::NotStaged
    } else if !verify {
        StagedIntegrity::Unverified
    } else if !input.exists() {
        StagedIntegrity::SourceMissing
    } else {
        let same = same_contents(&input.path, dest).map_err(|err| {
            StageError::io(
                format!(
                    "Failed to compare {} with {}",
                    dest.display(),
                    input.path.display()
                ),
                err,
            )
        })?;
        if same {
            StagedIntegrity::Matches
        } else {
            StagedIntegrity::Customized
        }
    };

    Ok(StagedStatus {
        name: input.display_name.clone(),
        path: dest.to_path_buf(),
        integrity,
    })
}

fn list_dir_names(dir: &Path) -> Result<Option<Vec<String>>, StageError> {
    if !dir.is_dir() {
        return Ok(None);
    }
    let entries = fs::read_dir(dir)
        .map_err(|err| StageError::io(format!("Failed to read directory: {}", dir.display()), err))?;

    let mut names = entries
        .map(|entry| entry.map(|e| e.file_name().to_string_lossy().into_owned()))
        .collect::<Result<Vec<_>, _>>()
        .map_err(|err| {
            StageError::io(
                format!("Failed to read directory entries: {}", dir.display()),
                err,
            )
        })?;
    names.sort();
    Ok(Some(names))
}
