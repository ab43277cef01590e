//! Project layout: every fixed path the pipeline reads from or writes to.
//!
//! All paths are resolved against an explicit project root. Nothing in this
//! crate consults or changes the process working directory.

use std::path::{Path, PathBuf};

use serde::Serialize;

pub const SERVER_ARCHIVE_NAME: &str = "HytaleServer.jar";
pub const ASSETS_ARCHIVE_NAME: &str = "Assets.zip";
pub const MODS_DIR_NAME: &str = "mods";

const LIBS_DIR: &str = "libs";
const SETUP_INSTRUCTIONS: &str = "README.md";
const BUILD_OUTPUT_DIR: [&str; 3] = ["app", "build", "libs"];
const RUN_DIR: &str = "run";

/// A required, read-only input identified by a fixed path and a display name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InputArtifact {
    pub display_name: String,
    pub path: PathBuf,
}

impl InputArtifact {
    pub fn new(display_name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            display_name: display_name.into(),
            path: path.into(),
        }
    }

    /// Whether the input is present as a regular file.
    pub fn exists(&self) -> bool {
        self.path.is_file()
    }
}

/// The mutable directory tree the server is launched from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunWorkspace {
    pub root: PathBuf,
    pub server_archive: PathBuf,
    pub assets_archive: PathBuf,
    pub mods_dir: PathBuf,
}

impl RunWorkspace {
    pub fn at(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        Self {
            server_archive: root.join(SERVER_ARCHIVE_NAME),
            assets_archive: root.join(ASSETS_ARCHIVE_NAME),
            mods_dir: root.join(MODS_DIR_NAME),
            root,
        }
    }

    /// File name of the staged server archive, relative to the workspace root.
    pub fn server_file_name(&self) -> String {
        file_name_or(&self.server_archive, SERVER_ARCHIVE_NAME)
    }

    /// File name of the staged asset archive, relative to the workspace root.
    pub fn assets_file_name(&self) -> String {
        file_name_or(&self.assets_archive, ASSETS_ARCHIVE_NAME)
    }
}

/// Resolved locations for a single project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProjectLayout {
    pub project_root: PathBuf,
    pub server: InputArtifact,
    pub assets: InputArtifact,
    /// Where users are pointed when inputs are missing.
    pub setup_instructions: PathBuf,
    pub build_output_dir: PathBuf,
    pub workspace: RunWorkspace,
}

impl ProjectLayout {
    /// Standard layout rooted at `project_root`.
    ///
    /// ```text
    /// <root>/libs/HytaleServer.jar     server archive (input)
    /// <root>/libs/Assets.zip           asset archive (input)
    /// <root>/app/build/libs/           build output
    /// <root>/run/                      run workspace
    /// <root>/run/mods/                 staged plugins
    /// ```
    pub fn default_for(project_root: impl Into<PathBuf>) -> Self {
        let project_root = project_root.into();
        let libs = project_root.join(LIBS_DIR);
        let build_output_dir = BUILD_OUTPUT_DIR
            .iter()
            .fold(project_root.clone(), |path, part| path.join(part));

        Self {
            server: InputArtifact::new(SERVER_ARCHIVE_NAME, libs.join(SERVER_ARCHIVE_NAME)),
            assets: InputArtifact::new(ASSETS_ARCHIVE_NAME, libs.join(ASSETS_ARCHIVE_NAME)),
            setup_instructions: libs.join(SETUP_INSTRUCTIONS),
            build_output_dir,
            workspace: RunWorkspace::at(project_root.join(RUN_DIR)),
            project_root,
        }
    }

    /// Inputs that must exist before anything else runs, in report order.
    pub fn required_inputs(&self) -> [&InputArtifact; 2] {
        [&self.server, &self.assets]
    }

    /// Each input paired with its fixed destination inside the workspace.
    pub fn staging_targets(&self) -> [(&InputArtifact, &Path); 2] {
        [
            (&self.server, self.workspace.server_archive.as_path()),
            (&self.assets, self.workspace.assets_archive.as_path()),
        ]
    }
}

fn file_name_or(path: &Path, fallback: &str) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| fallback.to_string())
}
