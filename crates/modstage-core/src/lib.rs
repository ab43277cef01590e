//! modstage core library
//!
//! Stages a runnable server instance from a server archive, an asset archive
//! and freshly built plugin jars, then launches the server. The frontend
//! builds a [`layout::ProjectLayout`] and [`pipeline::PipelineOptions`] and
//! drives a [`pipeline::Pipeline`].

pub mod clean;
pub mod error;
pub mod fs;
pub mod layout;
pub mod pipeline;
pub mod plugins;
pub mod preflight;
pub mod process;
pub mod status;

/// Re-exports of commonly used types
pub mod prelude {
    // Errors
    pub use crate::error::{StageError, StageFailure};

    // Layout
    pub use crate::layout::{InputArtifact, ProjectLayout, RunWorkspace};

    // Pipeline
    pub use crate::pipeline::{
        BuildSettings, LaunchSettings, NoopObserver, Pipeline, PipelineObserver,
        PipelineOptions, PipelineState, RunReport, Stage,
    };

    // Processes
    pub use crate::process::{CommandResult, CommandRunner, CommandSpec, ProcessRunner};

    // Filesystem
    pub use crate::fs::{ArtifactFilter, BuildArtifact, StageAction, SuffixRule};

    // Inspection
    pub use crate::status::{LayoutStatus, collect_status};
}
