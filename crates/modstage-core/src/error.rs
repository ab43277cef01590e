//! Failure taxonomy for pipeline stages.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::pipeline::Stage;

/// Exit code used for failures that have no child exit code to forward.
pub const GENERIC_FAILURE_CODE: i32 = 1;

/// Why a stage failed. Every variant is terminal.
#[derive(Error, Debug)]
pub enum StageError {
    #[error("required files are missing: {}", .names.join(", "))]
    MissingInputs {
        names: Vec<String>,
        instructions: PathBuf,
    },

    #[error("command `{command}` failed with exit code {}", describe_code(.code))]
    CommandFailed { command: String, code: Option<i32> },

    #[error("failed to start `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: io::Error,
    },

    #[error("build output directory not found at {}", .path.display())]
    MissingBuildOutputDirectory { path: PathBuf },

    #[error("no plugin artifact found in {}", .dir.display())]
    NoMatchingBuildArtifact { dir: PathBuf },

    #[error("{name} not found at {} (removed after it was checked?)", .path.display())]
    InputVanished { name: String, path: PathBuf },

    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: io::Error,
    },
}

impl StageError {
    pub fn io(context: impl Into<String>, source: io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    /// Process exit code to report for this failure.
    ///
    /// Failed commands forward the child's code; everything else, including
    /// children killed by a signal, maps to [`GENERIC_FAILURE_CODE`].
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::CommandFailed {
                code: Some(code), ..
            } if *code != 0 => *code,
            _ => GENERIC_FAILURE_CODE,
        }
    }
}

/// Payload of an aborted run: the stage that failed and why.
#[derive(Error, Debug)]
#[error("{stage} stage failed: {error}")]
pub struct StageFailure {
    pub stage: Stage,
    #[source]
    pub error: StageError,
}

impl StageFailure {
    pub fn exit_code(&self) -> i32 {
        self.error.exit_code()
    }
}

fn describe_code(code: &Option<i32>) -> String {
    match code {
        Some(code) => code.to_string(),
        None => "none (terminated by signal)".to_string(),
    }
}
