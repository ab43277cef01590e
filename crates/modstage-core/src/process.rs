//! External command execution.
//!
//! Commands are described by a [`CommandSpec`] and executed through a
//! [`CommandRunner`]. The production runner, [`ProcessRunner`], blocks until
//! the child exits and lets it write straight to the caller's console so
//! build and server logs stream live.

use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus, Stdio};

use crate::error::StageError;

/// Executable specification: program, arguments and working directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    pub program: String,
    pub args: Vec<String>,
    pub cwd: Option<PathBuf>,
}

impl CommandSpec {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            cwd: None,
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn current_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cwd = Some(dir.into());
        self
    }

    /// Human-readable command line, as echoed before execution.
    pub fn display(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Program path to hand to the OS.
    ///
    /// Relative paths with a directory component (`./gradlew`) are resolved
    /// against the working directory and made absolute, since the child
    /// changes into `cwd` before it looks the program up. Bare names (`java`)
    /// go through `PATH`.
    pub fn resolved_program(&self) -> PathBuf {
        let program = Path::new(&self.program);
        match &self.cwd {
            Some(cwd) if program.is_relative() && program.components().count() > 1 => {
                let joined = cwd.join(program);
                std::path::absolute(&joined).unwrap_or(joined)
            }
            _ => program.to_path_buf(),
        }
    }
}

/// Exit state of an external command. Only success and failure matter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandResult {
    Success,
    /// `code` is `None` when the child was terminated by a signal.
    Failure { code: Option<i32> },
}

impl CommandResult {
    pub fn from_status(status: ExitStatus) -> Self {
        if status.success() {
            Self::Success
        } else {
            Self::Failure {
                code: status.code(),
            }
        }
    }

    pub fn is_success(self) -> bool {
        matches!(self, Self::Success)
    }
}

/// Seam for running external commands.
///
/// `Err` is reserved for commands that could not be started at all; a
/// child that ran and exited non-zero is reported as
/// [`CommandResult::Failure`].
pub trait CommandRunner {
    fn run(&mut self, spec: &CommandSpec) -> Result<CommandResult, StageError>;
}

/// Runs commands as real child processes with inherited stdio.
#[derive(Debug, Default, Clone, Copy)]
pub struct ProcessRunner;

impl ProcessRunner {
    pub fn new() -> Self {
        Self
    }
}

impl CommandRunner for ProcessRunner {
    fn run(&mut self, spec: &CommandSpec) -> Result<CommandResult, StageError> {
        let mut command = Command::new(spec.resolved_program());
        command
            .args(&spec.args)
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit());
        if let Some(cwd) = &spec.cwd {
            command.current_dir(cwd);
        }

        let status = command.status().map_err(|source| StageError::Spawn {
            command: spec.display(),
            source,
        })?;
        Ok(CommandResult::from_status(status))
    }
}

/// Run `spec` and turn a non-zero exit into [`StageError::CommandFailed`].
pub fn run_checked(runner: &mut dyn CommandRunner, spec: &CommandSpec) -> Result<(), StageError> {
    tracing::info!("Running: {}", spec.display());
    if let Some(cwd) = &spec.cwd {
        tracing::debug!(cwd = %cwd.display(), "Working directory");
    }

    match runner.run(spec)? {
        CommandResult::Success => Ok(()),
        CommandResult::Failure { code } => {
            tracing::debug!(?code, "Command failed: {}", spec.display());
            Err(StageError::CommandFailed {
                command: spec.display(),
                code,
            })
        }
    }
}
