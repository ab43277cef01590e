//! Pipeline coordinator.
//!
//! The run is an explicit state machine:
//!
//! ```text
//! Init -> PreconditionsOk -> Built -> WorkspaceReady -> ArtifactsStaged
//!      -> PluginsStaged -> Running -> Exited
//! ```
//!
//! Any stage failure moves straight to `Aborted` and no later stage is
//! attempted. There is no resume state: every run starts at `Init` and relies
//! on copy-if-absent staging and full replacement of the mods directory to
//! converge.

use std::fmt;
use std::fs;
use std::path::Path;

use serde::Serialize;

use crate::error::{StageError, StageFailure};
use crate::fs::{ArtifactFilter, StageAction, stage_if_absent};
use crate::layout::{ProjectLayout, RunWorkspace};
use crate::plugins::{PluginStagingReport, stage_plugins};
use crate::preflight::check_inputs;
use crate::process::{CommandRunner, CommandSpec, run_checked};

/// One discrete step of the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    Preconditions,
    Build,
    Workspace,
    Artifacts,
    Plugins,
    Launch,
}

impl Stage {
    pub const ALL: [Stage; 6] = [
        Stage::Preconditions,
        Stage::Build,
        Stage::Workspace,
        Stage::Artifacts,
        Stage::Plugins,
        Stage::Launch,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Stage::Preconditions => "preconditions",
            Stage::Build => "build",
            Stage::Workspace => "workspace",
            Stage::Artifacts => "artifacts",
            Stage::Plugins => "plugins",
            Stage::Launch => "launch",
        }
    }

    /// One-based position, used for console banners.
    pub fn number(self) -> usize {
        Self::ALL.iter().position(|stage| *stage == self).unwrap_or(0) + 1
    }

    pub fn title(self) -> &'static str {
        match self {
            Stage::Preconditions => "Checking for required files",
            Stage::Build => "Building plugin",
            Stage::Workspace => "Ensuring run folder exists",
            Stage::Artifacts => "Copying server and assets",
            Stage::Plugins => "Copying plugins to mods folder",
            Stage::Launch => "Running server",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PipelineState {
    Init,
    PreconditionsOk,
    Built,
    WorkspaceReady,
    ArtifactsStaged,
    PluginsStaged,
    Running,
    Exited { code: i32 },
    Aborted { stage: Stage, reason: String },
}

impl PipelineState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Exited { .. } | Self::Aborted { .. })
    }

    /// The stage that moves the pipeline out of this state, if any.
    fn pending_stage(&self) -> Option<Stage> {
        match self {
            Self::Init => Some(Stage::Preconditions),
            Self::PreconditionsOk => Some(Stage::Build),
            Self::Built => Some(Stage::Workspace),
            Self::WorkspaceReady => Some(Stage::Artifacts),
            Self::ArtifactsStaged => Some(Stage::Plugins),
            Self::PluginsStaged => Some(Stage::Launch),
            Self::Running | Self::Exited { .. } | Self::Aborted { .. } => None,
        }
    }
}

/// Progress hooks, called synchronously as the pipeline advances.
pub trait PipelineObserver {
    fn stage_started(&mut self, _stage: Stage) {}
    fn stage_skipped(&mut self, _stage: Stage) {}
    fn state_changed(&mut self, _state: &PipelineState) {}
    /// Called right before the server is launched and the run blocks.
    fn launching(&mut self, _command: &CommandSpec) {}
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl PipelineObserver for NoopObserver {}

/// How the plugin is built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildSettings {
    pub program: String,
    pub args: Vec<String>,
    /// Treat the build as already done and move on.
    pub skip: bool,
}

impl Default for BuildSettings {
    fn default() -> Self {
        let program = if cfg!(windows) {
            "gradlew.bat"
        } else {
            "./gradlew"
        };
        Self {
            program: program.to_string(),
            args: vec!["build".to_string()],
            skip: false,
        }
    }
}

impl BuildSettings {
    /// Build command, run from the project root.
    pub fn command(&self, project_root: &Path) -> CommandSpec {
        CommandSpec::new(&self.program)
            .args(self.args.iter().cloned())
            .current_dir(project_root)
    }
}

/// How the server is started.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchSettings {
    pub java: String,
    /// Appended after the fixed `--assets` argument.
    pub extra_args: Vec<String>,
    /// When false, the run ends once plugins are staged.
    pub enabled: bool,
}

impl Default for LaunchSettings {
    fn default() -> Self {
        Self {
            java: "java".to_string(),
            extra_args: Vec::new(),
            enabled: true,
        }
    }
}

impl LaunchSettings {
    /// Server command, run from inside the workspace.
    pub fn command(&self, workspace: &RunWorkspace) -> CommandSpec {
        CommandSpec::new(&self.java)
            .args(["-jar".to_string(), workspace.server_file_name()])
            .args(["--assets".to_string(), workspace.assets_file_name()])
            .args(self.extra_args.iter().cloned())
            .current_dir(&workspace.root)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PipelineOptions {
    pub build: BuildSettings,
    pub launch: LaunchSettings,
    pub filter: ArtifactFilter,
}

/// What a completed run did.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunReport {
    pub built: bool,
    pub server: Option<StageAction>,
    pub assets: Option<StageAction>,
    pub plugins: PluginStagingReport,
    /// Exit code of the server, if it was launched.
    pub server_exit: Option<i32>,
}

pub struct Pipeline<'a> {
    layout: &'a ProjectLayout,
    options: &'a PipelineOptions,
    runner: &'a mut dyn CommandRunner,
    state: PipelineState,
    report: RunReport,
}

impl fmt::Debug for Pipeline<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pipeline")
            .field("layout", &self.layout)
            .field("options", &self.options)
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

impl<'a> Pipeline<'a> {
    pub fn new(
        layout: &'a ProjectLayout,
        options: &'a PipelineOptions,
        runner: &'a mut dyn CommandRunner,
    ) -> Self {
        Self {
            layout,
            options,
            runner,
            state: PipelineState::Init,
            report: RunReport::default(),
        }
    }

    pub fn state(&self) -> &PipelineState {
        &self.state
    }

    pub fn report(&self) -> &RunReport {
        &self.report
    }

    /// The next stage to run, or `None` once the run is over.
    pub fn next_stage(&self) -> Option<Stage> {
        match self.state.pending_stage() {
            Some(Stage::Launch) if !self.options.launch.enabled => None,
            pending => pending,
        }
    }

    /// Run the next stage.
    ///
    /// Returns the stage that ran, `Ok(None)` when nothing is left, or the
    /// failure that moved the pipeline to `Aborted`.
    pub fn advance(
        &mut self,
        observer: &mut dyn PipelineObserver,
    ) -> Result<Option<Stage>, StageFailure> {
        let Some(stage) = self.next_stage() else {
            return Ok(None);
        };

        observer.stage_started(stage);
        tracing::debug!(%stage, "Stage started");

        match self.execute(stage, observer) {
            Ok(next) => {
                self.transition(next, observer);
                Ok(Some(stage))
            }
            Err(error) => {
                tracing::debug!(%stage, %error, "Stage aborted");
                self.transition(
                    PipelineState::Aborted {
                        stage,
                        reason: error.to_string(),
                    },
                    observer,
                );
                Err(StageFailure { stage, error })
            }
        }
    }

    /// Drive the pipeline until it finishes or a stage fails.
    pub fn run(mut self, observer: &mut dyn PipelineObserver) -> Result<RunReport, StageFailure> {
        while self.advance(observer)?.is_some() {}
        Ok(self.report)
    }

    fn transition(&mut self, next: PipelineState, observer: &mut dyn PipelineObserver) {
        tracing::debug!(from = ?self.state, to = ?next, "State transition");
        self.state = next;
        observer.state_changed(&self.state);
    }

    fn execute(
        &mut self,
        stage: Stage,
        observer: &mut dyn PipelineObserver,
    ) -> Result<PipelineState, StageError> {
        let layout = self.layout;
        match stage {
            Stage::Preconditions => {
                check_inputs(layout.required_inputs(), &layout.setup_instructions)?;
                Ok(PipelineState::PreconditionsOk)
            }
            Stage::Build => {
                if self.options.build.skip {
                    tracing::info!("Skipping build");
                    observer.stage_skipped(stage);
                } else {
                    let command = self.options.build.command(&layout.project_root);
                    run_checked(self.runner, &command)?;
                    self.report.built = true;
                }
                Ok(PipelineState::Built)
            }
            Stage::Workspace => {
                let root = &layout.workspace.root;
                fs::create_dir_all(root).map_err(|err| {
                    StageError::io(
                        format!("Failed to create run folder: {}", root.display()),
                        err,
                    )
                })?;
                Ok(PipelineState::WorkspaceReady)
            }
            Stage::Artifacts => {
                let [(server, server_dest), (assets, assets_dest)] = layout.staging_targets();
                self.report.server = Some(stage_if_absent(server, server_dest)?);
                self.report.assets = Some(stage_if_absent(assets, assets_dest)?);
                Ok(PipelineState::ArtifactsStaged)
            }
            Stage::Plugins => {
                self.report.plugins = stage_plugins(
                    &layout.build_output_dir,
                    &layout.workspace.mods_dir,
                    &self.options.filter,
                )?;
                Ok(PipelineState::PluginsStaged)
            }
            Stage::Launch => {
                let command = self.options.launch.command(&layout.workspace);
                observer.launching(&command);
                self.transition(PipelineState::Running, observer);
                run_checked(self.runner, &command)?;
                self.report.server_exit = Some(0);
                Ok(PipelineState::Exited { code: 0 })
            }
        }
    }
}
