#![allow(dead_code)]

use std::collections::VecDeque;
use std::fs;
use std::path::{Path, PathBuf};

use modstage_core::error::StageError;
use modstage_core::layout::ProjectLayout;
use modstage_core::pipeline::{PipelineObserver, PipelineState, Stage};
use modstage_core::process::{CommandResult, CommandRunner, CommandSpec};
use tempfile::TempDir;

pub fn write_file(path: &Path, content: &str) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("create_dir_all should succeed in test temp dirs");
    }
    fs::write(path, content).expect("write should succeed in test temp dirs");
}

pub fn dir_names(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(dir)
        .expect("read_dir should succeed")
        .map(|entry| {
            entry
                .expect("dir entry should be readable")
                .file_name()
                .to_string_lossy()
                .into_owned()
        })
        .collect();
    names.sort();
    names
}

/// A temporary project with the standard layout.
pub struct Project {
    pub temp: TempDir,
    pub layout: ProjectLayout,
}

impl Project {
    pub fn empty() -> Self {
        let temp = TempDir::new().expect("tempdir should succeed");
        let layout = ProjectLayout::default_for(temp.path());
        Self { temp, layout }
    }

    /// Both inputs present, no build output yet.
    pub fn with_inputs() -> Self {
        let project = Self::empty();
        project.write_server("server-v1");
        project.write_assets("assets-v1");
        project
    }

    pub fn write_server(&self, content: &str) {
        write_file(&self.layout.server.path, content);
    }

    pub fn write_assets(&self, content: &str) {
        write_file(&self.layout.assets.path, content);
    }

    pub fn write_build_output(&self, name: &str, content: &str) -> PathBuf {
        let path = self.layout.build_output_dir.join(name);
        write_file(&path, content);
        path
    }

    pub fn clear_build_output(&self) {
        if self.layout.build_output_dir.exists() {
            fs::remove_dir_all(&self.layout.build_output_dir)
                .expect("remove_dir_all should succeed");
        }
        fs::create_dir_all(&self.layout.build_output_dir).expect("create_dir_all should succeed");
    }

    pub fn mods(&self) -> Vec<String> {
        dir_names(&self.layout.workspace.mods_dir)
    }
}

/// Records every command and answers with queued results (success once the
/// queue is empty).
#[derive(Default)]
pub struct ScriptedRunner {
    pub calls: Vec<CommandSpec>,
    pub results: VecDeque<CommandResult>,
}

impl ScriptedRunner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn then(mut self, result: CommandResult) -> Self {
        self.results.push_back(result);
        self
    }

    pub fn programs(&self) -> Vec<&str> {
        self.calls.iter().map(|call| call.program.as_str()).collect()
    }
}

impl CommandRunner for ScriptedRunner {
    fn run(&mut self, spec: &CommandSpec) -> Result<CommandResult, StageError> {
        self.calls.push(spec.clone());
        Ok(self.results.pop_front().unwrap_or(CommandResult::Success))
    }
}

/// Observer that keeps every event it sees.
#[derive(Default)]
pub struct EventLog {
    pub started: Vec<Stage>,
    pub skipped: Vec<Stage>,
    pub states: Vec<PipelineState>,
    pub launched: Vec<CommandSpec>,
}

impl PipelineObserver for EventLog {
    fn stage_started(&mut self, stage: Stage) {
        self.started.push(stage);
    }

    fn stage_skipped(&mut self, stage: Stage) {
        self.skipped.push(stage);
    }

    fn state_changed(&mut self, state: &PipelineState) {
        self.states.push(state.clone());
    }

    fn launching(&mut self, command: &CommandSpec) {
        self.launched.push(command.clone());
    }
}
