//! Console rendering: stage banners, failure diagnostics and status output.

use std::path::Path;

use anyhow::Result;
use console::style;

use modstage_core::error::{StageError, StageFailure};
use modstage_core::fs::StageAction;
use modstage_core::pipeline::{PipelineObserver, RunReport, Stage};
use modstage_core::process::CommandSpec;
use modstage_core::status::{BuildOutputStatus, LayoutStatus, StagedIntegrity};

/// Prints a banner for each stage as the pipeline reaches it.
#[derive(Default)]
pub struct ConsoleObserver;

impl ConsoleObserver {
    pub fn new() -> Self {
        Self
    }
}

impl PipelineObserver for ConsoleObserver {
    fn stage_started(&mut self, stage: Stage) {
        println!(
            "\n{} {}",
            style(format!("Step {}:", stage.number())).bold().cyan(),
            stage.title()
        );
    }

    fn stage_skipped(&mut self, stage: Stage) {
        println!("  {} {}", style("skipped").yellow(), stage);
    }

    fn launching(&mut self, command: &CommandSpec) {
        println!("Command: {}", command.display());
        if let Some(cwd) = &command.cwd {
            println!("Working directory: {}\n", absolute(cwd));
        }
    }
}

pub fn print_failure(failure: &StageFailure) {
    eprintln!("\n{} {}", style("Error:").red().bold(), failure);

    match &failure.error {
        StageError::MissingInputs {
            names,
            instructions,
        } => {
            eprintln!("The following required files are missing:");
            for name in names {
                eprintln!("  - {name}");
            }
            eprintln!(
                "\nPlease read {} for instructions on how to obtain these files before running again.",
                instructions.display()
            );
        }
        StageError::MissingBuildOutputDirectory { .. }
        | StageError::NoMatchingBuildArtifact { .. } => {
            eprintln!("  Make sure the build completed successfully");
        }
        StageError::CommandFailed { .. } => {
            eprintln!("Exiting with code {}", failure.exit_code());
        }
        _ => {}
    }
}

pub fn print_run_summary(report: &RunReport) {
    if report.server_exit.is_some() {
        println!("\nServer exited cleanly");
        return;
    }

    println!("\n{}", style("Staged without launching").bold());
    println!("  Server:  {}", action_label(report.server));
    println!("  Assets:  {}", action_label(report.assets));
    println!("  Plugins: {}", report.plugins.staged.len());
}

pub fn print_status_table(status: &LayoutStatus) {
    println!("Project: {}", status.project_root.display());
    println!();

    println!("Inputs:");
    for input in &status.inputs {
        let state = if input.present {
            style("present").green()
        } else {
            style("missing").red()
        };
        println!("  {:<20} {:<10} {}", input.name, state, input.path.display());
    }
    println!();

    let workspace = if status.workspace_exists {
        "exists"
    } else {
        "not created"
    };
    println!("Run folder ({workspace}):");
    for staged in &status.staged {
        println!(
            "  {:<20} {}",
            staged.name,
            integrity_label(staged.integrity)
        );
    }
    match &status.mods {
        Some(mods) if mods.is_empty() => println!("  mods/                (empty)"),
        Some(mods) => {
            println!("  mods/");
            for name in mods {
                println!("    {name}");
            }
        }
        None => println!("  mods/                not created"),
    }
    println!();

    match &status.build_output {
        BuildOutputStatus::Missing => println!("Build output: not found (run a build first)"),
        BuildOutputStatus::Present {
            qualifying,
            rejected,
        } => {
            println!("Build output ({} plugin(s)):", qualifying.len());
            for name in qualifying {
                println!("  {} {name}", style("+").green());
            }
            for name in rejected {
                println!("  {} {name}", style("-").dim());
            }
        }
    }

    let issues = status.issues();
    if issues > 0 {
        println!();
        println!("{}", style(format!("{issues} issue(s) found")).yellow());
    }
}

pub fn print_status_json(status: &LayoutStatus) -> Result<()> {
    // Wrap in versioned output
    let output = serde_json::json!({
        "schema_version": 1,
        "project_root": status.project_root,
        "inputs": status.inputs,
        "workspace_exists": status.workspace_exists,
        "staged": status.staged,
        "mods": status.mods,
        "build_output": status.build_output,
        "issues": status.issues(),
    });

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

pub fn print_status_quiet(status: &LayoutStatus) -> i32 {
    let issues = status.issues();
    if issues > 0 {
        println!("{issues} issues found");
        1
    } else {
        0
    }
}

fn action_label(action: Option<StageAction>) -> &'static str {
    match action {
        Some(StageAction::Copied) => "copied",
        Some(StageAction::Skipped) => "already staged",
        None => "-",
    }
}

fn integrity_label(integrity: StagedIntegrity) -> &'static str {
    match integrity {
        StagedIntegrity::NotStaged => "not staged",
        StagedIntegrity::Unverified => "staged",
        StagedIntegrity::Matches => "staged, matches source",
        StagedIntegrity::Customized => "staged, customized (kept as is)",
        StagedIntegrity::SourceMissing => "staged, source missing",
    }
}

fn absolute(path: &Path) -> String {
    std::path::absolute(path)
        .unwrap_or_else(|_| path.to_path_buf())
        .display()
        .to_string()
}
