//! modstage - build, stage and launch a plugin development server
//!
//! Usage:
//!   modstage                          # Same as `modstage run`
//!   modstage run -- --auth-mode offline
//!   modstage run --skip-build         # Re-stage and relaunch without building
//!   modstage status --verify          # Inspect inputs and the run folder
//!   modstage clean                    # Delete the run folder

mod render;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use modstage_core::clean::clean_workspace;
use modstage_core::fs::{ArtifactFilter, SuffixRule};
use modstage_core::layout::ProjectLayout;
use modstage_core::pipeline::{BuildSettings, LaunchSettings, Pipeline, PipelineOptions};
use modstage_core::process::ProcessRunner;
use modstage_core::status::collect_status;

use crate::render::ConsoleObserver;

#[derive(Parser)]
#[command(name = "modstage")]
#[command(about = "Build a plugin, stage a server run folder and launch it", long_about = None)]
struct Cli {
    /// Project root (defaults to the current directory)
    #[arg(long, global = true, value_name = "DIR")]
    root: Option<PathBuf>,

    /// Show debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the plugin, stage the run folder and launch the server (default)
    Run(RunArgs),

    /// Show which inputs are present and what is staged
    Status {
        /// Compare staged archives with their sources (slower, hashes files)
        #[arg(long)]
        verify: bool,

        /// Output format
        #[arg(short, long, default_value = "table")]
        format: OutputFormat,

        /// Additional build output suffix to exclude, as passed to `run` (repeatable)
        #[arg(long = "exclude-suffix", value_name = "SUFFIX")]
        exclude_suffixes: Vec<String>,
    },

    /// Delete the run folder
    Clean,
}

#[derive(Args, Default)]
struct RunArgs {
    /// Build program, run from the project root (default: ./gradlew)
    #[arg(long, value_name = "PROGRAM")]
    build_program: Option<String>,

    /// Build arguments, replacing the default `build` (repeatable)
    #[arg(long = "build-arg", value_name = "ARG", allow_hyphen_values = true)]
    build_args: Vec<String>,

    /// Stage and launch without building first
    #[arg(long)]
    skip_build: bool,

    /// Java executable used to launch the server
    #[arg(long, value_name = "PROGRAM")]
    java: Option<String>,

    /// Stop after staging plugins instead of launching the server
    #[arg(long)]
    no_launch: bool,

    /// Additional build output suffix to exclude from mods (repeatable)
    #[arg(long = "exclude-suffix", value_name = "SUFFIX")]
    exclude_suffixes: Vec<String>,

    /// Extra server arguments (after --)
    #[arg(last = true)]
    server_args: Vec<String>,
}

impl RunArgs {
    fn into_options(self) -> PipelineOptions {
        let mut build = BuildSettings {
            skip: self.skip_build,
            ..BuildSettings::default()
        };
        if let Some(program) = self.build_program {
            build.program = program;
        }
        if !self.build_args.is_empty() {
            build.args = self.build_args;
        }

        let mut launch = LaunchSettings {
            extra_args: self.server_args,
            enabled: !self.no_launch,
            ..LaunchSettings::default()
        };
        if let Some(java) = self.java {
            launch.java = java;
        }

        PipelineOptions {
            build,
            launch,
            filter: plugin_filter(self.exclude_suffixes),
        }
    }
}

/// Default plugin rules plus one deny rule per extra suffix.
fn plugin_filter(exclude_suffixes: Vec<String>) -> ArtifactFilter {
    exclude_suffixes
        .into_iter()
        .fold(ArtifactFilter::plugin_jars(), |filter, suffix| {
            filter.with_rule(SuffixRule::deny(suffix))
        })
}

#[derive(Clone, Copy, ValueEnum, Default)]
enum OutputFormat {
    /// Human-readable table
    #[default]
    Table,
    /// Machine-readable JSON
    Json,
    /// Only show issues (non-zero exit if problems)
    Quiet,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    init_tracing(cli.verbose);

    let root = match cli.root {
        Some(root) => std::path::absolute(&root)
            .with_context(|| format!("Could not resolve project root {}", root.display()))?,
        None => std::env::current_dir().context("Could not determine current directory")?,
    };
    let layout = ProjectLayout::default_for(root);
    tracing::debug!(root = %layout.project_root.display(), "Resolved project layout");

    let command = cli
        .command
        .unwrap_or_else(|| Commands::Run(RunArgs::default()));
    let exit_code = match command {
        Commands::Run(args) => run_pipeline(&layout, args),
        Commands::Status {
            verify,
            format,
            exclude_suffixes,
        } => run_status(&layout, &plugin_filter(exclude_suffixes), verify, format)?,
        Commands::Clean => run_clean(&layout)?,
    };

    if exit_code != 0 {
        std::process::exit(exit_code);
    }
    Ok(())
}

fn init_tracing(verbose: bool) {
    let default_filter = if verbose {
        "modstage=debug,modstage_core=debug,info"
    } else {
        "modstage=info,modstage_core=info,warn"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .without_time(),
        )
        .init();
}

fn run_pipeline(layout: &ProjectLayout, args: RunArgs) -> i32 {
    let options = args.into_options();
    let mut runner = ProcessRunner::new();
    let mut observer = ConsoleObserver::new();

    match Pipeline::new(layout, &options, &mut runner).run(&mut observer) {
        Ok(report) => {
            render::print_run_summary(&report);
            0
        }
        Err(failure) => {
            render::print_failure(&failure);
            failure.exit_code()
        }
    }
}

fn run_status(
    layout: &ProjectLayout,
    filter: &ArtifactFilter,
    verify: bool,
    format: OutputFormat,
) -> Result<i32> {
    let status = collect_status(layout, filter, verify)?;

    let exit_code = match format {
        OutputFormat::Table => {
            render::print_status_table(&status);
            0
        }
        OutputFormat::Json => {
            render::print_status_json(&status)?;
            0
        }
        OutputFormat::Quiet => render::print_status_quiet(&status),
    };
    Ok(exit_code)
}

fn run_clean(layout: &ProjectLayout) -> Result<i32> {
    if clean_workspace(&layout.workspace)? {
        println!("Deleted {}", layout.workspace.root.display());
    } else {
        println!("Nothing to clean");
    }
    Ok(0)
}
