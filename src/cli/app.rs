//! Main CLI application structure

use std::borrow::Cow;
use std::path::PathBuf;

use anyhow::Result;
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use log::LevelFilter;

use super::output::{Output, OutputFormat};
use super::templates::{self, TemplatesCommands};
use super::analyze;
use crate::domain::{ProjectType, TemplateLibrary};
use crate::storage::{load_library, Config};

#[derive(Parser)]
#[command(name = "programme")]
#[command(author, version, about = "Programme scheduling analysis for construction projects")]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output format (defaults to the global config, then text)
    #[arg(long, short = 'f', global = true)]
    pub format: Option<OutputFormat>,

    /// Enable verbose output for debugging
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    /// Template library file (YAML or JSON) replacing the built-in library
    #[arg(long, global = true, env = "PROGRAMME_LIBRARY")]
    pub library: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show the critical path of a milestone snapshot
    CriticalPath {
        /// Snapshot file (.json, .jsonl, .yaml) or - for JSON on stdin
        snapshot: PathBuf,
    },

    /// Detect overlaps, dependency loops and impossible timelines
    Conflicts {
        /// Snapshot file (.json, .jsonl, .yaml) or - for JSON on stdin
        snapshot: PathBuf,

        /// Exit with an error when a high or critical conflict is found
        #[arg(long)]
        strict: bool,
    },

    /// Critical path and conflicts together
    Analyze {
        /// Snapshot file (.json, .jsonl, .yaml) or - for JSON on stdin
        snapshot: PathBuf,
    },

    /// Print the snapshot with critical path and delay risk flags recomputed
    Annotate {
        /// Snapshot file (.json, .jsonl, .yaml) or - for JSON on stdin
        snapshot: PathBuf,
    },

    /// Suggest dependencies for a new or existing milestone
    ///
    /// Examples:
    ///   programme suggest site.json --milestone m-12
    ///   programme suggest site.json --name "Wall tiling" --trade tiling
    Suggest {
        /// Snapshot file (.json, .jsonl, .yaml) or - for JSON on stdin
        snapshot: PathBuf,

        /// Existing milestone to suggest for
        #[arg(long, conflicts_with_all = ["name", "trade"])]
        milestone: Option<String>,

        /// Name of a milestone being authored
        #[arg(long, required_unless_present = "milestone")]
        name: Option<String>,

        /// Trade of a milestone being authored
        #[arg(long)]
        trade: Option<String>,
    },

    /// Generate a draft programme from the template library
    Generate {
        /// Project start date (YYYY-MM-DD)
        #[arg(long)]
        start: NaiveDate,

        /// Project type (residential, commercial, industrial); defaults to the project config
        #[arg(long = "type")]
        project_type: Option<ProjectType>,
    },

    /// Inspect template libraries
    #[command(subcommand)]
    Templates(TemplatesCommands),
}

/// Main entry point for the CLI
pub fn run() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = Config::load()?;
    let format = cli
        .format
        .unwrap_or_else(|| config.global.default_format.into());
    let output = Output::new(format, cli.verbose);

    if let Some(root) = &config.project_root {
        output.verbose_ctx("config", &format!("Project root: {}", root.display()));
    }

    match cli.command {
        Commands::CriticalPath { snapshot } => analyze::critical_path(&output, &snapshot)?,

        Commands::Conflicts { snapshot, strict } => {
            analyze::conflicts(&output, &snapshot, strict)?
        }

        Commands::Analyze { snapshot } => analyze::analyze(&output, &snapshot)?,

        Commands::Annotate { snapshot } => analyze::annotate(&output, &snapshot)?,

        Commands::Suggest {
            snapshot,
            milestone,
            name,
            trade,
        } => {
            let library = resolve_library(&output, cli.library.as_ref(), &config)?;
            let candidate = match milestone {
                Some(id) => analyze::Candidate::Existing(id),
                None => analyze::Candidate::New {
                    name: name.unwrap_or_default(),
                    trade,
                },
            };
            analyze::suggest(&output, &snapshot, candidate, &library)?
        }

        Commands::Generate {
            start,
            project_type,
        } => {
            let library = resolve_library(&output, cli.library.as_ref(), &config)?;
            let project_type = project_type.unwrap_or(config.project.project_type);
            templates::generate(&output, start, project_type, &library)?
        }

        Commands::Templates(TemplatesCommands::Check { path }) => {
            templates::check(&output, &path)?
        }

        Commands::Templates(TemplatesCommands::List { project_type }) => {
            let library = resolve_library(&output, cli.library.as_ref(), &config)?;
            templates::list(&output, &library, project_type)?
        }
    }

    output.verbose_ctx("programme", "Command completed successfully");
    Ok(())
}

/// Routes library diagnostics through env_logger; `RUST_LOG` overrides the default level
fn init_logging(verbose: bool) {
    let default_level = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Warn
    };

    let _ = env_logger::Builder::new()
        .filter_level(default_level)
        .parse_default_env()
        .format_timestamp(None)
        .try_init();
}

/// Picks the `--library` file, then the configured library, then the built-in one
fn resolve_library(
    output: &Output,
    flag: Option<&PathBuf>,
    config: &Config,
) -> Result<Cow<'static, TemplateLibrary>> {
    let path = flag.cloned().or_else(|| config.template_library_path());

    match path {
        Some(path) => {
            output.verbose_ctx("library", &format!("Loading templates from {}", path.display()));
            Ok(Cow::Owned(load_library(&path)?))
        }
        None => {
            output.verbose_ctx("library", "Using built-in templates");
            Ok(Cow::Borrowed(TemplateLibrary::builtin()))
        }
    }
}
