//! Template library commands (templates list/check, generate)

use std::path::{Path, PathBuf};

use anyhow::Result;
use chrono::NaiveDate;
use clap::Subcommand;

use super::output::Output;
use crate::domain::{ProjectType, TemplateLibrary};
use crate::engine::generate_schedule;
use crate::storage::load_library;

#[derive(Subcommand)]
pub enum TemplatesCommands {
    /// List templates in the active library
    List {
        /// Only templates used for this project type
        #[arg(long = "type")]
        project_type: Option<ProjectType>,
    },

    /// Validate a template library file
    Check {
        /// Library file (YAML or JSON)
        path: PathBuf,
    },
}

/// Validate a library file on its own, independent of the active library
pub fn check(output: &Output, path: &Path) -> Result<()> {
    let checked = load_library(path)?;
    output.success(&format!(
        "Template library is valid: {} ({} templates)",
        path.display(),
        checked.len()
    ));
    Ok(())
}

/// List templates in the active library
pub fn list(
    output: &Output,
    library: &TemplateLibrary,
    project_type: Option<ProjectType>,
) -> Result<()> {
    let templates: Vec<_> = library
        .templates()
        .iter()
        .filter(|t| project_type.map_or(true, |pt| t.applies_to(pt)))
        .collect();

    if output.is_json() {
        output.data(&templates);
        return Ok(());
    }

    println!("Templates ({}):", templates.len());
    println!("{:<22} {:>5}  {:<16} {:<4} NAME", "ID", "DAYS", "TRADE", "CP");
    println!("{}", "-".repeat(80));
    for t in templates {
        println!(
            "{:<22} {:>5}  {:<16} {:<4} {}",
            t.id,
            t.estimated_duration_days,
            t.trade.as_ref().map(|tr| tr.as_str()).unwrap_or("-"),
            if t.is_critical_path { "yes" } else { "" },
            t.name
        );
    }
    Ok(())
}

/// Generate a draft programme
pub fn generate(
    output: &Output,
    start: NaiveDate,
    project_type: ProjectType,
    library: &TemplateLibrary,
) -> Result<()> {
    output.verbose_ctx(
        "generate",
        &format!("Generating {} programme from {}", project_type, start),
    );
    let drafts = generate_schedule(start, project_type, library);

    if output.is_json() {
        output.data(&drafts);
        return Ok(());
    }

    if drafts.is_empty() {
        println!("No templates apply to a {} project.", project_type);
        return Ok(());
    }

    println!("Draft {} programme ({} milestones):", project_type, drafts.len());
    println!("{:<10} {:<11} {:<11} {:<3} NAME", "ID", "START", "END", "CP");
    println!("{}", "-".repeat(70));
    for draft in &drafts {
        println!(
            "{:<10} {:<11} {:<11} {:<3} {}",
            draft.id.to_string(),
            draft.planned_start.to_string(),
            draft.planned_end.to_string(),
            if draft.critical_path_flag { "*" } else { "" },
            draft.name
        );
    }
    if let Some(end) = drafts.iter().map(|d| d.planned_end).max() {
        println!();
        println!("Programme completes {}", end);
    }
    Ok(())
}
