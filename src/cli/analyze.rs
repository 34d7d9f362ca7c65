//! Snapshot analysis commands (critical-path, conflicts, analyze, annotate, suggest)

use std::path::Path;

use anyhow::{Context, Result};

use super::output::Output;
use crate::domain::{Milestone, MilestoneId, TemplateLibrary};
use crate::engine::{self, ConflictIssue, CriticalPathResult, Severity};
use crate::storage::read_snapshot;

fn load(output: &Output, context: &str, snapshot: &Path) -> Result<Vec<Milestone>> {
    let milestones = read_snapshot(snapshot)?;
    output.verbose_ctx(
        context,
        &format!("Loaded {} milestones from {}", milestones.len(), snapshot.display()),
    );
    Ok(milestones)
}

fn print_critical_path(result: &CriticalPathResult, milestones: &[Milestone]) {
    if result.path.is_empty() {
        println!("No critical path found.");
    } else {
        println!(
            "Critical path ({} milestones, {} days):",
            result.path.len(),
            result.duration
        );
        println!("{:<20} {:>6}  NAME", "ID", "DAYS");
        println!("{}", "-".repeat(60));
        for id in &result.path {
            if let Some(m) = milestones.iter().find(|m| &m.id == id) {
                println!("{:<20} {:>6}  {}", id, m.duration_days(), m.name);
            }
        }
    }

    if !result.risk_factors.is_empty() {
        println!();
        println!("Risks:");
        for (risk, suggestion) in result.risk_factors.iter().zip(&result.suggestions) {
            println!("  - {}", risk);
            println!("    {}", suggestion);
        }
    }
}

fn print_conflicts(conflicts: &[ConflictIssue]) {
    if conflicts.is_empty() {
        println!("No conflicts found.");
        return;
    }

    println!("Conflicts ({}):", conflicts.len());
    println!("{:<10} {:<20} {:<24} DESCRIPTION", "SEVERITY", "TYPE", "MILESTONES");
    println!("{}", "-".repeat(90));
    for issue in conflicts {
        let ids: Vec<&str> = issue.milestone_ids.iter().map(|id| id.as_str()).collect();
        println!(
            "{:<10} {:<20} {:<24} {}",
            issue.severity.as_str(),
            issue.kind.as_str(),
            ids.join(", "),
            issue.description
        );
        if let Some(suggestion) = &issue.suggestion {
            println!("{:<56} -> {}", "", suggestion);
        }
    }
}

/// Show the critical path
pub fn critical_path(output: &Output, snapshot: &Path) -> Result<()> {
    let milestones = load(output, "critical-path", snapshot)?;
    let result = engine::critical_path(&milestones);

    if output.is_json() {
        output.data(&result);
    } else {
        print_critical_path(&result, &milestones);
    }
    Ok(())
}

/// Show scheduling conflicts
pub fn conflicts(output: &Output, snapshot: &Path, strict: bool) -> Result<()> {
    let milestones = load(output, "conflicts", snapshot)?;
    let conflicts = engine::detect_conflicts(&milestones);

    if output.is_json() {
        output.data(&conflicts);
    } else {
        print_conflicts(&conflicts);
    }

    if strict && conflicts.iter().any(|c| c.severity >= Severity::High) {
        anyhow::bail!("High or critical conflicts found");
    }
    Ok(())
}

/// Show critical path and conflicts together
pub fn analyze(output: &Output, snapshot: &Path) -> Result<()> {
    let milestones = load(output, "analyze", snapshot)?;
    let analysis = engine::analyze(&milestones);

    if output.is_json() {
        output.data(&analysis);
    } else {
        print_critical_path(&analysis.critical_path, &milestones);
        println!();
        print_conflicts(&analysis.conflicts);
    }
    Ok(())
}

/// Print the annotated snapshot as JSON
pub fn annotate(output: &Output, snapshot: &Path) -> Result<()> {
    let milestones = load(output, "annotate", snapshot)?;
    let annotated = engine::annotate(&milestones);

    let flagged = annotated.iter().filter(|m| m.critical_path_flag).count();
    output.verbose_ctx("annotate", &format!("{} milestones on the critical path", flagged));

    // Always JSON so the result can be piped back into storage
    let json = serde_json::to_string_pretty(&annotated).context("Failed to serialize snapshot")?;
    println!("{}", json);
    Ok(())
}

/// Milestone to suggest dependencies for
pub enum Candidate {
    /// A milestone already in the snapshot
    Existing(String),
    /// A milestone being authored
    New { name: String, trade: Option<String> },
}

/// Show dependency and successor suggestions
pub fn suggest(
    output: &Output,
    snapshot: &Path,
    candidate: Candidate,
    library: &TemplateLibrary,
) -> Result<()> {
    let milestones = load(output, "suggest", snapshot)?;

    let candidate = match candidate {
        Candidate::Existing(id) => {
            let id = MilestoneId::new(id)?;
            milestones
                .iter()
                .find(|m| m.id == id)
                .cloned()
                .with_context(|| format!("Milestone not found in snapshot: {}", id))?
        }
        Candidate::New { name, trade } => {
            let mut milestone = Milestone::new(MilestoneId::new("(new)")?, name);
            milestone.trade = trade.map(Into::into);
            milestone
        }
    };

    let dependencies = engine::suggest_dependencies(&candidate, &milestones, library);
    let successors = engine::suggest_successors(&candidate, &milestones, library);
    output.verbose_ctx(
        "suggest",
        &format!(
            "{} dependency and {} successor suggestions",
            dependencies.len(),
            successors.len()
        ),
    );

    if output.is_json() {
        output.data(&serde_json::json!({
            "milestone": candidate.id,
            "dependencies": dependencies,
            "successors": successors,
        }));
        return Ok(());
    }

    let describe = |id: &MilestoneId| {
        milestones
            .iter()
            .find(|m| &m.id == id)
            .map(|m| m.name.as_str())
            .unwrap_or("")
    };

    if dependencies.is_empty() {
        println!("No dependency suggestions for '{}'.", candidate.name);
    } else {
        println!("Suggested dependencies for '{}':", candidate.name);
        for id in &dependencies {
            println!("  {:<20} {}", id, describe(id));
        }
    }

    if !successors.is_empty() {
        println!();
        println!("Likely successors:");
        for id in &successors {
            println!("  {:<20} {}", id, describe(id));
        }
    }
    Ok(())
}
