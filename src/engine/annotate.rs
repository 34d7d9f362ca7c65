//! Combined analysis and informational flags
//!
//! Runs the critical path and conflict passes over one graph and derives
//! the `critical_path_flag` and `delay_risk_flag` annotations from them.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use super::conflicts::{detect_conflicts_in, ConflictIssue, Severity};
use super::critical_path::{critical_path_in, CriticalPathResult};
use crate::domain::{Milestone, MilestoneGraph, MilestoneId, MilestoneStatus};

/// Critical path and conflicts of one snapshot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleAnalysis {
    pub critical_path: CriticalPathResult,
    pub conflicts: Vec<ConflictIssue>,
}

impl ScheduleAnalysis {
    /// Returns true if any conflict is high or critical
    pub fn has_blocking_conflicts(&self) -> bool {
        self.conflicts.iter().any(|c| c.severity >= Severity::High)
    }
}

/// Computes the critical path and conflicts with a single graph build
pub fn analyze(milestones: &[Milestone]) -> ScheduleAnalysis {
    let graph = MilestoneGraph::build(milestones);
    ScheduleAnalysis {
        critical_path: critical_path_in(&graph),
        conflicts: detect_conflicts_in(&graph),
    }
}

/// Returns a copy of the snapshot with both informational flags recomputed
///
/// `critical_path_flag` is set exactly on critical path members.
/// `delay_risk_flag` stays set where the caller set it, and is added to
/// delayed milestones and to milestones named in a high or critical
/// conflict.
pub fn annotate(milestones: &[Milestone]) -> Vec<Milestone> {
    let analysis = analyze(milestones);

    let on_path: HashSet<&MilestoneId> = analysis.critical_path.path.iter().collect();
    let blocking: Vec<&ConflictIssue> = analysis
        .conflicts
        .iter()
        .filter(|c| c.severity >= Severity::High)
        .collect();

    milestones
        .iter()
        .map(|m| {
            let mut annotated = m.clone();
            annotated.critical_path_flag = on_path.contains(&m.id);
            annotated.delay_risk_flag = m.delay_risk_flag
                || m.status == MilestoneStatus::Delayed
                || blocking.iter().any(|c| c.involves(&m.id));
            annotated
        })
        .collect()
}

/// Returns true if declaring `dependency` as a predecessor of `milestone`
/// would close a dependency loop
///
/// A self-dependency always would. IDs outside the snapshot never do.
pub fn would_create_cycle(
    milestones: &[Milestone],
    milestone: &MilestoneId,
    dependency: &MilestoneId,
) -> bool {
    if milestone == dependency {
        return true;
    }

    let graph = MilestoneGraph::build(milestones);
    match (graph.position(milestone), graph.position(dependency)) {
        // The new edge runs dependency -> milestone; a path back closes a loop
        (Some(m), Some(d)) => graph.reaches(m, d),
        _ => false,
    }
}
