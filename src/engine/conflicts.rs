//! Scheduling conflict detection
//!
//! Three independent passes over one snapshot, concatenated in order:
//!
//! | Pass | Issue | Severity |
//! |------|-------|----------|
//! | Same-trade date overlap | `overlap` | medium |
//! | Dependency loops | `dependency_loop` | critical |
//! | Dependency ends after dependent starts | `impossible_timeline` | high |
//!
//! Dangling dependency IDs are skipped by every pass.

use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::domain::{Milestone, MilestoneGraph, MilestoneId, Trade};

/// Kind of scheduling conflict
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConflictType {
    Overlap,
    ImpossibleTimeline,
    /// Reserved for resource checks; no pass emits it yet
    ResourceConflict,
    DependencyLoop,
}

impl ConflictType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConflictType::Overlap => "overlap",
            ConflictType::ImpossibleTimeline => "impossible_timeline",
            ConflictType::ResourceConflict => "resource_conflict",
            ConflictType::DependencyLoop => "dependency_loop",
        }
    }
}

/// How serious a conflict is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Low => "low",
            Severity::Medium => "medium",
            Severity::High => "high",
            Severity::Critical => "critical",
        }
    }
}

/// A structurally detectable scheduling problem
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ConflictIssue {
    #[serde(rename = "type")]
    pub kind: ConflictType,

    pub severity: Severity,

    /// Implicated milestones
    pub milestone_ids: Vec<MilestoneId>,

    pub description: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
}

impl ConflictIssue {
    /// Returns true if the issue names this milestone
    pub fn involves(&self, id: &MilestoneId) -> bool {
        self.milestone_ids.contains(id)
    }
}

/// Runs all conflict passes over a snapshot
pub fn detect_conflicts(milestones: &[Milestone]) -> Vec<ConflictIssue> {
    let graph = MilestoneGraph::build(milestones);
    detect_conflicts_in(&graph)
}

/// Runs all conflict passes over an already built graph
pub fn detect_conflicts_in(graph: &MilestoneGraph<'_>) -> Vec<ConflictIssue> {
    let mut issues = detect_overlaps(graph);
    let overlaps = issues.len();

    issues.extend(detect_dependency_loops(graph));
    let loops = issues.len() - overlaps;

    issues.extend(detect_impossible_timelines(graph));
    let timelines = issues.len() - overlaps - loops;

    debug!(
        "conflicts: {} overlaps, {} loop members, {} impossible timelines",
        overlaps, loops, timelines
    );
    issues
}

/// Finds milestones of the same trade whose date ranges intersect
///
/// Milestones without a trade or without both dates are ignored. Trade
/// groups are visited in order of first appearance and pairs in input
/// order.
pub fn detect_overlaps(graph: &MilestoneGraph<'_>) -> Vec<ConflictIssue> {
    let mut groups: Vec<(&Trade, Vec<usize>)> = Vec::new();
    let mut group_of: HashMap<&Trade, usize> = HashMap::new();

    for (pos, milestone) in graph.milestones().iter().enumerate() {
        let Some(trade) = milestone.trade.as_ref() else {
            continue;
        };
        let group = *group_of.entry(trade).or_insert_with(|| {
            groups.push((trade, Vec::new()));
            groups.len() - 1
        });
        groups[group].1.push(pos);
    }

    let mut issues = Vec::new();
    for (trade, members) in &groups {
        for (i, &a) in members.iter().enumerate() {
            let first = graph.milestone(a);
            let Some((start_a, end_a)) = first.date_range() else {
                continue;
            };

            for &b in &members[i + 1..] {
                let second = graph.milestone(b);
                let Some((start_b, end_b)) = second.date_range() else {
                    continue;
                };

                if start_a <= end_b && end_a >= start_b {
                    issues.push(ConflictIssue {
                        kind: ConflictType::Overlap,
                        severity: Severity::Medium,
                        milestone_ids: vec![first.id.clone(), second.id.clone()],
                        description: format!(
                            "'{}' ({} to {}) overlaps '{}' ({} to {}) in {}",
                            first.name, start_a, end_a, second.name, start_b, end_b, trade
                        ),
                        suggestion: Some(format!(
                            "Resequence one of the {} milestones or confirm the crew can cover both",
                            trade
                        )),
                    });
                }
            }
        }
    }
    issues
}

/// Reports every milestone that can reach itself through its dependencies
///
/// One issue per milestone, not per loop: a three-milestone loop yields
/// three issues, in input order.
pub fn detect_dependency_loops(graph: &MilestoneGraph<'_>) -> Vec<ConflictIssue> {
    let mut loop_of: Vec<Option<usize>> = vec![None; graph.len()];
    let cycles = graph.cycles();
    for (n, members) in cycles.iter().enumerate() {
        for &pos in members {
            loop_of[pos] = Some(n);
        }
    }

    loop_of
        .iter()
        .enumerate()
        .filter_map(|(pos, cycle)| cycle.map(|n| (pos, &cycles[n])))
        .map(|(pos, members)| {
            let milestone = graph.milestone(pos);
            let description = if members.len() == 1 {
                format!("Milestone '{}' depends on itself", milestone.name)
            } else {
                let names: Vec<&str> = members
                    .iter()
                    .map(|&m| graph.milestone(m).name.as_str())
                    .collect();
                format!(
                    "Milestone '{}' is part of a dependency loop: {}",
                    milestone.name,
                    names.join(", ")
                )
            };

            ConflictIssue {
                kind: ConflictType::DependencyLoop,
                severity: Severity::Critical,
                milestone_ids: vec![milestone.id.clone()],
                description,
                suggestion: Some(
                    "Remove one of the dependencies in the loop so the work has a clear order"
                        .to_string(),
                ),
            }
        })
        .collect()
}

/// Finds dependencies that finish after their dependent milestone starts
pub fn detect_impossible_timelines(graph: &MilestoneGraph<'_>) -> Vec<ConflictIssue> {
    let mut issues = Vec::new();

    for (pos, milestone) in graph.milestones().iter().enumerate() {
        let Some(start) = milestone.planned_start else {
            continue;
        };

        for &dep in graph.dependencies(pos) {
            let dependency = graph.milestone(dep);
            let Some(dep_end) = dependency.planned_end else {
                continue;
            };

            if dep_end > start {
                issues.push(ConflictIssue {
                    kind: ConflictType::ImpossibleTimeline,
                    severity: Severity::High,
                    milestone_ids: vec![milestone.id.clone(), dependency.id.clone()],
                    description: format!(
                        "'{}' starts on {} but depends on '{}', which ends on {}",
                        milestone.name, start, dependency.name, dep_end
                    ),
                    suggestion: Some(format!(
                        "Move '{}' to start after {} or remove the dependency on '{}'",
                        milestone.name, dep_end, dependency.name
                    )),
                });
            }
        }
    }
    issues
}
