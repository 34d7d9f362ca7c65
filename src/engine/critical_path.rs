//! Critical path calculation
//!
//! The critical path is the longest chain of dependent milestones, measured
//! by summed duration. Walks start at every milestone without dependencies
//! and follow successor edges depth-first.
//!
//! The input may contain cycles. A milestone already on the active path is
//! never entered again, so a loop contributes nothing instead of recursing
//! forever. Each milestone's best suffix is computed once and memoised, so a
//! walk is linear in milestones plus dependency edges. On cyclic input the
//! chain found through a loop depends on which entry point is reached first.
//!
//! When several paths share the maximum duration, the first one found wins:
//! start points are tried in input order and successors in input order.
//! This order is an implementation detail, not a contract.

use log::{debug, trace};
use serde::{Deserialize, Serialize};

use crate::domain::{Milestone, MilestoneGraph, MilestoneId, MilestoneStatus};

/// Result of a critical path calculation
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CriticalPathResult {
    /// Milestone IDs from the first milestone to the last
    pub path: Vec<MilestoneId>,

    /// Summed duration of the path in days
    pub duration: u32,

    /// Advisory descriptions of risks found on the path
    pub risk_factors: Vec<String>,

    /// Advisory actions, one per risk factor
    pub suggestions: Vec<String>,
}

impl CriticalPathResult {
    /// Returns true if `id` is on the critical path
    pub fn contains(&self, id: &MilestoneId) -> bool {
        self.path.contains(id)
    }
}

#[derive(Debug, Clone)]
struct Suffix {
    duration: u32,
    path: Vec<usize>,
}

struct LongestPathWalk<'g, 'a> {
    graph: &'g MilestoneGraph<'a>,
    on_path: Vec<bool>,
    resolved: Vec<Option<Suffix>>,
}

impl<'g, 'a> LongestPathWalk<'g, 'a> {
    fn new(graph: &'g MilestoneGraph<'a>) -> Self {
        Self {
            graph,
            on_path: vec![false; graph.len()],
            resolved: vec![None; graph.len()],
        }
    }

    /// Longest suffix starting at `pos`
    ///
    /// Every node is resolved at most once. A suffix that was cut at a loop
    /// is memoised as it stands, so later walks reuse it rather than trying
    /// the loop from another entry point.
    fn longest_from(&mut self, pos: usize) -> Suffix {
        if let Some(suffix) = &self.resolved[pos] {
            return suffix.clone();
        }

        self.on_path[pos] = true;
        let mut best: Option<Suffix> = None;

        for &next in self.graph.successors(pos) {
            if self.on_path[next] {
                trace!(
                    "cutting loop {} -> {}",
                    self.graph.milestone(pos).id,
                    self.graph.milestone(next).id
                );
                continue;
            }

            let suffix = self.longest_from(next);
            if best.as_ref().map_or(true, |b| suffix.duration > b.duration) {
                best = Some(suffix);
            }
        }

        self.on_path[pos] = false;

        let mut suffix = Suffix {
            duration: self.graph.milestone(pos).duration_days(),
            path: vec![pos],
        };
        if let Some(best) = best {
            suffix.duration = suffix.duration.saturating_add(best.duration);
            suffix.path.extend(best.path);
        }

        self.resolved[pos] = Some(suffix.clone());
        suffix
    }
}

/// Computes the critical path of a milestone snapshot
pub fn critical_path(milestones: &[Milestone]) -> CriticalPathResult {
    let graph = MilestoneGraph::build(milestones);
    critical_path_in(&graph)
}

/// Computes the critical path over an already built graph
pub fn critical_path_in(graph: &MilestoneGraph<'_>) -> CriticalPathResult {
    if graph.is_empty() {
        return CriticalPathResult::default();
    }

    let starts: Vec<usize> = graph.start_points().collect();
    debug!(
        "critical path: {} milestones, {} start points",
        graph.len(),
        starts.len()
    );

    if starts.is_empty() {
        return CriticalPathResult {
            path: Vec::new(),
            duration: 0,
            risk_factors: vec![
                "No valid start point found: every milestone has at least one dependency"
                    .to_string(),
            ],
            suggestions: vec![
                "Check for circular dependencies; at least one milestone must have no dependencies"
                    .to_string(),
            ],
        };
    }

    let mut walk = LongestPathWalk::new(graph);
    let mut best: Option<Suffix> = None;
    for start in starts {
        let suffix = walk.longest_from(start);
        if best.as_ref().map_or(true, |b| suffix.duration > b.duration) {
            best = Some(suffix);
        }
    }

    let Some(best) = best else {
        return CriticalPathResult::default();
    };

    let mut result = CriticalPathResult {
        path: best
            .path
            .iter()
            .map(|&pos| graph.milestone(pos).id.clone())
            .collect(),
        duration: best.duration,
        risk_factors: Vec::new(),
        suggestions: Vec::new(),
    };
    annotate_risks(graph, &best.path, &mut result);

    debug!(
        "critical path: {} milestones, {} days, {} risk factors",
        result.path.len(),
        result.duration,
        result.risk_factors.len()
    );
    result
}

fn annotate_risks(graph: &MilestoneGraph<'_>, path: &[usize], result: &mut CriticalPathResult) {
    for &pos in path {
        let milestone = graph.milestone(pos);

        if milestone.status == MilestoneStatus::Delayed {
            result.risk_factors.push(format!(
                "Milestone '{}' on the critical path is delayed",
                milestone.name
            ));
            result.suggestions.push(format!(
                "Recover '{}' first: any slip on it moves the completion date",
                milestone.name
            ));
        }

        if milestone.delay_risk_flag {
            result.risk_factors.push(format!(
                "Milestone '{}' on the critical path is flagged at risk of delay",
                milestone.name
            ));
            result.suggestions.push(format!(
                "Review resourcing and lead times for '{}'",
                milestone.name
            ));
        }

        for missing in graph.dangling_of(pos) {
            result.risk_factors.push(format!(
                "Milestone '{}' depends on '{}', which is not in the programme",
                milestone.name, missing
            ));
            result.suggestions.push(format!(
                "Add '{}' to the programme or remove it from the dependencies of '{}'",
                missing, milestone.name
            ));
        }
    }
}
