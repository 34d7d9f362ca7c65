//! Dependency graph over a milestone snapshot
//!
//! Milestones live in a dense slice and are referenced by position. The
//! graph keeps an ID lookup, resolved predecessor lists, a successor index
//! and the list of dangling references. Uses petgraph for the strongly
//! connected component and reachability queries.
//!
//! Building never fails: cycles, self-dependencies and references to
//! milestones outside the snapshot are all legal here.

use petgraph::algo::{has_path_connecting, tarjan_scc};
use petgraph::graph::{DiGraph, NodeIndex};
use std::collections::HashMap;

use super::id::MilestoneId;
use super::milestone::Milestone;

/// A dependency on a milestone that is not part of the snapshot
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DanglingDependency {
    /// Position of the milestone declaring the dependency
    pub milestone: usize,
    /// The unresolved ID
    pub missing: MilestoneId,
}

/// Lookup structures for one analysis call
#[derive(Debug)]
pub struct MilestoneGraph<'a> {
    milestones: &'a [Milestone],

    /// ID to position (first occurrence wins)
    index: HashMap<&'a MilestoneId, usize>,

    /// Resolved predecessors per milestone, in declaration order
    dependencies: Vec<Vec<usize>>,

    /// Milestones declaring each milestone as a dependency, in input order
    successors: Vec<Vec<usize>>,

    dangling: Vec<DanglingDependency>,

    /// Edge direction is dependency -> dependent, node weight is the position
    graph: DiGraph<usize, ()>,
}

impl<'a> MilestoneGraph<'a> {
    /// Builds the graph in O(n + e)
    pub fn build(milestones: &'a [Milestone]) -> Self {
        let mut index = HashMap::with_capacity(milestones.len());
        let mut graph = DiGraph::with_capacity(milestones.len(), milestones.len());

        for (pos, milestone) in milestones.iter().enumerate() {
            index.entry(&milestone.id).or_insert(pos);
            graph.add_node(pos);
        }

        let mut dependencies = vec![Vec::new(); milestones.len()];
        let mut successors = vec![Vec::new(); milestones.len()];
        let mut dangling = Vec::new();

        for (pos, milestone) in milestones.iter().enumerate() {
            for dep_id in &milestone.dependencies {
                match index.get(dep_id) {
                    Some(&dep) => {
                        dependencies[pos].push(dep);
                        successors[dep].push(pos);
                        graph.add_edge(NodeIndex::new(dep), NodeIndex::new(pos), ());
                    }
                    None => dangling.push(DanglingDependency {
                        milestone: pos,
                        missing: dep_id.clone(),
                    }),
                }
            }
        }

        Self {
            milestones,
            index,
            dependencies,
            successors,
            dangling,
            graph,
        }
    }

    /// Number of milestones in the snapshot
    pub fn len(&self) -> usize {
        self.milestones.len()
    }

    pub fn is_empty(&self) -> bool {
        self.milestones.is_empty()
    }

    /// The underlying snapshot
    pub fn milestones(&self) -> &'a [Milestone] {
        self.milestones
    }

    /// Returns the milestone at a position
    pub fn milestone(&self, pos: usize) -> &'a Milestone {
        &self.milestones[pos]
    }

    /// Returns the position of a milestone ID
    pub fn position(&self, id: &MilestoneId) -> Option<usize> {
        self.index.get(id).copied()
    }

    /// Looks up a milestone by ID
    pub fn get(&self, id: &MilestoneId) -> Option<&'a Milestone> {
        self.position(id).map(|pos| &self.milestones[pos])
    }

    /// Returns true if the ID is part of the snapshot
    pub fn contains(&self, id: &MilestoneId) -> bool {
        self.index.contains_key(id)
    }

    /// Resolved predecessors of a milestone (dangling IDs skipped)
    pub fn dependencies(&self, pos: usize) -> &[usize] {
        &self.dependencies[pos]
    }

    /// Milestones that declare this one as a dependency
    pub fn successors(&self, pos: usize) -> &[usize] {
        &self.successors[pos]
    }

    /// Milestones with no declared dependencies, in input order
    pub fn start_points(&self) -> impl Iterator<Item = usize> + '_ {
        self.milestones
            .iter()
            .enumerate()
            .filter(|(_, m)| m.dependencies.is_empty())
            .map(|(pos, _)| pos)
    }

    /// All dependency references that could not be resolved
    pub fn dangling(&self) -> &[DanglingDependency] {
        &self.dangling
    }

    /// Unresolved dependency IDs of one milestone
    pub fn dangling_of(&self, pos: usize) -> impl Iterator<Item = &MilestoneId> + '_ {
        self.dangling
            .iter()
            .filter(move |d| d.milestone == pos)
            .map(|d| &d.missing)
    }

    /// Groups of milestones that can reach themselves through dependencies
    ///
    /// Each group is a strongly connected component with more than one
    /// member, or a single self-dependent milestone. Members are listed in
    /// input order.
    pub fn cycles(&self) -> Vec<Vec<usize>> {
        let mut groups: Vec<Vec<usize>> = tarjan_scc(&self.graph)
            .into_iter()
            .filter(|component| match component.as_slice() {
                [single] => self.graph.contains_edge(*single, *single),
                _ => true,
            })
            .map(|component| {
                let mut members: Vec<usize> =
                    component.into_iter().map(|node| self.graph[node]).collect();
                members.sort_unstable();
                members
            })
            .collect();
        groups.sort_by_key(|members| members[0]);
        groups
    }

    /// Returns true if `to` can be reached from `from` by following
    /// dependency -> dependent edges
    pub fn reaches(&self, from: usize, to: usize) -> bool {
        has_path_connecting(&self.graph, NodeIndex::new(from), NodeIndex::new(to), None)
    }
}
