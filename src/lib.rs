//! Site Programme - scheduling intelligence for construction projects
//!
//! Takes a snapshot of project milestones connected by dependency edges and
//! computes the critical path, detects scheduling conflicts, suggests likely
//! dependencies from trade sequencing, and generates draft programmes from
//! a template library. The engine is pure: it reads snapshots and returns
//! plain data, leaving persistence to the caller.

pub mod domain;
pub mod engine;
pub mod storage;
pub mod cli;

pub use domain::{Milestone, MilestoneId, MilestoneStatus, ProjectType, TemplateLibrary, Trade};
pub use engine::{
    critical_path, detect_conflicts, generate_schedule, suggest_dependencies, ConflictIssue,
    CriticalPathResult, MilestoneDraft,
};
