//! # Scheduling Engine
//!
//! Pure analyses over a milestone snapshot. Every call builds its own
//! [`MilestoneGraph`](crate::domain::MilestoneGraph), reads the snapshot
//! without modifying it and returns plain data, so calls are repeatable and
//! may run concurrently on separate threads.
//!
//! | Operation | Module |
//! |-----------|--------|
//! | Longest-duration dependency chain | [`critical_path()`] |
//! | Overlaps, loops, impossible orderings | [`detect_conflicts()`] |
//! | Predecessor / successor suggestions | [`suggest_dependencies()`], [`suggest_successors()`] |
//! | Draft programme from templates | [`generate_schedule()`] |
//! | Combined analysis and flags | [`analyze()`], [`annotate()`] |

mod critical_path;
mod conflicts;
mod inference;
mod generator;
mod annotate;

pub use critical_path::{critical_path, critical_path_in, CriticalPathResult};
pub use conflicts::{
    detect_conflicts, detect_conflicts_in, detect_dependency_loops, detect_impossible_timelines,
    detect_overlaps, ConflictIssue, ConflictType, Severity,
};
pub use inference::{suggest_dependencies, suggest_successors};
pub use generator::{generate_schedule, MilestoneDraft};
pub use annotate::{analyze, annotate, would_create_cycle, ScheduleAnalysis};
