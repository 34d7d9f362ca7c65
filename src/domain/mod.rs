//! Domain models for the programme engine
//!
//! Contains the scheduling data types without any I/O concerns.

mod id;
mod milestone;
mod template;
mod graph;

pub use id::{MilestoneId, DraftId, IdError};
pub use milestone::{Milestone, MilestoneStatus, Priority, Trade};
pub use template::{
    predecessor_trades, successor_trades, LibraryError, MilestoneTemplate, ProjectType,
    TemplateLibrary, TradeRule, TRADE_SEQUENCE,
};
pub use graph::{DanglingDependency, MilestoneGraph};
