//! Milestone domain model
//!
//! Milestones are the schedulable units of a construction programme.
//! They carry planned dates, a status, and dependency edges to other
//! milestones. Nothing here assumes the edges are well-formed.

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

use super::id::MilestoneId;

/// A construction discipline such as `carpentry` or `electrical`
///
/// Trades compare case-insensitively: the name is trimmed and lower-cased
/// on construction.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct Trade(String);

impl Trade {
    pub fn new(name: impl AsRef<str>) -> Self {
        Self(name.as_ref().trim().to_lowercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns true if `text` mentions this trade (case-insensitive)
    pub fn mentioned_in(&self, text: &str) -> bool {
        !self.0.is_empty() && text.to_lowercase().contains(&self.0)
    }
}

impl fmt::Display for Trade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for Trade {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

impl From<&str> for Trade {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<Trade> for String {
    fn from(trade: Trade) -> Self {
        trade.0
    }
}

/// Priority of a milestone
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
        }
    }
}

/// Progress status of a milestone
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum MilestoneStatus {
    #[default]
    Upcoming,
    InProgress,
    Complete,
    Delayed,
}

impl MilestoneStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            MilestoneStatus::Upcoming => "upcoming",
            MilestoneStatus::InProgress => "in_progress",
            MilestoneStatus::Complete => "complete",
            MilestoneStatus::Delayed => "delayed",
        }
    }
}

/// A milestone in a project snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Milestone {
    pub id: MilestoneId,

    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trade: Option<Trade>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,

    #[serde(default)]
    pub priority: Priority,

    #[serde(default)]
    pub planned_start: Option<NaiveDate>,

    #[serde(default)]
    pub planned_end: Option<NaiveDate>,

    #[serde(default)]
    pub status: MilestoneStatus,

    /// Percent complete, 0 to 100
    #[serde(default, deserialize_with = "deserialize_percentage")]
    pub completion_percentage: u8,

    #[serde(default)]
    pub critical_path_flag: bool,

    #[serde(default)]
    pub delay_risk_flag: bool,

    /// Predecessor IDs in declaration order, without duplicates
    #[serde(default, deserialize_with = "deserialize_dependencies")]
    pub dependencies: Vec<MilestoneId>,
}

impl Milestone {
    /// Creates an upcoming milestone with no dates or dependencies
    pub fn new(id: MilestoneId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            trade: None,
            category: None,
            priority: Priority::default(),
            planned_start: None,
            planned_end: None,
            status: MilestoneStatus::default(),
            completion_percentage: 0,
            critical_path_flag: false,
            delay_risk_flag: false,
            dependencies: Vec::new(),
        }
    }

    /// Sets the trade
    pub fn with_trade(mut self, trade: impl Into<Trade>) -> Self {
        self.trade = Some(trade.into());
        self
    }

    /// Sets the planned date range
    pub fn with_dates(mut self, start: NaiveDate, end: NaiveDate) -> Self {
        self.planned_start = Some(start);
        self.planned_end = Some(end);
        self
    }

    /// Sets the status
    pub fn with_status(mut self, status: MilestoneStatus) -> Self {
        self.status = status;
        self
    }

    /// Adds a dependency, returning false if it was already declared
    pub fn add_dependency(&mut self, id: MilestoneId) -> bool {
        if self.dependencies.contains(&id) {
            false
        } else {
            self.dependencies.push(id);
            true
        }
    }

    /// Returns true if this milestone declares `id` as a predecessor
    pub fn depends_on_id(&self, id: &MilestoneId) -> bool {
        self.dependencies.contains(id)
    }

    /// Returns the planned date range when both dates are known
    pub fn date_range(&self) -> Option<(NaiveDate, NaiveDate)> {
        self.planned_start.zip(self.planned_end)
    }

    /// Duration in whole days used for scheduling computations
    ///
    /// `planned_end - planned_start`, at least 1. A milestone missing
    /// either date counts as 1 day.
    pub fn duration_days(&self) -> u32 {
        match self.date_range() {
            Some((start, end)) => {
                let days = (end - start).num_days().max(1);
                u32::try_from(days).unwrap_or(u32::MAX)
            }
            None => 1,
        }
    }

    /// Returns true if this milestone is in the given trade
    pub fn is_trade(&self, trade: &Trade) -> bool {
        self.trade.as_ref() == Some(trade)
    }

    /// Returns true if the trade matches or the name mentions `needle` (case-insensitive)
    pub fn matches_trade_or_name(&self, trade: Option<&Trade>, needle: &str) -> bool {
        if let Some(trade) = trade {
            if self.is_trade(trade) {
                return true;
            }
        }
        let needle = needle.trim().to_lowercase();
        !needle.is_empty() && self.name.to_lowercase().contains(&needle)
    }
}

fn deserialize_percentage<'de, D>(deserializer: D) -> Result<u8, D::Error>
where
    D: Deserializer<'de>,
{
    let value = u64::deserialize(deserializer)?;
    Ok(value.min(100) as u8)
}

fn deserialize_dependencies<'de, D>(deserializer: D) -> Result<Vec<MilestoneId>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<Vec<MilestoneId>>::deserialize(deserializer)?.unwrap_or_default();
    let mut deps: Vec<MilestoneId> = Vec::with_capacity(raw.len());
    for id in raw {
        if !deps.contains(&id) {
            deps.push(id);
        }
    }
    Ok(deps)
}
