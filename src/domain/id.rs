//! Identifiers for milestones and generated drafts
//!
//! ID Format:
//! - Milestone IDs: opaque, caller-supplied (e.g. `m-42`, `1017`). Integer
//!   handles from the persistence layer are accepted and kept as text.
//! - Draft IDs: `d-{7-char-hash}` (e.g. `d-7f2b4c1`)
//!
//! Draft hashes are derived from the template ID and the project start date,
//! so generating the same programme twice yields the same draft IDs.

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum IdError {
    #[error("Milestone ID must not be empty")]
    EmptyMilestoneId,

    #[error("Invalid draft ID format: expected 'd-{{7-char-hash}}', got '{0}'")]
    InvalidDraftId(String),
}

/// Generates a 7-character hash from a template ID and project start
fn generate_hash(template_id: &str, project_start: NaiveDate) -> String {
    let input = format!("{}{}", template_id, project_start);
    let hash = blake3::hash(input.as_bytes());
    let hex = hash.to_hex();
    hex[..7].to_string()
}

/// Opaque identifier of a milestone, unique within one project snapshot
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(into = "String")]
pub struct MilestoneId(String);

impl MilestoneId {
    /// Creates a milestone ID, rejecting blank values
    pub fn new(id: impl Into<String>) -> Result<Self, IdError> {
        let id = id.into();
        let trimmed = id.trim();
        if trimmed.is_empty() {
            return Err(IdError::EmptyMilestoneId);
        }
        if trimmed.len() == id.len() {
            Ok(Self(id))
        } else {
            Ok(Self(trimmed.to_string()))
        }
    }

    /// Returns the ID as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MilestoneId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for MilestoneId {
    type Err = IdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl From<MilestoneId> for String {
    fn from(id: MilestoneId) -> Self {
        id.0
    }
}

impl From<DraftId> for MilestoneId {
    fn from(id: DraftId) -> Self {
        Self(id.to_string())
    }
}

impl<'de> Deserialize<'de> for MilestoneId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        use serde::de::{Error, Visitor};

        struct MilestoneIdVisitor;

        impl Visitor<'_> for MilestoneIdVisitor {
            type Value = MilestoneId;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("a non-empty string or an integer milestone handle")
            }

            fn visit_str<E: Error>(self, v: &str) -> Result<Self::Value, E> {
                MilestoneId::new(v).map_err(E::custom)
            }

            fn visit_u64<E: Error>(self, v: u64) -> Result<Self::Value, E> {
                Ok(MilestoneId(v.to_string()))
            }

            fn visit_i64<E: Error>(self, v: i64) -> Result<Self::Value, E> {
                Ok(MilestoneId(v.to_string()))
            }
        }

        deserializer.deserialize_any(MilestoneIdVisitor)
    }
}

/// Temporary ID of an unpersisted draft milestone: `d-{7-char-hash}`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DraftId {
    hash: String,
}

impl DraftId {
    /// Creates the draft ID for a template placed in a programme starting on `project_start`
    pub fn new(template_id: &str, project_start: NaiveDate) -> Self {
        Self {
            hash: generate_hash(template_id, project_start),
        }
    }
}

impl fmt::Display for DraftId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "d-{}", self.hash)
    }
}

impl FromStr for DraftId {
    type Err = IdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let hash = s
            .strip_prefix("d-")
            .ok_or_else(|| IdError::InvalidDraftId(s.to_string()))?;

        if hash.len() != 7 || !hash.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(IdError::InvalidDraftId(s.to_string()));
        }

        Ok(Self {
            hash: hash.to_string(),
        })
    }
}

impl TryFrom<String> for DraftId {
    type Error = IdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<DraftId> for String {
    fn from(id: DraftId) -> Self {
        id.to_string()
    }
}
