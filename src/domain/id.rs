//! Work item identifiers
//!
//! ID Format:
//! - Serialized as a bare positive integer (e.g., `42`)
//! - Displayed with a hash prefix (e.g., `#42`)
//! - Parsed from either form, so CLI users can paste what they see

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum IdError {
    #[error("Invalid work item ID: expected '#{{number}}' or '{{number}}', got '{0}'")]
    InvalidWorkItemId(String),

    #[error("Work item ID must be positive, got '{0}'")]
    Zero(String),
}

/// Opaque identifier of a work item, unique within a snapshot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u64", into = "u64")]
pub struct WorkItemId(u64);

impl WorkItemId {
    /// Creates an ID from its numeric value
    ///
    /// Returns `None` for zero, which is reserved for "unsaved" records
    /// in the surrounding application.
    pub fn new(value: u64) -> Option<Self> {
        (value > 0).then_some(Self(value))
    }

    /// Returns the numeric value
    pub fn get(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for WorkItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

impl FromStr for WorkItemId {
    type Err = IdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let digits = s.strip_prefix('#').unwrap_or(s);

        if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
            return Err(IdError::InvalidWorkItemId(s.to_string()));
        }

        let value: u64 = digits
            .parse()
            .map_err(|_| IdError::InvalidWorkItemId(s.to_string()))?;

        Self::new(value).ok_or_else(|| IdError::Zero(s.to_string()))
    }
}

impl TryFrom<u64> for WorkItemId {
    type Error = IdError;

    fn try_from(value: u64) -> Result<Self, Self::Error> {
        Self::new(value).ok_or_else(|| IdError::Zero(value.to_string()))
    }
}

impl From<WorkItemId> for u64 {
    fn from(id: WorkItemId) -> Self {
        id.0
    }
}
