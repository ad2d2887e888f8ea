//! JSON input files
//!
//! `resolve` reads a request bundling the snapshot, the trigger and an
//! optional calendar override; `check` reads a bare snapshot.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::domain::WorkingDayConfig;
use crate::schedule::{Snapshot, Trigger};

/// One resolution call read from disk
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolveRequest {
    pub snapshot: Snapshot,
    pub trigger: Trigger,

    /// Overrides the configured calendar for this request
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub calendar: Option<WorkingDayConfig>,
}

impl ResolveRequest {
    pub fn load(path: &Path) -> Result<Self> {
        read_json(path, "resolve request")
    }

    /// The request's own calendar, or `fallback` when it has none
    pub fn calendar_or<'a>(&'a self, fallback: &'a WorkingDayConfig) -> &'a WorkingDayConfig {
        self.calendar.as_ref().unwrap_or(fallback)
    }
}

/// Reads a snapshot file
pub fn load_snapshot(path: &Path) -> Result<Snapshot> {
    read_json(path, "snapshot")
}

fn read_json<T: DeserializeOwned>(path: &Path, what: &str) -> Result<T> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}: {}", what, path.display()))?;

    serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse {}: {}", what, path.display()))
}
