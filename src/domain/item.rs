//! Work item domain model
//!
//! Work items are the schedulable units: tasks, milestones, phases.
//! Their dates are either set by the caller (manual scheduling) or
//! derived by the engine from children or predecessors (automatic).

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::id::WorkItemId;

/// How an item's dates are decided
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SchedulingMode {
    /// Dates are set by the caller and act as fixed inputs
    #[default]
    Manual,
    /// Dates are derived from children or predecessors
    Automatic,
}

impl SchedulingMode {
    /// Returns true if the engine owns this item's dates
    pub fn is_automatic(&self) -> bool {
        matches!(self, SchedulingMode::Automatic)
    }

    /// Returns true if the caller owns this item's dates
    pub fn is_manual(&self) -> bool {
        matches!(self, SchedulingMode::Manual)
    }

    /// Returns a display label for the mode
    pub fn label(&self) -> &'static str {
        match self {
            SchedulingMode::Manual => "manual",
            SchedulingMode::Automatic => "automatic",
        }
    }
}

/// A schedulable unit of work
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkItem {
    /// Unique identifier
    pub id: WorkItemId,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<NaiveDate>,

    /// Countable days between start and due, inclusive
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<u32>,

    #[serde(default)]
    pub scheduling_mode: SchedulingMode,

    /// When true every calendar day counts; otherwise only working days
    #[serde(default)]
    pub ignore_non_working_days: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<WorkItemId>,
}

impl WorkItem {
    /// Creates an undated, manually scheduled item
    pub fn new(id: WorkItemId) -> Self {
        Self {
            id,
            start_date: None,
            due_date: None,
            duration: None,
            scheduling_mode: SchedulingMode::Manual,
            ignore_non_working_days: false,
            parent_id: None,
        }
    }

    /// Sets both dates and the duration
    pub fn with_dates(mut self, start: NaiveDate, due: NaiveDate, duration: u32) -> Self {
        self.start_date = Some(start);
        self.due_date = Some(due);
        self.duration = Some(duration);
        self
    }

    /// Sets only the duration, leaving dates to be derived
    pub fn with_duration(mut self, duration: u32) -> Self {
        self.duration = Some(duration);
        self
    }

    /// Marks the item as automatically scheduled
    pub fn automatic(mut self) -> Self {
        self.scheduling_mode = SchedulingMode::Automatic;
        self
    }

    /// Makes every calendar day count toward duration
    pub fn ignoring_non_working_days(mut self) -> Self {
        self.ignore_non_working_days = true;
        self
    }

    /// Sets the parent reference
    pub fn with_parent(mut self, parent: WorkItemId) -> Self {
        self.parent_id = Some(parent);
        self
    }

    /// Returns true if the engine owns this item's dates
    pub fn is_automatic(&self) -> bool {
        self.scheduling_mode.is_automatic()
    }

    /// Returns the date this item is considered finished by successors
    ///
    /// Items with only a start date finish on their start.
    pub fn finish_date(&self) -> Option<NaiveDate> {
        self.due_date.or(self.start_date)
    }

    /// Returns the date this item is considered started by a parent span
    pub fn begin_date(&self) -> Option<NaiveDate> {
        self.start_date.or(self.due_date)
    }

    /// Returns true when `due < start`
    pub fn has_inverted_dates(&self) -> bool {
        matches!((self.start_date, self.due_date), (Some(s), Some(d)) if d < s)
    }

    /// Returns true if dates, duration, flag and mode all match `other`
    pub fn same_schedule(&self, other: &WorkItem) -> bool {
        self.start_date == other.start_date
            && self.due_date == other.due_date
            && self.duration == other.duration
            && self.ignore_non_working_days == other.ignore_non_working_days
            && self.scheduling_mode == other.scheduling_mode
    }
}

/// A precedence relation: `successor` follows `predecessor`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Relation {
    pub predecessor: WorkItemId,
    pub successor: WorkItemId,
    /// Extra steps between the predecessor's finish and the successor's start
    #[serde(default)]
    pub lag: i32,
}

impl Relation {
    /// Creates a relation without lag
    pub fn follows(successor: WorkItemId, predecessor: WorkItemId) -> Self {
        Self {
            predecessor,
            successor,
            lag: 0,
        }
    }

    /// Sets the lag
    pub fn with_lag(mut self, lag: i32) -> Self {
        self.lag = lag;
        self
    }
}

/// A hierarchy edge: `child` belongs to `parent`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HierarchyEdge {
    pub parent: WorkItemId,
    pub child: WorkItemId,
}
