//! autosched - Automatic scheduling for hierarchical, related work items
//!
//! Given a snapshot of work items, the precedence relations and hierarchy
//! between them, and the edit that just happened, the engine derives new
//! dates for every automatically scheduled item it affects. Parents span
//! their children, successors start after their predecessors, and both
//! honour a configurable working-day calendar.

pub mod domain;
pub mod schedule;
pub mod storage;
pub mod cli;

pub use domain::{
    HierarchyEdge, Relation, SchedulingMode, WorkItem, WorkItemId, WorkingDayCalendar,
    WorkingDayConfig,
};
pub use schedule::{resolve, ChangeSet, Scheduler, SchedulingError, Snapshot, Trigger};
