//! Scheduling engine
//!
//! One resolution call takes a [`Snapshot`] of the affected items and edges,
//! the [`Trigger`] that changed it, and a working-day calendar. It returns a
//! [`ChangeSet`] with new persisted values for every item whose schedule
//! moved, or a [`SchedulingError`] and no changes at all.

mod change_set;
mod error;
mod resolver;
mod snapshot;
mod trigger;

pub use change_set::{Change, ChangeSet, ChangeSetBuilder};
pub use error::SchedulingError;
pub use resolver::{resolve, Scheduler};
pub use snapshot::Snapshot;
pub use trigger::{DateEdit, Trigger, TriggerKind};
