//! Domain models for the scheduling engine
//!
//! Contains the work item model, the working-day calendar, date-range
//! arithmetic and the relation graph, without any I/O concerns.

mod id;
mod item;
mod calendar;
pub mod span;
mod graph;

pub use id::{IdError, WorkItemId};
pub use item::{HierarchyEdge, Relation, SchedulingMode, WorkItem};
pub use calendar::{parse_weekday, CalendarError, WorkingDayCalendar, WorkingDayConfig};
pub use span::DateSpan;
pub use graph::{Attachment, Edge, GraphError, RelationGraph, Slot};
