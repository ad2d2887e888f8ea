//! Reschedule triggers
//!
//! A trigger is the external mutation that caused a resolution call. The
//! adapter applies it to the working graph and reports:
//! - the seed items whose dependents must be re-resolved
//! - per-parent child touches, in event order (last one wins)
//! - whether an item just switched from manual to automatic

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use tracing::debug;

use super::error::SchedulingError;
use crate::domain::{
    span, Attachment, DateSpan, RelationGraph, SchedulingMode, Slot, WorkItem, WorkItemId,
    WorkingDayCalendar,
};

/// Kind of a trigger, without its payload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TriggerKind {
    DatesChanged,
    RelationAdded,
    RelationRemoved,
    ChildAdded,
    ChildRemoved,
    ModeToggled,
}

impl TriggerKind {
    pub fn label(&self) -> &'static str {
        match self {
            TriggerKind::DatesChanged => "dates_changed",
            TriggerKind::RelationAdded => "relation_added",
            TriggerKind::RelationRemoved => "relation_removed",
            TriggerKind::ChildAdded => "child_added",
            TriggerKind::ChildRemoved => "child_removed",
            TriggerKind::ModeToggled => "mode_toggled",
        }
    }
}

impl fmt::Display for TriggerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A caller's edit of one item's dates
///
/// Absent fields keep their stored values; the missing ones are derived.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateEdit {
    pub item: WorkItemId,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<NaiveDate>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ignore_non_working_days: Option<bool>,
}

impl DateEdit {
    pub fn new(item: WorkItemId) -> Self {
        Self {
            item,
            start_date: None,
            due_date: None,
            duration: None,
            ignore_non_working_days: None,
        }
    }

    pub fn start(mut self, date: NaiveDate) -> Self {
        self.start_date = Some(date);
        self
    }

    pub fn due(mut self, date: NaiveDate) -> Self {
        self.due_date = Some(date);
        self
    }

    pub fn duration(mut self, days: u32) -> Self {
        self.duration = Some(days);
        self
    }

    pub fn ignore_non_working_days(mut self, ignore: bool) -> Self {
        self.ignore_non_working_days = Some(ignore);
        self
    }
}

/// The external mutation that caused a resolution call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Trigger {
    /// Dates, duration or working-day flag of an item were edited
    DatesChanged(DateEdit),

    /// `successor` now follows `predecessor`
    RelationAdded {
        predecessor: WorkItemId,
        successor: WorkItemId,
        #[serde(default)]
        lag: i32,
    },

    RelationRemoved {
        predecessor: WorkItemId,
        successor: WorkItemId,
    },

    /// Children attached to `parent`, in event order
    ChildAdded {
        parent: WorkItemId,
        children: Vec<WorkItemId>,
    },

    /// Children detached from `parent`, in event order
    ChildRemoved {
        parent: WorkItemId,
        children: Vec<WorkItemId>,
    },

    ModeToggled {
        item: WorkItemId,
        mode: SchedulingMode,
    },
}

impl Trigger {
    pub fn kind(&self) -> TriggerKind {
        match self {
            Trigger::DatesChanged(_) => TriggerKind::DatesChanged,
            Trigger::RelationAdded { .. } => TriggerKind::RelationAdded,
            Trigger::RelationRemoved { .. } => TriggerKind::RelationRemoved,
            Trigger::ChildAdded { .. } => TriggerKind::ChildAdded,
            Trigger::ChildRemoved { .. } => TriggerKind::ChildRemoved,
            Trigger::ModeToggled { .. } => TriggerKind::ModeToggled,
        }
    }
}

/// What applying a trigger to the working graph produced
#[derive(Debug, Default)]
pub(crate) struct Applied {
    /// Items whose dependents need re-resolution
    pub seeds: Vec<Slot>,

    /// parent -> most recently touched child in this call
    pub touches: HashMap<Slot, Slot>,

    /// Item that just switched from manual to automatic
    pub became_automatic: Option<Slot>,
}

impl Applied {
    fn seed(&mut self, slot: Slot) {
        if !self.seeds.contains(&slot) {
            self.seeds.push(slot);
        }
    }

    fn touch(&mut self, parent: Slot, child: Slot) {
        self.touches.insert(parent, child);
    }

    fn touch_parent_of(&mut self, graph: &RelationGraph, child: Slot) {
        if let Some(parent) = graph.parent(child) {
            self.touch(parent, child);
        }
    }
}

/// Applies `trigger` to the working graph
///
/// On error the graph may be partially edited; callers discard it.
pub(crate) fn apply(
    graph: &mut RelationGraph,
    calendar: &WorkingDayCalendar,
    trigger: &Trigger,
) -> Result<Applied, SchedulingError> {
    let mut applied = Applied::default();

    match trigger {
        Trigger::DatesChanged(edit) => {
            let slot = graph.require(edit.item)?;
            apply_date_edit(calendar, graph.item_mut(slot), edit)?;
            applied.seed(slot);
            applied.touch_parent_of(graph, slot);
        }

        Trigger::RelationAdded {
            predecessor,
            successor,
            lag,
        } => {
            let pred = graph.require(*predecessor)?;
            let succ = graph.require(*successor)?;
            graph.add_relation(pred, succ, *lag)?;
            applied.seed(succ);
        }

        Trigger::RelationRemoved {
            predecessor,
            successor,
        } => {
            let pred = graph.require(*predecessor)?;
            let succ = graph.require(*successor)?;
            if !graph.remove_relation(pred, succ) {
                debug!(%predecessor, %successor, "relation already absent");
            }
            applied.seed(succ);
        }

        Trigger::ChildAdded { parent, children } => {
            let parent_slot = graph.require(*parent)?;
            applied.seed(parent_slot);
            for child in children {
                let child_slot = graph.require(*child)?;
                match graph.add_child(parent_slot, child_slot)? {
                    Attachment::Unchanged => {
                        debug!(%parent, %child, "already a child, ignoring");
                    }
                    Attachment::Attached => applied.touch(parent_slot, child_slot),
                    Attachment::Moved(previous) => {
                        applied.seed(previous);
                        applied.touch(previous, child_slot);
                        applied.touch(parent_slot, child_slot);
                    }
                }
            }
        }

        Trigger::ChildRemoved { parent, children } => {
            let parent_slot = graph.require(*parent)?;
            applied.seed(parent_slot);
            for child in children {
                let child_slot = graph.require(*child)?;
                if graph.remove_child(parent_slot, child_slot) {
                    applied.touch(parent_slot, child_slot);
                } else {
                    debug!(%parent, %child, "not a child, ignoring removal");
                }
            }
        }

        Trigger::ModeToggled { item, mode } => {
            let slot = graph.require(*item)?;
            applied.seed(slot);

            let current = graph.item(slot).scheduling_mode;
            if current == *mode {
                debug!(%item, mode = mode.label(), "mode unchanged");
                return Ok(applied);
            }
            applied.touch_parent_of(graph, slot);

            match mode {
                SchedulingMode::Automatic => {
                    if !graph.has_children(slot) && !graph.has_predecessors(slot) {
                        return Err(SchedulingError::IneligibleForAutomatic(*item));
                    }
                    graph.item_mut(slot).scheduling_mode = SchedulingMode::Automatic;
                    applied.became_automatic = Some(slot);
                }
                SchedulingMode::Manual => {
                    graph.item_mut(slot).scheduling_mode = SchedulingMode::Manual;
                    if let Some(child) = first_automatic_child(graph, slot) {
                        debug!(%item, child = %graph.id(child), "forcing first child to manual");
                        graph.item_mut(child).scheduling_mode = SchedulingMode::Manual;
                        applied.seed(child);
                    }
                }
            }
        }
    }

    Ok(applied)
}

fn place(item: &mut WorkItem, span: DateSpan) {
    item.start_date = Some(span.start);
    item.due_date = Some(span.due);
    item.duration = Some(span.duration);
}

fn first_automatic_child(graph: &RelationGraph, parent: Slot) -> Option<Slot> {
    graph
        .children(parent)
        .iter()
        .copied()
        .find(|child| graph.item(*child).is_automatic())
}

/// Applies a date edit to one item, deriving whatever was not supplied
pub(crate) fn apply_date_edit(
    calendar: &WorkingDayCalendar,
    item: &mut WorkItem,
    edit: &DateEdit,
) -> Result<(), SchedulingError> {
    let ignore = edit
        .ignore_non_working_days
        .unwrap_or(item.ignore_non_working_days);
    let flag_changed = ignore != item.ignore_non_working_days;
    item.ignore_non_working_days = ignore;

    match (edit.start_date, edit.due_date, edit.duration) {
        // Both ends win over a supplied duration
        (Some(start), Some(due), _) => {
            item.start_date = Some(start);
            item.due_date = Some(due);
        }
        (Some(start), None, Some(length)) => {
            place(item, DateSpan::starting_at(calendar, start, length, ignore));
        }
        (None, Some(due), Some(length)) => {
            place(item, DateSpan::ending_at(calendar, due, length, ignore));
        }
        (Some(start), None, None) => match item.duration {
            Some(length) => place(item, DateSpan::starting_at(calendar, start, length, ignore)),
            None => item.start_date = Some(start),
        },
        (None, Some(due), None) => {
            item.due_date = Some(due);
        }
        (None, None, Some(length)) => match (item.start_date, item.due_date) {
            (Some(start), _) => place(item, DateSpan::starting_at(calendar, start, length, ignore)),
            (None, Some(due)) => place(item, DateSpan::ending_at(calendar, due, length, ignore)),
            (None, None) => item.duration = Some(length),
        },
        (None, None, None) => {
            if flag_changed {
                if let Some(start) = item.start_date {
                    let start = if ignore {
                        start
                    } else {
                        calendar.next_working_day(start)
                    };
                    match item.duration {
                        Some(length) => {
                            place(item, DateSpan::starting_at(calendar, start, length, ignore))
                        }
                        None => item.start_date = Some(start),
                    }
                }
            }
        }
    }

    if let (Some(start), Some(due)) = (item.start_date, item.due_date) {
        if due < start {
            return Err(SchedulingError::InconsistentDateRange {
                id: item.id,
                start,
                due,
            });
        }
        item.duration = Some(span::duration(calendar, start, due, ignore));
    }

    Ok(())
}
