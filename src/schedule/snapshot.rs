//! Input graph snapshot
//!
//! A snapshot is everything the engine reads: the affected items, their
//! precedence relations and hierarchy edges. It is supplied fresh for every
//! call and never modified by resolution. [`Snapshot::commit`] exists for
//! callers (and tests) that want to persist a result the way a storage
//! layer would.

use serde::{Deserialize, Serialize};

use super::change_set::ChangeSet;
use super::error::SchedulingError;
use super::trigger::Trigger;
use crate::domain::{
    DateSpan, HierarchyEdge, Relation, RelationGraph, WorkItem, WorkItemId, WorkingDayCalendar,
};

/// Items plus the edges between them
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    pub items: Vec<WorkItem>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub relations: Vec<Relation>,

    /// Explicit hierarchy edges, in child insertion order
    ///
    /// Items' `parent_id` fields are merged in after these.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub hierarchy: Vec<HierarchyEdge>,
}

impl Snapshot {
    /// Creates a snapshot without edges
    pub fn new(items: Vec<WorkItem>) -> Self {
        Self {
            items,
            relations: Vec::new(),
            hierarchy: Vec::new(),
        }
    }

    /// Adds a precedence relation
    pub fn with_relation(mut self, relation: Relation) -> Self {
        self.relations.push(relation);
        self
    }

    /// Looks up an item by ID
    pub fn item(&self, id: WorkItemId) -> Option<&WorkItem> {
        self.items.iter().find(|item| item.id == id)
    }

    fn item_mut(&mut self, id: WorkItemId) -> Option<&mut WorkItem> {
        self.items.iter_mut().find(|item| item.id == id)
    }

    /// Rejects items whose due date precedes their start date
    pub fn validate_dates(&self) -> Result<(), SchedulingError> {
        for item in &self.items {
            if let (Some(start), Some(due)) = (item.start_date, item.due_date) {
                if due < start {
                    return Err(SchedulingError::InconsistentDateRange {
                        id: item.id,
                        start,
                        due,
                    });
                }
            }
        }
        Ok(())
    }

    /// Validates the snapshot and builds the working graph
    ///
    /// Arena slot `i` of the returned graph holds a copy of `items[i]`.
    pub fn to_graph(&self) -> Result<RelationGraph, SchedulingError> {
        self.validate_dates()?;
        let graph = RelationGraph::build(self.items.iter().cloned(), &self.hierarchy, &self.relations)?;
        Ok(graph)
    }

    /// IDs of dated items whose stored duration disagrees with their dates
    pub fn inconsistent_durations(&self, calendar: &WorkingDayCalendar) -> Vec<WorkItemId> {
        self.items
            .iter()
            .filter(|item| match (item.start_date, item.due_date, item.duration) {
                (Some(start), Some(due), Some(duration)) => {
                    let span = DateSpan {
                        start,
                        due,
                        duration,
                    };
                    !span.is_consistent(calendar, item.ignore_non_working_days)
                }
                _ => false,
            })
            .map(|item| item.id)
            .collect()
    }

    /// Persists a resolution result into this snapshot
    ///
    /// Applies the structural part of `trigger` (relations, hierarchy,
    /// parent references), then every entry of `changes`.
    pub fn commit(&mut self, trigger: &Trigger, changes: &ChangeSet) -> Result<(), SchedulingError> {
        match trigger {
            Trigger::RelationAdded {
                predecessor,
                successor,
                lag,
            } => {
                match self
                    .relations
                    .iter_mut()
                    .find(|r| r.predecessor == *predecessor && r.successor == *successor)
                {
                    Some(existing) => existing.lag = *lag,
                    None => self
                        .relations
                        .push(Relation::follows(*successor, *predecessor).with_lag(*lag)),
                }
            }
            Trigger::RelationRemoved {
                predecessor,
                successor,
            } => {
                self.relations
                    .retain(|r| !(r.predecessor == *predecessor && r.successor == *successor));
            }
            Trigger::ChildAdded { parent, children } => {
                for child in children {
                    self.hierarchy.retain(|edge| edge.child != *child);
                    self.hierarchy.push(HierarchyEdge {
                        parent: *parent,
                        child: *child,
                    });
                    self.item_mut(*child)
                        .ok_or(SchedulingError::UnknownItem(*child))?
                        .parent_id = Some(*parent);
                }
            }
            Trigger::ChildRemoved { parent, children } => {
                for child in children {
                    self.hierarchy
                        .retain(|edge| !(edge.parent == *parent && edge.child == *child));
                    let item = self
                        .item_mut(*child)
                        .ok_or(SchedulingError::UnknownItem(*child))?;
                    if item.parent_id == Some(*parent) {
                        item.parent_id = None;
                    }
                }
            }
            Trigger::DatesChanged(_) | Trigger::ModeToggled { .. } => {}
        }

        for change in changes {
            let item = self
                .item_mut(change.id)
                .ok_or(SchedulingError::UnknownItem(change.id))?;
            change.apply_to(item);
        }

        Ok(())
    }
}
