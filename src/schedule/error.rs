//! Errors returned by a resolution call

use chrono::NaiveDate;
use thiserror::Error;

use crate::domain::{CalendarError, GraphError, WorkItemId};

#[derive(Debug, Error, PartialEq)]
pub enum SchedulingError {
    #[error("Relation from {from} to {to} would create a cycle")]
    CyclicRelation {
        from: WorkItemId,
        to: WorkItemId,
    },

    #[error("{0} has no children and no predecessors to derive dates from")]
    IneligibleForAutomatic(WorkItemId),

    #[error("{id} ends before it starts ({start} > {due})")]
    InconsistentDateRange {
        id: WorkItemId,
        start: NaiveDate,
        due: NaiveDate,
    },

    #[error("Working-day calendar marks every weekday as non-working")]
    CalendarMisconfigured,

    #[error("Work item not found: {0}")]
    UnknownItem(WorkItemId),

    #[error("Work item listed twice: {0}")]
    DuplicateItem(WorkItemId),

    #[error("Work item {child} has two parents: {first} and {second}")]
    ConflictingParent {
        child: WorkItemId,
        first: WorkItemId,
        second: WorkItemId,
    },
}

impl SchedulingError {
    /// Returns true for errors that reject a user's edit
    ///
    /// Everything else points at bad caller data and belongs in logs.
    pub fn is_user_facing(&self) -> bool {
        matches!(
            self,
            SchedulingError::CyclicRelation { .. } | SchedulingError::IneligibleForAutomatic(_)
        )
    }
}

impl From<GraphError> for SchedulingError {
    fn from(err: GraphError) -> Self {
        match err {
            GraphError::CycleDetected { from, to } => {
                SchedulingError::CyclicRelation { from, to }
            }
            GraphError::ItemNotFound(id) => SchedulingError::UnknownItem(id),
            GraphError::DuplicateItem(id) => SchedulingError::DuplicateItem(id),
            GraphError::ConflictingParent {
                child,
                first,
                second,
            } => SchedulingError::ConflictingParent {
                child,
                first,
                second,
            },
        }
    }
}

impl From<CalendarError> for SchedulingError {
    fn from(err: CalendarError) -> Self {
        match err {
            CalendarError::NoWorkingWeekdays => SchedulingError::CalendarMisconfigured,
        }
    }
}
