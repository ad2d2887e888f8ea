//! Change set emitted by a resolution call
//!
//! Only items whose persisted values differ from the snapshot get an entry,
//! so resolving an already consistent snapshot yields an empty set.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::domain::{SchedulingMode, WorkItem, WorkItemId};

/// New persisted values for one item
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Change {
    pub id: WorkItemId,
    pub start_date: Option<NaiveDate>,
    pub due_date: Option<NaiveDate>,
    pub duration: Option<u32>,
    pub ignore_non_working_days: bool,

    /// Set only when the resolution switched the item's mode
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scheduling_mode: Option<SchedulingMode>,
}

impl Change {
    /// Diffs two versions of the same item
    ///
    /// Returns `None` when nothing the caller persists has changed.
    pub fn between(before: &WorkItem, after: &WorkItem) -> Option<Self> {
        if before.same_schedule(after) {
            return None;
        }

        Some(Self {
            id: after.id,
            start_date: after.start_date,
            due_date: after.due_date,
            duration: after.duration,
            ignore_non_working_days: after.ignore_non_working_days,
            scheduling_mode: (before.scheduling_mode != after.scheduling_mode)
                .then_some(after.scheduling_mode),
        })
    }

    /// Writes the new values into a stored item
    pub fn apply_to(&self, item: &mut WorkItem) {
        item.start_date = self.start_date;
        item.due_date = self.due_date;
        item.duration = self.duration;
        item.ignore_non_working_days = self.ignore_non_working_days;
        if let Some(mode) = self.scheduling_mode {
            item.scheduling_mode = mode;
        }
    }
}

/// Ordered list of changes, in resolution order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChangeSet(Vec<Change>);

impl ChangeSet {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns the change for an item, if it has one
    pub fn get(&self, id: WorkItemId) -> Option<&Change> {
        self.0.iter().find(|c| c.id == id)
    }

    /// Returns true if the item has a change
    pub fn contains(&self, id: WorkItemId) -> bool {
        self.get(id).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Change> {
        self.0.iter()
    }

    /// IDs in resolution order
    pub fn ids(&self) -> impl Iterator<Item = WorkItemId> + '_ {
        self.0.iter().map(|c| c.id)
    }
}

impl<'a> IntoIterator for &'a ChangeSet {
    type Item = &'a Change;
    type IntoIter = std::slice::Iter<'a, Change>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl FromIterator<Change> for ChangeSet {
    fn from_iter<I: IntoIterator<Item = Change>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Collects per-item decisions into a minimal [`ChangeSet`]
#[derive(Debug, Default)]
pub struct ChangeSetBuilder {
    changes: Vec<Change>,
    seen: HashSet<WorkItemId>,
}

impl ChangeSetBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the outcome for one item
    ///
    /// Items already recorded and unchanged items are skipped.
    /// Returns true if an entry was added.
    pub fn record(&mut self, before: &WorkItem, after: &WorkItem) -> bool {
        if !self.seen.insert(after.id) {
            return false;
        }
        match Change::between(before, after) {
            Some(change) => {
                self.changes.push(change);
                true
            }
            None => false,
        }
    }

    pub fn build(self) -> ChangeSet {
        ChangeSet(self.changes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(n: u64) -> WorkItemId {
        WorkItemId::new(n).unwrap()
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn item() -> WorkItem {
        WorkItem::new(id(1)).with_dates(date(2025, 1, 6), date(2025, 1, 8), 3)
    }

    #[test]
    fn unchanged_item_has_no_entry() {
        let mut builder = ChangeSetBuilder::new();
        assert!(!builder.record(&item(), &item()));
        assert!(builder.build().is_empty());
    }

    #[test]
    fn date_change_recorded_without_mode() {
        let before = item();
        let mut after = item();
        after.due_date = Some(date(2025, 1, 9));
        after.duration = Some(4);

        let change = Change::between(&before, &after).unwrap();
        assert_eq!(change.due_date, Some(date(2025, 1, 9)));
        assert_eq!(change.duration, Some(4));
        assert_eq!(change.scheduling_mode, None);
    }

    #[test]
    fn mode_change_recorded() {
        let before = item();
        let after = item().automatic();

        let change = Change::between(&before, &after).unwrap();
        assert_eq!(change.scheduling_mode, Some(SchedulingMode::Automatic));
    }

    #[test]
    fn flag_change_alone_is_a_change() {
        let before = item();
        let after = item().ignoring_non_working_days();
        assert!(Change::between(&before, &after).is_some());
    }

    #[test]
    fn builder_keeps_first_record_per_item() {
        let before = item();
        let mut after = item();
        after.start_date = Some(date(2025, 1, 7));

        let mut builder = ChangeSetBuilder::new();
        assert!(builder.record(&before, &after));
        assert!(!builder.record(&before, &after));

        let changes = builder.build();
        assert_eq!(changes.len(), 1);
        assert!(changes.contains(id(1)));
    }

    #[test]
    fn apply_to_writes_values() {
        let mut stored = item();
        let change = Change {
            id: id(1),
            start_date: Some(date(2025, 2, 3)),
            due_date: Some(date(2025, 2, 4)),
            duration: Some(2),
            ignore_non_working_days: true,
            scheduling_mode: Some(SchedulingMode::Manual),
        };

        change.apply_to(&mut stored);
        assert_eq!(stored.start_date, Some(date(2025, 2, 3)));
        assert!(stored.ignore_non_working_days);
        assert_eq!(stored.scheduling_mode, SchedulingMode::Manual);
    }

    #[test]
    fn serializes_as_array() {
        let changes: ChangeSet = vec![Change {
            id: id(2),
            start_date: Some(date(2025, 1, 3)),
            due_date: Some(date(2025, 1, 7)),
            duration: Some(3),
            ignore_non_working_days: false,
            scheduling_mode: None,
        }]
        .into_iter()
        .collect();

        let json = serde_json::to_value(&changes).unwrap();
        assert_eq!(
            json,
            serde_json::json!([{
                "id": 2,
                "start_date": "2025-01-03",
                "due_date": "2025-01-07",
                "duration": 3,
                "ignore_non_working_days": false
            }])
        );
    }
}
