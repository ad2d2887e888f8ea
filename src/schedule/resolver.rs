//! Scheduling resolver
//!
//! Walks the items affected by a trigger in dependency order and
//! recomputes every automatic one:
//!
//! | Item has | Dates come from |
//! |----------|-----------------|
//! | children (with or without predecessors) | span of the children |
//! | predecessors only | latest predecessor finish + lag + 1 step |
//! | neither | nothing: dates are kept and the item turns manual |
//!
//! Manual items are never recomputed; they are fixed inputs for their
//! dependents.

use tracing::{debug, instrument};

use super::change_set::{ChangeSet, ChangeSetBuilder};
use super::error::SchedulingError;
use super::snapshot::Snapshot;
use super::trigger::{self, Applied, Trigger};
use crate::domain::{
    span, RelationGraph, SchedulingMode, Slot, WorkingDayCalendar, WorkingDayConfig,
};

/// Scheduling engine bound to one working-day calendar
#[derive(Debug, Clone)]
pub struct Scheduler {
    calendar: WorkingDayCalendar,
}

impl Scheduler {
    /// Creates a scheduler, rejecting calendars without working weekdays
    pub fn new(config: &WorkingDayConfig) -> Result<Self, SchedulingError> {
        Ok(Self {
            calendar: WorkingDayCalendar::new(config)?,
        })
    }

    pub fn calendar(&self) -> &WorkingDayCalendar {
        &self.calendar
    }

    /// Computes the changes caused by `trigger`
    ///
    /// The snapshot is never modified. Either the full change set for the
    /// affected items is returned, or an error and nothing else.
    #[instrument(skip_all, fields(trigger = %trigger.kind(), items = snapshot.items.len()))]
    pub fn resolve(&self, snapshot: &Snapshot, trigger: &Trigger) -> Result<ChangeSet, SchedulingError> {
        let mut graph = snapshot.to_graph()?;
        let applied = trigger::apply(&mut graph, &self.calendar, trigger)?;

        let affected = graph.dependents_closure(applied.seeds.iter().copied());
        let order: Vec<Slot> = graph
            .dependency_order()?
            .into_iter()
            .filter(|slot| affected.contains(slot))
            .collect();
        debug!(seeds = applied.seeds.len(), affected = order.len(), "resolving");

        for &slot in &order {
            self.reschedule(&mut graph, slot, &applied);
        }

        // Slot i of the working graph is snapshot.items[i]
        let mut builder = ChangeSetBuilder::new();
        for &slot in &order {
            builder.record(&snapshot.items[slot], graph.item(slot));
        }
        let changes = builder.build();

        debug!(changes = changes.len(), "resolved");
        Ok(changes)
    }

    fn reschedule(&self, graph: &mut RelationGraph, slot: Slot, applied: &Applied) {
        if !graph.item(slot).is_automatic() {
            return;
        }

        if graph.has_children(slot) {
            self.schedule_from_children(graph, slot, applied);
        } else if graph.has_predecessors(slot) {
            self.schedule_from_predecessors(graph, slot);
        } else {
            self.release(graph, slot, applied);
        }
    }

    /// Spans the children; the last touched child decides the day mode
    fn schedule_from_children(&self, graph: &mut RelationGraph, slot: Slot, applied: &Applied) {
        let children = graph.children(slot);
        let start = children
            .iter()
            .filter_map(|c| graph.item(*c).begin_date())
            .min();
        let due = children
            .iter()
            .filter_map(|c| graph.item(*c).finish_date())
            .max();
        let ignore = self.inherited_flag(graph, slot, applied);

        let duration = match (start, due) {
            (Some(start), Some(due)) => Some(span::duration(&self.calendar, start, due, ignore)),
            _ => None,
        };

        debug!(item = %graph.id(slot), ?start, ?due, ?duration, ignore, "from children");

        let item = graph.item_mut(slot);
        item.start_date = start;
        item.due_date = due;
        item.duration = duration;
        item.ignore_non_working_days = ignore;
    }

    fn inherited_flag(&self, graph: &RelationGraph, slot: Slot, applied: &Applied) -> bool {
        if let Some(&child) = applied.touches.get(&slot) {
            return graph.item(child).ignore_non_working_days;
        }

        if applied.became_automatic == Some(slot) {
            // First derivation: unanimous children decide, otherwise working days only
            let mut flags = graph
                .children(slot)
                .iter()
                .map(|c| graph.item(*c).ignore_non_working_days);
            let first = flags.next().unwrap_or(false);
            return first && flags.all(|flag| flag == first);
        }

        graph.item(slot).ignore_non_working_days
    }

    /// Starts one step after the latest-finishing predecessor, keeping duration
    fn schedule_from_predecessors(&self, graph: &mut RelationGraph, slot: Slot) {
        let item = graph.item(slot);
        let ignore = item.ignore_non_working_days;
        let skip = !ignore;

        let soonest = graph
            .predecessors(slot)
            .iter()
            .filter_map(|(pred, lag)| {
                graph
                    .item(*pred)
                    .finish_date()
                    .map(|finish| self.calendar.shift(finish, lag.saturating_add(1), skip))
            })
            .max();

        let Some(soonest) = soonest else {
            debug!(item = %item.id, "no dated predecessor, keeping dates");
            return;
        };
        let start = if skip {
            self.calendar.next_working_day(soonest)
        } else {
            soonest
        };

        let length = item.duration.or_else(|| match (item.start_date, item.due_date) {
            (Some(s), Some(d)) => Some(span::duration(&self.calendar, s, d, ignore)),
            _ => None,
        });
        let due = match length {
            Some(length) => Some(span::due_from(&self.calendar, start, length, ignore)),
            None => item.due_date.map(|d| d.max(start)),
        };
        let duration = due.map(|d| span::duration(&self.calendar, start, d, ignore));

        debug!(item = %item.id, %start, ?due, ?duration, "from predecessors");

        let item = graph.item_mut(slot);
        item.start_date = Some(start);
        item.due_date = due;
        item.duration = duration;
    }

    /// An automatic item left without children or predecessors turns manual
    fn release(&self, graph: &mut RelationGraph, slot: Slot, applied: &Applied) {
        let inherited = applied
            .touches
            .get(&slot)
            .map(|child| graph.item(*child).ignore_non_working_days);

        let calendar = &self.calendar;
        let item = graph.item_mut(slot);
        if let Some(ignore) = inherited {
            item.ignore_non_working_days = ignore;
        }
        if let (Some(start), Some(due)) = (item.start_date, item.due_date) {
            item.duration = Some(span::duration(calendar, start, due, item.ignore_non_working_days));
        }
        item.scheduling_mode = SchedulingMode::Manual;

        debug!(item = %item.id, "no source left, switching to manual");
    }
}

/// Resolves `trigger` against `snapshot` under the given calendar
pub fn resolve(
    snapshot: &Snapshot,
    trigger: &Trigger,
    calendar: &WorkingDayConfig,
) -> Result<ChangeSet, SchedulingError> {
    Scheduler::new(calendar)?.resolve(snapshot, trigger)
}
