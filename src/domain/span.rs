//! Date-range algebra
//!
//! Converts between a `(start, due)` pair and a duration under a calendar.
//! Every function takes the item's `ignore_non_working_days` flag; when it
//! is false only working days count.

use chrono::NaiveDate;
use serde::Serialize;

use super::calendar::WorkingDayCalendar;

/// Inclusive duration of `[start, due]`
pub fn duration(
    calendar: &WorkingDayCalendar,
    start: NaiveDate,
    due: NaiveDate,
    ignore_non_working_days: bool,
) -> u32 {
    calendar.count_days(start, due, !ignore_non_working_days)
}

/// Due date of an item starting at `start` that lasts `duration` days
///
/// A start on a non-working day is counted from the next working day.
/// A duration of 0 behaves like 1.
pub fn due_from(
    calendar: &WorkingDayCalendar,
    start: NaiveDate,
    duration: u32,
    ignore_non_working_days: bool,
) -> NaiveDate {
    let skip = !ignore_non_working_days;
    let first = if skip {
        calendar.next_working_day(start)
    } else {
        start
    };
    calendar.shift(first, steps(duration), skip)
}

/// Start date of an item ending at `due` that lasts `duration` days
pub fn start_from(
    calendar: &WorkingDayCalendar,
    due: NaiveDate,
    duration: u32,
    ignore_non_working_days: bool,
) -> NaiveDate {
    let skip = !ignore_non_working_days;
    let last = if skip {
        calendar.previous_working_day(due)
    } else {
        due
    };
    calendar.shift(last, -steps(duration), skip)
}

fn steps(duration: u32) -> i32 {
    i32::try_from(duration.saturating_sub(1)).unwrap_or(i32::MAX)
}

/// A start/due pair with its derived duration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DateSpan {
    pub start: NaiveDate,
    pub due: NaiveDate,
    pub duration: u32,
}

impl DateSpan {
    /// Builds a span from both ends, deriving the duration
    ///
    /// Returns `None` if `due < start`.
    pub fn between(
        calendar: &WorkingDayCalendar,
        start: NaiveDate,
        due: NaiveDate,
        ignore_non_working_days: bool,
    ) -> Option<Self> {
        if due < start {
            return None;
        }
        Some(Self {
            start,
            due,
            duration: duration(calendar, start, due, ignore_non_working_days),
        })
    }

    /// Builds a span from its start and length
    pub fn starting_at(
        calendar: &WorkingDayCalendar,
        start: NaiveDate,
        length: u32,
        ignore_non_working_days: bool,
    ) -> Self {
        let due = due_from(calendar, start, length, ignore_non_working_days);
        Self {
            start,
            due,
            duration: duration(calendar, start, due, ignore_non_working_days),
        }
    }

    /// Builds a span from its due date and length
    pub fn ending_at(
        calendar: &WorkingDayCalendar,
        due: NaiveDate,
        length: u32,
        ignore_non_working_days: bool,
    ) -> Self {
        let start = start_from(calendar, due, length, ignore_non_working_days);
        Self {
            start,
            due,
            duration: duration(calendar, start, due, ignore_non_working_days),
        }
    }

    /// Returns true if the stored duration matches the dates under the calendar
    pub fn is_consistent(
        &self,
        calendar: &WorkingDayCalendar,
        ignore_non_working_days: bool,
    ) -> bool {
        self.due >= self.start
            && self.duration == duration(calendar, self.start, self.due, ignore_non_working_days)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::calendar::WorkingDayConfig;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn cal() -> WorkingDayCalendar {
        WorkingDayCalendar::new(&WorkingDayConfig::default()).unwrap()
    }

    #[test]
    fn due_from_skips_weekend() {
        // Fri + 3 working days = Fri, Mon, Tue
        assert_eq!(due_from(&cal(), date(2025, 1, 3), 3, false), date(2025, 1, 7));
        assert_eq!(due_from(&cal(), date(2025, 1, 3), 3, true), date(2025, 1, 5));
    }

    #[test]
    fn due_from_single_day() {
        assert_eq!(due_from(&cal(), date(2025, 1, 6), 1, false), date(2025, 1, 6));
        assert_eq!(due_from(&cal(), date(2025, 1, 6), 0, false), date(2025, 1, 6));
    }

    #[test]
    fn due_from_weekend_start_counts_from_monday() {
        assert_eq!(due_from(&cal(), date(2025, 1, 4), 2, false), date(2025, 1, 7));
    }

    #[test]
    fn start_from_mirrors_due_from() {
        assert_eq!(start_from(&cal(), date(2025, 1, 7), 3, false), date(2025, 1, 3));
        assert_eq!(start_from(&cal(), date(2025, 1, 5), 3, true), date(2025, 1, 3));
        // A Sunday due date counts back from Friday
        assert_eq!(start_from(&cal(), date(2025, 1, 5), 2, false), date(2025, 1, 2));
    }

    #[test]
    fn duration_depends_on_flag() {
        let (start, due) = (date(2025, 1, 16), date(2025, 1, 24));
        assert_eq!(duration(&cal(), start, due, false), 7);
        assert_eq!(duration(&cal(), start, due, true), 9);
    }

    #[test]
    fn span_between_rejects_inverted() {
        assert!(DateSpan::between(&cal(), date(2025, 1, 8), date(2025, 1, 6), false).is_none());
    }

    #[test]
    fn span_starting_at_is_consistent() {
        let span = DateSpan::starting_at(&cal(), date(2025, 1, 3), 3, false);
        assert_eq!(span.due, date(2025, 1, 7));
        assert_eq!(span.duration, 3);
        assert!(span.is_consistent(&cal(), false));
        assert!(!span.is_consistent(&cal(), true));
    }

    #[test]
    fn span_ending_at() {
        let span = DateSpan::ending_at(&cal(), date(2025, 1, 7), 3, false);
        assert_eq!(span.start, date(2025, 1, 3));
        assert_eq!(span.duration, 3);
    }
}
