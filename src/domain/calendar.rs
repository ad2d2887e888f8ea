//! Working-day calendar
//!
//! Answers "is this a working day?" and moves dates by working or
//! calendar days. A day is working iff:
//! - its weekday is not configured as non-working, AND
//! - it is not listed as a non-working date (holiday, shutdown).
//!
//! The configuration is read once per resolution call and never changes
//! while the engine runs.

use std::collections::BTreeSet;
use std::ops::Bound;

use chrono::{Datelike, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum CalendarError {
    #[error("Every weekday is configured as non-working")]
    NoWorkingWeekdays,
}

/// Serializable working-day configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkingDayConfig {
    /// Weekdays that never count as working days
    #[serde(with = "weekday_names")]
    pub non_working_weekdays: Vec<Weekday>,

    /// Individual dates that are non-working regardless of weekday
    pub non_working_dates: Vec<NaiveDate>,
}

impl Default for WorkingDayConfig {
    fn default() -> Self {
        Self {
            non_working_weekdays: vec![Weekday::Sat, Weekday::Sun],
            non_working_dates: Vec::new(),
        }
    }
}

impl WorkingDayConfig {
    /// Every day of the week is a working day
    pub fn seven_day_week() -> Self {
        Self {
            non_working_weekdays: Vec::new(),
            non_working_dates: Vec::new(),
        }
    }

    /// Adds a non-working date
    pub fn with_non_working_date(mut self, date: NaiveDate) -> Self {
        self.non_working_dates.push(date);
        self
    }
}

/// Validated, query-ready calendar
#[derive(Debug, Clone)]
pub struct WorkingDayCalendar {
    /// Indexed by `Weekday::num_days_from_monday`
    working_weekdays: [bool; 7],
    working_per_week: i64,
    non_working_dates: BTreeSet<NaiveDate>,
}

impl WorkingDayCalendar {
    /// Builds a calendar, rejecting configurations without any working weekday
    pub fn new(config: &WorkingDayConfig) -> Result<Self, CalendarError> {
        let mut working_weekdays = [true; 7];
        for weekday in &config.non_working_weekdays {
            working_weekdays[weekday.num_days_from_monday() as usize] = false;
        }

        let working_per_week = working_weekdays.iter().filter(|w| **w).count() as i64;
        if working_per_week == 0 {
            return Err(CalendarError::NoWorkingWeekdays);
        }

        Ok(Self {
            working_weekdays,
            working_per_week,
            non_working_dates: config.non_working_dates.iter().copied().collect(),
        })
    }

    fn is_working_weekday(&self, date: NaiveDate) -> bool {
        self.working_weekdays[date.weekday().num_days_from_monday() as usize]
    }

    /// Returns true if `date` counts as a working day
    pub fn is_working_day(&self, date: NaiveDate) -> bool {
        self.is_working_weekday(date) && !self.non_working_dates.contains(&date)
    }

    /// Moves `date` by `n` steps
    ///
    /// With `skip_non_working` a step lands only on working days, so
    /// `shift(friday, 1, true)` is the following Monday on a Mon-Fri week.
    /// `n = 0` returns `date` unchanged, even if it is non-working.
    /// Results past the representable range clamp to `NaiveDate::MIN`/`MAX`.
    pub fn shift(&self, date: NaiveDate, n: i32, skip_non_working: bool) -> NaiveDate {
        let forward = n > 0;
        let sign: i64 = if forward { 1 } else { -1 };
        let limit = if forward { NaiveDate::MAX } else { NaiveDate::MIN };

        if !skip_non_working {
            return date
                .checked_add_signed(chrono::Duration::days(i64::from(n)))
                .unwrap_or(limit);
        }

        let mut remaining = i64::from(n.unsigned_abs());
        let mut current = date;

        // Jump whole weeks, leaving at least one step to walk
        while remaining > self.working_per_week {
            let weeks = (remaining - 1) / self.working_per_week;
            let Some(target) =
                current.checked_add_signed(chrono::Duration::days(sign * weeks * 7))
            else {
                return limit;
            };
            remaining -= weeks * self.working_per_week - self.holidays_crossed(current, target);
            current = target;
        }

        while remaining > 0 {
            let next = if forward {
                current.succ_opt()
            } else {
                current.pred_opt()
            };
            let Some(next) = next else {
                break;
            };
            current = next;

            if self.is_working_day(current) {
                remaining -= 1;
            }
        }

        current
    }

    /// Holidays on working weekdays passed when moving from `from` to `to`
    ///
    /// `from` itself is excluded, `to` included.
    fn holidays_crossed(&self, from: NaiveDate, to: NaiveDate) -> i64 {
        let range = if from < to {
            (Bound::Excluded(from), Bound::Included(to))
        } else {
            (Bound::Included(to), Bound::Excluded(from))
        };

        self.non_working_dates
            .range::<NaiveDate, _>(range)
            .filter(|d| self.is_working_weekday(**d))
            .count() as i64
    }

    /// Counts days in `[start, due]`, inclusive
    ///
    /// Returns 0 when `due < start`.
    pub fn count_days(&self, start: NaiveDate, due: NaiveDate, skip_non_working: bool) -> u32 {
        if due < start {
            return 0;
        }

        let total = (due - start).num_days() + 1;
        if !skip_non_working {
            return u32::try_from(total).unwrap_or(u32::MAX);
        }

        let full_weeks = total / 7;
        let mut count = full_weeks * self.working_per_week;

        let mut cursor = start + chrono::Duration::days(full_weeks * 7);
        while cursor <= due {
            if self.is_working_weekday(cursor) {
                count += 1;
            }
            match cursor.succ_opt() {
                Some(next) => cursor = next,
                None => break,
            }
        }

        let holidays = self
            .non_working_dates
            .range(start..=due)
            .filter(|d| self.is_working_weekday(**d))
            .count() as i64;

        u32::try_from(count - holidays).unwrap_or(u32::MAX)
    }

    /// Returns `date` if it is a working day, else the next working day
    pub fn next_working_day(&self, date: NaiveDate) -> NaiveDate {
        let mut current = date;
        while !self.is_working_day(current) {
            match current.succ_opt() {
                Some(next) => current = next,
                None => break,
            }
        }
        current
    }

    /// Returns `date` if it is a working day, else the previous working day
    pub fn previous_working_day(&self, date: NaiveDate) -> NaiveDate {
        let mut current = date;
        while !self.is_working_day(current) {
            match current.pred_opt() {
                Some(prev) => current = prev,
                None => break,
            }
        }
        current
    }
}

/// Parses a weekday name: `mon`, `Monday`, `TUES`, ...
pub fn parse_weekday(value: &str) -> Option<Weekday> {
    match value.trim().to_ascii_lowercase().as_str() {
        "mon" | "monday" => Some(Weekday::Mon),
        "tue" | "tues" | "tuesday" => Some(Weekday::Tue),
        "wed" | "wednesday" => Some(Weekday::Wed),
        "thu" | "thurs" | "thursday" => Some(Weekday::Thu),
        "fri" | "friday" => Some(Weekday::Fri),
        "sat" | "saturday" => Some(Weekday::Sat),
        "sun" | "sunday" => Some(Weekday::Sun),
        _ => None,
    }
}

fn weekday_name(weekday: Weekday) -> &'static str {
    match weekday {
        Weekday::Mon => "mon",
        Weekday::Tue => "tue",
        Weekday::Wed => "wed",
        Weekday::Thu => "thu",
        Weekday::Fri => "fri",
        Weekday::Sat => "sat",
        Weekday::Sun => "sun",
    }
}

mod weekday_names {
    use chrono::Weekday;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(weekdays: &[Weekday], serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_seq(weekdays.iter().map(|w| super::weekday_name(*w)))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Vec<Weekday>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let names = Vec::<String>::deserialize(deserializer)?;
        names
            .iter()
            .map(|name| {
                super::parse_weekday(name).ok_or_else(|| {
                    serde::de::Error::custom(format!("unknown weekday '{}'", name))
                })
            })
            .collect()
    }
}
