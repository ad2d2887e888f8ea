//! Calendar commands
//!
//! Query the configured working-day calendar without a snapshot.

use anyhow::Result;
use chrono::NaiveDate;
use clap::Subcommand;

use super::output::Output;
use crate::storage::Config;

#[derive(Subcommand)]
pub enum CalendarCommands {
    /// Tell whether a date is a working day
    IsWorking {
        /// Date (YYYY-MM-DD)
        date: NaiveDate,
    },

    /// Move a date by a number of days
    Shift {
        /// Date (YYYY-MM-DD)
        date: NaiveDate,

        /// Steps to move, negative moves backward
        #[arg(allow_negative_numbers = true)]
        days: i32,

        /// Count calendar days instead of working days
        #[arg(long)]
        all_days: bool,
    },

    /// Count days in an inclusive range
    Count {
        /// First day (YYYY-MM-DD)
        start: NaiveDate,

        /// Last day (YYYY-MM-DD)
        due: NaiveDate,

        /// Count calendar days instead of working days
        #[arg(long)]
        all_days: bool,
    },
}

pub fn run(cmd: CalendarCommands, output: &Output, config: &Config) -> Result<()> {
    let calendar = config.working_calendar()?;

    match cmd {
        CalendarCommands::IsWorking { date } => {
            let working = calendar.is_working_day(date);
            if output.is_json() {
                output.data(&serde_json::json!({
                    "date": date,
                    "working": working,
                }));
            } else if working {
                println!("{} is a working day", date);
            } else {
                println!("{} is not a working day", date);
            }
        }

        CalendarCommands::Shift {
            date,
            days,
            all_days,
        } => {
            let result = calendar.shift(date, days, !all_days);
            if output.is_json() {
                output.data(&serde_json::json!({
                    "date": date,
                    "days": days,
                    "all_days": all_days,
                    "result": result,
                }));
            } else {
                println!("{}", result);
            }
        }

        CalendarCommands::Count {
            start,
            due,
            all_days,
        } => {
            if due < start {
                anyhow::bail!("Range ends before it starts: {} > {}", start, due);
            }
            let days = calendar.count_days(start, due, !all_days);
            if output.is_json() {
                output.data(&serde_json::json!({
                    "start": start,
                    "due": due,
                    "all_days": all_days,
                    "days": days,
                }));
            } else {
                println!("{}", days);
            }
        }
    }

    Ok(())
}
