//! Resolve command

use std::path::Path;

use anyhow::{Context, Result};
use tracing::info;

use super::output::Output;
use crate::schedule::{Change, ChangeSet, Scheduler};
use crate::storage::{Config, ResolveRequest};

/// Resolves a request file and prints the change set or committed snapshot
pub fn run(output: &Output, config: &Config, path: &Path, commit: bool) -> Result<()> {
    let request = ResolveRequest::load(path)?;
    let calendar = request.calendar_or(&config.calendar);

    let scheduler = Scheduler::new(calendar).context("Invalid calendar")?;
    let changes = scheduler
        .resolve(&request.snapshot, &request.trigger)
        .with_context(|| format!("Cannot apply {} trigger", request.trigger.kind()))?;

    info!(
        trigger = %request.trigger.kind(),
        changes = changes.len(),
        "resolved request"
    );

    if commit {
        let mut snapshot = request.snapshot.clone();
        snapshot
            .commit(&request.trigger, &changes)
            .context("Failed to commit change set")?;
        output.data(&snapshot);
        return Ok(());
    }

    if output.is_json() {
        output.data(&changes);
    } else {
        print_changes(&changes);
    }

    Ok(())
}

fn print_changes(changes: &ChangeSet) {
    if changes.is_empty() {
        println!("No changes.");
        return;
    }

    println!(
        "{:<8} {:<12} {:<12} {:>5}  {:<10} MODE",
        "ID", "START", "DUE", "DAYS", "DAY MODE"
    );
    println!("{}", "-".repeat(60));
    for change in changes {
        println!("{}", format_change(change));
    }
    println!();
    println!("{} item(s) rescheduled", changes.len());
}

fn format_change(change: &Change) -> String {
    let date = |d: Option<chrono::NaiveDate>| d.map_or_else(|| "-".to_string(), |d| d.to_string());
    let duration = change
        .duration
        .map_or_else(|| "-".to_string(), |d| d.to_string());
    let day_mode = if change.ignore_non_working_days {
        "all days"
    } else {
        "working"
    };
    let mode = change.scheduling_mode.map_or("", |m| m.label());

    format!(
        "{:<8} {:<12} {:<12} {:>5}  {:<10} {}",
        change.id.to_string(),
        date(change.start_date),
        date(change.due_date),
        duration,
        day_mode,
        mode
    )
    .trim_end()
    .to_string()
}
