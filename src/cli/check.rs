//! Check command
//!
//! Validates a snapshot the way a resolution call would and reports
//! what it contains.

use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::warn;

use super::output::Output;
use crate::domain::{RelationGraph, WorkItemId};
use crate::storage::{self, Config};

#[derive(Debug, Serialize)]
struct CheckReport {
    valid: bool,
    items: usize,
    automatic: usize,
    relations: usize,
    hierarchy_edges: usize,
    roots: usize,
    /// Longest chain of ancestors above any item
    max_depth: usize,
    inconsistent_durations: Vec<WorkItemId>,
}

impl CheckReport {
    fn from_graph(graph: &RelationGraph, inconsistent_durations: Vec<WorkItemId>) -> Self {
        let slots = 0..graph.len();
        Self {
            valid: true,
            items: graph.len(),
            automatic: graph.items().iter().filter(|i| i.is_automatic()).count(),
            relations: slots.clone().map(|s| graph.predecessors(s).len()).sum(),
            hierarchy_edges: slots.clone().map(|s| graph.children(s).len()).sum(),
            roots: slots.clone().filter(|s| graph.parent(*s).is_none()).count(),
            max_depth: slots.map(|s| graph.ancestors(s).len()).max().unwrap_or(0),
            inconsistent_durations,
        }
    }
}

/// Validates a snapshot file and prints a summary
pub fn run(output: &Output, config: &Config, path: &Path) -> Result<()> {
    let snapshot = storage::load_snapshot(path)?;
    let calendar = config.working_calendar()?;

    let graph = snapshot
        .to_graph()
        .with_context(|| format!("Invalid snapshot: {}", path.display()))?;
    graph
        .dependency_order()
        .with_context(|| format!("Invalid snapshot: {}", path.display()))?;

    let inconsistent = snapshot.inconsistent_durations(&calendar);
    for id in &inconsistent {
        warn!(item = %id, "stored duration disagrees with dates");
    }

    let report = CheckReport::from_graph(&graph, inconsistent);

    if output.is_json() {
        output.data(&report);
        return Ok(());
    }

    println!("Snapshot OK: {}", path.display());
    println!("  Items:           {} ({} automatic)", report.items, report.automatic);
    println!("  Relations:       {}", report.relations);
    println!("  Hierarchy edges: {}", report.hierarchy_edges);
    println!("  Roots:           {}", report.roots);
    println!("  Max depth:       {}", report.max_depth);
    if !report.inconsistent_durations.is_empty() {
        let ids: Vec<String> = report
            .inconsistent_durations
            .iter()
            .map(|id| id.to_string())
            .collect();
        println!("  Duration drift:  {}", ids.join(", "));
    }

    Ok(())
}
