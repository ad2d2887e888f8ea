//! # Command-Line Interface
//!
//! Thin adapter over the scheduling engine: reads JSON inputs, loads the
//! calendar from configuration and prints results.
//!
//! ## Commands
//!
//! | Command | Purpose |
//! |---------|---------|
//! | `resolve <request.json> [--commit]` | Run one resolution call |
//! | `check <snapshot.json>` | Validate a snapshot |
//! | `calendar is-working\|shift\|count` | Query the working-day calendar |
//!
//! ## Output Formats
//!
//! All commands support `--format`:
//! - `text` (default) - Human-readable output
//! - `json` - Machine-parseable JSON
//!
//! ## Logging
//!
//! Logs go to stderr. `--verbose` enables debug logs; `AUTOSCHED_LOG`
//! takes an `EnvFilter` directive and `AUTOSCHED_LOG_FORMAT=json` switches
//! to JSON lines.
//!
//! ## Entry Point
//!
//! Call [`run()`] to parse arguments and execute the appropriate command.

mod app;
mod calendar_cmd;
mod check;
mod output;
mod resolve;

pub use app::{run, Cli, Commands};
pub use output::{Output, OutputFormat};
