//! # Storage Layer
//!
//! File-backed inputs for the CLI. The scheduling engine itself never
//! touches the filesystem.
//!
//! | Data | Format | Location |
//! |------|--------|----------|
//! | Config | TOML | `autosched.toml` (walked up from cwd), then global config dir |
//! | Resolve request | JSON | path given to `autosched resolve` |
//! | Snapshot | JSON | path given to `autosched check` |
//!
//! ## Key Types
//!
//! - [`Config`] - Calendar and output settings
//! - [`ResolveRequest`] - Snapshot, trigger and optional calendar override

mod config;
mod request;

pub use config::{Config, ConfigError, OutputConfig, OutputFormat, PROJECT_CONFIG_FILE};
pub use request::{load_snapshot, ResolveRequest};
