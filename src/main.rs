//! autosched - Automatic scheduling for hierarchical, related work items

use std::process::ExitCode;

fn main() -> ExitCode {
    if let Err(e) = autosched::cli::run() {
        eprintln!("Error: {:#}", e);
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}
