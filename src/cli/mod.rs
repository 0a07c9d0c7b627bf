//! Command line interface for yb_release.
//!
//! Parses arguments, validates the selection flags, and dispatches once to
//! the handler of the selected release type.

mod args;
pub mod commands;
mod output;

pub use args::{Args, ReleaseType, RuntimeConfig};
pub use commands::execute_command;
pub use output::OutputManager;

/// Main CLI entry point, returns the process exit code
pub async fn run() -> i32 {
    let args = Args::parse_args();
    execute_command(args).await
}
