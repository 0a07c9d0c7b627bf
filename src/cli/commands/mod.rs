//! Release type handlers.
//!
//! Each release type is an independent handler; [`execute_command`]
//! validates the arguments and dispatches exactly once.

mod docker;
mod file;
mod replicated;

use crate::cli::{Args, ReleaseType, RuntimeConfig};
use crate::error::ReleaseError;

use docker::execute_docker_release;
use file::execute_file_release;
use replicated::execute_replicated_release;

/// Execute the selected release type, returning the process exit code
pub async fn execute_command(args: Args) -> i32 {
    let config = RuntimeConfig::from(&args);

    if let Err(e) = args.validate() {
        report_failure(&config, args.release_type, &ReleaseError::from(e));
        return 1;
    }

    let release = args.release_config();
    let result = match args.release_type {
        ReleaseType::File => execute_file_release(&args, &config, &release).await,
        ReleaseType::Docker => execute_docker_release(&args, &config, &release).await,
        ReleaseType::Replicated => execute_replicated_release(&args, &config, &release).await,
    };

    match result {
        Ok(()) => 0,
        Err(e) => {
            report_failure(&config, args.release_type, &e);
            1
        }
    }
}

fn report_failure(config: &RuntimeConfig, release_type: ReleaseType, error: &ReleaseError) {
    let summary = failure_summary(release_type, error);
    log::error!("{}", summary);
    if !error.is_domain_error() {
        log::debug!("{:?}", error);
    }
    config.error_println(&summary);

    if let Some(output) = error.captured_output() {
        config.error_println("Last tool output:");
        for line in output.lines() {
            config.error_detail(line);
        }
    }

    let suggestions = error.recovery_suggestions();
    if !suggestions.is_empty() {
        config.warning_println("Recovery suggestions:");
        for suggestion in suggestions {
            config.indent(&format!("• {}", suggestion));
        }
    }
}

/// Invalid input is "rejected"; tool, OS and registry failures "failed"
fn failure_summary(release_type: ReleaseType, error: &ReleaseError) -> String {
    if error.is_domain_error() {
        format!("{} release rejected: {}", release_type, error)
    } else {
        format!("{} release failed: {}", release_type, error)
    }
}
