//! yb_release - release packaging for the platform control plane.
//!
//! Builds release tarballs, assembles the platform image from component
//! packages, and renders the replicated config.

use std::process;
use yb_release::cli;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    process::exit(cli::run().await);
}
