//! # yb_release
//!
//! Release packaging for the platform's control plane.
//!
//! A release is made of one package per component (`devops`, `yugaware`,
//! `yugabyte`). This crate resolves which packages belong to a release,
//! stages them, extracts the load-tester payload from the database package,
//! builds the platform image and publishes it.
//!
//! ## Release types
//!
//! - **file**: build the control plane with `sbt`/`npm` and publish the
//!   resulting tarball to the release bucket, or copy it to a directory
//! - **docker**: assemble the platform image from a tagged release or from
//!   local packages, optionally pushing it to the registry
//! - **replicated**: render the replicated config for a release tag
//!
//! ## Usage
//!
//! ```bash
//! yb_release --publish                                  # file release to S3
//! yb_release --type docker --tag 2.3.0.0 --publish      # tagged image
//! yb_release --type docker --packages devops-*.tar.gz yugaware-*.tar.gz yugabyte-*.tar.gz
//! yb_release --type replicated --tag 2.3.0.0
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

pub mod cli;
pub mod error;
pub mod image;
pub mod manifest;
pub mod package;
pub mod payload;
pub mod pipeline;
pub mod process;
pub mod replicated;
pub mod staging;
pub mod store;

pub use cli::Args;
pub use error::{ReleaseError, Result};
pub use manifest::{ReleaseManifest, ReleaseSelection};
pub use package::{Component, ComponentPackageRef, parse_package_name};
pub use pipeline::{DockerReleaseRequest, PipelineReport, PipelineState, ReleasePipeline};
pub use staging::StagingTree;

use std::path::PathBuf;

/// Default release metadata endpoint
pub const DEFAULT_METADATA_URL: &str = "https://releases.yugabyte.com";

/// Default directory the replicated config is written to
pub const DEFAULT_OUTPUT_DIR: &str = "/tmp";

/// Settings shared by every release type
#[derive(Debug, Clone)]
pub struct ReleaseConfig {
    /// Project root holding the Dockerfile, `ui/` and the sbt build
    pub project_dir: PathBuf,
    /// Bucket release packages are downloaded from and published to
    pub bucket: String,
    /// Base URL of the release metadata source
    pub metadata_url: String,
    /// Registry namespace images are pushed to
    pub registry: String,
    /// Local image name
    pub image_name: String,
    /// Directory the replicated config is written to
    pub output_dir: PathBuf,
    /// Marker selecting the payload inside the database package
    pub payload_marker: String,
}

impl Default for ReleaseConfig {
    fn default() -> Self {
        Self {
            project_dir: PathBuf::from("."),
            bucket: store::DEFAULT_RELEASE_BUCKET.to_string(),
            metadata_url: DEFAULT_METADATA_URL.to_string(),
            registry: image::DEFAULT_REGISTRY.to_string(),
            image_name: image::DEFAULT_IMAGE_NAME.to_string(),
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            payload_marker: payload::SAMPLE_APPS_MARKER.to_string(),
        }
    }
}

impl ReleaseConfig {
    /// Staging root for docker releases
    pub fn staging_root(&self) -> PathBuf {
        self.project_dir
            .join("target")
            .join("docker")
            .join("packages")
    }
}
