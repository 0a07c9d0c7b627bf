//! Command line argument parsing and validation.

use crate::error::ConfigError;
use crate::{ReleaseConfig, store};
use clap::{Parser, ValueEnum};
use std::fmt;
use std::path::PathBuf;

/// Release variant selected with `--type`
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ReleaseType {
    /// Build and publish the control-plane tarball
    File,
    /// Assemble the platform image from component packages
    Docker,
    /// Render the replicated config for a release
    Replicated,
}

impl ReleaseType {
    /// Name as accepted by `--type`
    pub fn as_str(self) -> &'static str {
        match self {
            ReleaseType::File => "file",
            ReleaseType::Docker => "docker",
            ReleaseType::Replicated => "replicated",
        }
    }
}

impl fmt::Display for ReleaseType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Release packaging for the platform control plane
#[derive(Parser, Debug)]
#[command(
    name = "yb_release",
    version,
    about = "Build, assemble and publish platform releases",
    long_about = "Build, assemble and publish platform releases.

Usage:
  yb_release --publish
  yb_release --destination /releases
  yb_release --type docker --tag 2.3.0.0 --publish
  yb_release --type docker --packages devops-<sha>.tar.gz yugaware-<sha>.tar.gz yugabyte-<version>-<sha>.tar.gz
  yb_release --type replicated --tag 2.3.0.0"
)]
pub struct Args {
    /// Release type
    #[arg(long = "type", value_enum, default_value_t = ReleaseType::File)]
    pub release_type: ReleaseType,

    /// Publish the release (upload to S3 or push the image)
    #[arg(long)]
    pub publish: bool,

    /// Copy the release file to this directory
    #[arg(long, value_name = "DIR")]
    pub destination: Option<PathBuf>,

    /// Release tag name
    #[arg(long)]
    pub tag: Option<String>,

    /// Release packages, ex. devops-<sha>.tar.gz yugaware-<sha>.tar.gz yugabyte-<version>-<sha>.tar.gz
    #[arg(long, num_args = 1.., value_name = "PATH")]
    pub packages: Vec<PathBuf>,

    /// Project directory holding the Dockerfile, ui/ and the sbt build
    #[arg(long, env = "YB_RELEASE_PROJECT_DIR", default_value = ".")]
    pub project_dir: PathBuf,

    /// Release bucket
    #[arg(long, env = "YB_RELEASE_BUCKET", default_value = store::DEFAULT_RELEASE_BUCKET)]
    pub bucket: String,

    /// Base URL of the release metadata source
    #[arg(long, env = "YB_RELEASE_METADATA_URL", default_value = crate::DEFAULT_METADATA_URL)]
    pub metadata_url: String,

    /// Registry namespace images are pushed to
    #[arg(long, env = "YB_RELEASE_REGISTRY", default_value = crate::image::DEFAULT_REGISTRY)]
    pub registry: String,

    /// Local image name
    #[arg(long, env = "YB_RELEASE_IMAGE_NAME", default_value = crate::image::DEFAULT_IMAGE_NAME)]
    pub image_name: String,

    /// Directory the replicated config is written to
    #[arg(long, env = "YB_RELEASE_OUTPUT_DIR", default_value = crate::DEFAULT_OUTPUT_DIR)]
    pub output_dir: PathBuf,

    /// Show detailed progress
    #[arg(short, long)]
    pub verbose: bool,
}

impl Args {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Cross-flag checks, run before any external call
    pub fn validate(&self) -> Result<(), ConfigError> {
        let variant = self.release_type.to_string();
        let has_tag = self.tag.as_deref().is_some_and(|t| !t.trim().is_empty());

        match self.release_type {
            ReleaseType::Docker => {
                if !has_tag && self.packages.is_empty() {
                    return Err(ConfigError::MissingSelection { variant });
                }
            }
            ReleaseType::Replicated => {
                if !self.packages.is_empty() {
                    return Err(ConfigError::PackagesNotSupported { variant });
                }
                if !has_tag {
                    return Err(ConfigError::MissingTag { variant });
                }
            }
            ReleaseType::File => {
                if !self.packages.is_empty() {
                    return Err(ConfigError::PackagesNotSupported { variant });
                }
            }
        }

        Ok(())
    }

    /// Settings shared by every release type
    pub fn release_config(&self) -> ReleaseConfig {
        ReleaseConfig {
            project_dir: self.project_dir.clone(),
            bucket: self.bucket.clone(),
            metadata_url: self.metadata_url.clone(),
            registry: self.registry.clone(),
            image_name: self.image_name.clone(),
            output_dir: self.output_dir.clone(),
            ..ReleaseConfig::default()
        }
    }
}

/// Configuration derived from command line arguments
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    output: super::OutputManager,
}

impl RuntimeConfig {
    /// Create runtime configuration
    pub fn new(verbose: bool) -> Self {
        Self {
            output: super::OutputManager::new(verbose),
        }
    }

    /// Print a section header
    pub fn section(&self, title: &str) {
        let _ = self.output.section(title);
    }

    /// Print progress message
    pub fn progress(&self, message: &str) {
        let _ = self.output.progress(message);
    }

    /// Print verbose message (only with --verbose)
    pub fn verbose_println(&self, message: &str) {
        let _ = self.output.verbose(message);
    }

    /// Print error message (always shown)
    pub fn error_println(&self, message: &str) {
        let _ = self.output.error(message);
    }

    /// Print an indented line under an error (always shown)
    pub fn error_detail(&self, message: &str) {
        let _ = self.output.error_detail(message);
    }

    /// Print warning message
    pub fn warning_println(&self, message: &str) {
        let _ = self.output.warn(message);
    }

    /// Print success message
    pub fn success_println(&self, message: &str) {
        let _ = self.output.success(message);
    }

    /// Print indented text
    pub fn indent(&self, message: &str) {
        let _ = self.output.indent(message);
    }
}

impl From<&Args> for RuntimeConfig {
    fn from(args: &Args) -> Self {
        Self::new(args.verbose)
    }
}
