//! Error types for yb_release operations.
//!
//! Every failure the orchestrator can hit is a variant of [`ReleaseError`].
//! Domain families (configuration, manifest resolution, package names,
//! payload extraction, image assembly) get their own enums so the top-level
//! handler can attach a targeted hint, while OS and process failures flow
//! through the same handler untouched.

use crate::package::Component;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for yb_release operations
pub type Result<T> = std::result::Result<T, ReleaseError>;

/// Main error type for all yb_release operations
#[derive(Error, Debug)]
pub enum ReleaseError {
    /// Contradictory or insufficient selection flags
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Release metadata lookup failed
    #[error("Manifest error: {0}")]
    Manifest(#[from] ManifestError),

    /// A package filename did not match the expected layout
    #[error("Package name error: {0}")]
    PackageName(#[from] PackageNameError),

    /// Payload extraction failed
    #[error("Payload error: {0}")]
    Payload(#[from] PayloadError),

    /// Image build or push failed
    #[error("Image error: {0}")]
    Image(#[from] ImageError),

    /// Remote object store failure
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Local destination for the file release is unusable
    #[error("Destination error: {0}")]
    Destination(#[from] DestinationError),

    /// An external build tool failed
    #[error("Tool error: {0}")]
    Tool(#[from] ToolError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON decoding errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Configuration errors, reported before any external call is made
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Neither a tag nor explicit packages were supplied
    #[error("--tag or --packages is required for {variant} release")]
    MissingSelection {
        /// Release variant that needed a selection
        variant: String,
    },

    /// A tag is required but was not supplied
    #[error("--tag is required for {variant} release")]
    MissingTag {
        /// Release variant that needed the tag
        variant: String,
    },

    /// `--packages` was given for a variant that does not consume it
    #[error("--packages is only supported for docker release, not {variant}")]
    PackagesNotSupported {
        /// Release variant that rejected the packages
        variant: String,
    },

    /// Explicit packages did not cover every required component
    #[error("Required packages {required:?} not specified (missing: {missing:?})")]
    IncompleteManifest {
        /// Components with no matching package
        missing: Vec<Component>,
        /// Every required component
        required: Vec<Component>,
    },

    /// More than one package was supplied for the same component
    #[error("More than one package supplied for component '{component}'")]
    DuplicateComponent {
        /// Component that appeared twice
        component: Component,
    },
}

/// Release metadata resolution errors
#[derive(Error, Debug)]
pub enum ManifestError {
    /// The metadata source does not know the tag
    #[error("Invalid release tag provided: '{tag}'")]
    UnknownTag {
        /// Release tag
        tag: String,
    },

    /// The metadata source could not be reached or returned garbage
    #[error("Release metadata for '{tag}' unavailable: {reason}")]
    Unreachable {
        /// Release tag
        tag: String,
        /// Reason for the error
        reason: String,
    },

    /// The tag resolved, but not to exactly one package per component
    #[error("Release '{tag}' does not list exactly one package per component: {reason}")]
    Incomplete {
        /// Release tag
        tag: String,
        /// Reason for the error
        reason: String,
    },
}

/// Package filename parsing errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PackageNameError {
    /// The filename does not follow `<component>-[<version>-]<commit>.tar.gz`
    #[error("Invalid package name format: {filename}")]
    Malformed {
        /// Offending filename
        filename: String,
    },

    /// The leading token is not one of the required components
    #[error("Invalid package name {filename}: unknown component '{component}'")]
    UnknownComponent {
        /// Offending filename
        filename: String,
        /// Component token found in the name
        component: String,
    },

    /// Strict parsing requires a version token
    #[error("Invalid package name {filename}: missing version")]
    MissingVersion {
        /// Offending filename
        filename: String,
    },
}

/// Payload extraction errors
#[derive(Error, Debug)]
pub enum PayloadError {
    /// No archive entry matched the marker
    #[error("No entry matching '{marker}' found in {}", .archive.display())]
    NotFound {
        /// Archive that was searched
        archive: PathBuf,
        /// Substring every candidate entry was tested against
        marker: String,
    },

    /// An archive entry would land outside the destination directory
    #[error("Archive entry escapes destination: {path}")]
    PathTraversal {
        /// Entry path from the archive
        path: String,
    },

    /// Reading the archive failed
    #[error("Failed to read archive {}: {source}", .archive.display())]
    Io {
        /// Archive being read
        archive: PathBuf,
        /// Underlying IO error
        #[source]
        source: std::io::Error,
    },
}

/// A single failed registry push
#[derive(Debug, Clone)]
pub struct PushFailure {
    /// Destination tag that failed
    pub remote_tag: String,
    /// Reason for the failure
    pub reason: String,
    /// Captured tool output, if any
    pub output: Option<String>,
}

/// Image assembly errors
#[derive(Error, Debug)]
pub enum ImageError {
    /// `docker build` failed
    #[error("Image build failed for '{image}': {reason}")]
    BuildFailed {
        /// Local image name
        image: String,
        /// Reason for the error
        reason: String,
        /// Captured tool output
        output: Option<String>,
    },

    /// One or more pushes failed
    #[error("Image push failed for tag(s) {}", remote_tags(.failures))]
    PushFailed {
        /// Every push that failed, in attempt order
        failures: Vec<PushFailure>,
    },
}

fn remote_tags(failures: &[PushFailure]) -> String {
    failures
        .iter()
        .map(|f| f.remote_tag.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Remote object store errors
#[derive(Error, Debug)]
pub enum StoreError {
    /// Download failed
    #[error("Failed to download '{object}': {reason}")]
    DownloadFailed {
        /// Object key
        object: String,
        /// Reason for the error
        reason: String,
        /// Captured tool output
        output: Option<String>,
    },

    /// Upload failed
    #[error("Failed to upload {}: {reason}", .path.display())]
    UploadFailed {
        /// Local file being uploaded
        path: PathBuf,
        /// Reason for the error
        reason: String,
        /// Captured tool output
        output: Option<String>,
    },
}

/// File-release destination errors
#[derive(Error, Debug)]
pub enum DestinationError {
    /// Destination does not exist or is not a directory
    #[error("Destination {} not a directory.", .path.display())]
    NotADirectory {
        /// Destination supplied by the caller
        path: PathBuf,
    },
}

/// External process errors
#[derive(Error, Debug)]
pub enum ToolError {
    /// The process could not be started
    #[error("Failed to run '{command}': {source}")]
    Spawn {
        /// Command line
        command: String,
        /// Underlying IO error
        #[source]
        source: std::io::Error,
    },

    /// The process exited unsuccessfully
    #[error("Command '{command}' failed with exit code {code}")]
    Failed {
        /// Command line
        command: String,
        /// Exit code, -1 when killed by a signal
        code: i32,
        /// Captured stdout and stderr
        output: String,
    },
}

impl ToolError {
    /// Output captured from the failed process, if it ran at all
    pub fn output(&self) -> Option<&str> {
        match self {
            ToolError::Failed { output, .. } if !output.trim().is_empty() => Some(output),
            _ => None,
        }
    }
}

impl ReleaseError {
    /// Most recent output captured from an external tool, for the error log
    pub fn captured_output(&self) -> Option<&str> {
        match self {
            ReleaseError::Tool(e) => e.output(),
            ReleaseError::Image(ImageError::BuildFailed { output, .. }) => output.as_deref(),
            ReleaseError::Image(ImageError::PushFailed { failures }) => {
                failures.iter().rev().find_map(|f| f.output.as_deref())
            }
            ReleaseError::Store(StoreError::DownloadFailed { output, .. })
            | ReleaseError::Store(StoreError::UploadFailed { output, .. }) => output.as_deref(),
            _ => None,
        }
    }

    /// Get actionable recovery suggestions for this error
    pub fn recovery_suggestions(&self) -> Vec<String> {
        match self {
            ReleaseError::Config(ConfigError::IncompleteManifest { required, .. }) => vec![
                format!(
                    "Pass one package per component: {}",
                    required
                        .iter()
                        .map(|c| c.as_str())
                        .collect::<Vec<_>>()
                        .join(", ")
                ),
                "ex. --packages devops-<sha>.tar.gz yugaware-<sha>.tar.gz yugabyte-<version>-<sha>.tar.gz"
                    .to_string(),
            ],
            ReleaseError::Config(ConfigError::MissingSelection { .. }) => vec![
                "Use --tag <release> to download packages for a published release".to_string(),
                "Use --packages <path...> to build from local packages".to_string(),
            ],
            ReleaseError::Manifest(ManifestError::UnknownTag { .. }) => {
                vec!["Invalid release tag provided.".to_string()]
            }
            ReleaseError::Manifest(ManifestError::Unreachable { .. }) => vec![
                "Check network access to the release metadata endpoint".to_string(),
                "Override the endpoint with --metadata-url".to_string(),
            ],
            ReleaseError::Payload(PayloadError::NotFound { marker, .. }) => vec![format!(
                "Ensure the yugabyte package was built with {} included",
                marker
            )],
            ReleaseError::Image(_) => vec![
                "Check that the docker daemon is running: docker info".to_string(),
                "Check registry credentials: docker login".to_string(),
            ],
            _ => Vec::new(),
        }
    }

    /// Whether this error comes from the release domain rather than the OS
    pub fn is_domain_error(&self) -> bool {
        matches!(
            self,
            ReleaseError::Config(_)
                | ReleaseError::Manifest(_)
                | ReleaseError::PackageName(_)
                | ReleaseError::Payload(_)
                | ReleaseError::Destination(_)
        )
    }
}
