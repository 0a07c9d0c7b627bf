//! Staging tree for image builds.
//!
//! Acquired packages are laid out as `{root}/{component}/{file}`, or
//! `{root}/{component}/{version}/{file}` for the version-namespaced
//! component. The tree belongs to a single pipeline run and is removed when
//! its [`StagingTree`] handle is dropped.

mod acquirer;

pub use acquirer::{AcquiredPackages, ArtifactAcquirer};

use crate::package::ComponentPackageRef;
use std::path::{Path, PathBuf};

/// Scoped handle over the staging directory.
///
/// Dropping the handle removes the whole tree, on success, on an early
/// error return, or while unwinding from a panic.
#[derive(Debug)]
pub struct StagingTree {
    root: PathBuf,
}

impl StagingTree {
    /// Create (or reuse) the staging root
    pub fn create(root: impl Into<PathBuf>) -> std::io::Result<Self> {
        let root = root.into();
        std::fs::create_dir_all(&root)?;
        log::debug!("Staging tree created at {}", root.display());
        Ok(Self { root })
    }

    /// Root directory of the tree
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory a package is staged into
    pub fn package_dir(&self, package: &ComponentPackageRef) -> PathBuf {
        let dir = self.root.join(package.component.as_str());
        match (&package.version, package.component.is_version_namespaced()) {
            (Some(version), true) => dir.join(version),
            _ => dir,
        }
    }
}

impl Drop for StagingTree {
    fn drop(&mut self) {
        // Drop must not panic; a failed removal is only reported
        match std::fs::remove_dir_all(&self.root) {
            Ok(()) => log::info!("Removed staging tree {}", self.root.display()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => log::warn!(
                "Failed to remove staging tree {}: {}. Remove it manually.",
                self.root.display(),
                e
            ),
        }
    }
}
