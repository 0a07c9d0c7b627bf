//! Package acquisition into the staging tree.

use super::StagingTree;
use crate::error::{ReleaseError, Result};
use crate::package::{Component, ComponentPackageRef, PackageSource};
use crate::store::ObjectStore;
use std::path::{Path, PathBuf};

/// Packages the rest of the pipeline needs to find again
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AcquiredPackages {
    /// Archive the image payload is extracted from
    pub payload_archive: Option<PathBuf>,
    /// Control-plane package, part of the image context
    pub control_plane: Option<PathBuf>,
    /// Every staged file, in acquisition order
    pub staged: Vec<PathBuf>,
}

/// Copies or downloads packages into a staging tree
pub struct ArtifactAcquirer<'a, S: ObjectStore> {
    store: &'a S,
    acquired: AcquiredPackages,
}

impl<'a, S: ObjectStore> ArtifactAcquirer<'a, S> {
    /// Acquirer that downloads remote packages from `store`
    pub fn new(store: &'a S) -> Self {
        Self {
            store,
            acquired: AcquiredPackages::default(),
        }
    }

    /// Stage one package and return its path inside the tree.
    ///
    /// The target directory is created if needed; acquiring the same
    /// package twice overwrites the staged copy.
    pub async fn acquire(
        &mut self,
        package: &ComponentPackageRef,
        staging: &StagingTree,
    ) -> Result<PathBuf> {
        let dir = staging.package_dir(package);
        tokio::fs::create_dir_all(&dir).await?;

        let staged = match &package.source {
            PackageSource::Local(path) => {
                log::info!("Copy local package {}", package.file_name());
                let dest = dir.join(package.file_name());
                copy_file(path, &dest).await?;
                dest
            }
            PackageSource::Remote { tag, object } => {
                log::info!("Download package {} from s3", object);
                self.store.download(tag, object, &dir).await?
            }
        };

        verify_artifact(&staged).await?;
        self.record(package.component, &staged);
        Ok(staged)
    }

    fn record(&mut self, component: Component, staged: &Path) {
        if component.carries_payload() {
            self.acquired.payload_archive = Some(staged.to_path_buf());
        }
        if component == Component::Yugaware {
            self.acquired.control_plane = Some(staged.to_path_buf());
        }
        self.acquired.staged.push(staged.to_path_buf());
    }

    /// Finish acquisition and hand over the tracked packages
    pub fn into_acquired(self) -> AcquiredPackages {
        self.acquired
    }
}

/// Copy a regular file, failing if the source is missing or a directory
async fn copy_file(from: &Path, to: &Path) -> Result<()> {
    if !from.is_file() {
        return Err(ReleaseError::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("{} does not exist or is not a file", from.display()),
        )));
    }
    tokio::fs::copy(from, to).await?;
    Ok(())
}

/// Staged packages must exist and be non-empty
async fn verify_artifact(path: &Path) -> Result<()> {
    let metadata = tokio::fs::metadata(path).await?;
    if metadata.len() == 0 {
        return Err(ReleaseError::Io(std::io::Error::new(
            std::io::ErrorKind::InvalidData,
            format!(
                "Package is empty (0 bytes): {}. This indicates a failed or incomplete transfer.",
                path.display()
            ),
        )));
    }
    log::debug!("Verified {} ({} bytes)", path.display(), metadata.len());
    Ok(())
}
