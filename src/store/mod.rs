//! Remote object store for release packages.
//!
//! Packages are published under `s3://{bucket}/{tag}/{object}`. The store is
//! driven through the `aws` CLI; credentials and region come from the
//! caller's environment.

mod checksum;

pub use checksum::generate_checksum;

use crate::error::StoreError;
use crate::process::ToolCommand;
use std::path::{Path, PathBuf};

/// Default bucket releases are published to
pub const DEFAULT_RELEASE_BUCKET: &str = "releases.yugabyte.com";

/// Download and upload of release objects
#[allow(async_fn_in_trait)]
pub trait ObjectStore {
    /// Download `object` published for `tag` into `dest_dir`.
    ///
    /// Returns the path of the downloaded file.
    async fn download(&self, tag: &str, object: &str, dest_dir: &Path)
    -> Result<PathBuf, StoreError>;

    /// Upload a local file under `key`.
    ///
    /// Returns the URI of the uploaded object.
    async fn upload(&self, path: &Path, key: &str) -> Result<String, StoreError>;
}

/// S3 bucket accessed with `aws s3 cp`
#[derive(Debug, Clone)]
pub struct S3Store {
    bucket: String,
}

impl S3Store {
    /// Store backed by `bucket`
    pub fn new(bucket: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
        }
    }

    /// URI of `key` in this bucket
    pub fn uri(&self, key: &str) -> String {
        format!("s3://{}/{}", self.bucket, key.trim_start_matches('/'))
    }
}

impl ObjectStore for S3Store {
    async fn download(
        &self,
        tag: &str,
        object: &str,
        dest_dir: &Path,
    ) -> Result<PathBuf, StoreError> {
        let source = self.uri(&format!("{tag}/{object}"));
        let dest = dest_dir.join(object);

        ToolCommand::new("aws")
            .args(["s3", "cp"])
            .arg(&source)
            .arg(dest.as_os_str())
            .run()
            .await
            .map_err(|e| StoreError::DownloadFailed {
                object: source.clone(),
                reason: e.to_string(),
                output: e.output().map(str::to_string),
            })?;

        Ok(dest)
    }

    async fn upload(&self, path: &Path, key: &str) -> Result<String, StoreError> {
        let dest = self.uri(key);

        ToolCommand::new("aws")
            .args(["s3", "cp"])
            .arg(path.as_os_str())
            .arg(&dest)
            .run()
            .await
            .map_err(|e| StoreError::UploadFailed {
                path: path.to_path_buf(),
                reason: e.to_string(),
                output: e.output().map(str::to_string),
            })?;

        Ok(dest)
    }
}
