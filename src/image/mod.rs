//! Container image assembly and publishing.
//!
//! The image is built from the project directory, whose Dockerfile copies
//! the staged packages and the extracted payload. Publishing a tagged
//! release pushes the image twice: once under the release tag and once
//! under the rolling `latest` tag.

mod docker;

pub use docker::{DEFAULT_REGISTRY, DockerCli};

use crate::error::{ImageError, PushFailure};
use std::path::Path;

/// Default local image name
pub const DEFAULT_IMAGE_NAME: &str = "yugaware";

/// Tag the local build is created with
pub const LOCAL_TAG: &str = "latest";

/// Rolling tag every published release is also pushed to
pub const ROLLING_TAG: &str = "latest";

/// External image build and push tool
#[allow(async_fn_in_trait)]
pub trait ImageTool {
    /// Build `image` with `context_dir` as build context
    async fn build(&self, context_dir: &Path, image: &str) -> Result<(), ImageError>;

    /// Push the local `image:local_tag` to the registry as `image:remote_tag`
    async fn push(&self, image: &str, local_tag: &str, remote_tag: &str)
    -> Result<(), PushFailure>;
}

/// Builds and publishes one image through an [`ImageTool`]
pub struct ImageAssembler<'a, T: ImageTool> {
    tool: &'a T,
    image: String,
}

impl<'a, T: ImageTool> ImageAssembler<'a, T> {
    /// Assembler for the local image `image`
    pub fn new(tool: &'a T, image: impl Into<String>) -> Self {
        Self {
            tool,
            image: image.into(),
        }
    }

    /// Build the image from `context_dir`
    pub async fn build(&self, context_dir: &Path) -> Result<(), ImageError> {
        log::info!("Package and publish {} docker image locally", self.image);
        self.tool.build(context_dir, &self.image).await
    }

    /// Push the image under `tag` and under the rolling tag.
    ///
    /// Every push is attempted even if an earlier one failed. Returns the
    /// tags that were pushed; if any push failed, all failures are logged
    /// and returned together.
    pub async fn publish(&self, tag: &str) -> Result<Vec<String>, ImageError> {
        log::info!("Publish {} docker image to registry", self.image);

        let mut pushed = Vec::new();
        let mut failures = Vec::new();
        for remote_tag in [tag, ROLLING_TAG] {
            match self.tool.push(&self.image, LOCAL_TAG, remote_tag).await {
                Ok(()) => {
                    log::info!("Pushed {}:{}", self.image, remote_tag);
                    pushed.push(remote_tag.to_string());
                }
                Err(failure) => {
                    log::error!(
                        "Failed to push {}:{}: {}",
                        self.image,
                        failure.remote_tag,
                        failure.reason
                    );
                    failures.push(failure);
                }
            }
        }

        if failures.is_empty() {
            Ok(pushed)
        } else {
            Err(ImageError::PushFailed { failures })
        }
    }
}
