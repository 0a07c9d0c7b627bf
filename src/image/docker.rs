//! `docker` CLI backend.

use super::ImageTool;
use crate::error::{ImageError, PushFailure};
use crate::process::ToolCommand;
use std::path::Path;

/// Default registry namespace images are pushed to
pub const DEFAULT_REGISTRY: &str = "quay.io/yugabyte";

/// Builds and pushes images with the `docker` command
#[derive(Debug, Clone)]
pub struct DockerCli {
    registry: String,
}

impl DockerCli {
    /// Docker backend pushing to `registry`
    pub fn new(registry: impl Into<String>) -> Self {
        Self {
            registry: registry.into(),
        }
    }

    /// Fully qualified remote reference for `image:tag`
    pub fn remote_ref(&self, image: &str, tag: &str) -> String {
        format!("{}/{}:{}", self.registry.trim_end_matches('/'), image, tag)
    }
}

impl ImageTool for DockerCli {
    async fn build(&self, context_dir: &Path, image: &str) -> Result<(), ImageError> {
        let output = ToolCommand::new("docker")
            .args(["build", "-t", image, "."])
            .current_dir(context_dir)
            .run()
            .await
            .map_err(|e| ImageError::BuildFailed {
                image: image.to_string(),
                reason: e.to_string(),
                output: e.output().map(str::to_string),
            })?;

        log::debug!("{}", output.trim_end());
        Ok(())
    }

    async fn push(&self, image: &str, local_tag: &str, remote_tag: &str) -> Result<(), PushFailure> {
        let remote = self.remote_ref(image, remote_tag);
        let failure = |e: crate::error::ToolError| PushFailure {
            remote_tag: remote_tag.to_string(),
            reason: e.to_string(),
            output: e.output().map(str::to_string),
        };

        ToolCommand::new("docker")
            .arg("tag")
            .arg(format!("{image}:{local_tag}"))
            .arg(&remote)
            .run()
            .await
            .map_err(failure)?;

        ToolCommand::new("docker")
            .args(["push", remote.as_str()])
            .run()
            .await
            .map_err(failure)?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn remote_ref_uses_registry_namespace() {
        let docker = DockerCli::new(format!("{DEFAULT_REGISTRY}/"));
        assert_eq!(
            docker.remote_ref("yugaware", "2.3.0.0"),
            "quay.io/yugabyte/yugaware:2.3.0.0"
        );
    }
}
