//! Docker release: assemble and optionally push the platform image.

use crate::ReleaseConfig;
use crate::cli::{Args, RuntimeConfig};
use crate::error::Result;
use crate::image::DockerCli;
use crate::manifest::HttpMetadataSource;
use crate::pipeline::{DockerReleaseRequest, ReleasePipeline};
use crate::store::S3Store;

/// Execute a docker release
pub(super) async fn execute_docker_release(
    args: &Args,
    config: &RuntimeConfig,
    release: &ReleaseConfig,
) -> Result<()> {
    config.section("Docker release");

    let request = DockerReleaseRequest {
        tag: args.tag.clone(),
        packages: args.packages.clone(),
        publish: args.publish,
        context_dir: release.project_dir.clone(),
        staging_root: release.staging_root(),
        image_name: release.image_name.clone(),
        payload_marker: release.payload_marker.clone(),
    };

    let metadata = HttpMetadataSource::new(&release.metadata_url);
    let store = S3Store::new(&release.bucket);
    let docker = DockerCli::new(&release.registry);
    let mut pipeline = ReleasePipeline::new(&metadata, &store, &docker);

    let report = pipeline.run(&request).await?;

    for package in report.manifest.refs() {
        config.verbose_println(&format!("Package: {}", package.file_name()));
    }
    config.verbose_println(&format!("Payload files extracted: {}", report.payload.len()));
    config.success_println(&format!("Built image {}", release.image_name));
    for tag in &report.pushed_tags {
        config.indent(&format!("Pushed {}:{}", release.image_name, tag));
    }

    Ok(())
}
