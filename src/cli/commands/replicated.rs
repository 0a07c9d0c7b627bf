//! Replicated release: render the replicated config for a tag.

use crate::ReleaseConfig;
use crate::cli::{Args, RuntimeConfig};
use crate::error::{ConfigError, Result};
use crate::manifest::HttpMetadataSource;
use crate::replicated;
use rand::rngs::OsRng;

/// Execute a replicated release
pub(super) async fn execute_replicated_release(
    args: &Args,
    config: &RuntimeConfig,
    release: &ReleaseConfig,
) -> Result<()> {
    config.section("Replicated release");

    let tag = args.tag.as_deref().ok_or_else(|| ConfigError::MissingTag {
        variant: args.release_type.to_string(),
    })?;

    let metadata = HttpMetadataSource::new(&release.metadata_url);
    let template = release.project_dir.join(replicated::TEMPLATE_FILE);

    let written =
        replicated::write_config(&metadata, &mut OsRng, &template, &release.output_dir, tag)
            .await?;

    config.success_println(&format!("Replicated config written to {}", written.display()));
    Ok(())
}
