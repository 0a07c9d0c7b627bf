//! Replicated release configuration.
//!
//! Renders `replicated.yml` for a validated release tag, filling in the
//! release version and a freshly generated application secret.

use crate::error::{ManifestError, Result};
use crate::manifest::MetadataSource;
use rand::{CryptoRng, Rng, RngCore};
use std::path::{Path, PathBuf};

/// Placeholder replaced with the release tag
pub const VERSION_PLACEHOLDER: &str = "YUGABYTE_RELEASE_VERSION";

/// Placeholder replaced with the generated secret
pub const SECRET_PLACEHOLDER: &str = "YUGAWARE_APP_SECRET";

/// Characters the application secret is drawn from
pub const SECRET_CHARSET: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789!@#$%^&*(-_=+)";

/// Length of the application secret
pub const SECRET_LENGTH: usize = 64;

/// Template file name inside the project directory
pub const TEMPLATE_FILE: &str = "replicated.yml";

/// Draw an application secret from a cryptographically secure generator
pub fn generate_secret<R: RngCore + CryptoRng>(rng: &mut R) -> String {
    (0..SECRET_LENGTH)
        .map(|_| SECRET_CHARSET[rng.gen_range(0..SECRET_CHARSET.len())] as char)
        .collect()
}

/// Substitute the release version and secret into a template
pub fn render(template: &str, tag: &str, secret: &str) -> String {
    template
        .replace(VERSION_PLACEHOLDER, tag)
        .replace(SECRET_PLACEHOLDER, secret)
}

/// Path the rendered config for `tag` is written to
pub fn output_path(output_dir: &Path, tag: &str) -> PathBuf {
    output_dir.join(format!("replicated-{tag}.yml"))
}

/// Validate `tag`, render the template and write it under `output_dir`.
///
/// Nothing is written unless the metadata source knows the tag.
pub async fn write_config<M, R>(
    source: &M,
    rng: &mut R,
    template_path: &Path,
    output_dir: &Path,
    tag: &str,
) -> Result<PathBuf>
where
    M: MetadataSource,
    R: RngCore + CryptoRng,
{
    if source.package_info(tag).await?.is_empty() {
        return Err(ManifestError::UnknownTag {
            tag: tag.to_string(),
        }
        .into());
    }

    log::info!("Creating replicated release");
    let template = tokio::fs::read_to_string(template_path).await?;
    let rendered = render(&template, tag, &generate_secret(rng));

    let dest = output_path(output_dir, tag);
    tokio::fs::write(&dest, rendered).await?;
    log::info!("Replicated config written to {}", dest.display());
    Ok(dest)
}
