//! Release metadata source.

use crate::error::ManifestError;
use serde::Deserialize;

/// One package published for a release
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PackageInfo {
    /// Package filename
    pub package: String,
}

/// Lists the packages published for a release tag
#[allow(async_fn_in_trait)]
pub trait MetadataSource {
    /// Packages associated with `tag`
    async fn package_info(&self, tag: &str) -> Result<Vec<PackageInfo>, ManifestError>;
}

/// Metadata served as `{base_url}/{tag}/package_info.json`.
///
/// The document is a JSON array of `{"package": "<file name>"}` objects.
#[derive(Debug, Clone)]
pub struct HttpMetadataSource {
    base_url: String,
    client: reqwest::Client,
}

impl HttpMetadataSource {
    /// Create a source rooted at `base_url`
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            client: reqwest::Client::new(),
        }
    }

    /// URL of the package list for `tag`
    pub fn url_for(&self, tag: &str) -> String {
        format!(
            "{}/{}/package_info.json",
            self.base_url.trim_end_matches('/'),
            tag
        )
    }
}

impl MetadataSource for HttpMetadataSource {
    async fn package_info(&self, tag: &str) -> Result<Vec<PackageInfo>, ManifestError> {
        let url = self.url_for(tag);
        log::debug!("Fetching release metadata from {}", url);

        let unavailable = |reason: String| ManifestError::Unreachable {
            tag: tag.to_string(),
            reason,
        };

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| unavailable(format!("request to {url} failed: {e}")))?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(ManifestError::UnknownTag {
                tag: tag.to_string(),
            });
        }

        let response = response
            .error_for_status()
            .map_err(|e| unavailable(e.to_string()))?;

        response
            .json::<Vec<PackageInfo>>()
            .await
            .map_err(|e| unavailable(format!("invalid package list: {e}")))
    }
}
