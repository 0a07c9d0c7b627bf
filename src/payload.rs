//! Payload extraction from component archives.
//!
//! The image needs one file out of the database package (the sample-apps
//! load tester). Every entry whose path contains the marker is extracted;
//! an archive may legitimately carry companion files that match too.

use crate::error::PayloadError;
use flate2::read::GzDecoder;
use std::fs::File;
use std::path::{Component, Path, PathBuf};

/// Marker identifying the load-tester payload inside the database package
pub const SAMPLE_APPS_MARKER: &str = "yb-sample-apps";

/// Extract every entry of a `.tar.gz` whose path contains `marker`.
///
/// Entries keep their relative archive path under `dest_dir`. Returns the
/// extracted paths in archive order.
///
/// # Errors
///
/// * [`PayloadError::NotFound`] if no entry matches
/// * [`PayloadError::PathTraversal`] if a matching entry would escape `dest_dir`
/// * [`PayloadError::Io`] if the archive cannot be read
pub fn extract_named_entry(
    archive_path: &Path,
    marker: &str,
    dest_dir: &Path,
) -> Result<Vec<PathBuf>, PayloadError> {
    let io_err = |source: std::io::Error| PayloadError::Io {
        archive: archive_path.to_path_buf(),
        source,
    };

    let file = File::open(archive_path).map_err(io_err)?;
    let mut archive = tar::Archive::new(GzDecoder::new(file));
    let mut extracted = Vec::new();

    for entry in archive.entries().map_err(io_err)? {
        let mut entry = entry.map_err(io_err)?;
        let entry_path = entry.path().map_err(io_err)?.into_owned();
        if !entry_path.to_string_lossy().contains(marker) {
            continue;
        }

        validate_entry_path(&entry_path)?;

        let dest = dest_dir.join(&entry_path);
        if let Some(parent) = dest.parent() {
            std::fs::create_dir_all(parent).map_err(io_err)?;
        }
        entry.unpack(&dest).map_err(io_err)?;
        log::info!("{}", entry_path.display());
        extracted.push(dest);
    }

    if extracted.is_empty() {
        return Err(PayloadError::NotFound {
            archive: archive_path.to_path_buf(),
            marker: marker.to_string(),
        });
    }

    Ok(extracted)
}

fn validate_entry_path(path: &Path) -> Result<(), PayloadError> {
    let escapes = path.is_absolute()
        || path
            .components()
            .any(|c| matches!(c, Component::ParentDir | Component::Prefix(_)));
    if escapes {
        return Err(PayloadError::PathTraversal {
            path: path.display().to_string(),
        });
    }
    Ok(())
}
