//! Release manifest resolution.
//!
//! A [`ReleaseManifest`] holds exactly one package per required component.
//! It is resolved either from package paths given on the command line or by
//! asking a [`MetadataSource`] which packages were published for a tag.

mod source;

pub use source::{HttpMetadataSource, MetadataSource, PackageInfo};

use crate::error::{ConfigError, ManifestError, Result};
use crate::package::{Component, ComponentPackageRef};
use std::path::{Path, PathBuf};

/// How the caller selected the packages of a release
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReleaseSelection {
    /// Download the packages published for a tag
    Tag(String),
    /// Use local package files
    Packages(Vec<PathBuf>),
}

impl ReleaseSelection {
    /// Pick the selection mode from `--tag` / `--packages`.
    ///
    /// Explicit packages take precedence; a tag given alongside them is only
    /// used for publishing.
    pub fn from_args(
        variant: &str,
        tag: Option<&str>,
        packages: &[PathBuf],
    ) -> std::result::Result<Self, ConfigError> {
        if !packages.is_empty() {
            return Ok(Self::Packages(packages.to_vec()));
        }
        match tag {
            Some(tag) if !tag.trim().is_empty() => Ok(Self::Tag(tag.to_string())),
            _ => Err(ConfigError::MissingSelection {
                variant: variant.to_string(),
            }),
        }
    }
}

/// Why a set of refs is not a valid manifest
#[derive(Debug, Clone, PartialEq, Eq)]
enum ManifestShape {
    Missing(Vec<Component>),
    Duplicate(Component),
}

/// Exactly one package per required component
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseManifest {
    refs: Vec<ComponentPackageRef>,
}

impl ReleaseManifest {
    fn from_refs(refs: Vec<ComponentPackageRef>) -> std::result::Result<Self, ManifestShape> {
        for (i, r) in refs.iter().enumerate() {
            if refs[..i].iter().any(|earlier| earlier.component == r.component) {
                return Err(ManifestShape::Duplicate(r.component));
            }
        }

        let missing: Vec<Component> = Component::ALL
            .into_iter()
            .filter(|c| !refs.iter().any(|r| r.component == *c))
            .collect();
        if !missing.is_empty() {
            return Err(ManifestShape::Missing(missing));
        }

        Ok(Self { refs })
    }

    /// Package refs in resolution order
    pub fn refs(&self) -> &[ComponentPackageRef] {
        &self.refs
    }

    /// Ref for one component
    pub fn get(&self, component: Component) -> Option<&ComponentPackageRef> {
        self.refs.iter().find(|r| r.component == component)
    }

    /// Number of packages, always the number of required components
    pub fn len(&self) -> usize {
        self.refs.len()
    }

    /// Always false; kept for API symmetry with `len`
    pub fn is_empty(&self) -> bool {
        self.refs.is_empty()
    }
}

/// Build a manifest from local package paths.
///
/// Paths whose basename does not start with a required component are
/// ignored. Completeness is checked on the filtered names before any of
/// them is parsed, then every surviving path is parsed strictly.
pub fn resolve_by_explicit_paths(paths: &[PathBuf]) -> Result<ReleaseManifest> {
    let mut selected = Vec::new();
    for path in paths {
        match Component::from_file_prefix(&file_name(path)) {
            Some(component) => selected.push((component, path)),
            None => log::debug!("Ignoring non-release package {}", path.display()),
        }
    }

    let missing: Vec<Component> = Component::ALL
        .into_iter()
        .filter(|c| !selected.iter().any(|(found, _)| found == c))
        .collect();
    if !missing.is_empty() {
        return Err(ConfigError::IncompleteManifest {
            missing,
            required: Component::ALL.to_vec(),
        }
        .into());
    }

    let refs = selected
        .into_iter()
        .map(|(_, path)| ComponentPackageRef::local(path.clone()))
        .collect::<std::result::Result<Vec<_>, _>>()?;

    ReleaseManifest::from_refs(refs).map_err(|shape| {
        let err = match shape {
            ManifestShape::Missing(missing) => ConfigError::IncompleteManifest {
                missing,
                required: Component::ALL.to_vec(),
            },
            ManifestShape::Duplicate(component) => ConfigError::DuplicateComponent { component },
        };
        err.into()
    })
}

/// Build a manifest from the packages a metadata source lists for `tag`.
pub async fn resolve_by_tag<M: MetadataSource>(source: &M, tag: &str) -> Result<ReleaseManifest> {
    log::info!("Download packages based on the release tag {}", tag);
    let infos = source.package_info(tag).await?;
    if infos.is_empty() {
        return Err(ManifestError::UnknownTag {
            tag: tag.to_string(),
        }
        .into());
    }

    let refs = infos
        .iter()
        .map(|info| ComponentPackageRef::remote(tag, &info.package))
        .collect::<std::result::Result<Vec<_>, _>>()?;

    ReleaseManifest::from_refs(refs).map_err(|shape| {
        let reason = match shape {
            ManifestShape::Missing(missing) => format!(
                "missing {}",
                missing
                    .iter()
                    .map(|c| c.as_str())
                    .collect::<Vec<_>>()
                    .join(", ")
            ),
            ManifestShape::Duplicate(component) => format!("{component} listed more than once"),
        };
        ManifestError::Incomplete {
            tag: tag.to_string(),
            reason,
        }
        .into()
    })
}

/// Resolve whichever selection the caller made
pub async fn resolve<M: MetadataSource>(
    selection: &ReleaseSelection,
    source: &M,
) -> Result<ReleaseManifest> {
    match selection {
        ReleaseSelection::Tag(tag) => resolve_by_tag(source, tag).await,
        ReleaseSelection::Packages(paths) => resolve_by_explicit_paths(paths),
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}
