//! Component identity and package filename parsing.
//!
//! Every release consists of exactly one package per [`Component`]. Package
//! files are named `<component>-[<version>-]<commit>[-<qualifier>...].tar.gz`,
//! e.g. `yugabyte-2.3.0.0-abcdef1.tar.gz`.

use crate::error::PackageNameError;
use regex::Regex;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::LazyLock;

/// A sub-project whose package must be present in every release
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Component {
    /// Orchestration and provisioning layer
    Devops,
    /// Web control plane
    Yugaware,
    /// Core database binaries
    Yugabyte,
}

impl Component {
    /// Every required component, in release order
    pub const ALL: [Component; 3] = [Component::Devops, Component::Yugaware, Component::Yugabyte];

    /// Name as it appears in package filenames
    pub fn as_str(self) -> &'static str {
        match self {
            Component::Devops => "devops",
            Component::Yugaware => "yugaware",
            Component::Yugabyte => "yugabyte",
        }
    }

    /// Whether staged packages of this component live under a version directory.
    ///
    /// The database binaries are versioned independently of the control plane,
    /// so more than one version may be relevant to an image.
    pub fn is_version_namespaced(self) -> bool {
        matches!(self, Component::Yugabyte)
    }

    /// Whether this component's archive carries the image payload
    pub fn carries_payload(self) -> bool {
        matches!(self, Component::Yugabyte)
    }

    /// Component whose filename starts with this component's name, if any
    pub fn from_file_prefix(file_name: &str) -> Option<Component> {
        Self::ALL
            .into_iter()
            .find(|c| file_name.starts_with(c.as_str()))
    }
}

impl fmt::Display for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Component {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| format!("unknown component '{s}'"))
    }
}

/// Fields recovered from a package filename
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedPackageName {
    /// Component the package belongs to
    pub component: Component,
    /// Short commit identifier
    pub commit: String,
    /// Release version, absent for unversioned package names
    pub version: Option<String>,
}

static PACKAGE_NAME_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(?P<component>[A-Za-z]+)-(?:(?P<version>\d+(?:\.\d+)*(?:-b\d+)?)-)?(?P<commit>[0-9A-Za-z]+)(?:-[0-9A-Za-z_.]+)*\.(?:tar\.gz|tgz)$",
    )
    .expect("package name regex is valid")
});

/// Parse a package filename into component, commit and version.
///
/// Only the final path component is considered; the filesystem is never
/// consulted. An unknown component is always an error. With `strict` the
/// version token is mandatory.
pub fn parse_package_name(
    file_name: &str,
    strict: bool,
) -> Result<ParsedPackageName, PackageNameError> {
    let base = Path::new(file_name)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or(file_name);

    let caps = PACKAGE_NAME_RE
        .captures(base)
        .ok_or_else(|| PackageNameError::Malformed {
            filename: base.to_string(),
        })?;

    let component: Component =
        caps["component"]
            .parse()
            .map_err(|_| PackageNameError::UnknownComponent {
                filename: base.to_string(),
                component: caps["component"].to_string(),
            })?;

    let version = caps.name("version").map(|m| m.as_str().to_string());
    if strict && version.is_none() {
        return Err(PackageNameError::MissingVersion {
            filename: base.to_string(),
        });
    }

    Ok(ParsedPackageName {
        component,
        commit: caps["commit"].to_string(),
        version,
    })
}

/// Where a package comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PackageSource {
    /// File supplied on the command line
    Local(PathBuf),
    /// Object published for a release tag
    Remote {
        /// Release tag the object is published under
        tag: String,
        /// Object name within the release
        object: String,
    },
}

/// One required package of a release
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComponentPackageRef {
    /// Component the package belongs to
    pub component: Component,
    /// Short commit identifier
    pub commit: String,
    /// Release version
    pub version: Option<String>,
    /// Local path or remote object
    pub source: PackageSource,
}

impl ComponentPackageRef {
    /// Reference a local package file, parsing its name strictly
    pub fn local(path: impl Into<PathBuf>) -> Result<Self, PackageNameError> {
        let path = path.into();
        let parsed = parse_package_name(&path.to_string_lossy(), true)?;
        Ok(Self::from_parsed(parsed, PackageSource::Local(path)))
    }

    /// Reference a remote package object, parsing its name strictly
    pub fn remote(tag: &str, object: &str) -> Result<Self, PackageNameError> {
        let parsed = parse_package_name(object, true)?;
        let object = Path::new(object)
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| object.to_string());
        Ok(Self::from_parsed(
            parsed,
            PackageSource::Remote {
                tag: tag.to_string(),
                object,
            },
        ))
    }

    fn from_parsed(parsed: ParsedPackageName, source: PackageSource) -> Self {
        Self {
            component: parsed.component,
            commit: parsed.commit,
            version: parsed.version,
            source,
        }
    }

    /// Basename the package is staged under
    pub fn file_name(&self) -> String {
        match &self.source {
            PackageSource::Local(path) => path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default(),
            PackageSource::Remote { object, .. } => object.clone(),
        }
    }
}
