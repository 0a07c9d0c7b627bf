//! File release: build the control-plane tarball and publish or copy it.
//!
//! Runs the UI bundler and the sbt packager, renames the packaged tarball
//! after the current commit, then either uploads it (with its checksum) to
//! the release bucket or copies it to a local destination.

use crate::ReleaseConfig;
use crate::cli::{Args, RuntimeConfig};
use crate::error::{DestinationError, Result};
use crate::package::{Component, parse_package_name};
use crate::process::ToolCommand;
use crate::store::{ObjectStore, S3Store, generate_checksum};
use std::path::{Path, PathBuf};

/// Tarball produced by `sbt universal:packageZipTarball`
const PACKAGED_FILE: &str = "target/universal/yugaware-1.0-SNAPSHOT.tgz";

/// Optional file holding the release version
const VERSION_FILE: &str = "version.txt";

/// Execute a file release
pub(super) async fn execute_file_release(
    args: &Args,
    config: &RuntimeConfig,
    release: &ReleaseConfig,
) -> Result<()> {
    let project = release.project_dir.as_path();
    let ui_dir = project.join("ui");

    config.section("File release");
    ToolCommand::new("sbt").arg("clean").current_dir(project).run().await?;

    config.progress("Building/Packaging UI code");
    match tokio::fs::remove_dir_all(ui_dir.join("node_modules")).await {
        Ok(()) => {}
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => log::warn!("Could not remove ui/node_modules: {}", e),
    }
    ToolCommand::new("npm").arg("install").current_dir(&ui_dir).run().await?;
    ToolCommand::new("npm")
        .args(["run", "build"])
        .current_dir(&ui_dir)
        .run()
        .await?;

    config.progress("Kick off SBT universal packaging");
    ToolCommand::new("sbt")
        .arg("universal:packageZipTarball")
        .current_dir(project)
        .run()
        .await?;

    config.progress("Get a release file name based on the current commit sha");
    let commit = current_commit(project).await?;
    let version = read_version(project).await?;
    let release_file = project
        .join("target")
        .join(release_file_name(version.as_deref(), &commit)?);

    config.progress("Rename the release file to have current commit sha");
    tokio::fs::copy(project.join(PACKAGED_FILE), &release_file).await?;
    config.verbose_println(&format!("Release file: {}", release_file.display()));

    if args.publish {
        if args.destination.is_some() {
            config.warning_println("--destination is ignored when --publish is given");
        }
        config.progress("Publish the release to S3");
        let store = S3Store::new(&release.bucket);
        publish_release(&store, &release_file).await?;
        config.success_println("Release published");
    } else if let Some(destination) = &args.destination {
        let copied = copy_to_destination(&release_file, destination).await?;
        config.success_println(&format!("Release copied to {}", copied.display()));
    } else {
        config.success_println(&format!("Release file at {}", release_file.display()));
    }

    Ok(())
}

/// `yugaware-[<version>-]<commit>.tar.gz`, checked against the package layout
fn release_file_name(version: Option<&str>, commit: &str) -> Result<String> {
    let name = match version {
        Some(version) => format!("{}-{}-{}.tar.gz", Component::Yugaware, version, commit),
        None => format!("{}-{}.tar.gz", Component::Yugaware, commit),
    };
    parse_package_name(&name, false)?;
    Ok(name)
}

async fn current_commit(project: &Path) -> Result<String> {
    let output = ToolCommand::new("git")
        .args(["rev-parse", "HEAD"])
        .current_dir(project)
        .run()
        .await?;
    Ok(output.trim().to_string())
}

async fn read_version(project: &Path) -> Result<Option<String>> {
    match tokio::fs::read_to_string(project.join(VERSION_FILE)).await {
        Ok(content) => Ok(Some(content.trim().to_string()).filter(|v| !v.is_empty())),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Generate the checksum, then upload the release and its checksum
async fn publish_release<S: ObjectStore>(store: &S, release_file: &Path) -> Result<()> {
    let checksum = generate_checksum(release_file).await?;
    for path in [release_file, checksum.as_path()] {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let uri = store
            .upload(path, &format!("{}/{}", Component::Yugaware, name))
            .await?;
        log::info!("Uploaded {}", uri);
    }
    Ok(())
}

/// Copy the release into an existing directory
async fn copy_to_destination(release_file: &Path, destination: &Path) -> Result<PathBuf> {
    if !destination.is_dir() {
        return Err(DestinationError::NotADirectory {
            path: destination.to_path_buf(),
        }
        .into());
    }
    let name = release_file.file_name().ok_or_else(|| {
        std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            format!("{} has no file name", release_file.display()),
        )
    })?;
    let dest = destination.join(name);
    tokio::fs::copy(release_file, &dest).await?;
    Ok(dest)
}
