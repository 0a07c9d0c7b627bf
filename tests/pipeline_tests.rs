//! End-to-end docker release runs against in-memory collaborators.

use flate2::Compression;
use flate2::write::GzEncoder;
use std::cell::{Cell, RefCell};
use std::path::{Path, PathBuf};
use yb_release::error::{ImageError, ManifestError, PushFailure, StoreError};
use yb_release::image::ImageTool;
use yb_release::manifest::{MetadataSource, PackageInfo};
use yb_release::store::ObjectStore;
use yb_release::{
    DockerReleaseRequest, PipelineState, ReleaseError, ReleasePipeline, replicated,
};

struct Listing(Vec<&'static str>);

impl MetadataSource for Listing {
    async fn package_info(&self, _tag: &str) -> Result<Vec<PackageInfo>, ManifestError> {
        Ok(self
            .0
            .iter()
            .map(|p| PackageInfo {
                package: p.to_string(),
            })
            .collect())
    }
}

struct Offline;

impl MetadataSource for Offline {
    async fn package_info(&self, tag: &str) -> Result<Vec<PackageInfo>, ManifestError> {
        Err(ManifestError::Unreachable {
            tag: tag.to_string(),
            reason: "connection refused".to_string(),
        })
    }
}

/// Serves downloads from a directory of prepared packages
struct DirStore {
    source: PathBuf,
    downloads: RefCell<Vec<String>>,
}

impl ObjectStore for DirStore {
    async fn download(
        &self,
        tag: &str,
        object: &str,
        dest_dir: &Path,
    ) -> Result<PathBuf, StoreError> {
        self.downloads.borrow_mut().push(format!("{tag}/{object}"));
        let dest = dest_dir.join(object);
        std::fs::copy(self.source.join(object), &dest).map_err(|e| {
            StoreError::DownloadFailed {
                object: object.to_string(),
                reason: e.to_string(),
                output: None,
            }
        })?;
        Ok(dest)
    }

    async fn upload(&self, _path: &Path, key: &str) -> Result<String, StoreError> {
        Ok(format!("s3://test/{key}"))
    }
}

/// Records what the build saw in the staging tree
struct InspectingTool {
    staging_root: PathBuf,
    fail_build: bool,
    failing_pushes: Vec<&'static str>,
    staged_during_build: Cell<bool>,
    pushes: RefCell<Vec<String>>,
}

impl InspectingTool {
    fn new(staging_root: &Path) -> Self {
        Self {
            staging_root: staging_root.to_path_buf(),
            fail_build: false,
            failing_pushes: Vec::new(),
            staged_during_build: Cell::new(false),
            pushes: RefCell::new(Vec::new()),
        }
    }
}

impl ImageTool for InspectingTool {
    async fn build(&self, _context_dir: &Path, image: &str) -> Result<(), ImageError> {
        let root = &self.staging_root;
        let staged = root.join("devops").join("devops-1-a.tar.gz").is_file()
            && root.join("yugaware").join("yugaware-1-a.tar.gz").is_file()
            && root
                .join("yugabyte")
                .join("1.0")
                .join("yugabyte-1.0-a.tar.gz")
                .is_file()
            && root.join("yb-sample-apps-1.0.jar").is_file();
        self.staged_during_build.set(staged);

        if self.fail_build {
            return Err(ImageError::BuildFailed {
                image: image.to_string(),
                reason: "exit status 1".to_string(),
                output: Some("Step 3/9 : COPY failed".to_string()),
            });
        }
        Ok(())
    }

    async fn push(&self, image: &str, local_tag: &str, remote_tag: &str) -> Result<(), PushFailure> {
        self.pushes
            .borrow_mut()
            .push(format!("{image}:{local_tag}->{remote_tag}"));
        if self.failing_pushes.contains(&remote_tag) {
            return Err(PushFailure {
                remote_tag: remote_tag.to_string(),
                reason: "denied".to_string(),
                output: None,
            });
        }
        Ok(())
    }
}

fn write_tar_gz(path: &Path, entries: &[(&str, &str)]) {
    let file = std::fs::File::create(path).unwrap();
    let mut builder = tar::Builder::new(GzEncoder::new(file, Compression::default()));
    for (name, content) in entries {
        let mut header = tar::Header::new_gnu();
        header.set_size(content.len() as u64);
        header.set_mode(0o644);
        header.set_cksum();
        builder
            .append_data(&mut header, name, content.as_bytes())
            .unwrap();
    }
    builder.into_inner().unwrap().finish().unwrap();
}

/// Three valid local packages; the database one carries the payload
fn local_packages(dir: &Path) -> Vec<PathBuf> {
    let devops = dir.join("devops-1-a.tar.gz");
    let yugaware = dir.join("yugaware-1-a.tar.gz");
    let yugabyte = dir.join("yugabyte-1.0-a.tar.gz");
    write_tar_gz(&devops, &[("devops/bin/run.sh", "#!/bin/sh")]);
    write_tar_gz(&yugaware, &[("yugaware/bin/yugaware", "#!/bin/sh")]);
    write_tar_gz(
        &yugabyte,
        &[
            ("bin/yb-master", "elf"),
            ("yb-sample-apps-1.0.jar", "jar bytes"),
        ],
    );
    vec![devops, yugaware, yugabyte]
}

fn request(tmp: &Path, tag: Option<&str>, packages: Vec<PathBuf>, publish: bool) -> DockerReleaseRequest {
    DockerReleaseRequest {
        tag: tag.map(str::to_string),
        packages,
        publish,
        context_dir: tmp.to_path_buf(),
        staging_root: tmp.join("target").join("docker").join("packages"),
        image_name: "yugaware".to_string(),
        payload_marker: "yb-sample-apps".to_string(),
    }
}

fn empty_store(tmp: &Path) -> DirStore {
    DirStore {
        source: tmp.to_path_buf(),
        downloads: RefCell::new(Vec::new()),
    }
}

#[tokio::test]
async fn local_packages_are_staged_built_and_cleaned_up() {
    let tmp = tempfile::tempdir().unwrap();
    let packages = local_packages(tmp.path());
    let req = request(tmp.path(), None, packages, false);
    let store = empty_store(tmp.path());
    let tool = InspectingTool::new(&req.staging_root);

    let mut pipeline = ReleasePipeline::new(&Offline, &store, &tool);
    let report = pipeline.run(&req).await.unwrap();

    assert!(tool.staged_during_build.get());
    assert!(!req.staging_root.exists());
    assert_eq!(report.manifest.len(), 3);
    assert_eq!(report.payload.len(), 1);
    assert!(report.pushed_tags.is_empty());
    assert!(store.downloads.borrow().is_empty());
    assert_eq!(
        pipeline.states(),
        &[
            PipelineState::Init,
            PipelineState::ResolvingManifest,
            PipelineState::Acquiring,
            PipelineState::ExtractingPayload,
            PipelineState::Assembling,
            PipelineState::CleaningUp,
            PipelineState::Done,
        ]
    );
}

#[tokio::test]
async fn tagged_release_downloads_and_pushes_tag_then_latest() {
    let tmp = tempfile::tempdir().unwrap();
    let source = tmp.path().join("bucket");
    std::fs::create_dir(&source).unwrap();
    local_packages(&source);

    let req = request(tmp.path(), Some("v1"), Vec::new(), true);
    let metadata = Listing(vec![
        "devops-1-a.tar.gz",
        "yugaware-1-a.tar.gz",
        "yugabyte-1.0-a.tar.gz",
    ]);
    let store = DirStore {
        source,
        downloads: RefCell::new(Vec::new()),
    };
    let tool = InspectingTool::new(&req.staging_root);

    let mut pipeline = ReleasePipeline::new(&metadata, &store, &tool);
    let report = pipeline.run(&req).await.unwrap();

    assert_eq!(store.downloads.borrow().len(), 3);
    assert!(
        store
            .downloads
            .borrow()
            .iter()
            .all(|d| d.starts_with("v1/"))
    );
    assert!(tool.staged_during_build.get());
    assert_eq!(report.pushed_tags, vec!["v1".to_string(), "latest".to_string()]);
    assert_eq!(
        *tool.pushes.borrow(),
        vec![
            "yugaware:latest->v1".to_string(),
            "yugaware:latest->latest".to_string(),
        ]
    );
    assert!(pipeline.states().contains(&PipelineState::Publishing));
    assert_eq!(pipeline.state(), PipelineState::Done);
    assert!(!req.staging_root.exists());
}

#[tokio::test]
async fn build_failure_still_removes_staging() {
    let tmp = tempfile::tempdir().unwrap();
    let packages = local_packages(tmp.path());
    let req = request(tmp.path(), None, packages, false);
    let store = empty_store(tmp.path());
    let mut tool = InspectingTool::new(&req.staging_root);
    tool.fail_build = true;

    let mut pipeline = ReleasePipeline::new(&Offline, &store, &tool);
    let err = pipeline.run(&req).await.unwrap_err();

    assert!(matches!(
        err,
        ReleaseError::Image(ImageError::BuildFailed { .. })
    ));
    assert_eq!(err.captured_output(), Some("Step 3/9 : COPY failed"));
    assert!(!req.staging_root.exists());
    assert_eq!(
        &pipeline.states()[pipeline.states().len() - 3..],
        &[
            PipelineState::Assembling,
            PipelineState::CleaningUp,
            PipelineState::Failed,
        ]
    );
}

#[tokio::test]
async fn every_push_failure_is_reported() {
    let tmp = tempfile::tempdir().unwrap();
    let packages = local_packages(tmp.path());
    let req = request(tmp.path(), Some("v1"), packages, true);
    let store = empty_store(tmp.path());
    let mut tool = InspectingTool::new(&req.staging_root);
    tool.failing_pushes = vec!["v1", "latest"];

    let mut pipeline = ReleasePipeline::new(&Offline, &store, &tool);
    let err = pipeline.run(&req).await.unwrap_err();

    assert_eq!(tool.pushes.borrow().len(), 2);
    match err {
        ReleaseError::Image(ImageError::PushFailed { failures }) => {
            let tags: Vec<_> = failures.iter().map(|f| f.remote_tag.as_str()).collect();
            assert_eq!(tags, vec!["v1", "latest"]);
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(!req.staging_root.exists());
    assert_eq!(pipeline.state(), PipelineState::Failed);
}

#[tokio::test]
async fn publish_without_tag_builds_but_does_not_push() {
    let tmp = tempfile::tempdir().unwrap();
    let packages = local_packages(tmp.path());
    let req = request(tmp.path(), None, packages, true);
    let store = empty_store(tmp.path());
    let tool = InspectingTool::new(&req.staging_root);

    let mut pipeline = ReleasePipeline::new(&Offline, &store, &tool);
    let report = pipeline.run(&req).await.unwrap();

    assert!(report.pushed_tags.is_empty());
    assert!(tool.pushes.borrow().is_empty());
    assert!(!pipeline.states().contains(&PipelineState::Publishing));
}

#[tokio::test]
async fn missing_payload_fails_after_acquisition() {
    let tmp = tempfile::tempdir().unwrap();
    let packages = local_packages(tmp.path());
    write_tar_gz(&packages[2], &[("bin/yb-master", "elf")]);
    let req = request(tmp.path(), None, packages, false);
    let store = empty_store(tmp.path());
    let tool = InspectingTool::new(&req.staging_root);

    let mut pipeline = ReleasePipeline::new(&Offline, &store, &tool);
    let err = pipeline.run(&req).await.unwrap_err();

    assert!(matches!(err, ReleaseError::Payload(_)));
    assert!(!req.staging_root.exists());
    assert!(!pipeline.states().contains(&PipelineState::Assembling));
}

#[tokio::test]
async fn unreachable_metadata_never_creates_staging() {
    let tmp = tempfile::tempdir().unwrap();
    let req = request(tmp.path(), Some("v1"), Vec::new(), true);
    let store = empty_store(tmp.path());
    let tool = InspectingTool::new(&req.staging_root);

    let mut pipeline = ReleasePipeline::new(&Offline, &store, &tool);
    let err = pipeline.run(&req).await.unwrap_err();

    assert!(matches!(
        err,
        ReleaseError::Manifest(ManifestError::Unreachable { .. })
    ));
    assert!(!req.staging_root.exists());
    assert!(tmp.path().join("target").read_dir().is_err());
    assert_eq!(
        pipeline.states(),
        &[
            PipelineState::Init,
            PipelineState::ResolvingManifest,
            PipelineState::Failed,
        ]
    );
}

#[tokio::test]
async fn replicated_config_is_not_written_for_unreachable_tag() {
    let tmp = tempfile::tempdir().unwrap();
    let template = tmp.path().join("replicated.yml");
    std::fs::write(&template, "version: YUGABYTE_RELEASE_VERSION\n").unwrap();

    let err = replicated::write_config(&Offline, &mut rand::rngs::OsRng, &template, tmp.path(), "v1")
        .await
        .unwrap_err();

    assert!(matches!(err, ReleaseError::Manifest(_)));
    assert!(!tmp.path().join("replicated-v1.yml").exists());
}

#[tokio::test]
async fn replicated_config_is_rendered_for_known_tag() {
    let tmp = tempfile::tempdir().unwrap();
    let template = tmp.path().join("replicated.yml");
    std::fs::write(
        &template,
        "version: YUGABYTE_RELEASE_VERSION\nsecret: YUGAWARE_APP_SECRET\n",
    )
    .unwrap();
    let metadata = Listing(vec!["yugabyte-1.0-a.tar.gz"]);

    let written = replicated::write_config(&metadata, &mut rand::rngs::OsRng, &template, tmp.path(), "v1")
        .await
        .unwrap();

    assert_eq!(written, tmp.path().join("replicated-v1.yml"));
    let rendered = std::fs::read_to_string(written).unwrap();
    assert!(rendered.starts_with("version: v1\n"));
    assert!(!rendered.contains("YUGAWARE_APP_SECRET"));
}

#[tokio::test]
async fn blank_tag_is_not_published() {
    let tmp = tempfile::tempdir().unwrap();
    let packages = local_packages(tmp.path());
    let req = request(tmp.path(), Some("  "), packages, true);
    let store = empty_store(tmp.path());
    let tool = InspectingTool::new(&req.staging_root);

    let mut pipeline = ReleasePipeline::new(&Offline, &store, &tool);
    let report = pipeline.run(&req).await.unwrap();

    assert!(report.pushed_tags.is_empty());
    assert!(tool.pushes.borrow().is_empty());
    assert!(!pipeline.states().contains(&PipelineState::Publishing));
}

#[tokio::test]
async fn missing_local_package_fails_during_acquisition() {
    let tmp = tempfile::tempdir().unwrap();
    let packages = local_packages(tmp.path());
    std::fs::remove_file(&packages[1]).unwrap();
    let req = request(tmp.path(), None, packages, false);
    let store = empty_store(tmp.path());
    let tool = InspectingTool::new(&req.staging_root);

    let mut pipeline = ReleasePipeline::new(&Offline, &store, &tool);
    let err = pipeline.run(&req).await.unwrap_err();

    assert!(matches!(err, ReleaseError::Io(_)));
    assert!(!req.staging_root.exists());
    assert_eq!(
        &pipeline.states()[pipeline.states().len() - 3..],
        &[
            PipelineState::Acquiring,
            PipelineState::CleaningUp,
            PipelineState::Failed,
        ]
    );
}

#[tokio::test]
async fn download_failure_removes_partial_staging() {
    let tmp = tempfile::tempdir().unwrap();
    let source = tmp.path().join("bucket");
    std::fs::create_dir(&source).unwrap();
    local_packages(&source);
    std::fs::remove_file(source.join("yugabyte-1.0-a.tar.gz")).unwrap();

    let req = request(tmp.path(), Some("v1"), Vec::new(), true);
    let metadata = Listing(vec![
        "devops-1-a.tar.gz",
        "yugaware-1-a.tar.gz",
        "yugabyte-1.0-a.tar.gz",
    ]);
    let store = DirStore {
        source,
        downloads: RefCell::new(Vec::new()),
    };
    let tool = InspectingTool::new(&req.staging_root);

    let mut pipeline = ReleasePipeline::new(&metadata, &store, &tool);
    let err = pipeline.run(&req).await.unwrap_err();

    assert!(matches!(
        err,
        ReleaseError::Store(StoreError::DownloadFailed { .. })
    ));
    assert_eq!(store.downloads.borrow().len(), 3);
    assert!(tool.pushes.borrow().is_empty());
    assert!(!req.staging_root.exists());
    assert_eq!(
        &pipeline.states()[pipeline.states().len() - 3..],
        &[
            PipelineState::Acquiring,
            PipelineState::CleaningUp,
            PipelineState::Failed,
        ]
    );
}
