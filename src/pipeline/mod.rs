//! Docker release pipeline.
//!
//! Sequences manifest resolution, acquisition, payload extraction, image
//! build and optional publishing. The staging tree handle is created on
//! entering [`PipelineState::Acquiring`] and released on every exit path
//! after that, so no run leaves staged packages behind.

mod state;

pub use state::PipelineState;

use crate::error::{PayloadError, ReleaseError, Result};
use crate::image::{ImageAssembler, ImageTool};
use crate::manifest::{self, MetadataSource, ReleaseManifest, ReleaseSelection};
use crate::package::Component;
use crate::payload;
use crate::staging::{AcquiredPackages, ArtifactAcquirer, StagingTree};
use crate::store::ObjectStore;
use std::path::PathBuf;

/// Inputs of one docker release run
#[derive(Debug, Clone)]
pub struct DockerReleaseRequest {
    /// Release tag, used for download and publishing
    pub tag: Option<String>,
    /// Explicit local packages, preferred over the tag for acquisition
    pub packages: Vec<PathBuf>,
    /// Push the built image (requires a tag)
    pub publish: bool,
    /// Docker build context
    pub context_dir: PathBuf,
    /// Root of the ephemeral staging tree
    pub staging_root: PathBuf,
    /// Local image name
    pub image_name: String,
    /// Marker selecting the payload entries in the database package
    pub payload_marker: String,
}

impl DockerReleaseRequest {
    /// Tag with surrounding whitespace removed; a blank tag counts as absent
    pub fn release_tag(&self) -> Option<&str> {
        self.tag.as_deref().map(str::trim).filter(|t| !t.is_empty())
    }
}

/// Outcome of a successful run
#[derive(Debug, Clone)]
pub struct PipelineReport {
    /// Resolved packages
    pub manifest: ReleaseManifest,
    /// Where packages were staged (paths no longer exist after cleanup)
    pub acquired: AcquiredPackages,
    /// Extracted payload files (paths no longer exist after cleanup)
    pub payload: Vec<PathBuf>,
    /// Registry tags that were pushed
    pub pushed_tags: Vec<String>,
}

struct Assembled {
    acquired: AcquiredPackages,
    payload: Vec<PathBuf>,
    pushed_tags: Vec<String>,
}

/// Drives one docker release through its states
pub struct ReleasePipeline<'a, M, S, T> {
    metadata: &'a M,
    store: &'a S,
    images: &'a T,
    states: Vec<PipelineState>,
}

impl<'a, M, S, T> ReleasePipeline<'a, M, S, T>
where
    M: MetadataSource,
    S: ObjectStore,
    T: ImageTool,
{
    /// Pipeline over the given collaborators
    pub fn new(metadata: &'a M, store: &'a S, images: &'a T) -> Self {
        Self {
            metadata,
            store,
            images,
            states: vec![PipelineState::Init],
        }
    }

    /// States visited so far, in order
    pub fn states(&self) -> &[PipelineState] {
        &self.states
    }

    /// Current state
    pub fn state(&self) -> PipelineState {
        self.states
            .last()
            .copied()
            .unwrap_or(PipelineState::Init)
    }

    fn enter(&mut self, next: PipelineState) {
        debug_assert!(
            self.state().can_transition_to(next),
            "invalid transition {:?} -> {:?}",
            self.state(),
            next
        );
        log::info!("Pipeline: {} -> {}", self.state(), next);
        self.states.push(next);
    }

    fn fail<R>(&mut self, error: ReleaseError) -> Result<R> {
        self.enter(PipelineState::Failed);
        Err(error)
    }

    /// Run the pipeline to `Done` or `Failed`
    pub async fn run(&mut self, request: &DockerReleaseRequest) -> Result<PipelineReport> {
        let selection =
            match ReleaseSelection::from_args("docker", request.release_tag(), &request.packages) {
                Ok(selection) => selection,
                Err(e) => return self.fail(e.into()),
            };

        self.enter(PipelineState::ResolvingManifest);
        let manifest = match manifest::resolve(&selection, self.metadata).await {
            Ok(manifest) => manifest,
            Err(e) => return self.fail(e),
        };

        self.enter(PipelineState::Acquiring);
        let staging = match StagingTree::create(&request.staging_root) {
            Ok(staging) => staging,
            Err(e) => return self.fail(e.into()),
        };

        let outcome = self.assemble(&manifest, &staging, request).await;

        self.enter(PipelineState::CleaningUp);
        drop(staging);

        match outcome {
            Ok(assembled) => {
                self.enter(PipelineState::Done);
                Ok(PipelineReport {
                    manifest,
                    acquired: assembled.acquired,
                    payload: assembled.payload,
                    pushed_tags: assembled.pushed_tags,
                })
            }
            Err(e) => self.fail(e),
        }
    }

    /// Everything between acquisition and publishing; the caller owns cleanup
    async fn assemble(
        &mut self,
        manifest: &ReleaseManifest,
        staging: &StagingTree,
        request: &DockerReleaseRequest,
    ) -> Result<Assembled> {
        let mut acquirer = ArtifactAcquirer::new(self.store);
        for package in manifest.refs() {
            acquirer.acquire(package, staging).await?;
        }
        let acquired = acquirer.into_acquired();

        if let Some(control_plane) = &acquired.control_plane {
            log::info!("Control plane package: {}", control_plane.display());
        }

        self.enter(PipelineState::ExtractingPayload);
        let archive = acquired
            .payload_archive
            .clone()
            .ok_or_else(|| PayloadError::NotFound {
                archive: staging.root().join(Component::Yugabyte.as_str()),
                marker: request.payload_marker.clone(),
            })?;
        log::info!(
            "Get {} from {}",
            request.payload_marker,
            archive
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default()
        );
        let marker = request.payload_marker.clone();
        let dest = staging.root().to_path_buf();
        let payload = tokio::task::spawn_blocking(move || {
            payload::extract_named_entry(&archive, &marker, &dest)
        })
        .await
        .map_err(std::io::Error::other)??;

        self.enter(PipelineState::Assembling);
        let assembler = ImageAssembler::new(self.images, request.image_name.clone());
        assembler.build(&request.context_dir).await?;

        let mut pushed_tags = Vec::new();
        match (request.publish, request.release_tag()) {
            (true, Some(tag)) => {
                self.enter(PipelineState::Publishing);
                pushed_tags = assembler.publish(tag).await?;
            }
            (true, None) => log::warn!("--publish requires --tag; image was not pushed"),
            _ => {}
        }

        Ok(Assembled {
            acquired,
            payload,
            pushed_tags,
        })
    }
}
