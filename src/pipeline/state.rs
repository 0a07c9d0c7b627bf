//! Pipeline state machine.

use std::fmt;

/// Stage of a docker release run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PipelineState {
    /// Selection not yet validated
    Init,
    /// Resolving the package list
    ResolvingManifest,
    /// Copying or downloading packages into staging
    Acquiring,
    /// Pulling the payload out of the database package
    ExtractingPayload,
    /// Building the image
    Assembling,
    /// Pushing the image
    Publishing,
    /// Removing the staging tree
    CleaningUp,
    /// Finished successfully
    Done,
    /// Finished with an error
    Failed,
}

impl PipelineState {
    /// Whether the run has finished
    pub fn is_terminal(self) -> bool {
        matches!(self, PipelineState::Done | PipelineState::Failed)
    }

    /// Whether a staging tree may exist in this state
    pub fn owns_staging(self) -> bool {
        matches!(
            self,
            PipelineState::Acquiring
                | PipelineState::ExtractingPayload
                | PipelineState::Assembling
                | PipelineState::Publishing
        )
    }

    /// Whether `next` is a legal successor
    pub fn can_transition_to(self, next: PipelineState) -> bool {
        use PipelineState::*;

        if next == Failed {
            return !self.is_terminal();
        }
        // Cleanup follows any state that owns staging
        if next == CleaningUp {
            return self.owns_staging();
        }
        matches!(
            (self, next),
            (Init, ResolvingManifest)
                | (ResolvingManifest, Acquiring)
                | (Acquiring, ExtractingPayload)
                | (ExtractingPayload, Assembling)
                | (Assembling, Publishing)
                | (CleaningUp, Done)
        )
    }
}

impl fmt::Display for PipelineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PipelineState::Init => "init",
            PipelineState::ResolvingManifest => "resolving-manifest",
            PipelineState::Acquiring => "acquiring",
            PipelineState::ExtractingPayload => "extracting-payload",
            PipelineState::Assembling => "assembling",
            PipelineState::Publishing => "publishing",
            PipelineState::CleaningUp => "cleaning-up",
            PipelineState::Done => "done",
            PipelineState::Failed => "failed",
        };
        f.write_str(name)
    }
}
