use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::lifecycle::resource_manager::LifecycleError;
use crate::shared::config_error::ConfigError;
use crate::stage::domain::stage_error::StageError;

use super::run_state::RunState;

pub const EXIT_FAILURE: i32 = 1;
pub const EXIT_USAGE: i32 = 2;
pub const EXIT_NO_TEXT: i32 = 3;
pub const EXIT_INTERRUPTED: i32 = 130;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Stage(StageError),
    #[error("frame extraction produced no frames in {}", .0.display())]
    NoFrames(PathBuf),
    #[error("interrupted")]
    Interrupted,
    #[error(transparent)]
    Lifecycle(#[from] LifecycleError),
    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: io::Error,
    },
    #[error("pipeline cannot move from {0} to {1}")]
    InvalidState(RunState, RunState),
}

impl From<StageError> for PipelineError {
    fn from(err: StageError) -> Self {
        match err {
            StageError::Interrupted => Self::Interrupted,
            other => Self::Stage(other),
        }
    }
}

impl From<(RunState, RunState)> for PipelineError {
    fn from((from, to): (RunState, RunState)) -> Self {
        Self::InvalidState(from, to)
    }
}

impl PipelineError {
    pub(crate) fn io(context: impl Into<String>, source: io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    /// Process exit code for this failure.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Config(_) => EXIT_USAGE,
            Self::Interrupted => EXIT_INTERRUPTED,
            Self::Lifecycle(LifecycleError::Config(_)) => EXIT_USAGE,
            _ => EXIT_FAILURE,
        }
    }

    pub fn is_interrupted(&self) -> bool {
        matches!(self, Self::Interrupted)
    }
}
