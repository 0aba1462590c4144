use std::io;
use std::path::{Path, PathBuf};

use tempfile::TempDir;
use thiserror::Error;

use crate::progress::domain::progress_tracker::ProgressScale;
use crate::shared::config_error::ConfigError;
use crate::shared::constants::SCRATCH_PREFIX;

use super::progress_feed::ProgressFeed;
use super::working_area::{WorkingArea, WorkingAreaError, WorkingAreaPolicy};

#[derive(Error, Debug)]
pub enum LifecycleError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("failed to create scratch directory: {0}")]
    Scratch(#[source] io::Error),
    #[error("failed to create progress feed {}: {source}", path.display())]
    Feed {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("cannot prepare working area {}: {source}", path.display())]
    WorkingArea {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to remove {}: {source}", path.display())]
    Remove {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl From<WorkingAreaError> for LifecycleError {
    fn from(err: WorkingAreaError) -> Self {
        match err {
            WorkingAreaError::Config(e) => Self::Config(e),
            WorkingAreaError::Io { path, source } => Self::WorkingArea { path, source },
        }
    }
}

/// Owns every ephemeral resource of a run.
///
/// Progress FIFOs and ephemeral working areas all live under one scratch
/// directory, so a single removal covers every exit path. Removal happens
/// in [`ResourceManager::release`] or, failing that, on drop.
#[derive(Debug)]
pub struct ResourceManager {
    scratch: Option<TempDir>,
    feeds_created: usize,
}

impl ResourceManager {
    /// Creates the scratch directory under `root`, or the system temp dir.
    pub fn new(root: Option<&Path>) -> Result<Self, LifecycleError> {
        let mut builder = tempfile::Builder::new();
        builder.prefix(SCRATCH_PREFIX);
        let scratch = match root {
            Some(root) => builder.tempdir_in(root),
            None => builder.tempdir(),
        }
        .map_err(LifecycleError::Scratch)?;
        log::debug!("Scratch directory {}", scratch.path().display());
        Ok(Self {
            scratch: Some(scratch),
            feeds_created: 0,
        })
    }

    pub fn scratch_path(&self) -> Option<&Path> {
        self.scratch.as_ref().map(|s| s.path())
    }

    /// Creates a fresh FIFO for one stage's progress records.
    pub fn progress_feed(
        &mut self,
        label: &str,
        scale: ProgressScale,
    ) -> Result<ProgressFeed, LifecycleError> {
        let root = self.live_scratch()?;
        self.feeds_created += 1;
        let path = root.join(format!("{:02}-{label}.progress", self.feeds_created));
        ProgressFeed::create(path.clone(), scale)
            .map_err(|source| LifecycleError::Feed { path, source })
    }

    pub fn working_area(&self, policy: &WorkingAreaPolicy) -> Result<WorkingArea, LifecycleError> {
        let area = match policy {
            WorkingAreaPolicy::Named(path) => WorkingArea::named(path)?,
            WorkingAreaPolicy::Ephemeral => WorkingArea::ephemeral(&self.live_scratch()?)?,
        };
        Ok(area)
    }

    /// Removes the scratch directory and everything in it.
    pub fn release(mut self) -> Result<(), LifecycleError> {
        let Some(scratch) = self.scratch.take() else {
            return Ok(());
        };
        let path = scratch.path().to_path_buf();
        scratch.close().map_err(|source| LifecycleError::Remove {
            path: path.clone(),
            source,
        })?;
        log::debug!("Removed scratch directory {}", path.display());
        Ok(())
    }

    fn live_scratch(&self) -> Result<PathBuf, LifecycleError> {
        self.scratch
            .as_ref()
            .map(|s| s.path().to_path_buf())
            .ok_or_else(|| {
                LifecycleError::Scratch(io::Error::new(
                    io::ErrorKind::NotFound,
                    "scratch directory already released",
                ))
            })
    }
}
