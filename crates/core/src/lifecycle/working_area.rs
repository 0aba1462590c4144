use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tempfile::TempDir;
use thiserror::Error;

use crate::shared::config_error::ConfigError;
use crate::shared::constants::{
    DEFAULT_NAMED_AREA, FRAME_EXTENSION, FRAME_PATTERN, NAMED_AREA_SUFFIX,
};
use crate::shared::endpoint::InputSource;

/// How long the frame directory outlives the run. Chosen once, up front.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum WorkingAreaPolicy {
    /// Caller-visible directory, never removed by the pipeline.
    Named(PathBuf),
    /// System temp directory, removed on every exit path.
    Ephemeral,
}

impl WorkingAreaPolicy {
    /// Picks the policy from an explicit flag and optional directory.
    ///
    /// Without a directory, a named area is derived from the input file
    /// stem in the current directory, or a fixed name for piped input.
    pub fn select(input: &InputSource, directory: Option<PathBuf>, ephemeral: bool) -> Self {
        if ephemeral {
            return Self::Ephemeral;
        }
        Self::Named(directory.unwrap_or_else(|| Self::derived_name(input)))
    }

    pub fn derived_name(input: &InputSource) -> PathBuf {
        let stem = input
            .path()
            .and_then(|p| p.file_stem())
            .map(|s| s.to_string_lossy().into_owned());
        match stem {
            Some(stem) => PathBuf::from(format!("{stem}{NAMED_AREA_SUFFIX}")),
            None => PathBuf::from(DEFAULT_NAMED_AREA),
        }
    }
}

/// Directory receiving one image per sampled frame.
#[derive(Debug)]
pub struct WorkingArea {
    path: PathBuf,
    temp: Option<TempDir>,
}

impl WorkingArea {
    /// Creates (or reuses an empty) named directory.
    pub(crate) fn named(path: &Path) -> Result<Self, WorkingAreaError> {
        fs::create_dir_all(path).map_err(|source| WorkingAreaError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let mut entries = fs::read_dir(path).map_err(|source| WorkingAreaError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        if entries.next().is_some() {
            return Err(ConfigError::WorkingAreaNotEmpty(path.to_path_buf()).into());
        }
        log::info!("Writing frames to {}", path.display());
        Ok(Self {
            path: path.to_path_buf(),
            temp: None,
        })
    }

    pub(crate) fn ephemeral(root: &Path) -> Result<Self, WorkingAreaError> {
        let temp = tempfile::Builder::new()
            .prefix("frames-")
            .tempdir_in(root)
            .map_err(|source| WorkingAreaError::Io {
                path: root.to_path_buf(),
                source,
            })?;
        log::debug!("Staging frames in {}", temp.path().display());
        Ok(Self {
            path: temp.path().to_path_buf(),
            temp: Some(temp),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_ephemeral(&self) -> bool {
        self.temp.is_some()
    }

    /// Numbered output pattern handed to the frame extractor.
    pub fn frame_pattern(&self) -> PathBuf {
        self.path.join(FRAME_PATTERN)
    }

    /// Frame files in ascending filename order, which is also frame order.
    pub fn frames(&self) -> io::Result<Vec<PathBuf>> {
        let mut frames = Vec::new();
        for entry in fs::read_dir(&self.path)? {
            let path = entry?.path();
            let is_frame = path.is_file()
                && path
                    .extension()
                    .is_some_and(|ext| ext.eq_ignore_ascii_case(FRAME_EXTENSION));
            if is_frame {
                frames.push(path);
            }
        }
        frames.sort();
        Ok(frames)
    }

    /// Removes an ephemeral area now, reporting failures. Named areas are
    /// left in place.
    pub fn close(mut self) -> io::Result<()> {
        match self.temp.take() {
            Some(temp) => temp.close(),
            None => Ok(()),
        }
    }
}

#[derive(Error, Debug)]
pub enum WorkingAreaError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("cannot prepare working area {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}
