use std::fmt;
use std::path::{Path, PathBuf};

use super::config_error::ConfigError;
use super::constants::STREAM_MARKER;

/// Where a pipeline reads its video from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum InputSource {
    Stdin,
    File(PathBuf),
}

impl InputSource {
    /// Interprets a command-line argument, treating `-` as stdin.
    pub fn from_arg(arg: &str) -> Self {
        if arg == STREAM_MARKER {
            Self::Stdin
        } else {
            Self::File(PathBuf::from(arg))
        }
    }

    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::Stdin => None,
            Self::File(path) => Some(path),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        match self {
            Self::File(path) if !path.is_file() => Err(ConfigError::InputNotFound(path.clone())),
            _ => Ok(()),
        }
    }
}

impl fmt::Display for InputSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Stdin => f.write_str("<stdin>"),
            Self::File(path) => write!(f, "{}", path.display()),
        }
    }
}

/// Where a pipeline writes its final result.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum OutputSink {
    Stdout,
    File(PathBuf),
}

impl OutputSink {
    /// Interprets a command-line argument, treating `-` or no value as stdout.
    pub fn from_arg(arg: Option<&str>) -> Self {
        match arg {
            None => Self::Stdout,
            Some(STREAM_MARKER) => Self::Stdout,
            Some(path) => Self::File(PathBuf::from(path)),
        }
    }

    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::Stdout => None,
            Self::File(path) => Some(path),
        }
    }
}

impl fmt::Display for OutputSink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Stdout => f.write_str("<stdout>"),
            Self::File(path) => write!(f, "{}", path.display()),
        }
    }
}
