use std::path::PathBuf;

use thiserror::Error;

/// Problems detected before any subprocess is started.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("invalid crop area '{0}': expected WxH+X+Y with non-negative integers")]
    InvalidArea(String),
    #[error("invalid sampling rate '{0}': expected a positive decimal")]
    InvalidRate(String),
    #[error("input file not found: {}", .0.display())]
    InputNotFound(PathBuf),
    #[error("exec template '{0}' has no '{{}}' frame placeholder")]
    MissingPlaceholder(String),
    #[error("invalid OCR language list '{0}'")]
    InvalidLanguages(String),
    #[error("output directory {} already contains files", .0.display())]
    WorkingAreaNotEmpty(PathBuf),
    #[error("invalid pipeline: {0}")]
    InvalidPipeline(String),
}
