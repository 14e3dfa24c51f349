//! Error types for load-scan

use std::path::PathBuf;
use thiserror::Error;

/// Failures of the object detector capability.
#[derive(Error, Debug)]
pub enum DetectorError {
    #[error("Failed to load detection model from {path:?}: {source}")]
    Load {
        path: PathBuf,
        #[source]
        source: ort::Error,
    },

    #[error("Failed to read class names from {path:?}: {source}")]
    Classes {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("ONNX Runtime error: {0}")]
    Ort(#[from] ort::Error),

    #[error("Unexpected model output: {0}")]
    Output(String),

    #[error("Detector lock poisoned by a panicked inference call")]
    Poisoned,
}

/// Errors surfaced by the analysis operations.
///
/// An empty detection set is not an error; it produces the zero-valued result.
#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error("Image decode error: {0}")]
    ImageDecode(#[source] image::ImageError),

    #[error("Image encode error: {0}")]
    ImageEncode(#[source] image::ImageError),

    #[error("Detector unavailable: {0}")]
    DetectorUnavailable(#[from] DetectorError),
}

/// Problems with the configuration file or the resources it points at.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error reading {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid configuration file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Font at {0:?} could not be parsed")]
    Font(PathBuf),
}
