//! Error types for the probe module.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while probing a media file.
#[derive(Debug, Error)]
pub enum ProbeError {
    /// FFprobe binary not found.
    #[error("FFprobe not found at path: {path}")]
    FfprobeNotFound { path: PathBuf },

    /// Input file not found.
    #[error("Input file not found: {path}")]
    InputNotFound { path: PathBuf },

    /// FFprobe exited unsuccessfully.
    #[error("ffprobe failed: {stderr}")]
    Failed { stderr: String },

    /// Duration output could not be parsed.
    #[error("Failed to parse video duration from {output:?}")]
    InvalidDuration { output: String },

    /// Dimension output could not be parsed.
    #[error("Failed to parse video resolution from {output:?}")]
    InvalidDimensions { output: String },

    /// I/O error while running ffprobe.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
