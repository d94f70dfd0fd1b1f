//! Error types for the encoder module.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while encoding a rendition.
#[derive(Debug, Error)]
pub enum EncodeError {
    /// FFmpeg binary not found.
    #[error("FFmpeg not found at path: {path}")]
    FfmpegNotFound { path: PathBuf },

    /// Source file not found.
    #[error("Input file not found: {path}")]
    InputNotFound { path: PathBuf },

    /// FFmpeg exited with a non-zero status.
    #[error("FFmpeg exited with {}: {stderr}", describe_exit(.code))]
    Failed { code: Option<i32>, stderr: String },

    /// FFmpeg reported success but wrote no playlist.
    #[error("Playlist not created: {path}: {stderr}")]
    MissingPlaylist { path: PathBuf, stderr: String },

    /// Encoding timed out.
    #[error("Encoding timed out after {timeout_secs} seconds")]
    Timeout { timeout_secs: u64 },

    /// I/O error during encoding.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// `code 1`, or `signal` when the process was killed without an exit code.
fn describe_exit(code: &Option<i32>) -> String {
    match *code {
        Some(code) => format!("code {}", code),
        None => "signal".to_string(),
    }
}

impl EncodeError {
    /// Creates a failed error from an exit code and captured stderr.
    pub fn failed(code: Option<i32>, stderr: impl Into<String>) -> Self {
        Self::Failed {
            code,
            stderr: stderr.into(),
        }
    }
}
