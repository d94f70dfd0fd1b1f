//! FFprobe-based prober implementation.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;
use tracing::debug;

use super::error::ProbeError;
use super::traits::MediaProber;
use super::types::MediaMetadata;

/// Prober that shells out to `ffprobe`.
#[derive(Debug, Clone)]
pub struct FfprobeProber {
    ffprobe_path: PathBuf,
}

impl FfprobeProber {
    /// Creates a prober using the given ffprobe binary.
    pub fn new(ffprobe_path: impl Into<PathBuf>) -> Self {
        Self {
            ffprobe_path: ffprobe_path.into(),
        }
    }

    /// Parses ffprobe's bare `format=duration` output (seconds) into milliseconds.
    pub(crate) fn parse_duration_millis(output: &str) -> Result<u64, ProbeError> {
        let trimmed = output.trim();
        let invalid = || ProbeError::InvalidDuration {
            output: trimmed.to_string(),
        };

        let secs: f64 = trimmed.parse().map_err(|_| invalid())?;
        if !secs.is_finite() || secs < 0.0 {
            return Err(invalid());
        }

        Ok((secs * 1000.0) as u64)
    }

    /// Parses `WIDTHxHEIGHT` as printed by `-of csv=s=x:p=0`.
    pub(crate) fn parse_dimensions(output: &str) -> Result<(u32, u32), ProbeError> {
        let trimmed = output.trim();
        let invalid = || ProbeError::InvalidDimensions {
            output: trimmed.to_string(),
        };

        let (width, height) = trimmed.split_once('x').ok_or_else(invalid)?;
        let parse_side = |side: &str| -> Result<u32, ProbeError> {
            if side.is_empty() || !side.bytes().all(|b| b.is_ascii_digit()) {
                return Err(invalid());
            }
            match side.parse::<u32>() {
                Ok(0) | Err(_) => Err(invalid()),
                Ok(value) => Ok(value),
            }
        };

        Ok((parse_side(width)?, parse_side(height)?))
    }

    async fn run(&self, args: &[&str], path: &Path) -> Result<String, ProbeError> {
        let output = Command::new(&self.ffprobe_path)
            .args(args)
            .arg(path)
            .stdin(Stdio::null())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    ProbeError::FfprobeNotFound {
                        path: self.ffprobe_path.clone(),
                    }
                } else {
                    ProbeError::Io(e)
                }
            })?;

        if !output.status.success() {
            return Err(ProbeError::Failed {
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

impl Default for FfprobeProber {
    fn default() -> Self {
        Self::new("ffprobe")
    }
}

#[async_trait]
impl MediaProber for FfprobeProber {
    fn name(&self) -> &str {
        "ffprobe"
    }

    async fn probe(&self, path: &Path) -> Result<MediaMetadata, ProbeError> {
        if !path.exists() {
            return Err(ProbeError::InputNotFound {
                path: path.to_path_buf(),
            });
        }

        let duration_out = self
            .run(
                &[
                    "-v",
                    "error",
                    "-show_entries",
                    "format=duration",
                    "-of",
                    "default=noprint_wrappers=1:nokey=1",
                ],
                path,
            )
            .await?;
        let duration_millis = Self::parse_duration_millis(&duration_out)?;

        let dims_out = self
            .run(
                &[
                    "-v",
                    "error",
                    "-select_streams",
                    "v:0",
                    "-show_entries",
                    "stream=width,height",
                    "-of",
                    "csv=s=x:p=0",
                ],
                path,
            )
            .await?;
        let (width, height) = Self::parse_dimensions(&dims_out)?;

        debug!(
            "Probed {:?}: {}ms, {}x{}",
            path, duration_millis, width, height
        );

        Ok(MediaMetadata {
            duration_millis,
            width,
            height,
        })
    }
}
