//! FFmpeg-based HLS encoder implementation.

use async_trait::async_trait;
use std::path::Path;
use std::process::Stdio;
use std::time::Instant;
use tokio::process::Command;
use tokio::time::{timeout, Duration};
use tracing::debug;

use super::config::EncoderConfig;
use super::error::EncodeError;
use super::traits::RenditionEncoder;
use super::types::{list_segments, EncodeOutput, PLAYLIST_FILE_NAME, SEGMENT_FILE_TEMPLATE};
use crate::rendition::Rendition;

/// Keep at most this many bytes of ffmpeg diagnostics in an error.
const MAX_STDERR_BYTES: usize = 4096;

/// Encoder that shells out to `ffmpeg` and writes HLS output.
#[derive(Debug, Clone)]
pub struct FfmpegEncoder {
    config: EncoderConfig,
}

impl FfmpegEncoder {
    /// Creates a new FFmpeg encoder with the given configuration.
    pub fn new(config: EncoderConfig) -> Self {
        Self { config }
    }

    /// Creates an encoder with default configuration.
    pub fn with_defaults() -> Self {
        Self::new(EncoderConfig::default())
    }

    /// Builds the ffmpeg video filter for a rendition.
    ///
    /// Scales down into the target box keeping the aspect ratio, then pads
    /// each side up to an even pixel count.
    fn video_filter(rendition: Rendition) -> String {
        format!(
            "scale={}:force_original_aspect_ratio=decrease,pad=ceil(iw/2)*2:ceil(ih/2)*2",
            rendition.scale_expr()
        )
    }

    /// Builds ffmpeg arguments for one rendition.
    fn build_args(&self, source: &Path, rendition: Rendition, output_dir: &Path) -> Vec<String> {
        let mut args = vec![
            "-y".to_string(), // Overwrite output
            "-i".to_string(),
            source.to_string_lossy().to_string(),
        ];

        // Video
        args.extend([
            "-c:v".to_string(),
            "libx264".to_string(),
            "-vf".to_string(),
            Self::video_filter(rendition),
            "-preset".to_string(),
            self.config.preset.clone(),
            "-crf".to_string(),
            self.config.crf.to_string(),
        ]);

        // Audio
        args.extend([
            "-c:a".to_string(),
            "aac".to_string(),
            "-b:a".to_string(),
            format!("{}k", self.config.audio_bitrate_kbps),
        ]);

        // Segmenting
        args.extend([
            "-hls_time".to_string(),
            self.config.segment_duration_secs.to_string(),
            "-hls_playlist_type".to_string(),
            "vod".to_string(),
            "-hls_segment_filename".to_string(),
            output_dir
                .join(SEGMENT_FILE_TEMPLATE)
                .to_string_lossy()
                .to_string(),
        ]);

        args.extend([
            "-loglevel".to_string(),
            self.config.ffmpeg_log_level.clone(),
        ]);

        // Extra args
        args.extend(self.config.extra_ffmpeg_args.iter().cloned());

        // Output
        args.push(
            output_dir
                .join(PLAYLIST_FILE_NAME)
                .to_string_lossy()
                .to_string(),
        );

        args
    }
}

/// Returns at most the last `max` bytes of `text`, on a char boundary.
fn tail(text: &str, max: usize) -> &str {
    if text.len() <= max {
        return text;
    }
    let mut start = text.len() - max;
    while !text.is_char_boundary(start) {
        start += 1;
    }
    &text[start..]
}

#[async_trait]
impl RenditionEncoder for FfmpegEncoder {
    fn name(&self) -> &str {
        "ffmpeg"
    }

    async fn encode(
        &self,
        source: &Path,
        rendition: Rendition,
        output_dir: &Path,
    ) -> Result<EncodeOutput, EncodeError> {
        if !source.exists() {
            return Err(EncodeError::InputNotFound {
                path: source.to_path_buf(),
            });
        }

        let start = Instant::now();
        let args = self.build_args(source, rendition, output_dir);
        debug!("Running {:?} {}", self.config.ffmpeg_path, args.join(" "));

        let child = Command::new(&self.config.ffmpeg_path)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    EncodeError::FfmpegNotFound {
                        path: self.config.ffmpeg_path.clone(),
                    }
                } else {
                    EncodeError::Io(e)
                }
            })?;

        // Dropping the child on timeout kills it.
        let timeout_duration = Duration::from_secs(self.config.timeout_secs);
        let output = match timeout(timeout_duration, child.wait_with_output()).await {
            Ok(result) => result?,
            Err(_) => {
                return Err(EncodeError::Timeout {
                    timeout_secs: self.config.timeout_secs,
                })
            }
        };

        let stderr = String::from_utf8_lossy(&output.stderr);
        let diagnostics = tail(stderr.trim(), MAX_STDERR_BYTES);

        if !output.status.success() {
            return Err(EncodeError::failed(output.status.code(), diagnostics));
        }

        let playlist = output_dir.join(PLAYLIST_FILE_NAME);
        if !tokio::fs::try_exists(&playlist).await.unwrap_or(false) {
            return Err(EncodeError::MissingPlaylist {
                path: playlist,
                stderr: diagnostics.to_string(),
            });
        }

        let segments = list_segments(output_dir).await?;

        Ok(EncodeOutput {
            rendition,
            playlist,
            segments,
            elapsed_ms: start.elapsed().as_millis() as u64,
        })
    }
}
