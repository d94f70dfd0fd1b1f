//! Types and file naming for the encoder module.

use once_cell::sync::Lazy;
use regex_lite::Regex;
use std::path::{Path, PathBuf};

use crate::rendition::Rendition;

/// File name of a rendition's playlist.
pub const PLAYLIST_FILE_NAME: &str = "index.m3u8";

/// Segment file template handed to ffmpeg.
pub const SEGMENT_FILE_TEMPLATE: &str = "segment_%03d.ts";

static SEGMENT_NAME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^segment_\d{3,}\.ts$").expect("segment pattern is valid"));

/// Whether `file_name` is a media segment written by the encoder.
pub fn is_segment_file(file_name: &str) -> bool {
    SEGMENT_NAME.is_match(file_name)
}

/// Index encoded in a segment file name: `segment_042.ts` is 42.
fn segment_index(path: &Path) -> Option<u64> {
    path.file_name()?
        .to_str()?
        .strip_prefix("segment_")?
        .strip_suffix(".ts")?
        .parse()
        .ok()
}

/// Lists segment files in `dir`, in playback order.
///
/// Ordering is by segment index, so `segment_1000.ts` follows `segment_999.ts`.
pub async fn list_segments(dir: &Path) -> std::io::Result<Vec<PathBuf>> {
    let mut entries = tokio::fs::read_dir(dir).await?;
    let mut segments = Vec::new();

    while let Some(entry) = entries.next_entry().await? {
        let name = entry.file_name();
        if name.to_str().is_some_and(is_segment_file) && entry.file_type().await?.is_file() {
            segments.push(entry.path());
        }
    }

    segments.sort_by(|a, b| {
        segment_index(a)
            .cmp(&segment_index(b))
            .then_with(|| a.cmp(b))
    });
    Ok(segments)
}

/// Result of a successful rendition encode.
#[derive(Debug, Clone)]
pub struct EncodeOutput {
    /// The rendition that was produced.
    pub rendition: Rendition,
    /// Path of the written playlist.
    pub playlist: PathBuf,
    /// Segment files, in playback order.
    pub segments: Vec<PathBuf>,
    /// Wall-clock encode time in milliseconds.
    pub elapsed_ms: u64,
}
