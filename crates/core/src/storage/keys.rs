//! Object key layout for source and destination objects.

use std::path::Path;

use crate::encoder::PLAYLIST_FILE_NAME;
use crate::rendition::Rendition;

/// Prefix every transcoded object lives under.
pub const DESTINATION_PREFIX: &str = "transcoded";

/// Content type declared for HLS playlists.
pub const PLAYLIST_CONTENT_TYPE: &str = "application/x-mpegURL";

/// Content type declared for MPEG-TS segments.
pub const SEGMENT_CONTENT_TYPE: &str = "video/MP2T";

/// Extension used for the scratch source file when the key has none.
pub const DEFAULT_SOURCE_EXTENSION: &str = ".mp4";

/// Last path element of an object key, ignoring trailing slashes.
fn file_name(key: &str) -> &str {
    let trimmed = key.trim_end_matches('/');
    trimmed.rsplit('/').next().unwrap_or(trimmed)
}

/// Base name of a source key: last path element with its extension removed.
///
/// `movies/clip.mp4` becomes `clip`. A name that is all extension
/// (`.mp4`) is kept whole.
pub fn source_base_name(source_key: &str) -> &str {
    let name = file_name(source_key);
    match name.rfind('.') {
        Some(0) | None => name,
        Some(idx) => &name[..idx],
    }
}

/// Extension of a source key including the dot, or `.mp4` when absent.
pub fn source_extension(source_key: &str) -> String {
    let name = file_name(source_key);
    match name.rfind('.') {
        Some(idx) if idx > 0 && idx + 1 < name.len() => name[idx..].to_string(),
        _ => DEFAULT_SOURCE_EXTENSION.to_string(),
    }
}

/// Content type to declare for an uploaded file.
pub fn content_type_for(path: &Path) -> &'static str {
    match path.extension().and_then(|e| e.to_str()) {
        Some("m3u8") => PLAYLIST_CONTENT_TYPE,
        Some("ts") => SEGMENT_CONTENT_TYPE,
        _ => "application/octet-stream",
    }
}

/// Destination keys for one source object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DestinationKeys {
    base_name: String,
}

impl DestinationKeys {
    /// Builds the layout for `source_key`.
    pub fn for_source(source_key: &str) -> Self {
        Self {
            base_name: source_base_name(source_key).to_string(),
        }
    }

    pub fn base_name(&self) -> &str {
        &self.base_name
    }

    /// `transcoded/{base}`, shared by every rendition of the source.
    pub fn prefix(&self) -> String {
        format!("{}/{}", DESTINATION_PREFIX, self.base_name)
    }

    /// `transcoded/{base}/{rendition}`
    pub fn rendition_prefix(&self, rendition: Rendition) -> String {
        format!("{}/{}", self.prefix(), rendition)
    }

    /// `transcoded/{base}/{rendition}/index.m3u8`
    pub fn playlist(&self, rendition: Rendition) -> String {
        self.file(rendition, PLAYLIST_FILE_NAME)
    }

    /// `transcoded/{base}/{rendition}/{file_name}`
    pub fn file(&self, rendition: Rendition, file_name: &str) -> String {
        format!("{}/{}", self.rendition_prefix(rendition), file_name)
    }
}
