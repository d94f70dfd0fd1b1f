//! Types for the probe module.

use serde::{Deserialize, Serialize};

use crate::rendition::Dimensions;

/// What a probe learns about a source file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaMetadata {
    /// Duration in whole milliseconds, truncated.
    pub duration_millis: u64,
    /// Width of the first video stream.
    pub width: u32,
    /// Height of the first video stream.
    pub height: u32,
}

impl MediaMetadata {
    pub fn dimensions(&self) -> Dimensions {
        Dimensions::new(self.width, self.height)
    }
}
