//! The fixed rendition table.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// An output quality tier.
///
/// Variants are declared in ascending quality, so the derived `Ord` matches
/// the order renditions are planned, encoded and reported in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Rendition {
    #[serde(rename = "240p")]
    P240,
    #[serde(rename = "360p")]
    P360,
    #[serde(rename = "480p")]
    P480,
    #[serde(rename = "720p")]
    P720,
    #[serde(rename = "1080p")]
    P1080,
}

/// A width/height pair in whole pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

impl Dimensions {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Whether both sides are at least as large as `other`.
    pub fn covers(&self, other: Dimensions) -> bool {
        self.width >= other.width && self.height >= other.height
    }
}

impl fmt::Display for Dimensions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

impl Rendition {
    /// Every rendition, lowest first.
    pub const ALL: [Rendition; 5] = [
        Rendition::P240,
        Rendition::P360,
        Rendition::P480,
        Rendition::P720,
        Rendition::P1080,
    ];

    /// The lowest tier, used when a source is below every threshold.
    pub const LOWEST: Rendition = Rendition::P240;

    /// Name used in object keys, directory names and responses.
    pub fn name(&self) -> &'static str {
        match self {
            Rendition::P240 => "240p",
            Rendition::P360 => "360p",
            Rendition::P480 => "480p",
            Rendition::P720 => "720p",
            Rendition::P1080 => "1080p",
        }
    }

    /// Box the encoder scales into.
    ///
    /// 480p targets 852 wide rather than 854 so the encoded width stays even.
    pub fn target(&self) -> Dimensions {
        match self {
            Rendition::P240 => Dimensions::new(426, 240),
            Rendition::P360 => Dimensions::new(640, 360),
            Rendition::P480 => Dimensions::new(852, 480),
            Rendition::P720 => Dimensions::new(1280, 720),
            Rendition::P1080 => Dimensions::new(1920, 1080),
        }
    }

    /// Minimum source size that classifies as this tier.
    pub fn threshold(&self) -> Dimensions {
        match self {
            Rendition::P480 => Dimensions::new(854, 480),
            other => other.target(),
        }
    }

    /// Ffmpeg scale expression for the target box (`W:H`).
    pub fn scale_expr(&self) -> String {
        let target = self.target();
        format!("{}:{}", target.width, target.height)
    }
}

impl fmt::Display for Rendition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Error returned when parsing an unknown rendition name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown rendition: {0}")]
pub struct UnknownRendition(pub String);

impl FromStr for Rendition {
    type Err = UnknownRendition;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Rendition::ALL
            .into_iter()
            .find(|r| r.name() == s)
            .ok_or_else(|| UnknownRendition(s.to_string()))
    }
}
