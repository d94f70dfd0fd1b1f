//! Rendition encoding into segmented HLS output.
//!
//! This module provides the [`RenditionEncoder`] trait and an ffmpeg-backed
//! implementation. One call produces one rendition: an `index.m3u8` playlist and
//! `segment_NNN.ts` media segments inside the given output directory.
//!
//! # Example
//!
//! ```ignore
//! use ladder_core::encoder::{EncoderConfig, FfmpegEncoder, RenditionEncoder};
//! use ladder_core::Rendition;
//!
//! let encoder = FfmpegEncoder::new(EncoderConfig::default());
//! let output = encoder
//!     .encode(Path::new("/tmp/video-1.mp4"), Rendition::P720, Path::new("/tmp/out/720p"))
//!     .await?;
//! println!("{} segments", output.segments.len());
//! ```

mod config;
mod error;
mod ffmpeg;
mod traits;
mod types;

pub use config::EncoderConfig;
pub use error::EncodeError;
pub use ffmpeg::FfmpegEncoder;
pub use traits::RenditionEncoder;
pub use types::{
    is_segment_file, list_segments, EncodeOutput, PLAYLIST_FILE_NAME, SEGMENT_FILE_TEMPLATE,
};
