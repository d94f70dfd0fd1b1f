//! Source media probing.
//!
//! The [`MediaProber`] trait reads duration and video dimensions from a local
//! file. [`FfprobeProber`] implements it with two `ffprobe` invocations:
//!
//! - `format=duration`, printed bare, in seconds
//! - `stream=width,height` of the first video stream, printed as `WIDTHxHEIGHT`
//!
//! Both outputs are parsed strictly. Unparseable output is an error, never a
//! default.

mod error;
mod ffprobe;
mod traits;
mod types;

pub use error::ProbeError;
pub use ffprobe::FfprobeProber;
pub use traits::MediaProber;
pub use types::MediaMetadata;
