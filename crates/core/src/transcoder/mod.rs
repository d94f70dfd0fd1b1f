//! Transcode orchestrator.
//!
//! Wires storage, probing, planning and encoding into a single job:
//!
//! 1. Create a scratch workspace (`video-*` file + `transcoded-*` directory)
//! 2. Download the source object
//! 3. Probe duration and resolution
//! 4. Plan the rendition ladder
//! 5. For each rendition, ascending: encode, upload playlist, upload segments
//!
//! The first failure ends the job with a [`TranscodeError`] naming its
//! [`Stage`]. Scratch space is always released. Jobs that write the same
//! destination prefix are serialized.

mod config;
mod ledger;
mod locks;
mod runner;
mod types;
mod workspace;

pub use config::TranscoderConfig;
pub use runner::Transcoder;
pub use types::{Stage, TranscodeError, TranscodeResult};
pub use workspace::ScratchWorkspace;
