//! Testing utilities and mock implementations.
//!
//! This module provides mock implementations of the storage, probe and
//! encoder traits, so jobs can run end to end without ffmpeg or S3.
//!
//! # Example
//!
//! ```rust,ignore
//! use ladder_core::testing::{fixtures, MockEncoder, MockProber, MockStorage};
//!
//! let storage = Arc::new(MockStorage::new());
//! storage.add_source("clip.mp4", fixtures::source_bytes()).await;
//!
//! let transcoder = fixtures::transcoder(
//!     scratch.path(),
//!     storage.clone(),
//!     Arc::new(MockProber::with_dimensions(640, 360)),
//!     Arc::new(MockEncoder::new()),
//! );
//! ```

mod mock_encoder;
mod mock_prober;
mod mock_storage;

pub use mock_encoder::MockEncoder;
pub use mock_prober::MockProber;
pub use mock_storage::{MockStorage, RecordedUpload};

/// Test fixtures and helper functions.
pub mod fixtures {
    use std::path::Path;
    use std::sync::Arc;

    use crate::encoder::RenditionEncoder;
    use crate::probe::{MediaMetadata, MediaProber};
    use crate::storage::StorageGateway;
    use crate::transcoder::{Transcoder, TranscoderConfig};

    /// Bytes standing in for a source video.
    pub fn source_bytes() -> Vec<u8> {
        b"\x00\x00\x00\x18ftypmp42 not really a video".to_vec()
    }

    /// Probe metadata with a 10 second duration.
    pub fn metadata(width: u32, height: u32) -> MediaMetadata {
        MediaMetadata {
            duration_millis: 10_000,
            width,
            height,
        }
    }

    /// Transcoder using `scratch_dir` with rollback enabled and no job limit.
    pub fn transcoder(
        scratch_dir: &Path,
        storage: Arc<dyn StorageGateway>,
        prober: Arc<dyn MediaProber>,
        encoder: Arc<dyn RenditionEncoder>,
    ) -> Transcoder {
        Transcoder::new(
            TranscoderConfig::default().with_scratch_dir(scratch_dir),
            storage,
            prober,
            encoder,
        )
    }
}
