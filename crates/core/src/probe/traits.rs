//! Trait definitions for the probe module.

use async_trait::async_trait;
use std::path::Path;

use super::error::ProbeError;
use super::types::MediaMetadata;

/// Extracts duration and dimensions from a local media file.
#[async_trait]
pub trait MediaProber: Send + Sync {
    /// Returns the name of this prober implementation.
    fn name(&self) -> &str;

    /// Probes the file at `path`.
    async fn probe(&self, path: &Path) -> Result<MediaMetadata, ProbeError>;
}
