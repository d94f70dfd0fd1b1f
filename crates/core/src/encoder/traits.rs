//! Trait definitions for the encoder module.

use async_trait::async_trait;
use std::path::Path;

use super::error::EncodeError;
use super::types::EncodeOutput;
use crate::rendition::Rendition;

/// Produces one segmented streaming rendition from a local source file.
#[async_trait]
pub trait RenditionEncoder: Send + Sync {
    /// Returns the name of this encoder implementation.
    fn name(&self) -> &str;

    /// Encodes `source` into a playlist plus segments under `output_dir`.
    ///
    /// `output_dir` must already exist. Existing files in it are overwritten.
    async fn encode(
        &self,
        source: &Path,
        rendition: Rendition,
        output_dir: &Path,
    ) -> Result<EncodeOutput, EncodeError>;
}
