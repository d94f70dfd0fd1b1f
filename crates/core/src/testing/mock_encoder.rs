//! Mock rendition encoder for testing.

use async_trait::async_trait;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

use crate::encoder::{list_segments, EncodeError, EncodeOutput, RenditionEncoder, PLAYLIST_FILE_NAME};
use crate::rendition::Rendition;

/// Mock implementation of the RenditionEncoder trait.
///
/// Writes a small playlist and a configurable number of segment files into
/// the output directory instead of running ffmpeg.
#[derive(Debug)]
pub struct MockEncoder {
    /// Segments written per rendition.
    segments_per_rendition: Arc<RwLock<usize>>,
    /// Rendition that fails, and the stderr it reports.
    failing: Arc<RwLock<Option<(Rendition, String)>>>,
    /// Rendition whose next encode fails once.
    failing_once: Arc<RwLock<Option<(Rendition, String)>>>,
    /// Simulated encode time.
    delay: Arc<RwLock<Duration>>,
    /// Renditions requested, in order.
    encodes: Arc<RwLock<Vec<Rendition>>>,
}

impl Default for MockEncoder {
    fn default() -> Self {
        Self::new()
    }
}

impl MockEncoder {
    /// Create an encoder writing two segments per rendition.
    pub fn new() -> Self {
        Self {
            segments_per_rendition: Arc::new(RwLock::new(2)),
            failing: Arc::new(RwLock::new(None)),
            failing_once: Arc::new(RwLock::new(None)),
            delay: Arc::new(RwLock::new(Duration::ZERO)),
            encodes: Arc::new(RwLock::new(Vec::new())),
        }
    }

    /// Set how many segments each encode writes.
    pub async fn set_segments_per_rendition(&self, count: usize) {
        *self.segments_per_rendition.write().await = count;
    }

    /// Make encodes of `rendition` fail with `stderr`.
    pub async fn fail_rendition(&self, rendition: Rendition, stderr: &str) {
        *self.failing.write().await = Some((rendition, stderr.to_string()));
    }

    /// Make only the next encode of `rendition` fail with `stderr`.
    pub async fn fail_rendition_once(&self, rendition: Rendition, stderr: &str) {
        *self.failing_once.write().await = Some((rendition, stderr.to_string()));
    }

    /// Set the simulated encode time.
    pub async fn set_delay(&self, delay: Duration) {
        *self.delay.write().await = delay;
    }

    /// Get all requested renditions.
    pub async fn recorded_encodes(&self) -> Vec<Rendition> {
        self.encodes.read().await.clone()
    }
}

#[async_trait]
impl RenditionEncoder for MockEncoder {
    fn name(&self) -> &str {
        "mock"
    }

    async fn encode(
        &self,
        source: &Path,
        rendition: Rendition,
        output_dir: &Path,
    ) -> Result<EncodeOutput, EncodeError> {
        self.encodes.write().await.push(rendition);

        if !source.exists() {
            return Err(EncodeError::InputNotFound {
                path: source.to_path_buf(),
            });
        }

        let delay = *self.delay.read().await;
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        {
            let mut once = self.failing_once.write().await;
            if once.as_ref().is_some_and(|(failing, _)| *failing == rendition) {
                if let Some((_, stderr)) = once.take() {
                    return Err(EncodeError::failed(Some(1), stderr));
                }
            }
        }

        if let Some((failing, stderr)) = self.failing.read().await.clone() {
            if failing == rendition {
                return Err(EncodeError::failed(Some(1), stderr));
            }
        }

        let count = *self.segments_per_rendition.read().await;
        let mut playlist = String::from("#EXTM3U\n#EXT-X-VERSION:3\n#EXT-X-PLAYLIST-TYPE:VOD\n");
        for i in 0..count {
            let name = format!("segment_{:03}.ts", i);
            tokio::fs::write(output_dir.join(&name), format!("{} {}", rendition, i)).await?;
            playlist.push_str(&format!("#EXTINF:10.0,\n{}\n", name));
        }
        playlist.push_str("#EXT-X-ENDLIST\n");

        let playlist_path = output_dir.join(PLAYLIST_FILE_NAME);
        tokio::fs::write(&playlist_path, playlist).await?;

        Ok(EncodeOutput {
            rendition,
            playlist: playlist_path,
            segments: list_segments(output_dir).await?,
            elapsed_ms: delay.as_millis() as u64,
        })
    }
}
