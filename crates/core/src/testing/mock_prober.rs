//! Mock media prober for testing.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::probe::{MediaMetadata, MediaProber, ProbeError};

/// Mock implementation of the MediaProber trait.
///
/// Returns fixed metadata for any existing file and records probed paths.
#[derive(Debug)]
pub struct MockProber {
    /// Metadata returned by every successful probe.
    metadata: Arc<RwLock<MediaMetadata>>,
    /// If set, the next probe fails with this error.
    next_error: Arc<RwLock<Option<ProbeError>>>,
    /// Probed paths, in order.
    probes: Arc<RwLock<Vec<PathBuf>>>,
}

impl MockProber {
    /// Create a prober reporting `metadata`.
    pub fn new(metadata: MediaMetadata) -> Self {
        Self {
            metadata: Arc::new(RwLock::new(metadata)),
            next_error: Arc::new(RwLock::new(None)),
            probes: Arc::new(RwLock::new(Vec::new())),
        }
    }

    /// Create a prober reporting a 10 second source of the given size.
    pub fn with_dimensions(width: u32, height: u32) -> Self {
        Self::new(MediaMetadata {
            duration_millis: 10_000,
            width,
            height,
        })
    }

    /// Change the reported metadata.
    pub async fn set_metadata(&self, metadata: MediaMetadata) {
        *self.metadata.write().await = metadata;
    }

    /// Configure the next probe to fail with the given error.
    pub async fn set_next_error(&self, error: ProbeError) {
        *self.next_error.write().await = Some(error);
    }

    /// Get all probed paths.
    pub async fn recorded_probes(&self) -> Vec<PathBuf> {
        self.probes.read().await.clone()
    }
}

#[async_trait]
impl MediaProber for MockProber {
    fn name(&self) -> &str {
        "mock"
    }

    async fn probe(&self, path: &Path) -> Result<MediaMetadata, ProbeError> {
        self.probes.write().await.push(path.to_path_buf());

        if let Some(err) = self.next_error.write().await.take() {
            return Err(err);
        }
        if !path.exists() {
            return Err(ProbeError::InputNotFound {
                path: path.to_path_buf(),
            });
        }

        Ok(*self.metadata.read().await)
    }
}
