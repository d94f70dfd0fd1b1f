//! Transcoder configuration.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Configuration for the transcode orchestrator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranscoderConfig {
    /// Root directory for job scratch workspaces.
    /// Each job creates and removes its own `video-*` file and `transcoded-*` directory here.
    #[serde(default = "default_scratch_dir")]
    pub scratch_dir: PathBuf,

    /// Maximum jobs running at once (0 = unlimited).
    /// Further requests wait for a free slot.
    #[serde(default)]
    pub max_concurrent_jobs: usize,

    /// Delete objects a failed or cancelled job created.
    /// Keys that existed before the job started are never deleted.
    #[serde(default = "default_rollback")]
    pub rollback_on_failure: bool,
}

fn default_scratch_dir() -> PathBuf {
    std::env::temp_dir()
}

fn default_rollback() -> bool {
    true
}

impl Default for TranscoderConfig {
    fn default() -> Self {
        Self {
            scratch_dir: default_scratch_dir(),
            max_concurrent_jobs: 0,
            rollback_on_failure: default_rollback(),
        }
    }
}

impl TranscoderConfig {
    /// Sets the scratch directory.
    pub fn with_scratch_dir(mut self, scratch_dir: impl Into<PathBuf>) -> Self {
        self.scratch_dir = scratch_dir.into();
        self
    }

    /// Sets the job concurrency limit.
    pub fn with_max_concurrent_jobs(mut self, max: usize) -> Self {
        self.max_concurrent_jobs = max;
        self
    }

    /// Enables or disables rollback of uploads on failure.
    pub fn with_rollback(mut self, enabled: bool) -> Self {
        self.rollback_on_failure = enabled;
        self
    }
}
