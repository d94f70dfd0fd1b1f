//! Types for the transcode orchestrator.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::encoder::EncodeError;
use crate::probe::ProbeError;
use crate::rendition::Rendition;
use crate::storage::StorageError;

/// Pipeline stage a job failed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Stage {
    Download,
    Probe,
    Encode,
    Upload,
    NoOutput,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Download => "download",
            Stage::Probe => "probe",
            Stage::Encode => "encode",
            Stage::Upload => "upload",
            Stage::NoOutput => "no-output",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Renders the renditions finished before a failure, if any.
fn completed_note(completed: &[Rendition]) -> String {
    if completed.is_empty() {
        return String::new();
    }
    let names: Vec<&str> = completed.iter().map(Rendition::name).collect();
    format!(" (completed before failure: {})", names.join(", "))
}

/// Errors that abort a transcode job.
#[derive(Debug, Error)]
pub enum TranscodeError {
    /// Scratch workspace could not be created.
    #[error("download failed: could not create scratch workspace: {0}")]
    Workspace(#[source] std::io::Error),

    /// Source download failed.
    #[error("download failed: {0}")]
    Download(#[source] StorageError),

    /// Source could not be probed.
    #[error("probe failed: {0}")]
    Probe(#[source] ProbeError),

    /// Rendition output directory could not be created.
    #[error("encode failed for {rendition}{}: could not create output directory: {source}", completed_note(.completed))]
    OutputDir {
        rendition: Rendition,
        completed: Vec<Rendition>,
        #[source]
        source: std::io::Error,
    },

    /// Encoder failed for a rendition.
    #[error("encode failed for {rendition}{}: {source}", completed_note(.completed))]
    Encode {
        rendition: Rendition,
        completed: Vec<Rendition>,
        #[source]
        source: EncodeError,
    },

    /// Uploading a rendition's files failed.
    #[error("upload failed for {rendition}{}: {source}", completed_note(.completed))]
    Upload {
        rendition: Rendition,
        completed: Vec<Rendition>,
        #[source]
        source: StorageError,
    },

    /// The job finished without producing any rendition.
    #[error("no-output: no renditions were produced")]
    NoOutput,
}

impl TranscodeError {
    /// Stage the job stopped at.
    pub fn stage(&self) -> Stage {
        match self {
            Self::Workspace(_) | Self::Download(_) => Stage::Download,
            Self::Probe(_) => Stage::Probe,
            Self::OutputDir { .. } | Self::Encode { .. } => Stage::Encode,
            Self::Upload { .. } => Stage::Upload,
            Self::NoOutput => Stage::NoOutput,
        }
    }

    /// Rendition being processed when the job stopped, if any.
    pub fn rendition(&self) -> Option<Rendition> {
        match self {
            Self::OutputDir { rendition, .. }
            | Self::Encode { rendition, .. }
            | Self::Upload { rendition, .. } => Some(*rendition),
            _ => None,
        }
    }

    /// Renditions fully produced and uploaded before the failure.
    pub fn completed(&self) -> &[Rendition] {
        match self {
            Self::OutputDir { completed, .. }
            | Self::Encode { completed, .. }
            | Self::Upload { completed, .. } => completed,
            _ => &[],
        }
    }
}

/// Outcome of a successful job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranscodeResult {
    /// Identifier used in logs for this job.
    pub job_id: String,
    /// Produced renditions, ascending.
    pub renditions: Vec<Rendition>,
    /// Probed source duration in milliseconds.
    pub source_duration_millis: u64,
    /// Number of objects written to the destination store.
    pub uploaded_objects: usize,
}

impl TranscodeResult {
    /// Rendition names, ascending.
    pub fn rendition_names(&self) -> Vec<String> {
        self.renditions.iter().map(|r| r.name().to_string()).collect()
    }
}
