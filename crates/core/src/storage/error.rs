//! Error types for the storage module.

use thiserror::Error;

/// Errors that can occur talking to the object store.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Source object does not exist.
    #[error("Object not found: {key}")]
    NotFound { key: String },

    /// Key cannot be mapped to a storage location.
    #[error("Invalid object key: {key}")]
    InvalidKey { key: String },

    /// Download failed.
    #[error("Failed to download {key}: {reason}")]
    DownloadFailed { key: String, reason: String },

    /// Upload failed.
    #[error("Failed to upload {key}: {reason}")]
    UploadFailed { key: String, reason: String },

    /// Existence check failed.
    #[error("Failed to check {key}: {reason}")]
    LookupFailed { key: String, reason: String },

    /// Delete failed.
    #[error("Failed to delete {key}: {reason}")]
    DeleteFailed { key: String, reason: String },

    /// Backend is misconfigured.
    #[error("Storage configuration error: {0}")]
    Config(String),

    /// Local I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl StorageError {
    pub fn download_failed(key: impl Into<String>, reason: impl ToString) -> Self {
        Self::DownloadFailed {
            key: key.into(),
            reason: reason.to_string(),
        }
    }

    pub fn upload_failed(key: impl Into<String>, reason: impl ToString) -> Self {
        Self::UploadFailed {
            key: key.into(),
            reason: reason.to_string(),
        }
    }

    pub fn lookup_failed(key: impl Into<String>, reason: impl ToString) -> Self {
        Self::LookupFailed {
            key: key.into(),
            reason: reason.to_string(),
        }
    }

    pub fn delete_failed(key: impl Into<String>, reason: impl ToString) -> Self {
        Self::DeleteFailed {
            key: key.into(),
            reason: reason.to_string(),
        }
    }
}
