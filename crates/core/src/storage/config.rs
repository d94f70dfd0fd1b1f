//! Configuration for the storage module.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Which gateway implementation to build.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StorageBackend {
    /// S3 or an S3-compatible service.
    #[default]
    S3,
    /// Two local directories standing in for the buckets.
    Local,
}

/// Storage configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default)]
    pub backend: StorageBackend,
    /// Required when backend = "s3".
    #[serde(default)]
    pub s3: Option<S3Config>,
    /// Required when backend = "local".
    #[serde(default)]
    pub local: Option<LocalStorageConfig>,
}

/// S3 bucket configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct S3Config {
    /// Bucket source videos are downloaded from.
    #[serde(default)]
    pub source_bucket: String,
    /// Bucket transcoded renditions are uploaded to.
    #[serde(default)]
    pub destination_bucket: String,
    /// AWS region. Falls back to the default provider chain.
    #[serde(default)]
    pub region: Option<String>,
    /// Custom endpoint for S3-compatible providers (MinIO, etc.).
    /// Path-style addressing is used when set.
    #[serde(default)]
    pub endpoint_url: Option<String>,
}

/// Local directory configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocalStorageConfig {
    /// Directory source keys are resolved against.
    pub source_dir: PathBuf,
    /// Directory destination keys are written under.
    pub destination_dir: PathBuf,
}
