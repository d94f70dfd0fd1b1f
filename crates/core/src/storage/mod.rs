//! Object storage gateway.
//!
//! The [`StorageGateway`] trait downloads source objects into local scratch
//! files and uploads rendition files to the destination store. Two
//! implementations are provided:
//!
//! - [`S3Gateway`]: two S3 buckets (or an S3-compatible service)
//! - [`FsGateway`]: two local directories, for development and tests
//!
//! The [`keys`] submodule owns the destination key layout.

mod config;
mod error;
mod fs;
pub mod keys;
mod s3;
mod traits;

use std::sync::Arc;

pub use config::{LocalStorageConfig, S3Config, StorageBackend, StorageConfig};
pub use error::StorageError;
pub use fs::FsGateway;
pub use keys::DestinationKeys;
pub use s3::S3Gateway;
pub use traits::StorageGateway;

/// Builds the gateway selected by `config`.
pub async fn create_gateway(config: &StorageConfig) -> Result<Arc<dyn StorageGateway>, StorageError> {
    match config.backend {
        StorageBackend::S3 => {
            let s3 = config.s3.as_ref().ok_or_else(|| {
                StorageError::Config("backend \"s3\" selected but [storage.s3] is missing".to_string())
            })?;
            Ok(Arc::new(S3Gateway::new(s3).await?))
        }
        StorageBackend::Local => {
            let local = config.local.as_ref().ok_or_else(|| {
                StorageError::Config(
                    "backend \"local\" selected but [storage.local] is missing".to_string(),
                )
            })?;
            Ok(Arc::new(FsGateway::from_config(local)))
        }
    }
}
