//! Trait definitions for the storage module.

use async_trait::async_trait;
use std::path::Path;

use super::error::StorageError;

/// Moves files between the local scratch area and the object stores.
///
/// Implementations hold one source store and one destination store and must
/// be safe to share between concurrent jobs. Retries, if any, belong to the
/// underlying client.
#[async_trait]
pub trait StorageGateway: Send + Sync {
    /// Returns the name of this gateway implementation.
    fn name(&self) -> &str;

    /// Downloads `source_key` from the source store into `dest`.
    ///
    /// `dest` is an existing, empty file owned by the caller; it is truncated
    /// and overwritten.
    async fn download(&self, source_key: &str, dest: &Path) -> Result<(), StorageError>;

    /// Uploads `local` to `destination_key` in the destination store.
    async fn upload(
        &self,
        local: &Path,
        destination_key: &str,
        content_type: &str,
    ) -> Result<(), StorageError>;

    /// Whether `destination_key` already exists in the destination store.
    async fn exists(&self, destination_key: &str) -> Result<bool, StorageError>;

    /// Deletes `destination_key` from the destination store.
    ///
    /// Deleting a key that does not exist succeeds.
    async fn delete(&self, destination_key: &str) -> Result<(), StorageError>;
}
