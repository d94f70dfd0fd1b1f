//! Filesystem-backed storage gateway.

use async_trait::async_trait;
use std::path::{Component, Path, PathBuf};
use tokio::fs;
use tracing::debug;

use super::config::LocalStorageConfig;
use super::error::StorageError;
use super::traits::StorageGateway;

/// Gateway that treats two local directories as the source and destination
/// stores. Keys map to relative paths.
#[derive(Debug, Clone)]
pub struct FsGateway {
    source_dir: PathBuf,
    destination_dir: PathBuf,
}

impl FsGateway {
    pub fn new(source_dir: impl Into<PathBuf>, destination_dir: impl Into<PathBuf>) -> Self {
        Self {
            source_dir: source_dir.into(),
            destination_dir: destination_dir.into(),
        }
    }

    pub fn from_config(config: &LocalStorageConfig) -> Self {
        Self::new(&config.source_dir, &config.destination_dir)
    }

    pub fn destination_dir(&self) -> &Path {
        &self.destination_dir
    }

    /// Resolves `key` under `root`, rejecting keys that would escape it.
    fn resolve(root: &Path, key: &str) -> Result<PathBuf, StorageError> {
        let relative = Path::new(key.trim_start_matches('/'));
        let escapes = relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));
        if key.is_empty() || escapes || relative.as_os_str().is_empty() {
            return Err(StorageError::InvalidKey {
                key: key.to_string(),
            });
        }
        Ok(root.join(relative))
    }
}

#[async_trait]
impl StorageGateway for FsGateway {
    fn name(&self) -> &str {
        "local"
    }

    async fn download(&self, source_key: &str, dest: &Path) -> Result<(), StorageError> {
        let source = Self::resolve(&self.source_dir, source_key)?;
        if !fs::try_exists(&source).await.unwrap_or(false) {
            return Err(StorageError::NotFound {
                key: source_key.to_string(),
            });
        }

        let bytes = fs::copy(&source, dest)
            .await
            .map_err(|e| StorageError::download_failed(source_key, e))?;
        debug!("Copied {:?} to {:?} ({} bytes)", source, dest, bytes);

        Ok(())
    }

    async fn upload(
        &self,
        local: &Path,
        destination_key: &str,
        _content_type: &str,
    ) -> Result<(), StorageError> {
        let destination = Self::resolve(&self.destination_dir, destination_key)?;
        if let Some(parent) = destination.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| StorageError::upload_failed(destination_key, e))?;
        }

        fs::copy(local, &destination)
            .await
            .map_err(|e| StorageError::upload_failed(destination_key, e))?;

        Ok(())
    }

    async fn exists(&self, destination_key: &str) -> Result<bool, StorageError> {
        let destination = Self::resolve(&self.destination_dir, destination_key)?;
        Ok(fs::try_exists(&destination).await?)
    }

    async fn delete(&self, destination_key: &str) -> Result<(), StorageError> {
        let destination = Self::resolve(&self.destination_dir, destination_key)?;
        match fs::remove_file(&destination).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StorageError::delete_failed(destination_key, e)),
        }
    }
}
