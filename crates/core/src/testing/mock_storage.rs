//! Mock storage gateway for testing.

use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

use crate::storage::{StorageError, StorageGateway};

/// A recorded upload for test assertions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedUpload {
    /// Destination key.
    pub key: String,
    /// Declared content type.
    pub content_type: String,
    /// Uploaded bytes.
    pub size_bytes: usize,
}

/// Mock implementation of the StorageGateway trait.
///
/// Holds source objects and uploaded objects in memory:
/// - Seed sources with [`add_source`](Self::add_source)
/// - Inspect uploads, deletes and the current destination contents
/// - Inject download, upload or delete failures
///
/// # Example
///
/// ```rust,ignore
/// use ladder_core::testing::MockStorage;
///
/// let storage = MockStorage::new();
/// storage.add_source("clip.mp4", b"video".to_vec()).await;
/// storage.fail_uploads_matching("720p").await;
/// ```
#[derive(Debug)]
pub struct MockStorage {
    /// Source objects by key.
    sources: Arc<RwLock<HashMap<String, Vec<u8>>>>,
    /// Destination objects currently stored.
    objects: Arc<RwLock<BTreeMap<String, Vec<u8>>>>,
    /// Every download requested, in order.
    downloads: Arc<RwLock<Vec<String>>>,
    /// Every successful upload, in order.
    uploads: Arc<RwLock<Vec<RecordedUpload>>>,
    /// Every delete requested, in order.
    deletes: Arc<RwLock<Vec<String>>>,
    /// If set, the next download fails with this error.
    next_download_error: Arc<RwLock<Option<StorageError>>>,
    /// Uploads whose key contains this fragment fail.
    failing_upload_fragment: Arc<RwLock<Option<String>>>,
    /// Whether deletes fail.
    fail_deletes: Arc<RwLock<bool>>,
    /// Simulated time per upload.
    upload_delay: Arc<RwLock<Duration>>,
}

impl Default for MockStorage {
    fn default() -> Self {
        Self::new()
    }
}

impl MockStorage {
    /// Create an empty mock store.
    pub fn new() -> Self {
        Self {
            sources: Arc::new(RwLock::new(HashMap::new())),
            objects: Arc::new(RwLock::new(BTreeMap::new())),
            downloads: Arc::new(RwLock::new(Vec::new())),
            uploads: Arc::new(RwLock::new(Vec::new())),
            deletes: Arc::new(RwLock::new(Vec::new())),
            next_download_error: Arc::new(RwLock::new(None)),
            failing_upload_fragment: Arc::new(RwLock::new(None)),
            fail_deletes: Arc::new(RwLock::new(false)),
            upload_delay: Arc::new(RwLock::new(Duration::ZERO)),
        }
    }

    /// Add a source object.
    pub async fn add_source(&self, key: &str, bytes: Vec<u8>) {
        self.sources.write().await.insert(key.to_string(), bytes);
    }

    /// Seed a destination object, as if published by an earlier job.
    pub async fn add_object(&self, key: &str, bytes: Vec<u8>) {
        self.objects.write().await.insert(key.to_string(), bytes);
    }

    /// Keys of destination objects currently stored, sorted.
    pub async fn object_keys(&self) -> Vec<String> {
        self.objects.read().await.keys().cloned().collect()
    }

    /// Contents of a stored destination object.
    pub async fn object(&self, key: &str) -> Option<Vec<u8>> {
        self.objects.read().await.get(key).cloned()
    }

    /// Get all recorded downloads.
    pub async fn recorded_downloads(&self) -> Vec<String> {
        self.downloads.read().await.clone()
    }

    /// Get all recorded uploads.
    pub async fn recorded_uploads(&self) -> Vec<RecordedUpload> {
        self.uploads.read().await.clone()
    }

    /// Get all recorded deletes.
    pub async fn recorded_deletes(&self) -> Vec<String> {
        self.deletes.read().await.clone()
    }

    /// Configure the next download to fail with the given error.
    pub async fn set_next_download_error(&self, error: StorageError) {
        *self.next_download_error.write().await = Some(error);
    }

    /// Fail every upload whose key contains `fragment`.
    pub async fn fail_uploads_matching(&self, fragment: &str) {
        *self.failing_upload_fragment.write().await = Some(fragment.to_string());
    }

    /// Set whether deletes fail.
    pub async fn set_fail_deletes(&self, fail: bool) {
        *self.fail_deletes.write().await = fail;
    }

    /// Set the simulated time each upload takes.
    pub async fn set_upload_delay(&self, delay: Duration) {
        *self.upload_delay.write().await = delay;
    }
}

#[async_trait]
impl StorageGateway for MockStorage {
    fn name(&self) -> &str {
        "mock"
    }

    async fn download(&self, source_key: &str, dest: &Path) -> Result<(), StorageError> {
        self.downloads.write().await.push(source_key.to_string());

        if let Some(err) = self.next_download_error.write().await.take() {
            return Err(err);
        }

        let bytes = self
            .sources
            .read()
            .await
            .get(source_key)
            .cloned()
            .ok_or_else(|| StorageError::NotFound {
                key: source_key.to_string(),
            })?;

        tokio::fs::write(dest, bytes).await?;
        Ok(())
    }

    async fn upload(
        &self,
        local: &Path,
        destination_key: &str,
        content_type: &str,
    ) -> Result<(), StorageError> {
        let delay = *self.upload_delay.read().await;
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        let failing = self.failing_upload_fragment.read().await.clone();
        if failing.is_some_and(|fragment| destination_key.contains(&fragment)) {
            return Err(StorageError::upload_failed(
                destination_key,
                "simulated upload failure",
            ));
        }

        let bytes = tokio::fs::read(local)
            .await
            .map_err(|e| StorageError::upload_failed(destination_key, e))?;

        self.uploads.write().await.push(RecordedUpload {
            key: destination_key.to_string(),
            content_type: content_type.to_string(),
            size_bytes: bytes.len(),
        });
        self.objects
            .write()
            .await
            .insert(destination_key.to_string(), bytes);

        Ok(())
    }

    async fn exists(&self, destination_key: &str) -> Result<bool, StorageError> {
        Ok(self.objects.read().await.contains_key(destination_key))
    }

    async fn delete(&self, destination_key: &str) -> Result<(), StorageError> {
        self.deletes.write().await.push(destination_key.to_string());

        if *self.fail_deletes.read().await {
            return Err(StorageError::delete_failed(
                destination_key,
                "simulated delete failure",
            ));
        }

        self.objects.write().await.remove(destination_key);
        Ok(())
    }
}
