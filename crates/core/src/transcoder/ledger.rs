//! Tracks objects a job has uploaded so a failed job can remove them.

use std::sync::Arc;
use tokio::sync::OwnedMutexGuard;
use tracing::{debug, warn};

use crate::metrics;
use crate::storage::StorageGateway;

/// Destination keys written by one job.
///
/// Only keys the job created are ever deleted. A key that already existed
/// before the upload belongs to whoever published it first, so overwriting it
/// does not make it ours to remove.
///
/// An armed ledger that is dropped without [`commit`](Self::commit) or
/// [`rollback`](Self::rollback), as happens when the job future is cancelled,
/// deletes its created keys from a background task. The destination prefix
/// guard, if held, is released only once that task finishes.
pub(crate) struct UploadLedger {
    storage: Arc<dyn StorageGateway>,
    created: Vec<String>,
    uploaded: usize,
    armed: bool,
    prefix_guard: Option<OwnedMutexGuard<()>>,
}

impl UploadLedger {
    /// `armed` = false records keys but never deletes them.
    pub(crate) fn new(storage: Arc<dyn StorageGateway>, armed: bool) -> Self {
        Self {
            storage,
            created: Vec::new(),
            uploaded: 0,
            armed,
            prefix_guard: None,
        }
    }

    /// Keeps the destination prefix locked for as long as the ledger lives.
    pub(crate) fn holding(mut self, prefix_guard: OwnedMutexGuard<()>) -> Self {
        self.prefix_guard = Some(prefix_guard);
        self
    }

    pub(crate) fn is_armed(&self) -> bool {
        self.armed
    }

    /// Records an upload. `created` is false when the key existed beforehand.
    pub(crate) fn record(&mut self, key: String, created: bool) {
        metrics::OBJECTS_UPLOADED.inc();
        self.uploaded += 1;
        if created {
            self.created.push(key);
        }
    }

    /// Number of uploads recorded.
    pub(crate) fn len(&self) -> usize {
        self.uploaded
    }

    /// Keeps every recorded object. Returns how many there were.
    pub(crate) fn commit(mut self) -> usize {
        self.armed = false;
        self.uploaded
    }

    /// Deletes created objects if armed. Returns how many were deleted.
    pub(crate) async fn rollback(mut self) -> usize {
        if !std::mem::replace(&mut self.armed, false) {
            return 0;
        }
        let keys = std::mem::take(&mut self.created);
        delete_all(self.storage.as_ref(), keys).await
    }
}

impl Drop for UploadLedger {
    fn drop(&mut self) {
        if !self.armed || self.created.is_empty() {
            return;
        }
        let keys = std::mem::take(&mut self.created);
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                let storage = Arc::clone(&self.storage);
                let prefix_guard = self.prefix_guard.take();
                warn!("Job cancelled, rolling back {} uploaded objects", keys.len());
                handle.spawn(async move {
                    delete_all(storage.as_ref(), keys).await;
                    drop(prefix_guard);
                });
            }
            Err(_) => {
                warn!(
                    "Job cancelled outside a runtime, leaving {} uploaded objects",
                    keys.len()
                );
            }
        }
    }
}

/// Deletes `keys` newest first, continuing past failures.
async fn delete_all(storage: &dyn StorageGateway, keys: Vec<String>) -> usize {
    let mut deleted = 0;
    for key in keys.iter().rev() {
        match storage.delete(key).await {
            Ok(()) => {
                deleted += 1;
                metrics::ROLLBACK_OBJECTS.with_label_values(&["deleted"]).inc();
                debug!("Rolled back {}", key);
            }
            Err(e) => {
                metrics::ROLLBACK_OBJECTS.with_label_values(&["failed"]).inc();
                warn!("Failed to roll back {}: {}", key, e);
            }
        }
    }
    deleted
}
