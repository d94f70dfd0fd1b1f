//! Per-destination job serialization.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

/// One async lock per destination prefix.
///
/// Jobs whose sources share a base name write the same destination keys, so
/// they must not run interleaved. Entries nobody holds or waits on are pruned
/// on the next acquire.
#[derive(Debug, Default)]
pub(crate) struct PrefixLocks {
    locks: Mutex<HashMap<String, Arc<AsyncMutex<()>>>>,
}

impl PrefixLocks {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Waits until no other job holds `prefix`.
    pub(crate) async fn acquire(&self, prefix: &str) -> OwnedMutexGuard<()> {
        let lock = {
            let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
            locks.retain(|_, lock| Arc::strong_count(lock) > 1);
            Arc::clone(locks.entry(prefix.to_string()).or_default())
        };
        lock.lock_owned().await
    }

    #[cfg(test)]
    fn tracked(&self) -> usize {
        self.locks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}
