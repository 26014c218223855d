//! Per-user serialisation of read-decide-write-publish sequences

use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};
use uuid::Uuid;

/// Advisory locks keyed by user ID.
///
/// Only serialises callers inside this process. Idle entries are dropped
/// on the next acquisition.
#[derive(Debug, Clone, Default)]
pub struct UserLocks {
    entries: Arc<Mutex<HashMap<Uuid, Arc<Mutex<()>>>>>,
}

impl UserLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for exclusive access to `user_id`
    pub async fn lock(&self, user_id: Uuid) -> OwnedMutexGuard<()> {
        let lock = {
            let mut entries = self.entries.lock().await;
            // An entry referenced only by the map is neither held nor awaited.
            entries.retain(|_, lock| Arc::strong_count(lock) > 1);
            entries.entry(user_id).or_default().clone()
        };

        lock.lock_owned().await
    }

    #[cfg(test)]
    async fn tracked(&self) -> usize {
        self.entries.lock().await.len()
    }
}
