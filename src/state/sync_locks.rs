use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::{Mutex, OwnedMutexGuard};

// ---------------------------------------------------------------------------
// SyncLocks
// ---------------------------------------------------------------------------

/// One async mutex per series id. Syncs for the same id run one at a time;
/// different ids never contend. Entries live only while someone holds or
/// waits on them.
#[derive(Default)]
pub struct SyncLocks {
    /// series_id → lock guarding fetch + merge + save for that series
    locks: DashMap<String, Arc<Mutex<()>>>,
}

/// Held for the duration of one sync. Dropping it releases the id and removes
/// the table entry once no other caller references it.
pub struct SyncGuard<'a> {
    locks: &'a SyncLocks,
    series_id: String,
    guard: Option<OwnedMutexGuard<()>>,
}

impl Drop for SyncGuard<'_> {
    fn drop(&mut self) {
        // Unlock first so the map's Arc is the only one left when idle.
        self.guard.take();
        self.locks
            .locks
            .remove_if(&self.series_id, |_, lock| Arc::strong_count(lock) == 1);
    }
}

impl SyncLocks {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Waits until no other sync holds `series_id`. The shard lock is released
    /// before awaiting so other ids are never blocked.
    pub async fn acquire(&self, series_id: &str) -> SyncGuard<'_> {
        let lock = self
            .locks
            .entry(series_id.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();
        let guard = lock.lock_owned().await;
        SyncGuard {
            locks: self,
            series_id: series_id.to_string(),
            guard: Some(guard),
        }
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.locks.len()
    }
}
