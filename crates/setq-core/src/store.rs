//! Process-wide holder of the last committed snapshot.
//!
//! One slot, one lock. Readers get a clone; `commit` swaps the whole value,
//! so a reader can never see a half-written snapshot. There is no history.

use tokio::sync::RwLock;

use crate::snapshot::Snapshot;

#[derive(Debug, Default)]
pub struct SnapshotStore {
    slot: RwLock<Option<Snapshot>>,
}

impl SnapshotStore {
    /// Empty store ("no data yet").
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-seeded with a committed snapshot.
    pub fn with_snapshot(snapshot: Snapshot) -> Self {
        Self {
            slot: RwLock::new(Some(snapshot)),
        }
    }

    /// Current snapshot, or `None` if nothing has been committed yet.
    pub async fn read(&self) -> Option<Snapshot> {
        self.slot.read().await.clone()
    }

    /// Unconditionally replace the current snapshot and return it.
    ///
    /// Last lock acquirer wins; `captured_at` is not compared.
    pub async fn commit(&self, candidate: Snapshot) -> Snapshot {
        let mut slot = self.slot.write().await;
        *slot = Some(candidate.clone());
        candidate
    }
}
