//! Single-slot holder for the most recent snapshot.
//!
//! One writer (the collector) replaces the slot; any number of readers
//! fetch it concurrently. The guard is only held for a pointer swap or
//! an `Arc` clone, never while a snapshot is being built, and the
//! replaced value is dropped after the guard is released.
//!
//! Snapshots are immutable and replaced wholesale, so a reader always
//! sees either the whole previous snapshot or the whole new one.

use std::sync::Arc;

use parking_lot::RwLock;
use tidewatch_types::Snapshot;

/// Thread-safe holder of zero or one [`Snapshot`].
#[derive(Debug, Default)]
pub struct SnapshotStore {
    slot: RwLock<Option<Arc<Snapshot>>>,
}

impl SnapshotStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the held value. `None` publishes the "no data" state.
    pub fn publish(&self, snapshot: Option<Snapshot>) {
        self.publish_arc(snapshot.map(Arc::new));
    }

    /// Replace the held value with an already shared snapshot.
    pub fn publish_arc(&self, snapshot: Option<Arc<Snapshot>>) {
        let previous = {
            let mut slot = self.slot.write();
            std::mem::replace(&mut *slot, snapshot)
        };
        drop(previous);
    }

    /// Return the held value, if any.
    pub fn read(&self) -> Option<Arc<Snapshot>> {
        self.slot.read().clone()
    }

    /// Publish the "no data" state.
    pub fn clear(&self) {
        self.publish_arc(None);
    }

    /// Whether a snapshot is currently held.
    pub fn has_snapshot(&self) -> bool {
        self.slot.read().is_some()
    }
}
