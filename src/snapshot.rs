//! Published snapshot of all printer statuses
//!
//! A [`Snapshot`] is built completely by one poll cycle and never mutated
//! afterwards. [`SnapshotStore`] holds the one currently published snapshot
//! behind an `Arc`; publishing replaces that `Arc` in a single step, so a
//! reader always gets either the previous snapshot or the new one in full.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

use crate::models::PrinterStatus;

// ============================================================================
// Snapshot
// ============================================================================

/// Statuses of all configured printers from one poll cycle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Cycle sequence number, 0 for the placeholder before the first cycle
    pub sequence: u64,

    /// When the cycle started
    pub started_at: DateTime<Utc>,

    /// When the cycle finished
    pub finished_at: DateTime<Utc>,

    /// Cycle duration in milliseconds
    pub duration_ms: u64,

    /// One status per configured printer, in configuration order
    pub printers: Vec<PrinterStatus>,
}

impl Snapshot {
    /// Build a snapshot from a finished cycle
    pub fn new(
        sequence: u64,
        started_at: DateTime<Utc>,
        duration: Duration,
        printers: Vec<PrinterStatus>,
    ) -> Self {
        Self {
            sequence,
            started_at,
            finished_at: Utc::now(),
            duration_ms: duration.as_millis() as u64,
            printers,
        }
    }

    /// Placeholder published before the first cycle completes
    pub fn empty() -> Self {
        let now = Utc::now();
        Self {
            sequence: 0,
            started_at: now,
            finished_at: now,
            duration_ms: 0,
            printers: Vec::new(),
        }
    }

    /// Whether this is the placeholder rather than a real cycle result
    pub fn is_placeholder(&self) -> bool {
        self.sequence == 0
    }

    /// Number of printers flagged as errored
    pub fn errored_count(&self) -> usize {
        self.printers.iter().filter(|p| p.errored).count()
    }

    /// Cycle duration
    pub fn duration(&self) -> Duration {
        Duration::from_millis(self.duration_ms)
    }

    /// Status for a printer by name
    pub fn get(&self, name: &str) -> Option<&PrinterStatus> {
        self.printers.iter().find(|p| p.name == name)
    }

    /// Public API payload: the statuses as a JSON array
    pub fn to_json(&self) -> serde_json::Result<Vec<u8>> {
        serde_json::to_vec(&self.printers)
    }
}

impl Default for Snapshot {
    fn default() -> Self {
        Self::empty()
    }
}

// ============================================================================
// Snapshot Store
// ============================================================================

/// Single published-snapshot slot with one writer and many readers
#[derive(Debug, Clone, Default)]
pub struct SnapshotStore {
    current: Arc<RwLock<Arc<Snapshot>>>,
}

impl SnapshotStore {
    /// Create a store holding the placeholder snapshot
    pub fn new() -> Self {
        Self::default()
    }

    /// Currently published snapshot
    pub async fn current(&self) -> Arc<Snapshot> {
        Arc::clone(&*self.current.read().await)
    }

    /// Replace the published snapshot, returning the one it superseded
    pub async fn publish(&self, snapshot: Snapshot) -> Arc<Snapshot> {
        let next = Arc::new(snapshot);
        let mut slot = self.current.write().await;
        std::mem::replace(&mut *slot, next)
    }
}
