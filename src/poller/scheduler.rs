//! Poll scheduler
//!
//! One cycle runs before the HTTP API starts serving, so clients never see
//! an empty result. After that the scheduler sleeps for the polling
//! interval, runs a cycle, and repeats until shutdown. Cycles run one after
//! another on the scheduler task, so they cannot overlap; a cycle that takes
//! longer than the interval is reported.

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::metrics;
use crate::snapshot::Snapshot;

use super::cycle::PollCycle;

/// Drives [`PollCycle`] on a fixed interval
pub struct PollScheduler {
    cycle: PollCycle,
    interval: Duration,
}

impl PollScheduler {
    /// Create a scheduler
    pub fn new(cycle: PollCycle, interval: Duration) -> Self {
        Self { cycle, interval }
    }

    /// Run the startup cycle; call before the API starts serving
    pub async fn run_initial_cycle(&self) -> Arc<Snapshot> {
        self.run_once().await
    }

    /// Loop until `shutdown` flips to `true` or its sender is dropped
    pub async fn run(self, mut shutdown: watch::Receiver<bool>) {
        tracing::info!(interval_secs = self.interval.as_secs(), "Poll scheduler started");

        loop {
            if *shutdown.borrow() {
                break;
            }

            tokio::select! {
                _ = tokio::time::sleep(self.interval) => {
                    self.run_once().await;
                }
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
            }
        }

        tracing::info!("Poll scheduler stopped");
    }

    /// Spawn [`Self::run`] as a background task
    pub fn spawn(self, shutdown: watch::Receiver<bool>) -> JoinHandle<()> {
        tokio::spawn(self.run(shutdown))
    }

    /// Whether a cycle took longer than the polling interval
    pub fn overran(&self, snapshot: &Snapshot) -> bool {
        snapshot.duration() > self.interval
    }

    // Internal: one cycle plus overrun detection
    async fn run_once(&self) -> Arc<Snapshot> {
        let snapshot = self.cycle.run_and_publish().await;

        if self.overran(&snapshot) {
            metrics::record_cycle_overrun();
            tracing::warn!(
                sequence = snapshot.sequence,
                duration_ms = snapshot.duration_ms,
                interval_secs = self.interval.as_secs(),
                "Poll cycle took longer than the polling interval"
            );
        }

        snapshot
    }
}
