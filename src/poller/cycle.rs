//! Aggregation cycle: poll every printer, build a snapshot, publish it
//!
//! Printers are polled concurrently, each in its own task, so one slow or
//! failing printer cannot hold back or take down another. The snapshot is
//! assembled in configuration order, not completion order, and published
//! with a single swap.

use chrono::Utc;
use futures::future::join_all;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::config::{Config, PrinterConfig};
use crate::metrics;
use crate::models::PrinterStatus;
use crate::octoprint::PrinterApi;
use crate::snapshot::{Snapshot, SnapshotStore};

use super::device::poll_printer;

/// Poll all printers and build a snapshot (does not publish)
pub async fn run_cycle(
    api: Arc<dyn PrinterApi>,
    printers: &[PrinterConfig],
    connect_delay: Duration,
    sequence: u64,
) -> Snapshot {
    let started_at = Utc::now();
    let timer = Instant::now();

    let handles: Vec<_> = printers
        .iter()
        .cloned()
        .map(|printer| {
            let api = Arc::clone(&api);
            tokio::spawn(async move { poll_printer(api.as_ref(), &printer, connect_delay).await })
        })
        .collect();

    let statuses: Vec<PrinterStatus> = join_all(handles)
        .await
        .into_iter()
        .zip(printers)
        .map(|(result, printer)| match result {
            Ok(status) => status,
            Err(e) => {
                tracing::error!(printer = %printer.name, error = %e, "Poll task failed");
                PrinterStatus::failed(&printer.name)
            }
        })
        .collect();

    Snapshot::new(sequence, started_at, timer.elapsed(), statuses)
}

/// Runs cycles against a fixed printer list and publishes into a store
pub struct PollCycle {
    api: Arc<dyn PrinterApi>,
    printers: Arc<[PrinterConfig]>,
    connect_delay: Duration,
    store: SnapshotStore,
    next_sequence: AtomicU64,
}

impl PollCycle {
    /// Create a cycle runner
    pub fn new(
        api: Arc<dyn PrinterApi>,
        printers: Vec<PrinterConfig>,
        connect_delay: Duration,
        store: SnapshotStore,
    ) -> Self {
        Self {
            api,
            printers: printers.into(),
            connect_delay,
            store,
            next_sequence: AtomicU64::new(1),
        }
    }

    /// Create a cycle runner from the loaded configuration
    pub fn from_config(api: Arc<dyn PrinterApi>, config: &Config, store: SnapshotStore) -> Self {
        Self::new(api, config.printers.clone(), config.connect_delay(), store)
    }

    /// Number of configured printers
    pub fn printer_count(&self) -> usize {
        self.printers.len()
    }

    /// Run one cycle and publish its snapshot, returning what was published
    pub async fn run_and_publish(&self) -> Arc<Snapshot> {
        let sequence = self.next_sequence.fetch_add(1, Ordering::SeqCst);
        tracing::info!(sequence, printers = self.printers.len(), "Updating printers");

        let snapshot = run_cycle(
            Arc::clone(&self.api),
            &self.printers,
            self.connect_delay,
            sequence,
        )
        .await;

        for status in &snapshot.printers {
            metrics::record_printer_poll(&status.name, status.errored);
        }
        metrics::record_cycle(snapshot.duration().as_secs_f64(), snapshot.errored_count());

        tracing::info!(
            sequence,
            duration_ms = snapshot.duration_ms,
            errored = snapshot.errored_count(),
            "Poll cycle complete"
        );

        self.store.publish(snapshot).await;
        self.store.current().await
    }
}
