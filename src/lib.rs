//! ospap - safe, read-only status proxy for OctoPrint printer controllers
//!
//! Polls a fixed set of printer controllers on an interval, aggregates the
//! latest status of each into an immutable snapshot, and republishes that
//! snapshot over a read-only HTTP API, so clients never talk to the
//! controllers directly.
//!
//! # Architecture
//!
//! The library is organized into several modules:
//!
//! - [`config`] - Configuration loading and validation
//! - [`octoprint`] - Controller client, lenient decoding, connection handling
//! - [`poller`] - Per-printer pipeline, aggregation cycle, scheduler
//! - [`snapshot`] - Immutable snapshot and its single published slot
//! - [`server`] - axum HTTP API serving the snapshot
//! - [`models`] - Core data structures
//! - [`metrics`] - Prometheus metrics
//! - [`error`] - Unified error type
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use ospap::config::Config;
//! use ospap::octoprint::{ClientConfig, OctoPrintClient};
//! use ospap::poller::{PollCycle, PollScheduler};
//! use ospap::snapshot::SnapshotStore;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load(None)?;
//!     let client = OctoPrintClient::new(ClientConfig::from(&config))?;
//!     let store = SnapshotStore::new();
//!     let cycle = PollCycle::from_config(Arc::new(client), &config, store.clone());
//!     let scheduler = PollScheduler::new(cycle, config.polling_interval());
//!     let snapshot = scheduler.run_initial_cycle().await;
//!     println!("{} printers polled", snapshot.printers.len());
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod metrics;
pub mod models;
pub mod octoprint;
pub mod poller;
pub mod server;
pub mod snapshot;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::config::{Config, PrinterConfig};
    pub use crate::error::{Error, ErrorCategory, OspapErrorTrait, Result};
    pub use crate::models::PrinterStatus;
    pub use crate::octoprint::{OctoPrintClient, PrinterApi};
    pub use crate::poller::{PollCycle, PollScheduler};
    pub use crate::snapshot::{Snapshot, SnapshotStore};
}

// Direct re-exports for convenience
pub use models::PrinterStatus;
pub use snapshot::{Snapshot, SnapshotStore};
