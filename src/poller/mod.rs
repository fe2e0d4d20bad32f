//! Polling engine
//!
//! # Architecture
//!
//! ```text
//! PollScheduler ──tick──▶ PollCycle ──spawn × N──▶ poll_printer
//!                              │                      │
//!                              │◀──── PrinterStatus ──┘
//!                              ▼
//!                        SnapshotStore::publish (single swap)
//! ```
//!
//! - [`device`] - Gated retrieval pipeline for one printer
//! - [`cycle`] - Concurrent, fault-isolated cycle over all printers
//! - [`scheduler`] - Startup cycle plus fixed-interval loop

pub mod cycle;
pub mod device;
pub mod scheduler;

// Re-export main types
pub use cycle::{run_cycle, PollCycle};
pub use device::poll_printer;
pub use scheduler::PollScheduler;
