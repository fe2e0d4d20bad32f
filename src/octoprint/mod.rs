//! OctoPrint controller access
//!
//! - [`client`] - HTTP client and the [`PrinterApi`] seam used by the poller
//! - [`connection`] - Connection check with optional single auto-connect
//! - [`decode`] - Lenient decoding of controller responses
//! - [`error`] - Client error type

pub mod client;
pub mod connection;
pub mod decode;
pub mod error;

#[cfg(test)]
pub(crate) mod testing;

// Re-export main types
pub use client::{ClientConfig, ConnectionState, OctoPrintClient, PrinterApi};
pub use connection::ensure_connected;
pub use decode::{Decoded, JsonObject};
pub use error::ClientError;
