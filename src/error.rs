//! Unified error handling for the ospap crate
//!
//! # Architecture
//!
//! - [`OspapErrorTrait`] - Common interface of the domain error types
//! - [`ErrorCategory`] - Classification of errors for handling strategies
//! - [`Error`] - Errors reported while loading and validating configuration
//!
//! Per-printer failures never surface through [`Error`]: the poller folds
//! them into the `errored` flag of a status and logs their category.

use thiserror::Error;

pub use crate::octoprint::error::ClientError;

/// Common trait for ospap domain error types
pub trait OspapErrorTrait: std::error::Error {
    /// Check if this error is transient (the next poll cycle may succeed)
    fn is_recoverable(&self) -> bool;

    /// Get the error category for handling strategies
    fn category(&self) -> ErrorCategory;
}

/// Classification of errors for handling strategies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// Network-related errors (transport, timeout, HTTP status)
    Network,
    /// Configuration and validation errors
    Config,
}

impl ErrorCategory {
    /// Short label used in logs
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Network => "network",
            Self::Config => "config",
        }
    }
}

/// Unified error type for the ospap crate
#[derive(Error, Debug)]
pub enum Error {
    /// JSON deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML deserialization errors
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Configuration errors
    #[error("Config error: {0}")]
    Config(String),

    /// Generic error with context
    #[error("{context}")]
    Other {
        context: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

impl Error {
    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a generic error with context and source
    pub fn with_source(
        context: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Other {
            context: context.into(),
            source: Some(Box::new(source)),
        }
    }
}

/// Result type alias using the unified Error type
pub type Result<T> = std::result::Result<T, Error>;
