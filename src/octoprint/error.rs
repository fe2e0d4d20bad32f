//! Error types for the printer controller client

use thiserror::Error;

use crate::error::{ErrorCategory, OspapErrorTrait};

/// Errors that can occur while talking to a printer controller
///
/// A malformed response body is deliberately *not* an error: it decodes to
/// an empty value (see [`crate::octoprint::decode`]).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ClientError {
    /// Transport failure (connection refused, DNS, reset, body read)
    #[error("Network error: {0}")]
    Network(String),

    /// Request did not complete within the configured timeout
    #[error("Request timeout")]
    Timeout,

    /// Controller answered with a non-2xx status
    #[error("HTTP {status} from {url}")]
    HttpStatus { status: u16, url: String },

    /// Printer server address could not be turned into a request URL
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// HTTP client could not be built
    #[error("Initialization error: {0}")]
    Init(String),
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            return Self::Timeout;
        }
        if err.is_builder() {
            return Self::InvalidUrl(err.to_string());
        }
        match (err.status(), err.url()) {
            (Some(status), Some(url)) => Self::HttpStatus {
                status: status.as_u16(),
                url: url.to_string(),
            },
            _ => Self::Network(err.to_string()),
        }
    }
}

impl OspapErrorTrait for ClientError {
    fn is_recoverable(&self) -> bool {
        match self {
            Self::Network(_) | Self::Timeout => true,
            Self::HttpStatus { status, .. } => *status >= 500 || *status == 409,
            Self::InvalidUrl(_) | Self::Init(_) => false,
        }
    }

    fn category(&self) -> ErrorCategory {
        match self {
            Self::InvalidUrl(_) | Self::Init(_) => ErrorCategory::Config,
            _ => ErrorCategory::Network,
        }
    }
}
