//! HTTP client for OctoPrint printer controllers
//!
//! One [`OctoPrintClient`] is shared by every printer; the per-printer
//! details (base URL, API key) travel with each call as a
//! [`PrinterConfig`]. Responses are decoded leniently, see
//! [`super::decode`].

use async_trait::async_trait;
use reqwest::{
    header::{HeaderValue, CONTENT_TYPE},
    Client, Method, RequestBuilder,
};
use std::time::Duration;

use crate::config::{Config, PrinterConfig};

use super::decode::{decode_object, decode_string_field, Decoded, JsonObject};
use super::error::ClientError;

// ============================================================================
// Endpoints
// ============================================================================

pub const ENDPOINT_VERSION: &str = "/api/version";
pub const ENDPOINT_PRINTER: &str = "/api/printer?history=false&exclude=sd";
pub const ENDPOINT_JOB: &str = "/api/job";
pub const ENDPOINT_CONNECTION: &str = "/api/connection";

/// Header carrying the controller API key
pub const API_KEY_HEADER: &str = "X-Api-Key";

/// Body of the connect command
pub const CONNECT_BODY: &str = r#"{"command":"connect"}"#;

/// Substring of the connection state that means the printer is connected
const CONNECTED_MARKER: &str = "Operational";

// ============================================================================
// Connection State
// ============================================================================

/// Connection state reported by a controller
#[derive(Debug, Clone, PartialEq)]
pub struct ConnectionState {
    /// Raw `current.state` string
    pub state: Decoded<String>,

    /// Whether the controller is connected to its printer
    pub connected: bool,
}

impl ConnectionState {
    /// Derive the connected flag from the raw state string
    pub fn from_state(state: Decoded<String>) -> Self {
        let connected = state.value.contains(CONNECTED_MARKER);
        Self { state, connected }
    }
}

// ============================================================================
// Printer API
// ============================================================================

/// Operations the poller needs from a printer controller
#[async_trait]
pub trait PrinterApi: Send + Sync {
    /// `GET /api/version`, the `api` field
    async fn api_version(&self, printer: &PrinterConfig) -> Result<Decoded<String>, ClientError>;

    /// `GET /api/printer`, opaque state and temperature object
    async fn printer_info(&self, printer: &PrinterConfig)
        -> Result<Decoded<JsonObject>, ClientError>;

    /// `GET /api/job`, opaque job object
    async fn current_job(&self, printer: &PrinterConfig)
        -> Result<Decoded<JsonObject>, ClientError>;

    /// `GET /api/connection`, `current.state` plus the derived connected flag
    async fn connection_state(&self, printer: &PrinterConfig)
        -> Result<ConnectionState, ClientError>;

    /// `POST /api/connection` with the connect command; the response is ignored
    async fn connect(&self, printer: &PrinterConfig) -> Result<(), ClientError>;
}

// ============================================================================
// Client Configuration
// ============================================================================

/// Configuration for the controller client
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Per-request timeout
    pub timeout: Duration,

    /// User agent sent with every request
    pub user_agent: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(crate::config::DEFAULT_REQUEST_TIMEOUT_SECS),
            user_agent: format!("ospap/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl ClientConfig {
    /// Set timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

impl From<&Config> for ClientConfig {
    fn from(config: &Config) -> Self {
        Self::default().with_timeout(config.request_timeout())
    }
}

// ============================================================================
// OctoPrint Client
// ============================================================================

/// reqwest-backed [`PrinterApi`] implementation
#[derive(Debug, Clone)]
pub struct OctoPrintClient {
    http_client: Client,
}

impl OctoPrintClient {
    /// Create a new client
    pub fn new(config: ClientConfig) -> Result<Self, ClientError> {
        let http_client = Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent)
            .build()
            .map_err(|e| ClientError::Init(e.to_string()))?;

        Ok(Self { http_client })
    }

    /// Build the request URL for an endpoint of a printer
    pub fn endpoint_url(printer: &PrinterConfig, endpoint: &str) -> String {
        format!("{}{}", printer.server_address.trim_end_matches('/'), endpoint)
    }

    fn request(&self, method: Method, printer: &PrinterConfig, endpoint: &str) -> RequestBuilder {
        let request = self
            .http_client
            .request(method, Self::endpoint_url(printer, endpoint));

        match printer.api_key() {
            Some(key) => request.header(API_KEY_HEADER, key),
            None => request,
        }
    }

    // Internal: GET an endpoint and return the raw body of a 2xx response
    async fn get_body(&self, printer: &PrinterConfig, endpoint: &str) -> Result<Vec<u8>, ClientError> {
        tracing::debug!(printer = %printer.name, endpoint, "GET");

        let response = self
            .request(Method::GET, printer, endpoint)
            .send()
            .await?
            .error_for_status()?;

        Ok(response.bytes().await?.to_vec())
    }
}

#[async_trait]
impl PrinterApi for OctoPrintClient {
    async fn api_version(&self, printer: &PrinterConfig) -> Result<Decoded<String>, ClientError> {
        let body = self.get_body(printer, ENDPOINT_VERSION).await?;
        let version = decode_string_field(&body, "api");
        if !version.present {
            tracing::debug!(printer = %printer.name, "Version response has no api field");
        }
        Ok(version)
    }

    async fn printer_info(
        &self,
        printer: &PrinterConfig,
    ) -> Result<Decoded<JsonObject>, ClientError> {
        let body = self.get_body(printer, ENDPOINT_PRINTER).await?;
        Ok(decode_object(&body))
    }

    async fn current_job(
        &self,
        printer: &PrinterConfig,
    ) -> Result<Decoded<JsonObject>, ClientError> {
        let body = self.get_body(printer, ENDPOINT_JOB).await?;
        Ok(decode_object(&body))
    }

    async fn connection_state(
        &self,
        printer: &PrinterConfig,
    ) -> Result<ConnectionState, ClientError> {
        let body = self.get_body(printer, ENDPOINT_CONNECTION).await?;
        Ok(ConnectionState::from_state(decode_string_field(
            &body,
            "current.state",
        )))
    }

    async fn connect(&self, printer: &PrinterConfig) -> Result<(), ClientError> {
        tracing::debug!(printer = %printer.name, endpoint = ENDPOINT_CONNECTION, "POST connect");

        self.request(Method::POST, printer, ENDPOINT_CONNECTION)
            .header(CONTENT_TYPE, HeaderValue::from_static("application/json"))
            .body(CONNECT_BODY)
            .send()
            .await?
            .error_for_status()?;

        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================
