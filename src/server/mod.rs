//! Public HTTP API server
//!
//! This module serves the published snapshot to any number of concurrent
//! readers. Handlers only ever clone the current snapshot `Arc`; they never
//! wait on or interfere with a poll cycle in progress.
//!
//! # Routes
//!
//! ```text
//! GET /api      current snapshot as a JSON array, one entry per printer
//! GET /health   service health and last cycle summary
//! GET /metrics  Prometheus text exposition
//! ```

pub mod api;
pub mod health;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use thiserror::Error;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::snapshot::SnapshotStore;

pub use health::HealthChecker;

// ============================================================================
// App State
// ============================================================================

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Published snapshot slot
    pub store: SnapshotStore,

    /// Start time and readiness
    pub health: HealthChecker,

    /// Configuration
    pub config: Arc<Config>,
}

impl AppState {
    /// Create state for a store and configuration
    pub fn new(store: SnapshotStore, config: Arc<Config>) -> Self {
        Self {
            store,
            health: HealthChecker::new(),
            config,
        }
    }
}

// ============================================================================
// Proxy Server
// ============================================================================

/// HTTP server publishing printer snapshots
pub struct ProxyServer {
    state: AppState,
}

impl ProxyServer {
    /// Create a new server
    pub fn new(state: AppState) -> Self {
        Self { state }
    }

    /// Get the application state
    pub fn state(&self) -> AppState {
        self.state.clone()
    }

    /// Build the router with all routes and layers
    pub fn build_router(&self) -> Router {
        let mut router = api::create_router(self.state.clone())
            .merge(health::create_health_router(self.state.clone()));

        if self.state.config.enable_cors {
            router = router.layer(
                CorsLayer::new()
                    .allow_origin(Any)
                    .allow_methods(Any)
                    .allow_headers(Any),
            );
        }

        if self.state.config.enable_request_logging {
            router = router.layer(TraceLayer::new_for_http());
        }

        router
    }

    /// Bind the configured address and serve until `shutdown_signal` resolves
    pub async fn start_with_shutdown(
        &self,
        shutdown_signal: impl std::future::Future<Output = ()> + Send + 'static,
    ) -> Result<(), ServerError> {
        let addr = self
            .state
            .config
            .bind_address()
            .map_err(|e| ServerError::Config(e.to_string()))?;

        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .map_err(|source| ServerError::Bind { addr, source })?;

        self.serve(listener, shutdown_signal).await
    }

    /// Serve on an already bound listener
    pub async fn serve(
        &self,
        listener: tokio::net::TcpListener,
        shutdown_signal: impl std::future::Future<Output = ()> + Send + 'static,
    ) -> Result<(), ServerError> {
        let router = self.build_router();

        match listener.local_addr() {
            Ok(addr) => tracing::info!("Serving printer API on http://{}", addr),
            Err(_) => tracing::info!("Serving printer API"),
        }

        self.state.health.mark_ready();

        axum::serve(listener, router)
            .with_graceful_shutdown(shutdown_signal)
            .await
            .map_err(ServerError::Serve)?;

        tracing::info!("HTTP server shutdown complete");
        Ok(())
    }
}

// ============================================================================
// Server Errors
// ============================================================================

/// Server errors
#[derive(Debug, Error)]
pub enum ServerError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Failed to bind to address
    #[error("Failed to bind {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },

    /// Server error while serving
    #[error("Server error: {0}")]
    Serve(#[source] std::io::Error),
}

// ============================================================================
// Tests
// ============================================================================
