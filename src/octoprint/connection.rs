//! Connection management for printer controllers
//!
//! A controller can be up while its serial link to the printer is closed.
//! [`ensure_connected`] detects that and, for printers configured with
//! `auto_connect`, makes exactly one attempt to bring the link up.

use std::time::Duration;

use crate::config::PrinterConfig;

use super::client::PrinterApi;
use super::error::ClientError;

/// Check that a controller is connected to its printer, connecting if allowed
///
/// Returns `Ok(false)` for a printer that is legitimately disconnected; only
/// transport failures are errors. After a connect command the state is
/// re-read once, `connect_delay` later.
pub async fn ensure_connected(
    api: &dyn PrinterApi,
    printer: &PrinterConfig,
    connect_delay: Duration,
) -> Result<bool, ClientError> {
    let state = api.connection_state(printer).await?;
    if state.connected {
        return Ok(true);
    }

    if !printer.auto_connect {
        tracing::debug!(
            printer = %printer.name,
            state = %state.state.value,
            "Printer not connected, auto_connect disabled"
        );
        return Ok(false);
    }

    tracing::info!(
        printer = %printer.name,
        address = %printer.server_address,
        state = %state.state.value,
        "Requesting controller to connect to its printer"
    );

    api.connect(printer).await?;
    tokio::time::sleep(connect_delay).await;

    let state = api.connection_state(printer).await?;
    if !state.connected {
        tracing::warn!(
            printer = %printer.name,
            state = %state.state.value,
            "Printer still not connected after connect command"
        );
    }

    Ok(state.connected)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::octoprint::testing::{network_error, Script, ScriptedApi};

    const DELAY: Duration = Duration::from_millis(5);

    #[tokio::test]
    async fn test_already_connected() {
        let api = ScriptedApi::new().with("mk3", Script::healthy());
        let printer = PrinterConfig::new("mk3", "http://mk3.local").with_auto_connect(true);

        assert_eq!(ensure_connected(&api, &printer, DELAY).await, Ok(true));
        assert_eq!(api.calls_for("mk3"), vec!["connection_state"]);
    }

    #[tokio::test]
    async fn test_disconnected_without_auto_connect() {
        let api = ScriptedApi::new().with("mk3", Script::disconnected());
        let printer = PrinterConfig::new("mk3", "http://mk3.local");

        assert_eq!(ensure_connected(&api, &printer, DELAY).await, Ok(false));
        assert!(!api.calls_for("mk3").contains(&"connect"));
    }

    #[tokio::test]
    async fn test_auto_connect_succeeds() {
        let script = Script {
            connection: vec![Ok("Closed".to_string()), Ok("Operational".to_string())],
            ..Script::healthy()
        };
        let api = ScriptedApi::new().with("mk3", script);
        let printer = PrinterConfig::new("mk3", "http://mk3.local").with_auto_connect(true);

        assert_eq!(ensure_connected(&api, &printer, DELAY).await, Ok(true));
        assert_eq!(
            api.calls_for("mk3"),
            vec!["connection_state", "connect", "connection_state"]
        );
    }

    #[tokio::test]
    async fn test_auto_connect_single_attempt() {
        let api = ScriptedApi::new().with("mk3", Script::disconnected());
        let printer = PrinterConfig::new("mk3", "http://mk3.local").with_auto_connect(true);

        assert_eq!(ensure_connected(&api, &printer, DELAY).await, Ok(false));
        let calls = api.calls_for("mk3");
        assert_eq!(calls.iter().filter(|op| **op == "connect").count(), 1);
        assert_eq!(calls.len(), 3);
    }

    #[tokio::test]
    async fn test_connection_error_propagates() {
        let script = Script {
            connection: vec![Err(network_error())],
            ..Script::healthy()
        };
        let api = ScriptedApi::new().with("mk3", script);
        let printer = PrinterConfig::new("mk3", "http://mk3.local").with_auto_connect(true);

        assert_eq!(ensure_connected(&api, &printer, DELAY).await, Err(network_error()));
        assert_eq!(api.calls_for("mk3"), vec!["connection_state"]);
    }

    #[tokio::test]
    async fn test_connect_error_propagates() {
        let script = Script {
            connect: Err(ClientError::Timeout),
            ..Script::disconnected()
        };
        let api = ScriptedApi::new().with("mk3", script);
        let printer = PrinterConfig::new("mk3", "http://mk3.local").with_auto_connect(true);

        assert_eq!(ensure_connected(&api, &printer, DELAY).await, Err(ClientError::Timeout));
        assert_eq!(api.calls_for("mk3"), vec!["connection_state", "connect"]);
    }
}
