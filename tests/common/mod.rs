//! Common test utilities: a mocked OctoPrint controller

#![allow(dead_code)]

use ospap::config::PrinterConfig;
use ospap::octoprint::{ClientConfig, OctoPrintClient};
use serde_json::{json, Value};
use std::time::Duration;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Short post-connect delay so auto-connect tests stay fast
pub const TEST_CONNECT_DELAY: Duration = Duration::from_millis(20);

/// Client with a short timeout
pub fn test_client() -> OctoPrintClient {
    OctoPrintClient::new(ClientConfig::default().with_timeout(Duration::from_secs(2)))
        .expect("client should build")
}

/// Printer config pointing at a mock server
pub fn printer_for(server: &MockServer, name: &str) -> PrinterConfig {
    PrinterConfig::new(name, server.uri())
}

pub fn version_body() -> Value {
    json!({ "api": "0.1", "server": "1.9.3", "text": "OctoPrint 1.9.3" })
}

pub fn printer_body() -> Value {
    json!({
        "state": {
            "text": "Printing",
            "flags": { "operational": true, "printing": true, "error": false }
        },
        "temperature": {
            "bed": { "actual": 59.8, "target": 60.0 },
            "tool0": { "actual": 214.6, "target": 215.0 }
        }
    })
}

pub fn job_body(state: &str) -> Value {
    json!({
        "job": { "file": { "name": "benchy.gcode" }, "estimatedPrintTime": 3600 },
        "progress": { "completion": 42.5, "printTime": 1530, "printTimeLeft": 2070 },
        "state": state
    })
}

pub fn connection_body(state: &str) -> Value {
    json!({
        "current": { "state": state, "port": "/dev/ttyACM0", "baudrate": 115200 },
        "options": { "ports": ["/dev/ttyACM0"] }
    })
}

/// Mount the connection endpoint answering with a fixed state
pub async fn mount_connection(server: &MockServer, state: &str) {
    Mock::given(method("GET"))
        .and(path("/api/connection"))
        .respond_with(ResponseTemplate::new(200).set_body_json(connection_body(state)))
        .mount(server)
        .await;
}

/// Mount the three data endpoints
pub async fn mount_data_endpoints(server: &MockServer, job_state: &str) {
    Mock::given(method("GET"))
        .and(path("/api/version"))
        .respond_with(ResponseTemplate::new(200).set_body_json(version_body()))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/printer"))
        .respond_with(ResponseTemplate::new(200).set_body_json(printer_body()))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/job"))
        .respond_with(ResponseTemplate::new(200).set_body_json(job_body(job_state)))
        .mount(server)
        .await;
}

/// Mount a fully healthy, connected controller
pub async fn mount_healthy_printer(server: &MockServer, job_state: &str) {
    mount_connection(server, "Operational").await;
    mount_data_endpoints(server, job_state).await;
}

/// Start a mock server already mounted as a healthy printer
pub async fn healthy_printer_server() -> MockServer {
    let server = MockServer::start().await;
    mount_healthy_printer(&server, "Printing").await;
    server
}
