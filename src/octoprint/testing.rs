//! Scripted [`PrinterApi`] for unit tests

use async_trait::async_trait;
use serde_json::json;
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use crate::config::PrinterConfig;

use super::client::{ConnectionState, PrinterApi};
use super::decode::{Decoded, JsonObject};
use super::error::ClientError;

/// Canned responses for one printer
#[derive(Debug, Clone)]
pub(crate) struct Script {
    /// Successive connection states; the last one repeats
    pub connection: Vec<Result<String, ClientError>>,
    pub connect: Result<(), ClientError>,
    pub version: Result<String, ClientError>,
    pub info: Result<JsonObject, ClientError>,
    pub job: Result<JsonObject, ClientError>,
    /// Whether the info and job bodies were parsable
    pub info_present: bool,
    pub job_present: bool,
    /// Panic inside `api_version`
    pub panic_on_version: bool,
    /// Added latency on every call
    pub latency: Duration,
}

impl Script {
    pub fn healthy() -> Self {
        Self {
            connection: vec![Ok("Operational".to_string())],
            connect: Ok(()),
            version: Ok("0.1".to_string()),
            info: Ok(object(json!({"state": {"text": "Operational"}}))),
            job: Ok(object(json!({"state": "Printing", "progress": {"completion": 12.5}}))),
            info_present: true,
            job_present: true,
            panic_on_version: false,
            latency: Duration::ZERO,
        }
    }

    pub fn disconnected() -> Self {
        Self {
            connection: vec![Ok("Closed".to_string())],
            ..Self::healthy()
        }
    }
}

pub(crate) fn object(value: serde_json::Value) -> JsonObject {
    value.as_object().cloned().unwrap_or_default()
}

fn present_or_absent(value: JsonObject, present: bool) -> Decoded<JsonObject> {
    if present {
        Decoded::found(value)
    } else {
        Decoded::absent()
    }
}

pub(crate) fn network_error() -> ClientError {
    ClientError::Network("connection refused".to_string())
}

/// [`PrinterApi`] answering from per-printer scripts and recording calls
#[derive(Debug, Default)]
pub(crate) struct ScriptedApi {
    scripts: HashMap<String, Script>,
    connection_reads: Mutex<HashMap<String, usize>>,
    calls: Mutex<Vec<(String, &'static str)>>,
}

impl ScriptedApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: &str, script: Script) -> Self {
        self.scripts.insert(name.to_string(), script);
        self
    }

    /// Operations called for a printer, in order
    pub fn calls_for(&self, name: &str) -> Vec<&'static str> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|(printer, _)| printer == name)
            .map(|(_, op)| *op)
            .collect()
    }

    async fn enter(&self, printer: &PrinterConfig, op: &'static str) -> Script {
        self.calls.lock().unwrap().push((printer.name.clone(), op));
        let script = self
            .scripts
            .get(&printer.name)
            .cloned()
            .unwrap_or_else(Script::healthy);
        if !script.latency.is_zero() {
            tokio::time::sleep(script.latency).await;
        }
        script
    }
}

#[async_trait]
impl PrinterApi for ScriptedApi {
    async fn api_version(&self, printer: &PrinterConfig) -> Result<Decoded<String>, ClientError> {
        let script = self.enter(printer, "api_version").await;
        if script.panic_on_version {
            panic!("scripted panic in api_version for {}", printer.name);
        }
        script.version.map(Decoded::found)
    }

    async fn printer_info(
        &self,
        printer: &PrinterConfig,
    ) -> Result<Decoded<JsonObject>, ClientError> {
        let script = self.enter(printer, "printer_info").await;
        script.info.map(|info| present_or_absent(info, script.info_present))
    }

    async fn current_job(
        &self,
        printer: &PrinterConfig,
    ) -> Result<Decoded<JsonObject>, ClientError> {
        let script = self.enter(printer, "current_job").await;
        script.job.map(|job| present_or_absent(job, script.job_present))
    }

    async fn connection_state(
        &self,
        printer: &PrinterConfig,
    ) -> Result<ConnectionState, ClientError> {
        let script = self.enter(printer, "connection_state").await;
        let read = {
            let mut reads = self.connection_reads.lock().unwrap();
            let count = reads.entry(printer.name.clone()).or_insert(0);
            *count += 1;
            *count - 1
        };
        let index = read.min(script.connection.len().saturating_sub(1));
        script.connection[index]
            .clone()
            .map(|state| ConnectionState::from_state(Decoded::found(state)))
    }

    async fn connect(&self, printer: &PrinterConfig) -> Result<(), ClientError> {
        self.enter(printer, "connect").await.connect
    }
}
