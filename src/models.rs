// Core data structures for the ospap proxy

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::octoprint::decode::JsonObject;

/// Status of one printer as retrieved in one poll cycle
///
/// When `errored` is set the data fields hold whatever was collected before
/// the failing step; later fields stay empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrinterStatus {
    pub name: String,
    pub last_retrieved: DateTime<Utc>,
    pub errored: bool,
    pub api_version: String,
    pub printer_info: Option<JsonObject>,
    pub current_job: Option<JsonObject>,
}

impl PrinterStatus {
    /// Fresh, not yet errored status stamped with the current time
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            last_retrieved: Utc::now(),
            errored: false,
            api_version: String::new(),
            printer_info: None,
            current_job: None,
        }
    }

    /// Status for a printer whose poll produced nothing at all
    pub fn failed(name: impl Into<String>) -> Self {
        Self {
            errored: true,
            ..Self::new(name)
        }
    }

    /// `state` of the current job rendered as text, if any
    pub fn job_state(&self) -> Option<String> {
        self.current_job
            .as_ref()
            .and_then(|job| job.get("state"))
            .and_then(crate::octoprint::decode::stringify)
    }
}

/// Steps of the per-printer retrieval pipeline, in execution order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PollStep {
    Connection,
    ApiVersion,
    PrinterInfo,
    CurrentJob,
    JobState,
}

impl PollStep {
    /// Get string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Connection => "connection",
            Self::ApiVersion => "api_version",
            Self::PrinterInfo => "printer_info",
            Self::CurrentJob => "current_job",
            Self::JobState => "job_state",
        }
    }
}

impl fmt::Display for PollStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_new_status() {
        let status = PrinterStatus::new("prusa");
        assert_eq!(status.name, "prusa");
        assert!(!status.errored);
        assert!(status.api_version.is_empty());
        assert!(status.printer_info.is_none());
    }

    #[test]
    fn test_failed_status() {
        let status = PrinterStatus::failed("ender");
        assert!(status.errored);
        assert!(status.current_job.is_none());
    }

    #[test]
    fn test_serialized_field_names() {
        let status = PrinterStatus::new("prusa");
        let value = serde_json::to_value(&status).unwrap();
        let object = value.as_object().unwrap();

        for field in [
            "name",
            "last_retrieved",
            "errored",
            "api_version",
            "printer_info",
            "current_job",
        ] {
            assert!(object.contains_key(field), "missing field {field}");
        }
        assert!(value["printer_info"].is_null());
    }

    #[test]
    fn test_round_trip() {
        let mut status = PrinterStatus::new("prusa");
        status.api_version = "0.1".to_string();
        status.printer_info = json!({"temperature": {"tool0": {"actual": 214.8}}})
            .as_object()
            .cloned();
        status.current_job = json!({"state": "Printing", "progress": {"completion": 42.5}})
            .as_object()
            .cloned();

        let text = serde_json::to_string(&status).unwrap();
        let parsed: PrinterStatus = serde_json::from_str(&text).unwrap();
        assert_eq!(parsed, status);
    }

    #[test]
    fn test_job_state() {
        let mut status = PrinterStatus::new("prusa");
        assert_eq!(status.job_state(), None);

        status.current_job = json!({"state": "Offline after error"}).as_object().cloned();
        assert_eq!(status.job_state().as_deref(), Some("Offline after error"));
    }

    #[test]
    fn test_poll_step_display() {
        assert_eq!(PollStep::ApiVersion.to_string(), "api_version");
        assert_eq!(PollStep::Connection.as_str(), "connection");
    }
}
