//! Status retrieval for a single printer
//!
//! The retrieval is a fixed pipeline: connection check, API version,
//! printer info, current job, job state. Every step gates the next one; the
//! first failure marks the status errored and ends the poll with whatever
//! was collected so far.

use std::fmt;
use std::time::Duration;

use crate::config::PrinterConfig;
use crate::error::OspapErrorTrait;
use crate::models::{PollStep, PrinterStatus};
use crate::octoprint::{ensure_connected, ClientError, PrinterApi};

/// Substring of the job state that marks a device-level error
const JOB_ERROR_MARKER: &str = "Error";

/// Why a poll ended early: the step, and the transport error if there was one
#[derive(Debug, Clone, PartialEq)]
pub struct PollFailure {
    pub step: PollStep,
    pub error: Option<ClientError>,
}

impl PollFailure {
    fn device(step: PollStep) -> Self {
        Self { step, error: None }
    }

    fn transport(step: PollStep, error: ClientError) -> Self {
        Self {
            step,
            error: Some(error),
        }
    }

    /// Whether the next cycle may succeed without intervention
    pub fn is_recoverable(&self) -> bool {
        self.error.as_ref().map_or(true, OspapErrorTrait::is_recoverable)
    }
}

impl fmt::Display for PollFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.error {
            Some(error) => write!(f, "{} failed: {}", self.step, error),
            None => write!(f, "{} reported by device", self.step),
        }
    }
}

/// Poll one printer; never fails, failures end up in `errored`
pub async fn poll_printer(
    api: &dyn PrinterApi,
    printer: &PrinterConfig,
    connect_delay: Duration,
) -> PrinterStatus {
    let mut status = PrinterStatus::new(&printer.name);

    match run_pipeline(api, printer, connect_delay, &mut status).await {
        Ok(()) => tracing::debug!(
            printer = %printer.name,
            api_version = %status.api_version,
            job_state = ?status.job_state(),
            "Printer polled"
        ),
        Err(failure) => {
            status.errored = true;
            let category = failure.error.as_ref().map(|e| e.category().as_str());
            tracing::warn!(
                printer = %printer.name,
                step = %failure.step,
                category = category.unwrap_or("device"),
                recoverable = failure.is_recoverable(),
                "Printer poll errored: {}",
                failure
            );
        }
    }

    status
}

// Internal: run the gated steps, returning where and why the poll stopped
async fn run_pipeline(
    api: &dyn PrinterApi,
    printer: &PrinterConfig,
    connect_delay: Duration,
    status: &mut PrinterStatus,
) -> Result<(), PollFailure> {
    let connected = ensure_connected(api, printer, connect_delay)
        .await
        .map_err(|e| PollFailure::transport(PollStep::Connection, e))?;
    if !connected {
        tracing::info!(printer = %printer.name, "Printer is not connected");
        return Err(PollFailure::device(PollStep::Connection));
    }

    status.api_version = api
        .api_version(printer)
        .await
        .map_err(|e| PollFailure::transport(PollStep::ApiVersion, e))?
        .into_value();

    // Unparsable bodies are published as null, not as an empty object
    status.printer_info = api
        .printer_info(printer)
        .await
        .map_err(|e| PollFailure::transport(PollStep::PrinterInfo, e))?
        .into_present();

    status.current_job = api
        .current_job(printer)
        .await
        .map_err(|e| PollFailure::transport(PollStep::CurrentJob, e))?
        .into_present();

    if let Some(state) = status.job_state() {
        if state.contains(JOB_ERROR_MARKER) {
            tracing::info!(printer = %printer.name, state = %state, "Job reports an error state");
            return Err(PollFailure::device(PollStep::JobState));
        }
    }

    Ok(())
}
