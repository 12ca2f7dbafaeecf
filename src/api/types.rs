//! API response and query types.

use serde::{Deserialize, Serialize};

use crate::config::ScenarioConfig;
use crate::sim::kpi::RunSummary;
use crate::sim::types::StepRecord;

/// Combined state response: scenario, summary, and latest record.
#[derive(Debug, Serialize)]
pub struct StateResponse<'a> {
    pub scenario: &'a ScenarioConfig,
    pub summary: &'a RunSummary,
    /// Last record of the run, absent for an empty run.
    pub latest_step: Option<&'a StepRecord>,
}

/// Optional range query parameters for the telemetry endpoint.
#[derive(Debug, Deserialize)]
pub struct TelemetryQuery {
    /// Start timestep (inclusive).
    pub from: Option<usize>,
    /// End timestep (inclusive).
    pub to: Option<usize>,
}

/// Error response body for 4xx errors.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Human-readable error message.
    pub error: String,
}
