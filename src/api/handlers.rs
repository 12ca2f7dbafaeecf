//! Request handlers for the API endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use tracing::warn;

use super::AppState;
use super::types::{ErrorResponse, StateResponse, TelemetryQuery};
use crate::alloc::{Allocation, Snapshot};
use crate::sim::types::StepRecord;

/// Evaluates a snapshot with the configured engine.
///
/// `POST /evaluate` → 200 + `Allocation` JSON
/// invalid snapshot → 422 + `ErrorResponse`
pub async fn evaluate(
    State(state): State<Arc<AppState>>,
    Json(snapshot): Json<Snapshot>,
) -> Result<Json<Allocation>, (StatusCode, Json<ErrorResponse>)> {
    state.engine.evaluate(&snapshot).map(Json).map_err(|e| {
        warn!(error = %e, "rejected snapshot");
        (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(ErrorResponse {
                error: e.to_string(),
            }),
        )
    })
}

/// Returns scenario, run summary, and latest record.
///
/// `GET /state` → 200 + `StateResponse` JSON
pub async fn get_state(State(state): State<Arc<AppState>>) -> Response {
    Json(StateResponse {
        scenario: &state.scenario,
        summary: &state.summary,
        latest_step: state.records.last(),
    })
    .into_response()
}

/// Returns step records, optionally filtered by timestep range.
///
/// `GET /telemetry` → 200 + `Vec<StepRecord>` JSON
/// `GET /telemetry?from=N&to=M` → filtered range (inclusive)
/// `GET /telemetry?from=10&to=5` → 400 + `ErrorResponse`
pub async fn get_telemetry(
    State(state): State<Arc<AppState>>,
    Query(query): Query<TelemetryQuery>,
) -> Response {
    let from = query.from.unwrap_or(0);
    let to = query.to.unwrap_or(usize::MAX);

    if from > to {
        return (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                error: format!("`from` ({from}) must be <= `to` ({to})"),
            }),
        )
            .into_response();
    }

    let records: Vec<&StepRecord> = state
        .records
        .iter()
        .filter(|r| r.timestep >= from && r.timestep <= to)
        .collect();

    Json(records).into_response()
}
