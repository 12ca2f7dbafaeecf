//! REST API for snapshot evaluation and run telemetry.
//!
//! Endpoints:
//! - `POST /evaluate`: evaluate a snapshot with the run's engine
//! - `GET /state`: scenario config, run summary, and latest record
//! - `GET /telemetry`: step records with optional range filtering

mod handlers;
mod types;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use tracing::info;

use crate::alloc::AllocationEngine;
use crate::config::ScenarioConfig;
use crate::sim::kpi::RunSummary;
use crate::sim::types::StepRecord;

pub use types::ErrorResponse;

/// Immutable application state shared across all request handlers.
///
/// Constructed once after the run completes and wrapped in `Arc`; all data
/// is read-only and the engine is stateless, so no locks are needed.
pub struct AppState {
    /// Scenario used for this run.
    pub scenario: ScenarioConfig,
    /// Engine configured from the scenario.
    pub engine: AllocationEngine,
    /// Aggregate run summary.
    pub summary: RunSummary,
    /// Per-tick records.
    pub records: Vec<StepRecord>,
}

/// Builds the axum router with all API routes.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/evaluate", post(handlers::evaluate))
        .route("/state", get(handlers::get_state))
        .route("/telemetry", get(handlers::get_telemetry))
        .with_state(state)
}

/// Binds to the given address and serves the API.
///
/// # Errors
///
/// Returns an `io::Error` if the listener cannot bind or the server fails.
pub async fn serve(state: Arc<AppState>, addr: SocketAddr) -> std::io::Result<()> {
    let app = router(state);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "API server listening");
    axum::serve(listener, app).await
}
