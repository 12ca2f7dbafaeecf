//! Integration tests for the REST API feature.

#![cfg(feature = "api")]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use tower::util::ServiceExt;

use smart_energy::api::{AppState, router};
use smart_energy::config::ScenarioConfig;
use smart_energy::sim::kpi::RunSummary;
use smart_energy::sim::runner::DayRunner;

/// Run the baseline scenario and return the API state.
fn build_api_state() -> Arc<AppState> {
    let scenario = ScenarioConfig::baseline();
    let mut runner = DayRunner::from_scenario(&scenario).unwrap();
    let records = runner.run().unwrap();
    let summary = RunSummary::from_records(
        &records,
        runner.run_config().dt_hours,
        scenario.budget.energy_usage_limit_kwh,
    );
    Arc::new(AppState {
        engine: runner.engine().clone(),
        scenario,
        summary,
        records,
    })
}

async fn send(req: Request<Body>) -> (StatusCode, serde_json::Value) {
    let app = router(build_api_state());
    let resp = app.oneshot(req).await.unwrap();
    let status = resp.status();
    let body = axum::body::to_bytes(resp.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&body).unwrap())
}

fn post_evaluate(body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/evaluate")
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn evaluate_pending_schedule_keeps_device_off() {
    let (status, json) = send(post_evaluate(serde_json::json!({
        "current_price": 0.15,
        "price_threshold": 0.20,
        "device_priorities": {"Oven": 2},
        "current_time": "2024-10-01T17:00:00",
        "current_temperature": 22.0,
        "desired_temperature_range": {"low": 20.0, "high": 24.0},
        "energy_usage_limit": 30.0,
        "total_energy_used_today": 25.0,
        "scheduled_devices": [
            {"device_name": "Oven", "scheduled_time": "2024-10-01T18:00:00"}
        ]
    })))
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["device_status"]["Oven"], false);
    assert_eq!(json["energy_saving_mode"], false);
}

#[tokio::test]
async fn evaluate_over_budget_reports_shed_devices() {
    let (status, json) = send(post_evaluate(serde_json::json!({
        "current_price": 0.15,
        "price_threshold": 0.20,
        "device_priorities": {"Heating": 1, "Lights": 2, "Appliances": 3},
        "current_time": "2024-10-01T12:00:00",
        "current_temperature": 22.0,
        "desired_temperature_range": {"low": 20.0, "high": 24.0},
        "energy_usage_limit": 30.0,
        "total_energy_used_today": 35.0
    })))
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["total_energy_used"], 31.0);
    assert_eq!(json["device_status"]["Heating"], true);
    assert_eq!(json["shed_devices"], serde_json::json!(["Appliances", "Lights"]));
}

#[tokio::test]
async fn evaluate_rejects_zero_priority() {
    let (status, json) = send(post_evaluate(serde_json::json!({
        "current_price": 0.15,
        "price_threshold": 0.20,
        "device_priorities": {"Pump": 0},
        "current_time": "2024-10-01T12:00:00",
        "current_temperature": 22.0,
        "desired_temperature_range": {"low": 20.0, "high": 24.0},
        "energy_usage_limit": 30.0,
        "total_energy_used_today": 10.0
    })))
    .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(json["error"].as_str().unwrap().contains("Pump"));
}

#[tokio::test]
async fn state_reports_baseline_run() {
    let req = Request::builder()
        .uri("/state")
        .body(Body::empty())
        .unwrap();
    let (status, json) = send(req).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["summary"]["ticks"], 24);
    assert_eq!(json["latest_step"]["timestep"], 23);
    assert_eq!(json["scenario"]["simulation"]["seed"], 42);
}

#[tokio::test]
async fn telemetry_returns_all_records() {
    let req = Request::builder()
        .uri("/telemetry")
        .body(Body::empty())
        .unwrap();
    let (status, json) = send(req).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json.as_array().unwrap().len(), 24);
}

#[tokio::test]
async fn telemetry_open_ended_range() {
    let req = Request::builder()
        .uri("/telemetry?from=20")
        .body(Body::empty())
        .unwrap();
    let (status, json) = send(req).await;

    assert_eq!(status, StatusCode::OK);
    let rows = json.as_array().unwrap();
    assert_eq!(rows.len(), 4);
    assert_eq!(rows[0]["timestep"], 20);
}
