//! Integration tests for scenario-driven day runs.

use smart_energy::config::ScenarioConfig;
use smart_energy::io::export::{export_csv, write_csv};
use smart_energy::sim::kpi::RunSummary;
use smart_energy::sim::runner::DayRunner;
use smart_energy::sim::types::StepRecord;

fn run_scenario(cfg: &ScenarioConfig) -> Vec<StepRecord> {
    assert!(cfg.validate().is_empty(), "scenario should validate");
    let mut runner = DayRunner::from_scenario(cfg).expect("scenario builds");
    runner.run().expect("run completes")
}

#[test]
fn baseline_run_produces_one_record_per_tick() {
    let records = run_scenario(&ScenarioConfig::baseline());
    assert_eq!(records.len(), 24);
    for (i, r) in records.iter().enumerate() {
        assert_eq!(r.timestep, i);
    }
}

#[test]
fn multi_day_run_resets_usage_each_midnight() {
    let mut cfg = ScenarioConfig::baseline();
    cfg.simulation.days = 3;
    let records = run_scenario(&cfg);
    assert_eq!(records.len(), 72);
    for day in 0..3 {
        assert_eq!(records[day * 24].used_today_kwh, 0.0);
    }
}

#[test]
fn same_seed_reproduces_run() {
    let cfg = ScenarioConfig::baseline();
    let a = run_scenario(&cfg);
    let b = run_scenario(&cfg);
    assert_eq!(a, b);
}

#[test]
fn different_seed_changes_profiles() {
    let a = run_scenario(&ScenarioConfig::baseline());
    let mut cfg = ScenarioConfig::baseline();
    cfg.simulation.seed = 7;
    let b = run_scenario(&cfg);
    assert!(a.iter().zip(&b).any(|(x, y)| x.price != y.price));
}

#[test]
fn every_record_reports_every_configured_device() {
    let cfg = ScenarioConfig::baseline();
    let records = run_scenario(&cfg);
    for r in &records {
        assert_eq!(r.device_status.len(), cfg.devices.len());
        for d in &cfg.devices {
            assert!(r.device_status.contains_key(&d.name), "{} missing", d.name);
        }
    }
}

#[test]
fn night_ticks_keep_only_essential_or_due_devices() {
    let cfg = ScenarioConfig::baseline();
    let records = run_scenario(&cfg);
    for r in records.iter().filter(|r| r.night_mode) {
        assert!(r.shed_devices.is_empty());
        for d in &cfg.devices {
            let on = r.device_status[&d.name];
            let scheduled = !d.schedules.is_empty();
            if on && !scheduled {
                assert_eq!(d.priority, Some(1), "{} on at night", d.name);
            }
        }
    }
}

#[test]
fn schedule_only_device_runs_from_its_slot() {
    let records = run_scenario(&ScenarioConfig::baseline());
    for r in &records {
        let hour = r.time.format("%H").to_string().parse::<u32>().unwrap();
        assert_eq!(r.device_status["Dishwasher"], hour >= 21, "at {}", r.time);
    }
}

#[test]
fn peak_pricing_engages_energy_saving() {
    let records = run_scenario(&ScenarioConfig::peak_pricing());
    let saving = records.iter().filter(|r| r.energy_saving_mode).count();
    assert!(saving > 12, "expected most ticks in saving mode, got {saving}");
    for r in records.iter().filter(|r| r.energy_saving_mode) {
        assert!(r.price > 0.20);
        assert!(!r.device_status["Lights"]);
        assert!(!r.device_status["Appliances"]);
    }
}

#[test]
fn cold_snap_runs_heating_and_sheds() {
    let cfg = ScenarioConfig::cold_snap();
    let records = run_scenario(&cfg);
    let summary = RunSummary::from_records(&records, 1.0, cfg.budget.energy_usage_limit_kwh);
    assert!(summary.regulation_ticks > 0);
    for r in records.iter().filter(|r| r.temperature_regulation_active && r.temperature_c < 20.0) {
        assert!(r.device_status["Heating"]);
        assert!(!r.device_status["Cooling"]);
    }
    for r in records.iter().filter(|r| !r.shed_devices.is_empty()) {
        assert!(r.used_today_kwh > cfg.budget.energy_usage_limit_kwh);
        let k = r.shed_devices.len() as f64;
        assert_eq!(r.reported_used_kwh, r.used_today_kwh - 2.0 * k);
    }
}

#[test]
fn summary_matches_records() {
    let cfg = ScenarioConfig::baseline();
    let records = run_scenario(&cfg);
    let summary = RunSummary::from_records(&records, 1.0, cfg.budget.energy_usage_limit_kwh);
    assert_eq!(summary.ticks, 24);
    let total: f64 = records.iter().map(|r| r.consumption_kwh).sum();
    assert!((summary.total_consumption_kwh - total).abs() < 1e-9);
    assert_eq!(summary.night_ticks, records.iter().filter(|r| r.night_mode).count());
    assert!(summary.total_consumption_kwh.is_finite());
}

#[test]
fn csv_export_writes_header_and_rows() {
    let records = run_scenario(&ScenarioConfig::baseline());
    let mut buf = Vec::new();
    write_csv(&records, &mut buf).unwrap();
    let text = String::from_utf8(buf).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines.len(), records.len() + 1);
    assert!(lines[0].starts_with("timestep,time,price"));
    assert!(lines[0].ends_with("devices_on,devices_shed"));
}

#[test]
fn csv_export_to_file_is_deterministic() {
    let records = run_scenario(&ScenarioConfig::baseline());
    let dir = std::env::temp_dir();
    let a = dir.join(format!("smart_energy_export_a_{}.csv", std::process::id()));
    let b = dir.join(format!("smart_energy_export_b_{}.csv", std::process::id()));
    export_csv(&records, &a).unwrap();
    export_csv(&records, &b).unwrap();
    let ca = std::fs::read_to_string(&a).unwrap();
    let cb = std::fs::read_to_string(&b).unwrap();
    let _ = std::fs::remove_file(&a);
    let _ = std::fs::remove_file(&b);
    assert_eq!(ca, cb);
}

#[test]
fn toml_scenario_round_trips_through_runner() {
    let toml = r#"
        [simulation]
        start_date = "2024-12-01"
        steps_per_day = 48
        days = 1
        seed = 3

        [budget]
        energy_usage_limit_kwh = 10.0

        [[devices]]
        name = "Heating"
        priority = 1
        power_kw = 2.0

        [[devices]]
        name = "Lights"
        priority = 2
        power_kw = 0.5
    "#;
    let cfg = ScenarioConfig::from_toml_str(toml).unwrap();
    let records = run_scenario(&cfg);
    assert_eq!(records.len(), 48);
    assert_eq!(records[1].time.format("%H:%M").to_string(), "00:30");
}
