//! Shared test fixtures for integration tests.

#![allow(dead_code)]

use std::collections::BTreeMap;

use chrono::{NaiveDate, NaiveDateTime};
use smart_energy::alloc::{DeviceSchedule, Snapshot, TemperatureRange};

/// Timestamp on 2024-10-01 at `hour:minute`.
pub fn at(hour: u32, minute: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 10, 1)
        .and_then(|d| d.and_hms_opt(hour, minute, 0))
        .expect("valid fixture timestamp")
}

/// Builds a priority map from `(name, priority)` pairs.
pub fn priorities(pairs: &[(&str, i32)]) -> BTreeMap<String, i32> {
    pairs.iter().map(|(n, p)| (n.to_string(), *p)).collect()
}

/// Calm midday snapshot: cheap power, comfortable temperature, under budget.
///
/// price 0.15 / threshold 0.20, 12:00, 22.0 °C in (20, 24), 25.0 of 30.0 used.
pub fn calm_snapshot(pairs: &[(&str, i32)]) -> Snapshot {
    Snapshot {
        current_price: 0.15,
        price_threshold: 0.20,
        device_priorities: priorities(pairs),
        current_time: at(12, 0),
        current_temperature: 22.0,
        desired_temperature_range: TemperatureRange::new(20.0, 24.0),
        energy_usage_limit: 30.0,
        total_energy_used_today: 25.0,
        scheduled_devices: Vec::new(),
    }
}

/// Single schedule for `device` at `hour:00` on the fixture day.
pub fn schedule(device: &str, hour: u32) -> DeviceSchedule {
    DeviceSchedule::new(device, at(hour, 0))
}
