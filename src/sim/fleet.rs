//! Household device fleet: priorities, daily schedules and power draw.

use std::collections::BTreeMap;

use chrono::{NaiveDate, NaiveTime};

use crate::alloc::DeviceSchedule;

/// A controllable device as the caller knows it.
#[derive(Debug, Clone, PartialEq)]
pub struct FleetDevice {
    pub name: String,
    /// `None` for schedule-only devices.
    pub priority: Option<i32>,
    /// Draw while ON (kW).
    pub power_kw: f64,
    /// Daily forced-ON times.
    pub schedule_times: Vec<NaiveTime>,
}

impl FleetDevice {
    pub fn new(name: impl Into<String>, priority: Option<i32>, power_kw: f64) -> Self {
        Self {
            name: name.into(),
            priority,
            power_kw,
            schedule_times: Vec::new(),
        }
    }

    pub fn with_schedule(mut self, at: NaiveTime) -> Self {
        self.schedule_times.push(at);
        self
    }
}

#[derive(Debug, Clone, Default)]
pub struct Fleet {
    devices: Vec<FleetDevice>,
}

impl Fleet {
    pub fn new(devices: Vec<FleetDevice>) -> Self {
        Self { devices }
    }

    pub fn devices(&self) -> &[FleetDevice] {
        &self.devices
    }

    /// Priority map handed to the engine; schedule-only devices are omitted.
    pub fn priorities(&self) -> BTreeMap<String, i32> {
        self.devices
            .iter()
            .filter_map(|d| d.priority.map(|p| (d.name.clone(), p)))
            .collect()
    }

    /// Concrete schedules for `date`.
    pub fn schedules_on(&self, date: NaiveDate) -> Vec<DeviceSchedule> {
        self.devices
            .iter()
            .flat_map(|d| {
                d.schedule_times
                    .iter()
                    .map(move |at| DeviceSchedule::new(d.name.clone(), date.and_time(*at)))
            })
            .collect()
    }

    /// Draw of `device` in kW, `0.0` for unknown devices.
    pub fn power_kw(&self, device: &str) -> f64 {
        self.devices
            .iter()
            .find(|d| d.name == device)
            .map_or(0.0, |d| d.power_kw)
    }

    /// Energy drawn over `dt_hours` by the devices marked ON in `status`.
    pub fn consumption_kwh(&self, status: &BTreeMap<String, bool>, dt_hours: f64) -> f64 {
        status
            .iter()
            .filter(|(_, on)| **on)
            .map(|(name, _)| self.power_kw(name) * dt_hours)
            .sum()
    }
}
