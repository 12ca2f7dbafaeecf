//! Snapshot, schedule, and allocation types consumed and produced by the engine.

use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::error::SnapshotError;

/// Priority of an essential device. Essential devices are never shed.
pub const ESSENTIAL_PRIORITY: i32 = 1;

/// Request to force a device ON once `scheduled_time` has been reached.
///
/// # Examples
///
/// ```
/// use chrono::NaiveDate;
/// use smart_energy::alloc::DeviceSchedule;
///
/// let at = NaiveDate::from_ymd_opt(2024, 10, 1)
///     .and_then(|d| d.and_hms_opt(18, 0, 0))
///     .unwrap();
/// let schedule = DeviceSchedule::new("Oven", at);
/// assert!(schedule.is_due(at));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceSchedule {
    /// Device the schedule applies to.
    pub device_name: String,
    /// Moment from which the device is forced ON.
    pub scheduled_time: NaiveDateTime,
}

impl DeviceSchedule {
    pub fn new(device_name: impl Into<String>, scheduled_time: NaiveDateTime) -> Self {
        Self {
            device_name: device_name.into(),
            scheduled_time,
        }
    }

    /// Returns `true` once `now` is at or past the scheduled time.
    pub fn is_due(&self, now: NaiveDateTime) -> bool {
        now >= self.scheduled_time
    }
}

/// Comfort band for indoor temperature (°C), bounds inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TemperatureRange {
    pub low: f64,
    pub high: f64,
}

/// Direction the temperature regulation layer has to push.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThermalDemand {
    Heat,
    Cool,
}

impl TemperatureRange {
    pub fn new(low: f64, high: f64) -> Self {
        Self { low, high }
    }

    /// Returns the required regulation for `temperature_c`, or `None` inside the band.
    pub fn demand_for(&self, temperature_c: f64) -> Option<ThermalDemand> {
        if temperature_c < self.low {
            Some(ThermalDemand::Heat)
        } else if temperature_c > self.high {
            Some(ThermalDemand::Cool)
        } else {
            None
        }
    }
}

/// Point-in-time conditions for one evaluation.
///
/// `device_priorities` defines the known devices; `scheduled_devices` may
/// add schedule-only devices that start OFF until their slot arrives.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub current_price: f64,
    pub price_threshold: f64,
    /// Device name to priority (1 = essential, higher = less essential).
    pub device_priorities: BTreeMap<String, i32>,
    pub current_time: NaiveDateTime,
    pub current_temperature: f64,
    pub desired_temperature_range: TemperatureRange,
    pub energy_usage_limit: f64,
    /// Usage accumulated so far today, owned by the caller.
    pub total_energy_used_today: f64,
    #[serde(default)]
    pub scheduled_devices: Vec<DeviceSchedule>,
}

impl Snapshot {
    /// Priority of `device`, or `None` for schedule-only devices.
    pub fn priority_of(&self, device: &str) -> Option<i32> {
        self.device_priorities.get(device).copied()
    }

    /// Union of prioritised and scheduled device names.
    pub fn known_devices(&self) -> BTreeSet<&str> {
        self.device_priorities
            .keys()
            .map(String::as_str)
            .chain(
                self.scheduled_devices
                    .iter()
                    .map(|s| s.device_name.as_str()),
            )
            .collect()
    }

    /// Checks the preconditions the engine relies on.
    ///
    /// # Errors
    ///
    /// Returns the first [`SnapshotError`] found.
    pub fn validate(&self) -> Result<(), SnapshotError> {
        let numbers = [
            ("current_price", self.current_price),
            ("price_threshold", self.price_threshold),
            ("current_temperature", self.current_temperature),
            ("desired_temperature_range.low", self.desired_temperature_range.low),
            ("desired_temperature_range.high", self.desired_temperature_range.high),
            ("energy_usage_limit", self.energy_usage_limit),
            ("total_energy_used_today", self.total_energy_used_today),
        ];
        for (field, value) in numbers {
            if !value.is_finite() {
                return Err(SnapshotError::NonFinite { field });
            }
        }

        let range = self.desired_temperature_range;
        if range.low > range.high {
            return Err(SnapshotError::InvertedTemperatureRange {
                low: range.low,
                high: range.high,
            });
        }

        for (device, &priority) in &self.device_priorities {
            if device.is_empty() {
                return Err(SnapshotError::EmptyDeviceName);
            }
            if priority < ESSENTIAL_PRIORITY {
                return Err(SnapshotError::InvalidPriority {
                    device: device.clone(),
                    priority,
                });
            }
        }

        if self
            .scheduled_devices
            .iter()
            .any(|s| s.device_name.is_empty())
        {
            return Err(SnapshotError::EmptyDeviceName);
        }

        Ok(())
    }
}

/// Outcome of one evaluation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Allocation {
    /// Price exceeded the threshold.
    pub energy_saving_mode: bool,
    /// Temperature was outside the desired range.
    pub temperature_regulation_active: bool,
    /// Evaluation time fell inside the night window.
    pub night_mode: bool,
    /// Final ON/OFF state for every known device.
    pub device_status: BTreeMap<String, bool>,
    /// Usage after budget shedding adjustments.
    pub total_energy_used: f64,
    /// Devices turned OFF by budget shedding, least essential tier first.
    ///
    /// A due schedule may switch a shed device back ON afterwards. It stays
    /// listed here and its decrement stays in `total_energy_used`, so the
    /// list records what shedding did, not the final status.
    pub shed_devices: Vec<String>,
}

impl Allocation {
    /// Status of `device`, or `None` if the device is unknown.
    pub fn is_on(&self, device: &str) -> Option<bool> {
        self.device_status.get(device).copied()
    }

    /// Names of all devices left ON, in name order.
    pub fn devices_on(&self) -> impl Iterator<Item = &str> {
        self.device_status
            .iter()
            .filter(|(_, on)| **on)
            .map(|(name, _)| name.as_str())
    }
}
