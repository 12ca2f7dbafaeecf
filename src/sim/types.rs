//! Core run types: timing configuration and per-tick records.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{NaiveDateTime, TimeDelta};
use serde::Serialize;

use crate::config::ConfigError;

const SECONDS_PER_DAY: usize = 86_400;

/// Run timing configuration.
///
/// # Examples
///
/// ```
/// use chrono::NaiveDate;
/// use smart_energy::sim::types::RunConfig;
///
/// let start = NaiveDate::from_ymd_opt(2024, 10, 1)
///     .and_then(|d| d.and_hms_opt(0, 0, 0))
///     .unwrap();
/// let cfg = RunConfig::new(start, 24, 2, 42).unwrap();
/// assert_eq!(cfg.dt_hours, 1.0);
/// assert_eq!(cfg.total_steps(), 48);
/// ```
#[derive(Debug, Clone, Serialize)]
pub struct RunConfig {
    /// Timestamp of the first tick.
    pub start: NaiveDateTime,
    /// Decision ticks per day.
    pub steps_per_day: usize,
    /// Number of days to run.
    pub days: usize,
    /// Duration of one tick in hours, derived as `24.0 / steps_per_day`.
    pub dt_hours: f64,
    /// Master random seed for reproducibility.
    pub seed: u64,
}

impl RunConfig {
    /// Creates a new run configuration.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if `days` is zero or `steps_per_day` does not
    /// split the day into whole-second ticks.
    pub fn new(
        start: NaiveDateTime,
        steps_per_day: usize,
        days: usize,
        seed: u64,
    ) -> Result<Self, ConfigError> {
        if steps_per_day == 0 || SECONDS_PER_DAY % steps_per_day != 0 {
            return Err(ConfigError::new(
                "simulation.steps_per_day",
                format!("{steps_per_day} does not divide {SECONDS_PER_DAY}"),
            ));
        }
        if days == 0 {
            return Err(ConfigError::new("simulation.days", "must be > 0"));
        }
        Ok(Self {
            start,
            steps_per_day,
            days,
            dt_hours: 24.0 / steps_per_day as f64,
            seed,
        })
    }

    /// Total number of ticks across all days.
    pub fn total_steps(&self) -> usize {
        self.steps_per_day * self.days
    }

    /// Wall-clock length of one tick.
    pub fn step_duration(&self) -> TimeDelta {
        TimeDelta::seconds((SECONDS_PER_DAY / self.steps_per_day) as i64)
    }
}

/// Complete record of one decision tick.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StepRecord {
    /// Tick index.
    pub timestep: usize,
    /// Evaluation timestamp.
    pub time: NaiveDateTime,
    /// Price per kWh at this tick.
    pub price: f64,
    /// Indoor temperature (°C).
    pub temperature_c: f64,
    pub energy_saving_mode: bool,
    pub temperature_regulation_active: bool,
    pub night_mode: bool,
    /// Usage accumulated today before this tick (kWh).
    pub used_today_kwh: f64,
    /// Usage figure reported by the engine after shedding (kWh).
    pub reported_used_kwh: f64,
    /// Energy metered during this tick (kWh).
    pub consumption_kwh: f64,
    /// Final device states.
    pub device_status: BTreeMap<String, bool>,
    /// Devices shed by the budget layer.
    pub shed_devices: Vec<String>,
}

impl StepRecord {
    /// Names of devices left ON, in name order.
    pub fn devices_on(&self) -> Vec<&str> {
        self.device_status
            .iter()
            .filter(|(_, on)| **on)
            .map(|(name, _)| name.as_str())
            .collect()
    }
}

impl fmt::Display for StepRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mode = |flag: bool, tag: &'static str| if flag { tag } else { "-" };
        write!(
            f,
            "t={:>3} {} | price={:.3} temp={:>5.1}C | {}{}{} | used={:>6.2} kWh \
             reported={:>6.2} +{:.2} | on=[{}] shed=[{}]",
            self.timestep,
            self.time.format("%Y-%m-%d %H:%M"),
            self.price,
            self.temperature_c,
            mode(self.night_mode, "N"),
            mode(self.energy_saving_mode, "S"),
            mode(self.temperature_regulation_active, "T"),
            self.used_today_kwh,
            self.reported_used_kwh,
            self.consumption_kwh,
            self.devices_on().join(","),
            self.shed_devices.join(","),
        )
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    fn midnight() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 10, 1)
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .unwrap()
    }

    #[test]
    fn run_config_quarter_hours() {
        let cfg = RunConfig::new(midnight(), 96, 1, 0).unwrap();
        assert_eq!(cfg.dt_hours, 0.25);
        assert_eq!(cfg.step_duration(), TimeDelta::minutes(15));
        assert_eq!(cfg.total_steps(), 96);
    }

    #[test]
    fn run_config_rejects_zero_steps() {
        let err = RunConfig::new(midnight(), 0, 1, 0).err();
        assert_eq!(
            err.map(|e| e.field),
            Some("simulation.steps_per_day".to_string())
        );
    }

    #[test]
    fn run_config_rejects_uneven_steps() {
        assert!(RunConfig::new(midnight(), 7, 1, 0).is_err());
        assert!(RunConfig::new(midnight(), 1440, 1, 0).is_ok());
    }

    #[test]
    fn run_config_rejects_zero_days() {
        let err = RunConfig::new(midnight(), 24, 0, 0).err();
        assert_eq!(err.map(|e| e.field), Some("simulation.days".to_string()));
    }

    #[test]
    fn step_record_display_lists_devices() {
        let r = StepRecord {
            timestep: 3,
            time: midnight(),
            price: 0.15,
            temperature_c: 19.0,
            energy_saving_mode: false,
            temperature_regulation_active: true,
            night_mode: true,
            used_today_kwh: 4.0,
            reported_used_kwh: 4.0,
            consumption_kwh: 2.2,
            device_status: BTreeMap::from([
                ("Heating".to_string(), true),
                ("Lights".to_string(), false),
            ]),
            shed_devices: Vec::new(),
        };
        let s = format!("{r}");
        assert!(s.contains("on=[Heating]"));
        assert!(s.contains("N-T"));
    }
}
