//! TOML-based scenario configuration and preset definitions.

use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::alloc::{AllocationConfig, PendingSchedule, ShedAccounting, TimeWindow};

const SECONDS_PER_DAY: usize = 86_400;

/// Top-level scenario configuration parsed from TOML.
///
/// All sections have defaults matching the baseline scenario. Load from
/// TOML with [`ScenarioConfig::from_toml_file`] or use
/// [`ScenarioConfig::baseline`] for the built-in default.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScenarioConfig {
    /// Run timing and global parameters.
    #[serde(default)]
    pub simulation: SimulationConfig,
    /// Electricity price profile and saving threshold.
    #[serde(default)]
    pub tariff: TariffConfig,
    /// Indoor temperature profile and comfort band.
    #[serde(default)]
    pub climate: ClimateConfig,
    /// Daily energy budget.
    #[serde(default)]
    pub budget: BudgetConfig,
    /// Allocation engine tuning.
    #[serde(default)]
    pub allocation: AllocationSection,
    /// Controllable devices.
    #[serde(default = "default_devices")]
    pub devices: Vec<DeviceConfig>,
}

/// Run timing and global parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SimulationConfig {
    /// First simulated day, `YYYY-MM-DD`.
    pub start_date: String,
    /// Decision ticks per day (must divide 86400).
    pub steps_per_day: usize,
    /// Number of days to simulate (must be > 0).
    pub days: usize,
    /// Master random seed.
    pub seed: u64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            start_date: "2024-10-01".to_string(),
            steps_per_day: 24,
            days: 1,
            seed: 42,
        }
    }
}

/// Electricity price profile.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TariffConfig {
    /// Off-peak price per kWh.
    pub base_price: f64,
    /// Peak price per kWh.
    pub peak_price: f64,
    /// Peak window start, `HH:MM`.
    pub peak_start: String,
    /// Peak window end (exclusive), `HH:MM`.
    pub peak_end: String,
    /// Price above which energy-saving mode engages.
    pub price_threshold: f64,
    /// Gaussian price noise standard deviation.
    pub noise_std: f64,
}

impl Default for TariffConfig {
    fn default() -> Self {
        Self {
            base_price: 0.15,
            peak_price: 0.28,
            peak_start: "17:00".to_string(),
            peak_end: "21:00".to_string(),
            price_threshold: 0.20,
            noise_std: 0.01,
        }
    }
}

/// Indoor temperature profile and comfort band (°C).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ClimateConfig {
    /// Daily mean temperature.
    pub mean_c: f64,
    /// Half the daily swing.
    pub amplitude_c: f64,
    /// Hour of day with the lowest temperature, in `[0, 24)`.
    pub coldest_hour: f64,
    /// Gaussian temperature noise standard deviation.
    pub noise_std: f64,
    /// Lower bound of the comfort band.
    pub desired_low: f64,
    /// Upper bound of the comfort band.
    pub desired_high: f64,
}

impl Default for ClimateConfig {
    fn default() -> Self {
        Self {
            mean_c: 21.5,
            amplitude_c: 3.0,
            coldest_hour: 5.0,
            noise_std: 0.2,
            desired_low: 20.0,
            desired_high: 24.0,
        }
    }
}

/// Daily energy budget.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BudgetConfig {
    /// Usage limit per calendar day (kWh).
    pub energy_usage_limit_kwh: f64,
}

impl Default for BudgetConfig {
    fn default() -> Self {
        Self {
            energy_usage_limit_kwh: 30.0,
        }
    }
}

/// Allocation engine tuning.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AllocationSection {
    /// Night window start, `HH:MM`.
    pub night_start: String,
    /// Night window end (exclusive), `HH:MM`.
    pub night_end: String,
    /// Usage removed per shed unit.
    pub shed_decrement: f64,
    /// `"per_pass"` or `"per_device"`.
    pub shed_accounting: ShedAccounting,
    /// `"hold_off"` or `"passthrough"`.
    pub pending_schedule: PendingSchedule,
    pub heating_device: String,
    pub cooling_device: String,
}

impl Default for AllocationSection {
    fn default() -> Self {
        let engine = AllocationConfig::default();
        Self {
            night_start: "23:00".to_string(),
            night_end: "06:00".to_string(),
            shed_decrement: engine.shed_decrement,
            shed_accounting: engine.shed_accounting,
            pending_schedule: engine.pending_schedule,
            heating_device: engine.heating_device,
            cooling_device: engine.cooling_device,
        }
    }
}

impl AllocationSection {
    /// Converts the section into engine configuration.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if a window bound is not `HH:MM`.
    pub fn to_engine_config(&self) -> Result<AllocationConfig, ConfigError> {
        let start = parse_time_of_day("allocation.night_start", &self.night_start)?;
        let end = parse_time_of_day("allocation.night_end", &self.night_end)?;
        Ok(AllocationConfig {
            night_window: TimeWindow::from_times(start, end),
            shed_decrement: self.shed_decrement,
            shed_accounting: self.shed_accounting,
            pending_schedule: self.pending_schedule,
            heating_device: self.heating_device.clone(),
            cooling_device: self.cooling_device.clone(),
        })
    }
}

/// One controllable device.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DeviceConfig {
    pub name: String,
    /// 1 = essential. Omit for schedule-only devices.
    #[serde(default)]
    pub priority: Option<i32>,
    /// Draw while ON (kW).
    pub power_kw: f64,
    /// Daily forced-ON times, `HH:MM`.
    #[serde(default)]
    pub schedules: Vec<String>,
}

impl DeviceConfig {
    fn new(name: &str, priority: Option<i32>, power_kw: f64, schedules: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            priority,
            power_kw,
            schedules: schedules.iter().map(ToString::to_string).collect(),
        }
    }
}

fn default_devices() -> Vec<DeviceConfig> {
    vec![
        DeviceConfig::new("Heating", Some(1), 2.0, &[]),
        DeviceConfig::new("Cooling", Some(1), 1.5, &[]),
        DeviceConfig::new("Refrigerator", Some(1), 0.15, &[]),
        DeviceConfig::new("Security", Some(1), 0.05, &[]),
        DeviceConfig::new("Lights", Some(2), 0.3, &[]),
        DeviceConfig::new("Oven", Some(2), 2.5, &["18:00"]),
        DeviceConfig::new("Appliances", Some(3), 0.8, &[]),
        DeviceConfig::new("Dishwasher", None, 1.2, &["21:00"]),
    ]
}

/// Configuration error with field path and constraint description.
#[derive(Debug, Clone, Error)]
#[error("config error: {field}: {message}")]
pub struct ConfigError {
    /// Dotted field path (e.g., `"simulation.steps_per_day"`).
    pub field: String,
    /// Human-readable constraint description.
    pub message: String,
}

impl ConfigError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Parses an `HH:MM` time of day.
///
/// # Errors
///
/// Returns a `ConfigError` naming `field` if `value` is not `HH:MM`.
pub fn parse_time_of_day(field: &str, value: &str) -> Result<NaiveTime, ConfigError> {
    NaiveTime::parse_from_str(value, "%H:%M")
        .map_err(|e| ConfigError::new(field, format!("expected HH:MM, got \"{value}\" ({e})")))
}

impl ScenarioConfig {
    /// Returns the baseline scenario.
    pub fn baseline() -> Self {
        Self {
            simulation: SimulationConfig::default(),
            tariff: TariffConfig::default(),
            climate: ClimateConfig::default(),
            budget: BudgetConfig::default(),
            allocation: AllocationSection::default(),
            devices: default_devices(),
        }
    }

    /// Returns the peak-pricing preset: prices sit above the threshold for most of the day.
    pub fn peak_pricing() -> Self {
        Self {
            tariff: TariffConfig {
                base_price: 0.22,
                peak_price: 0.40,
                peak_start: "16:00".to_string(),
                peak_end: "22:00".to_string(),
                ..TariffConfig::default()
            },
            ..Self::baseline()
        }
    }

    /// Returns the cold-snap preset: low indoor temperatures and a tight budget.
    pub fn cold_snap() -> Self {
        Self {
            climate: ClimateConfig {
                mean_c: 16.0,
                amplitude_c: 4.0,
                ..ClimateConfig::default()
            },
            budget: BudgetConfig {
                energy_usage_limit_kwh: 20.0,
            },
            ..Self::baseline()
        }
    }

    /// Available preset names.
    pub const PRESETS: &[&str] = &["baseline", "peak_pricing", "cold_snap"];

    /// Loads a scenario from a named preset.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the preset name is unknown.
    pub fn from_preset(name: &str) -> Result<Self, ConfigError> {
        match name {
            "baseline" => Ok(Self::baseline()),
            "peak_pricing" => Ok(Self::peak_pricing()),
            "cold_snap" => Ok(Self::cold_snap()),
            _ => Err(ConfigError::new(
                "preset",
                format!(
                    "unknown preset \"{name}\", available: {}",
                    Self::PRESETS.join(", ")
                ),
            )),
        }
    }

    /// Parses a scenario from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the file cannot be read or the TOML is invalid.
    pub fn from_toml_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| {
            ConfigError::new("scenario", format!("cannot read \"{}\": {e}", path.display()))
        })?;
        Self::from_toml_str(&content)
    }

    /// Parses a scenario from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the TOML is invalid or contains unknown fields.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        toml::from_str(s).map_err(|e| ConfigError::new("toml", e.to_string()))
    }

    /// Parses the first simulated day.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if `simulation.start_date` is not `YYYY-MM-DD`.
    pub fn start_date(&self) -> Result<NaiveDate, ConfigError> {
        let raw = &self.simulation.start_date;
        NaiveDate::parse_from_str(raw, "%Y-%m-%d").map_err(|e| {
            ConfigError::new(
                "simulation.start_date",
                format!("expected YYYY-MM-DD, got \"{raw}\" ({e})"),
            )
        })
    }

    /// Validates all fields and returns a list of errors.
    ///
    /// Returns an empty vector if configuration is valid.
    pub fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();

        let s = &self.simulation;
        if s.steps_per_day == 0 {
            errors.push(ConfigError::new("simulation.steps_per_day", "must be > 0"));
        } else if SECONDS_PER_DAY % s.steps_per_day != 0 {
            errors.push(ConfigError::new(
                "simulation.steps_per_day",
                "must divide 86400 so every tick lasts a whole number of seconds",
            ));
        }
        if s.days == 0 {
            errors.push(ConfigError::new("simulation.days", "must be > 0"));
        }
        if let Err(e) = self.start_date() {
            errors.push(e);
        }

        let t = &self.tariff;
        for (field, value) in [
            ("tariff.base_price", t.base_price),
            ("tariff.peak_price", t.peak_price),
            ("tariff.noise_std", t.noise_std),
        ] {
            if !(value.is_finite() && value >= 0.0) {
                errors.push(ConfigError::new(field, "must be a finite value >= 0"));
            }
        }
        if !t.price_threshold.is_finite() {
            errors.push(ConfigError::new("tariff.price_threshold", "must be finite"));
        }
        for (field, value) in [("tariff.peak_start", &t.peak_start), ("tariff.peak_end", &t.peak_end)]
        {
            if let Err(e) = parse_time_of_day(field, value) {
                errors.push(e);
            }
        }

        let c = &self.climate;
        if c.desired_low > c.desired_high {
            errors.push(ConfigError::new(
                "climate.desired_low",
                "must be <= climate.desired_high",
            ));
        }
        if !(0.0..24.0).contains(&c.coldest_hour) {
            errors.push(ConfigError::new("climate.coldest_hour", "must be in [0, 24)"));
        }
        if !(c.noise_std.is_finite() && c.noise_std >= 0.0) {
            errors.push(ConfigError::new("climate.noise_std", "must be a finite value >= 0"));
        }

        let limit = self.budget.energy_usage_limit_kwh;
        if !(limit.is_finite() && limit >= 0.0) {
            errors.push(ConfigError::new(
                "budget.energy_usage_limit_kwh",
                "must be a finite value >= 0",
            ));
        }

        let a = &self.allocation;
        if let Err(e) = a.to_engine_config() {
            errors.push(e);
        }
        if !(a.shed_decrement.is_finite() && a.shed_decrement >= 0.0) {
            errors.push(ConfigError::new(
                "allocation.shed_decrement",
                "must be a finite value >= 0",
            ));
        }

        if self.devices.is_empty() {
            errors.push(ConfigError::new("devices", "at least one device is required"));
        }
        let mut seen = BTreeSet::new();
        for (i, d) in self.devices.iter().enumerate() {
            let path = format!("devices[{i}]");
            if d.name.is_empty() {
                errors.push(ConfigError::new(format!("{path}.name"), "must not be empty"));
            } else if !seen.insert(d.name.as_str()) {
                errors.push(ConfigError::new(
                    format!("{path}.name"),
                    format!("duplicate device \"{}\"", d.name),
                ));
            }
            if let Some(p) = d.priority {
                if p < 1 {
                    errors.push(ConfigError::new(format!("{path}.priority"), "must be >= 1"));
                }
            } else if d.schedules.is_empty() {
                errors.push(ConfigError::new(
                    format!("{path}.schedules"),
                    "a device without priority needs at least one schedule",
                ));
            }
            if !(d.power_kw.is_finite() && d.power_kw >= 0.0) {
                errors.push(ConfigError::new(
                    format!("{path}.power_kw"),
                    "must be a finite value >= 0",
                ));
            }
            for (j, at) in d.schedules.iter().enumerate() {
                if let Err(e) = parse_time_of_day(&format!("{path}.schedules[{j}]"), at) {
                    errors.push(e);
                }
            }
        }

        errors
    }
}
