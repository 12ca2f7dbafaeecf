//! Day runner: drives the allocation engine once per tick and owns the
//! daily usage accumulator.

use chrono::{NaiveDate, NaiveTime};
use tracing::{debug, info};

use crate::alloc::{AllocationEngine, Snapshot, SnapshotError, TemperatureRange, TimeWindow};
use crate::config::{ConfigError, ScenarioConfig, parse_time_of_day};

use super::clock::{Clock, Tick};
use super::fleet::{Fleet, FleetDevice};
use super::profile::{ClimateProfile, TariffProfile};
use super::types::{RunConfig, StepRecord};

/// Seed offset for the climate RNG to avoid correlation with the tariff.
const CLIMATE_SEED_OFFSET: u64 = 57;

/// Household targets the runner puts into every snapshot.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HouseholdPolicy {
    pub price_threshold: f64,
    pub desired_range: TemperatureRange,
    /// Daily usage limit (kWh).
    pub energy_usage_limit_kwh: f64,
}

/// Caller loop around the [`AllocationEngine`].
///
/// Builds a snapshot per tick from the profiles, the fleet and today's
/// accumulated usage, evaluates it, then meters what the ON devices drew.
/// The accumulator resets when the calendar day changes.
pub struct DayRunner {
    run: RunConfig,
    engine: AllocationEngine,
    fleet: Fleet,
    tariff: TariffProfile,
    climate: ClimateProfile,
    policy: HouseholdPolicy,
    used_today_kwh: f64,
    current_day: Option<NaiveDate>,
}

impl DayRunner {
    pub fn new(
        run: RunConfig,
        engine: AllocationEngine,
        fleet: Fleet,
        tariff: TariffProfile,
        climate: ClimateProfile,
        policy: HouseholdPolicy,
    ) -> Self {
        Self {
            run,
            engine,
            fleet,
            tariff,
            climate,
            policy,
            used_today_kwh: 0.0,
            current_day: None,
        }
    }

    /// Builds a runner from a scenario.
    ///
    /// # Errors
    ///
    /// Returns the first `ConfigError` met while converting the scenario.
    /// Call [`ScenarioConfig::validate`] first for a complete report.
    pub fn from_scenario(cfg: &ScenarioConfig) -> Result<Self, ConfigError> {
        let s = &cfg.simulation;
        let start = cfg.start_date()?.and_time(NaiveTime::MIN);
        let run = RunConfig::new(start, s.steps_per_day, s.days, s.seed)?;

        let mut devices = Vec::with_capacity(cfg.devices.len());
        for (i, d) in cfg.devices.iter().enumerate() {
            let mut device = FleetDevice::new(d.name.clone(), d.priority, d.power_kw);
            for (j, at) in d.schedules.iter().enumerate() {
                device = device.with_schedule(parse_time_of_day(
                    &format!("devices[{i}].schedules[{j}]"),
                    at,
                )?);
            }
            devices.push(device);
        }

        let t = &cfg.tariff;
        let peak = TimeWindow::from_times(
            parse_time_of_day("tariff.peak_start", &t.peak_start)?,
            parse_time_of_day("tariff.peak_end", &t.peak_end)?,
        );
        let tariff = TariffProfile::new(t.base_price, t.peak_price, peak, t.noise_std, s.seed);

        let c = &cfg.climate;
        let climate = ClimateProfile::new(
            c.mean_c,
            c.amplitude_c,
            c.coldest_hour,
            c.noise_std,
            s.seed.wrapping_add(CLIMATE_SEED_OFFSET),
        );

        let policy = HouseholdPolicy {
            price_threshold: t.price_threshold,
            desired_range: TemperatureRange::new(c.desired_low, c.desired_high),
            energy_usage_limit_kwh: cfg.budget.energy_usage_limit_kwh,
        };

        let engine = AllocationEngine::new(cfg.allocation.to_engine_config()?);

        Ok(Self::new(run, engine, Fleet::new(devices), tariff, climate, policy))
    }

    /// Evaluates one tick and meters its consumption.
    ///
    /// # Errors
    ///
    /// Returns a `SnapshotError` if the generated snapshot is invalid.
    pub fn step(&mut self, tick: Tick) -> Result<StepRecord, SnapshotError> {
        let date = tick.time.date();
        if self.current_day != Some(date) {
            if self.current_day.is_some() {
                info!(%date, previous_kwh = self.used_today_kwh, "new day, usage reset");
            }
            self.current_day = Some(date);
            self.used_today_kwh = 0.0;
        }

        let snapshot = Snapshot {
            current_price: self.tariff.price_at(tick.time),
            price_threshold: self.policy.price_threshold,
            device_priorities: self.fleet.priorities(),
            current_time: tick.time,
            current_temperature: self.climate.temperature_at(tick.time),
            desired_temperature_range: self.policy.desired_range,
            energy_usage_limit: self.policy.energy_usage_limit_kwh,
            total_energy_used_today: self.used_today_kwh,
            scheduled_devices: self.fleet.schedules_on(date),
        };

        let allocation = self.engine.evaluate(&snapshot)?;
        let consumption_kwh = self
            .fleet
            .consumption_kwh(&allocation.device_status, self.run.dt_hours);
        let used_before = self.used_today_kwh;
        self.used_today_kwh += consumption_kwh;

        debug!(
            timestep = tick.index,
            time = %tick.time,
            consumption_kwh,
            used_today_kwh = self.used_today_kwh,
            "tick metered"
        );

        Ok(StepRecord {
            timestep: tick.index,
            time: tick.time,
            price: snapshot.current_price,
            temperature_c: snapshot.current_temperature,
            energy_saving_mode: allocation.energy_saving_mode,
            temperature_regulation_active: allocation.temperature_regulation_active,
            night_mode: allocation.night_mode,
            used_today_kwh: used_before,
            reported_used_kwh: allocation.total_energy_used,
            consumption_kwh,
            device_status: allocation.device_status,
            shed_devices: allocation.shed_devices,
        })
    }

    /// Executes every tick and returns the complete record vector.
    ///
    /// # Errors
    ///
    /// Stops at the first tick whose snapshot is invalid.
    pub fn run(&mut self) -> Result<Vec<StepRecord>, SnapshotError> {
        let clock = Clock::new(self.run.start, self.run.step_duration(), self.run.total_steps());
        let engine = self.engine.config();
        info!(
            start = %self.run.start,
            ticks = self.run.total_steps(),
            devices = self.fleet.devices().len(),
            shed_accounting = ?engine.shed_accounting,
            pending_schedule = ?engine.pending_schedule,
            "starting run"
        );
        let records = clock
            .map(|tick| self.step(tick))
            .collect::<Result<Vec<_>, _>>()?;
        info!(ticks = records.len(), "run finished");
        Ok(records)
    }

    pub fn run_config(&self) -> &RunConfig {
        &self.run
    }

    pub fn fleet(&self) -> &Fleet {
        &self.fleet
    }

    pub fn engine(&self) -> &AllocationEngine {
        &self.engine
    }

    /// Usage metered so far on the current day (kWh).
    pub fn used_today_kwh(&self) -> f64 {
        self.used_today_kwh
    }
}
