//! Allocation engine: validates a snapshot and runs the layer pipeline.

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use super::error::SnapshotError;
use super::layers::{Decision, LayerContext, PIPELINE};
use super::types::{Allocation, Snapshot};
use super::window::TimeWindow;

/// Usage removed per shed unit unless configured otherwise.
pub const DEFAULT_SHED_DECREMENT: f64 = 2.0;

/// How budget shedding charges the usage decrement.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShedAccounting {
    /// One decrement per shed device.
    #[default]
    PerDevice,
    /// A single decrement for the whole pass, charged with the first tier.
    PerPass,
}

/// Treatment of a schedule whose time has not arrived yet.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PendingSchedule {
    /// Keep the device OFF until its slot.
    #[default]
    HoldOff,
    /// Leave the status decided by the earlier layers.
    Passthrough,
}

/// Tunables for the allocation pipeline.
#[derive(Debug, Clone, PartialEq)]
pub struct AllocationConfig {
    /// Window in which only essential devices run.
    pub night_window: TimeWindow,
    /// Usage removed per shed unit.
    pub shed_decrement: f64,
    pub shed_accounting: ShedAccounting,
    pub pending_schedule: PendingSchedule,
    /// Device switched ON when too cold.
    pub heating_device: String,
    /// Device switched ON when too warm.
    pub cooling_device: String,
}

impl Default for AllocationConfig {
    fn default() -> Self {
        Self {
            night_window: TimeWindow::NIGHT,
            shed_decrement: DEFAULT_SHED_DECREMENT,
            shed_accounting: ShedAccounting::default(),
            pending_schedule: PendingSchedule::default(),
            heating_device: "Heating".to_string(),
            cooling_device: "Cooling".to_string(),
        }
    }
}

/// Stateless evaluator mapping a [`Snapshot`] to an [`Allocation`].
///
/// The engine holds only configuration, so a single instance can be shared
/// across threads and reused for every decision tick.
///
/// # Examples
///
/// ```
/// use std::collections::BTreeMap;
///
/// use chrono::NaiveDate;
/// use smart_energy::alloc::{AllocationEngine, Snapshot, TemperatureRange};
///
/// let snapshot = Snapshot {
///     current_price: 0.25,
///     price_threshold: 0.20,
///     device_priorities: BTreeMap::from([
///         ("Heating".to_string(), 1),
///         ("Lights".to_string(), 2),
///     ]),
///     current_time: NaiveDate::from_ymd_opt(2024, 10, 1)
///         .and_then(|d| d.and_hms_opt(12, 0, 0))
///         .unwrap(),
///     current_temperature: 22.0,
///     desired_temperature_range: TemperatureRange::new(20.0, 24.0),
///     energy_usage_limit: 30.0,
///     total_energy_used_today: 25.0,
///     scheduled_devices: Vec::new(),
/// };
///
/// let allocation = AllocationEngine::default().evaluate(&snapshot).unwrap();
/// assert!(allocation.energy_saving_mode);
/// assert_eq!(allocation.is_on("Heating"), Some(true));
/// assert_eq!(allocation.is_on("Lights"), Some(false));
/// ```
#[derive(Debug, Clone, Default)]
pub struct AllocationEngine {
    config: AllocationConfig,
}

impl AllocationEngine {
    pub fn new(config: AllocationConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AllocationConfig {
        &self.config
    }

    /// Validates `snapshot` and evaluates it.
    ///
    /// # Errors
    ///
    /// Returns a [`SnapshotError`] if the snapshot violates a precondition.
    pub fn evaluate(&self, snapshot: &Snapshot) -> Result<Allocation, SnapshotError> {
        snapshot.validate()?;
        Ok(self.evaluate_unchecked(snapshot))
    }

    /// Evaluates `snapshot` without validation.
    ///
    /// Best effort for malformed input: an inverted temperature range
    /// reports regulation with heating precedence, non-positive priorities
    /// count as non-essential.
    pub fn evaluate_unchecked(&self, snapshot: &Snapshot) -> Allocation {
        let ctx = LayerContext {
            snapshot,
            config: &self.config,
        };

        let mut decision = Decision::new(snapshot.total_energy_used_today);
        for (name, layer) in PIPELINE {
            decision = layer(&ctx, decision);
            trace!(layer = name, status = ?decision.status, "layer applied");
        }

        debug!(
            time = %snapshot.current_time,
            energy_saving = decision.energy_saving_mode,
            regulation = decision.temperature_regulation_active,
            night = decision.night_mode,
            shed = decision.shed.len(),
            total_energy_used = decision.remaining_usage,
            "allocation evaluated"
        );

        decision.into_allocation()
    }
}
