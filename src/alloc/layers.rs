//! Rule layers of the allocation pipeline.
//!
//! Each layer is a pure function from the partially decided state to the
//! updated state. [`PIPELINE`] fixes their order; a later layer wins over an
//! earlier one for the same device.

use std::collections::BTreeMap;

use tracing::{debug, info};

use super::engine::{AllocationConfig, PendingSchedule, ShedAccounting};
use super::types::{Allocation, ESSENTIAL_PRIORITY, Snapshot, ThermalDemand};

/// Read-only inputs shared by every layer.
pub struct LayerContext<'a> {
    pub snapshot: &'a Snapshot,
    pub config: &'a AllocationConfig,
}

/// Partially decided allocation threaded through the pipeline.
#[derive(Debug, Clone, PartialEq)]
pub struct Decision {
    pub status: BTreeMap<String, bool>,
    pub energy_saving_mode: bool,
    pub temperature_regulation_active: bool,
    pub night_mode: bool,
    /// Usage figure adjusted by budget shedding.
    pub remaining_usage: f64,
    /// Devices shed so far, in shedding order.
    pub shed: Vec<String>,
}

impl Decision {
    pub fn new(total_energy_used_today: f64) -> Self {
        Self {
            status: BTreeMap::new(),
            energy_saving_mode: false,
            temperature_regulation_active: false,
            night_mode: false,
            remaining_usage: total_energy_used_today,
            shed: Vec::new(),
        }
    }

    pub fn into_allocation(self) -> Allocation {
        Allocation {
            energy_saving_mode: self.energy_saving_mode,
            temperature_regulation_active: self.temperature_regulation_active,
            night_mode: self.night_mode,
            device_status: self.status,
            total_energy_used: self.remaining_usage,
            shed_devices: self.shed,
        }
    }
}

pub type Layer = fn(&LayerContext<'_>, Decision) -> Decision;

/// Layers in precedence order, lowest first.
pub const PIPELINE: [(&str, Layer); 6] = [
    ("baseline", baseline),
    ("night_mode", night_mode),
    ("temperature_regulation", temperature_regulation),
    ("energy_saving", energy_saving),
    ("budget_shedding", budget_shedding),
    ("schedule_override", schedule_override),
];

/// Prioritised devices start ON, schedule-only devices start OFF.
pub fn baseline(ctx: &LayerContext<'_>, mut decision: Decision) -> Decision {
    let snapshot = ctx.snapshot;
    decision.status = snapshot
        .known_devices()
        .into_iter()
        .map(|name| (name.to_string(), snapshot.priority_of(name).is_some()))
        .collect();
    decision
}

pub fn night_mode(ctx: &LayerContext<'_>, mut decision: Decision) -> Decision {
    let time = ctx.snapshot.current_time.time();
    if !ctx.config.night_window.contains(time) {
        return decision;
    }
    decision.night_mode = true;
    force_off_non_essential(ctx.snapshot, &mut decision.status);
    decision
}

/// Drives the configured heating/cooling devices when outside the comfort band.
pub fn temperature_regulation(ctx: &LayerContext<'_>, mut decision: Decision) -> Decision {
    let snapshot = ctx.snapshot;
    let demand = snapshot
        .desired_temperature_range
        .demand_for(snapshot.current_temperature);

    let Some(demand) = demand else {
        decision.temperature_regulation_active = false;
        return decision;
    };

    decision.temperature_regulation_active = true;
    let heating_on = demand == ThermalDemand::Heat;
    set_if_known(&mut decision.status, &ctx.config.heating_device, heating_on);
    set_if_known(&mut decision.status, &ctx.config.cooling_device, !heating_on);
    debug!(
        temperature = snapshot.current_temperature,
        ?demand,
        "temperature regulation active"
    );
    decision
}

pub fn energy_saving(ctx: &LayerContext<'_>, mut decision: Decision) -> Decision {
    let snapshot = ctx.snapshot;
    decision.energy_saving_mode = snapshot.current_price > snapshot.price_threshold;
    if decision.energy_saving_mode {
        force_off_non_essential(snapshot, &mut decision.status);
    }
    decision
}

/// Sheds non-essential tiers, least essential first, while over budget.
///
/// The budget is re-checked before every tier, so the loop stops as soon as
/// the charged decrements bring usage within the limit or no tier is left.
pub fn budget_shedding(ctx: &LayerContext<'_>, mut decision: Decision) -> Decision {
    let snapshot = ctx.snapshot;
    let limit = snapshot.energy_usage_limit;
    if decision.remaining_usage <= limit {
        return decision;
    }

    let mut tiers: BTreeMap<i32, Vec<String>> = BTreeMap::new();
    for (name, on) in &decision.status {
        if let Some(priority) = snapshot.priority_of(name) {
            if *on && priority > ESSENTIAL_PRIORITY {
                tiers.entry(priority).or_default().push(name.clone());
            }
        }
    }

    let decrement = ctx.config.shed_decrement;
    let accounting = ctx.config.shed_accounting;
    let before = decision.remaining_usage;
    let mut shed_in_pass = 0usize;

    for (priority, devices) in tiers.into_iter().rev() {
        if decision.remaining_usage <= limit {
            break;
        }
        debug!(priority, devices = ?devices, "shedding priority tier");
        if accounting == ShedAccounting::PerPass && shed_in_pass == 0 {
            decision.remaining_usage -= decrement;
        }
        for name in devices {
            if let Some(on) = decision.status.get_mut(&name) {
                *on = false;
            }
            if accounting == ShedAccounting::PerDevice {
                decision.remaining_usage -= decrement;
            }
            decision.shed.push(name);
            shed_in_pass += 1;
        }
    }

    if shed_in_pass > 0 {
        info!(
            limit,
            before,
            after = decision.remaining_usage,
            shed = shed_in_pass,
            "usage over budget, shed non-essential devices"
        );
    }
    decision
}

/// Due schedules force their device ON; pending ones follow the configured policy.
pub fn schedule_override(ctx: &LayerContext<'_>, mut decision: Decision) -> Decision {
    let now = ctx.snapshot.current_time;

    let mut due: BTreeMap<&str, bool> = BTreeMap::new();
    for schedule in &ctx.snapshot.scheduled_devices {
        *due.entry(schedule.device_name.as_str()).or_insert(false) |= schedule.is_due(now);
    }

    for (name, is_due) in due {
        let on = decision.status.entry(name.to_string()).or_insert(false);
        if is_due {
            *on = true;
        } else if ctx.config.pending_schedule == PendingSchedule::HoldOff {
            *on = false;
        }
    }
    decision
}

fn force_off_non_essential(snapshot: &Snapshot, status: &mut BTreeMap<String, bool>) {
    for (name, on) in status.iter_mut() {
        if snapshot.priority_of(name) != Some(ESSENTIAL_PRIORITY) {
            *on = false;
        }
    }
}

fn set_if_known(status: &mut BTreeMap<String, bool>, device: &str, on: bool) {
    if let Some(current) = status.get_mut(device) {
        *current = on;
    }
}
