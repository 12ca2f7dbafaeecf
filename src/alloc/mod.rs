//! Priority-driven device allocation.
//!
//! A [`Snapshot`] of price, time, temperature, priorities, schedules and
//! usage is evaluated by the [`AllocationEngine`] into an [`Allocation`]:
//! one ON/OFF decision per known device plus the derived flags.

pub mod engine;
pub mod error;
/// Ordered rule layers applied by the engine.
pub mod layers;
pub mod types;
/// Daily time-of-day windows.
pub mod window;

pub use engine::{AllocationConfig, AllocationEngine, PendingSchedule, ShedAccounting};
pub use error::SnapshotError;
pub use types::{
    Allocation, DeviceSchedule, ESSENTIAL_PRIORITY, Snapshot, TemperatureRange, ThermalDemand,
};
pub use window::TimeWindow;

/// Evaluates `snapshot` with the default engine configuration.
///
/// # Errors
///
/// Returns a [`SnapshotError`] if the snapshot violates a precondition.
pub fn evaluate(snapshot: &Snapshot) -> Result<Allocation, SnapshotError> {
    AllocationEngine::default().evaluate(snapshot)
}
