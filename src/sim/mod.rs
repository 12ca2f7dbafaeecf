//! Day-run simulation acting as the engine's caller.

/// Tick clock for the decision loop.
pub mod clock;
pub mod fleet;
pub mod kpi;
/// Price and temperature profiles.
pub mod profile;
pub mod runner;
pub mod types;
