//! Priority-driven device energy allocation with a day-run simulator.

/// Snapshot evaluation: rule layers, engine, and types.
pub mod alloc;
#[cfg(feature = "api")]
pub mod api;
pub mod config;
pub mod io;
/// Caller loop, profiles, and run summaries.
pub mod sim;
