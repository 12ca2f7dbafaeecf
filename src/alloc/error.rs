//! Precondition violations detected before evaluation.

use thiserror::Error;

/// The snapshot does not satisfy the engine's preconditions.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SnapshotError {
    #[error("invalid snapshot: desired temperature range is inverted (low {low} > high {high})")]
    InvertedTemperatureRange { low: f64, high: f64 },

    #[error("invalid snapshot: device \"{device}\" has priority {priority}, expected >= 1")]
    InvalidPriority { device: String, priority: i32 },

    #[error("invalid snapshot: {field} must be a finite number")]
    NonFinite { field: &'static str },

    #[error("invalid snapshot: device names must not be empty")]
    EmptyDeviceName,
}
