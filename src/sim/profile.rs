//! Seeded price and temperature profiles feeding the run.

use chrono::{NaiveDateTime, Timelike};
use rand::{Rng, SeedableRng, rngs::StdRng};

use crate::alloc::TimeWindow;

/// Generates Gaussian noise using the Box-Muller transform.
///
/// Returns `0.0` without drawing when `std_dev <= 0`.
pub fn gaussian_noise(rng: &mut StdRng, std_dev: f64) -> f64 {
    if std_dev <= 0.0 {
        return 0.0;
    }

    let u1: f64 = rng.random::<f64>().clamp(1e-9, 1.0);
    let u2: f64 = rng.random::<f64>();
    let z0 = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
    z0 * std_dev
}

/// Two-level time-of-use tariff with noise.
#[derive(Debug, Clone)]
pub struct TariffProfile {
    base_price: f64,
    peak_price: f64,
    peak: TimeWindow,
    noise_std: f64,
    rng: StdRng,
}

impl TariffProfile {
    pub fn new(base_price: f64, peak_price: f64, peak: TimeWindow, noise_std: f64, seed: u64) -> Self {
        Self {
            base_price,
            peak_price,
            peak,
            noise_std,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Price per kWh at `time`, never negative.
    pub fn price_at(&mut self, time: NaiveDateTime) -> f64 {
        let level = if self.peak.contains(time.time()) {
            self.peak_price
        } else {
            self.base_price
        };
        (level + gaussian_noise(&mut self.rng, self.noise_std)).max(0.0)
    }
}

/// Sinusoidal daily indoor temperature with noise.
///
/// `T(h) = mean - amplitude * cos(2π (h - coldest_hour) / 24) + noise`
#[derive(Debug, Clone)]
pub struct ClimateProfile {
    mean_c: f64,
    amplitude_c: f64,
    coldest_hour: f64,
    noise_std: f64,
    rng: StdRng,
}

impl ClimateProfile {
    pub fn new(mean_c: f64, amplitude_c: f64, coldest_hour: f64, noise_std: f64, seed: u64) -> Self {
        Self {
            mean_c,
            amplitude_c,
            coldest_hour,
            noise_std,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Temperature (°C) at `time`.
    pub fn temperature_at(&mut self, time: NaiveDateTime) -> f64 {
        let hour = f64::from(time.hour()) + f64::from(time.minute()) / 60.0;
        let phase = 2.0 * std::f64::consts::PI * (hour - self.coldest_hour) / 24.0;
        self.mean_c - self.amplitude_c * phase.cos() + gaussian_noise(&mut self.rng, self.noise_std)
    }
}
