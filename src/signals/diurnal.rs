use std::f32::consts::PI;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::sim::types::{SimConfig, TimeSeries};

/// A 24-hour sinusoid with additive Gaussian noise.
///
/// `value(h) = base + amplitude * sin((h - phase_shift_hr) * π / 12) + N(0, noise_std)`
///
/// # Examples
///
/// ```
/// use flexkit_sim::signals::diurnal::DiurnalProfile;
/// use flexkit_sim::sim::types::SimConfig;
/// use rand::{SeedableRng, rngs::StdRng};
///
/// let profile = DiurnalProfile::new(100.0, 40.0, 0.0, 18.0);
/// let grid = SimConfig::new(96, 1, 42);
/// let price = profile.generate(&grid, &mut StdRng::seed_from_u64(42));
/// assert_eq!(price.len(), 96);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DiurnalProfile {
    /// Mean level.
    pub base: f32,
    /// Peak deviation from the mean.
    pub amplitude: f32,
    /// Standard deviation of the per-interval Gaussian noise.
    pub noise_std: f32,
    /// Hour at which the sinusoid crosses the mean going up.
    pub phase_shift_hr: f32,
    /// Lower clip bound.
    pub floor: f32,
}

impl DiurnalProfile {
    /// Creates a profile clipped to a non-negative floor.
    pub fn new(base: f32, amplitude: f32, noise_std: f32, phase_shift_hr: f32) -> Self {
        Self {
            base,
            amplitude,
            noise_std,
            phase_shift_hr,
            floor: 0.0,
        }
    }

    /// Noise-free value at `hour`.
    pub fn level_at(&self, hour: f32) -> f32 {
        self.base + self.amplitude * ((hour - self.phase_shift_hr) * PI / 12.0).sin()
    }

    /// Generates one sample per interval of `grid`.
    ///
    /// Noise is the only source of randomness; a zero `noise_std` leaves
    /// `rng` untouched.
    pub fn generate(&self, grid: &SimConfig, rng: &mut impl Rng) -> TimeSeries {
        (0..grid.total_steps())
            .map(|t| {
                let v = self.level_at(grid.hour_of_day(t)) + gaussian_noise(rng, self.noise_std);
                self.clip(v)
            })
            .collect::<Vec<_>>()
            .into()
    }

    fn clip(&self, v: f32) -> f32 {
        v.max(self.floor)
    }
}

/// Gaussian noise via the Box-Muller transform.
pub fn gaussian_noise(rng: &mut impl Rng, std_dev: f32) -> f32 {
    if std_dev <= 0.0 {
        return 0.0;
    }

    let u1: f32 = rng.random::<f32>().clamp(1e-6, 1.0);
    let u2: f32 = rng.random::<f32>();
    let z0 = (-2.0 * u1.ln()).sqrt() * (2.0 * PI * u2).cos();
    z0 * std_dev
}
