use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::sim::types::{SimConfig, TimeSeries};

/// Household demand in four fixed six-hour buckets.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DemandProfile {
    /// 00:00–06:00 demand (kW).
    pub night_kw: f32,
    /// 06:00–12:00 demand (kW).
    pub morning_kw: f32,
    /// 12:00–18:00 demand (kW).
    pub afternoon_kw: f32,
    /// 18:00–24:00 demand (kW).
    pub evening_kw: f32,
}

impl Default for DemandProfile {
    fn default() -> Self {
        Self {
            night_kw: 1.0,
            morning_kw: 2.0,
            afternoon_kw: 3.0,
            evening_kw: 5.0,
        }
    }
}

impl DemandProfile {
    /// No household demand at all.
    pub fn none() -> Self {
        Self {
            night_kw: 0.0,
            morning_kw: 0.0,
            afternoon_kw: 0.0,
            evening_kw: 0.0,
        }
    }

    /// Demand rate for the bucket containing `hour` (0.0..24.0).
    pub fn kw_at(&self, hour: f32) -> f32 {
        if (6.0..12.0).contains(&hour) {
            self.morning_kw
        } else if (12.0..18.0).contains(&hour) {
            self.afternoon_kw
        } else if (18.0..24.0).contains(&hour) {
            self.evening_kw
        } else {
            self.night_kw
        }
    }

    /// Per-interval demand expressed as a fraction of battery capacity.
    ///
    /// `kW × dt_hours / capacity_kwh`
    pub fn soc_fractions(&self, grid: &SimConfig, capacity_kwh: f32) -> TimeSeries {
        (0..grid.total_steps())
            .map(|t| self.kw_at(grid.hour_of_day(t)) * grid.dt_hours / capacity_kwh)
            .collect::<Vec<_>>()
            .into()
    }

    pub fn validate(&self) -> Vec<ConfigError> {
        [
            ("demand.night_kw", self.night_kw),
            ("demand.morning_kw", self.morning_kw),
            ("demand.afternoon_kw", self.afternoon_kw),
            ("demand.evening_kw", self.evening_kw),
        ]
        .into_iter()
        .filter(|(_, kw)| !(kw.is_finite() && *kw >= 0.0))
        .map(|(field, _)| ConfigError::new(field, "must be a finite value >= 0"))
        .collect()
    }
}
