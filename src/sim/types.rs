//! Core simulation types: time grid, input series, actions, and schedule records.

use std::fmt;
use std::ops::Deref;

use serde::Serialize;

/// Centralized time-grid configuration.
///
/// Every signal, the SOC integrator, and the engine reference this struct
/// for timing, so `dt_hours` is derived in exactly one place.
///
/// # Examples
///
/// ```
/// use flexkit_sim::sim::types::SimConfig;
///
/// let cfg = SimConfig::new(96, 1, 42);
/// assert_eq!(cfg.dt_hours, 0.25);
/// assert_eq!(cfg.total_steps(), 96);
/// ```
#[derive(Debug, Clone, Serialize)]
pub struct SimConfig {
    /// Number of intervals per day.
    pub steps_per_day: usize,
    /// Number of days in the horizon.
    pub days: usize,
    /// Duration of one interval in hours, derived as `24.0 / steps_per_day`.
    pub dt_hours: f32,
    /// Master random seed for the synthetic signals.
    pub seed: u64,
}

impl SimConfig {
    /// Creates a new time-grid configuration.
    ///
    /// # Panics
    ///
    /// Panics if `steps_per_day` or `days` is zero, or if their product
    /// overflows `usize`. Scenario validation rejects all three before a
    /// `SimConfig` is built.
    pub fn new(steps_per_day: usize, days: usize, seed: u64) -> Self {
        assert!(steps_per_day > 0, "steps_per_day must be > 0");
        assert!(days > 0, "days must be > 0");
        assert!(
            steps_per_day.checked_mul(days).is_some(),
            "steps_per_day × days overflows usize"
        );
        Self {
            steps_per_day,
            days,
            dt_hours: 24.0 / steps_per_day as f32,
            seed,
        }
    }

    /// Total number of intervals across all days.
    pub fn total_steps(&self) -> usize {
        self.steps_per_day * self.days
    }

    /// Hour of day (`0.0..24.0`) at the start of interval `t`.
    pub fn hour_of_day(&self, t: usize) -> f32 {
        (t % self.steps_per_day) as f32 * self.dt_hours
    }

    /// Horizon length in hours.
    pub fn horizon_hours(&self) -> f32 {
        self.total_steps() as f32 * self.dt_hours
    }
}

/// Ordered, fixed-length sequence of per-interval samples.
///
/// The index is the only time key: no gaps, no timestamps, no reordering.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct TimeSeries(Vec<f32>);

impl TimeSeries {
    pub fn new(values: Vec<f32>) -> Self {
        Self(values)
    }

    /// A series holding `value` at every one of `len` intervals.
    pub fn constant(value: f32, len: usize) -> Self {
        Self(vec![value; len])
    }

    pub fn values(&self) -> &[f32] {
        &self.0
    }

    /// Smallest sample, or `None` for an empty series.
    pub fn min(&self) -> Option<f32> {
        self.0.iter().copied().reduce(f32::min)
    }

    /// Largest sample, or `None` for an empty series.
    pub fn max(&self) -> Option<f32> {
        self.0.iter().copied().reduce(f32::max)
    }

    /// Clamps every sample into `[lo, hi]`.
    pub fn clamped(mut self, lo: f32, hi: f32) -> Self {
        for v in &mut self.0 {
            *v = v.clamp(lo, hi);
        }
        self
    }

}

impl From<Vec<f32>> for TimeSeries {
    fn from(values: Vec<f32>) -> Self {
        Self(values)
    }
}

impl Deref for TimeSeries {
    type Target = [f32];

    fn deref(&self) -> &[f32] {
        &self.0
    }
}

/// Battery action chosen for one interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    Charge,
    Discharge,
    Idle,
}

impl Action {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Charge => "charge",
            Self::Discharge => "discharge",
            Self::Idle => "idle",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// Signals and battery state handed to the controller for one interval.
#[derive(Debug, Clone, Copy)]
pub struct StepInput {
    /// Interval index.
    pub timestep: usize,
    /// Electricity price (currency/MWh).
    pub price: f32,
    /// Carbon intensity (gCO2/kWh).
    pub carbon: f32,
    /// User demand draw for this interval (fraction of capacity).
    pub demand: f32,
    /// State of charge before this interval (0.0 to 1.0).
    pub soc: f32,
}

/// Complete record of one simulated interval.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScheduleRecord {
    /// Interval index.
    pub timestep: usize,
    /// Interval start in hours since the beginning of the horizon.
    pub time_hr: f32,
    /// Action chosen by the dispatch policy.
    pub action: Action,
    /// Price during the interval (currency/MWh).
    pub price: f32,
    /// Carbon intensity during the interval (gCO2/kWh).
    pub carbon: f32,
    /// User demand served during the interval (kWh).
    pub demand_kwh: f32,
    /// SOC before the update.
    pub soc_before: f32,
    /// SOC after the update.
    pub soc: f32,
    /// Battery-side energy movement, `|ΔSOC| × capacity` (kWh).
    pub grid_energy_kwh: f32,
    /// `price × grid_energy / 1000` (currency).
    pub cost: f32,
    /// `carbon × grid_energy / 1000` (kg CO2).
    pub emissions_kg: f32,
    /// Frequency-regulation revenue earned while idle (currency).
    pub reg_revenue: f32,
    /// CO2 displaced by discharging (kg).
    pub carbon_offset_kg: f32,
}

impl ScheduleRecord {
    /// Wall-clock label `HH:MM` for the interval start.
    pub fn clock_label(&self) -> String {
        let minutes = (self.time_hr * 60.0).round() as u32 % (24 * 60);
        format!("{:02}:{:02}", minutes / 60, minutes % 60)
    }
}

impl fmt::Display for ScheduleRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "t={:>3} ({}) | {:<9} | price={:>7.2}  carbon={:>6.1} | \
             demand={:.2} kWh  grid={:.2} kWh | SoC {:.1}% -> {:.1}%",
            self.timestep,
            self.clock_label(),
            self.action,
            self.price,
            self.carbon,
            self.demand_kwh,
            self.grid_energy_kwh,
            self.soc_before * 100.0,
            self.soc * 100.0,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sim_config_reference_horizon() {
        let cfg = SimConfig::new(96, 1, 42);
        assert_eq!(cfg.steps_per_day, 96);
        assert_eq!(cfg.dt_hours, 0.25);
        assert_eq!(cfg.total_steps(), 96);
        assert_eq!(cfg.horizon_hours(), 24.0);
    }

    #[test]
    fn sim_config_hour_of_day_wraps() {
        let cfg = SimConfig::new(96, 2, 0);
        assert_eq!(cfg.hour_of_day(4), 1.0);
        assert_eq!(cfg.hour_of_day(96 + 4), 1.0);
    }

    #[test]
    #[should_panic]
    fn sim_config_zero_steps_panics() {
        SimConfig::new(0, 1, 0);
    }

    #[test]
    #[should_panic(expected = "overflows")]
    fn sim_config_overflowing_horizon_panics() {
        SimConfig::new(usize::MAX / 2 + 1, 2, 0);
    }

    #[test]
    fn time_series_bounds() {
        let s = TimeSeries::new(vec![3.0, -1.0, 7.5]);
        assert_eq!(s.min(), Some(-1.0));
        assert_eq!(s.max(), Some(7.5));
        assert_eq!(TimeSeries::default().min(), None);
    }

    #[test]
    fn time_series_clamp() {
        let s = TimeSeries::new(vec![50.0, 300.0, 900.0]).clamped(100.0, 500.0);
        assert_eq!(s.values(), &[100.0, 300.0, 500.0]);
    }

    #[test]
    fn clock_label_formats_quarter_hours() {
        let r = ScheduleRecord {
            timestep: 70,
            time_hr: 17.5,
            action: Action::Idle,
            price: 0.0,
            carbon: 0.0,
            demand_kwh: 0.0,
            soc_before: 0.5,
            soc: 0.5,
            grid_energy_kwh: 0.0,
            cost: 0.0,
            emissions_kg: 0.0,
            reg_revenue: 0.0,
            carbon_offset_kg: 0.0,
        };
        assert_eq!(r.clock_label(), "17:30");
        assert!(!format!("{r}").is_empty());
    }
}
