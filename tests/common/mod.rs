//! Shared test fixtures for integration tests.

#![allow(dead_code)]

use flexkit_sim::signals::SignalSet;
use flexkit_sim::sim::{BatteryConfig, DispatchThresholds, RunSettings, SimConfig, TimeSeries};

/// Four-interval grid used by the hand-checked scenarios.
pub fn four_step_grid() -> SimConfig {
    SimConfig::new(4, 1, 42)
}

/// Battery whose per-interval SOC step is exactly 0.1
/// (10 kWh, 2 kW, divisor 2), charging at 95% and discharging losslessly.
pub fn tenth_step_battery() -> BatteryConfig {
    BatteryConfig {
        capacity_kwh: 10.0,
        power_kw: 2.0,
        charge_efficiency: 0.95,
        discharge_efficiency: 1.0,
        passive_discharge: 0.0,
        tariff_threshold: 200.0,
        step_divisor: 2.0,
    }
}

/// Run settings with the standard threshold set.
pub fn settings(battery: BatteryConfig, initial_soc: f32) -> RunSettings {
    RunSettings::new(battery, DispatchThresholds::default(), initial_soc)
}

/// Signal set with the given prices, constant carbon, and no demand.
pub fn flat_signals(prices: &[f32], carbon: f32) -> SignalSet {
    let n = prices.len();
    SignalSet::new(
        TimeSeries::new(prices.to_vec()),
        TimeSeries::constant(carbon, n),
        TimeSeries::constant(0.0, n),
    )
}

/// Price and carbon that swing across every threshold band, with demand.
pub fn swinging_signals(n: usize) -> SignalSet {
    let price: Vec<f32> = (0..n).map(|t| [40.0, 120.0, 260.0, 180.0][t % 4]).collect();
    let carbon: Vec<f32> = (0..n).map(|t| [150.0, 320.0, 450.0, 250.0][t % 4]).collect();
    let demand: Vec<f32> = (0..n).map(|t| if t % 3 == 0 { 0.02 } else { 0.0 }).collect();
    SignalSet::new(price.into(), carbon.into(), demand.into())
}
