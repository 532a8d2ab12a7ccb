//! Simulation loop that drives the dispatch policy and the SOC integrator.

use serde::Serialize;
use tracing::{debug, info};

use crate::error::{ConfigError, SimError};
use crate::signals::SignalSet;

use super::battery::{Battery, BatteryConfig};
use super::kpi::Summary;
use super::policy::{Controller, DispatchPolicy, DispatchThresholds, NormalizationBounds, Strategy};
use super::types::{Action, ScheduleRecord, SimConfig, StepInput};

/// Simulation engine owning the battery and controller for one run.
///
/// Generic over `C: Controller` for static dispatch. Signals are borrowed so
/// several engines can share one input set.
pub struct Engine<'a, C: Controller> {
    config: &'a SimConfig,
    battery: Battery,
    controller: C,
    signals: &'a SignalSet,
    regulation_share: Option<f32>,
}

impl<'a, C: Controller> Engine<'a, C> {
    /// Creates a new simulation engine.
    ///
    /// # Arguments
    ///
    /// * `config` - Time grid
    /// * `battery` - Battery at its starting SOC
    /// * `controller` - Dispatch controller
    /// * `signals` - Input series, already shape-checked
    /// * `regulation_share` - Fraction of capacity offered to frequency
    ///   regulation while idle, or `None` when not participating
    pub fn new(
        config: &'a SimConfig,
        battery: Battery,
        controller: C,
        signals: &'a SignalSet,
        regulation_share: Option<f32>,
    ) -> Self {
        Self {
            config,
            battery,
            controller,
            signals,
            regulation_share,
        }
    }

    /// Executes one interval and returns its record.
    ///
    /// # Panics
    ///
    /// Panics if `t` is outside the signal horizon.
    pub fn step(&mut self, t: usize) -> ScheduleRecord {
        let price = self.signals.price[t];
        let carbon = self.signals.carbon[t];
        let demand = self.signals.demand[t];

        let input = StepInput {
            timestep: t,
            price,
            carbon,
            demand,
            soc: self.battery.soc,
        };
        let action = self.controller.dispatch(&input);

        let outcome = self.battery.apply(action, demand);
        let capacity = self.battery.capacity_kwh();
        let energy = outcome.grid_energy_kwh;

        let reg_revenue = match (action, self.regulation_share, &self.signals.regulation_price) {
            (Action::Idle, Some(share), Some(reg_price)) => {
                capacity * share * reg_price[t] * self.config.dt_hours
            }
            _ => 0.0,
        };
        let carbon_offset_kg = if action == Action::Discharge {
            carbon * energy / 1000.0
        } else {
            0.0
        };

        ScheduleRecord {
            timestep: t,
            time_hr: t as f32 * self.config.dt_hours,
            action,
            price,
            carbon,
            demand_kwh: demand * capacity,
            soc_before: outcome.soc_before,
            soc: outcome.soc_after,
            grid_energy_kwh: energy,
            cost: price * energy / 1000.0,
            emissions_kg: carbon * energy / 1000.0,
            reg_revenue,
            carbon_offset_kg,
        }
    }

    /// Executes every interval of the horizon.
    pub fn run(&mut self) -> Vec<ScheduleRecord> {
        let total = self.signals.horizon();
        let mut schedule = Vec::with_capacity(total);
        for t in 0..total {
            schedule.push(self.step(t));
        }
        schedule
    }

    pub fn battery(&self) -> &Battery {
        &self.battery
    }

    pub fn config(&self) -> &SimConfig {
        self.config
    }
}

/// Everything besides the signals and the strategy that a run depends on.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RunSettings {
    pub battery: BatteryConfig,
    pub thresholds: DispatchThresholds,
    /// Starting SOC, in [0, 1]. Always supplied by the caller.
    pub initial_soc: f32,
    /// Regulation capacity share, `None` when not participating.
    pub regulation_share: Option<f32>,
}

impl RunSettings {
    pub fn new(battery: BatteryConfig, thresholds: DispatchThresholds, initial_soc: f32) -> Self {
        Self {
            battery,
            thresholds,
            initial_soc,
            regulation_share: None,
        }
    }

    pub fn with_regulation(mut self, share: f32) -> Self {
        self.regulation_share = Some(share);
        self
    }

    /// Returns every violation across battery, thresholds, and SOC.
    pub fn validate(&self) -> Vec<ConfigError> {
        let mut errors = self.battery.validate();
        errors.extend(self.thresholds.validate());

        if !(0.0..=1.0).contains(&self.initial_soc) {
            errors.push(ConfigError::new(
                "simulation.initial_soc",
                "must be in [0.0, 1.0]",
            ));
        }
        if self
            .regulation_share
            .is_some_and(|share| !(0.0..=1.0).contains(&share))
        {
            errors.push(ConfigError::new(
                "regulation.max_share",
                "must be in [0.0, 1.0]",
            ));
        }
        errors
    }
}

/// Schedule and summary of one strategy over one signal set.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimulationRun {
    pub strategy: Strategy,
    pub schedule: Vec<ScheduleRecord>,
    pub summary: Summary,
}

/// Validates inputs and runs `strategy` over the full horizon.
///
/// Configuration and shape errors are raised before the first interval; a
/// run either completes or does not start.
pub fn simulate(
    grid: &SimConfig,
    signals: &SignalSet,
    settings: &RunSettings,
    strategy: Strategy,
) -> Result<SimulationRun, SimError> {
    let errors = settings.validate();
    if !errors.is_empty() {
        return Err(SimError::Config(errors));
    }
    signals.validate_shape(grid.total_steps())?;
    if settings.regulation_share.is_some() && signals.regulation_price.is_none() {
        return Err(SimError::MissingSeries {
            series: "regulation_price",
        });
    }

    let bounds = NormalizationBounds::from_series(&signals.price, &signals.carbon);
    let policy = DispatchPolicy::new(
        strategy,
        settings.thresholds,
        settings.battery.tariff_threshold,
        bounds,
    );
    let battery = Battery::new(settings.battery, settings.initial_soc);

    let mut engine = Engine::new(grid, battery, policy, signals, settings.regulation_share);
    let schedule = engine.run();
    let summary = Summary::from_schedule(
        &schedule,
        settings.battery.tariff_threshold,
        engine.config().dt_hours,
    );

    debug!(
        strategy = strategy.name(),
        intervals = schedule.len(),
        final_soc = engine.battery().soc,
        "simulation finished"
    );
    info!(
        strategy = strategy.name(),
        cost = summary.total_cost,
        emissions_kg = summary.total_emissions_kg,
        "strategy run complete"
    );

    Ok(SimulationRun {
        strategy,
        schedule,
        summary,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::types::TimeSeries;

    fn lossless_battery() -> BatteryConfig {
        BatteryConfig {
            capacity_kwh: 10.0,
            power_kw: 2.0,
            charge_efficiency: 1.0,
            discharge_efficiency: 1.0,
            passive_discharge: 0.0,
            tariff_threshold: 200.0,
            step_divisor: 2.0,
        }
    }

    fn flat_signals(len: usize, price: f32, carbon: f32) -> SignalSet {
        SignalSet::new(
            TimeSeries::constant(price, len),
            TimeSeries::constant(carbon, len),
            TimeSeries::constant(0.0, len),
        )
    }

    #[test]
    fn engine_runs_every_interval() {
        let grid = SimConfig::new(4, 1, 0);
        let signals = flat_signals(4, 50.0, 300.0);
        let settings = RunSettings::new(lossless_battery(), DispatchThresholds::default(), 0.5);
        let run = simulate(&grid, &signals, &settings, Strategy::PriceArbitrage).unwrap();

        assert_eq!(run.schedule.len(), 4);
        for (t, r) in run.schedule.iter().enumerate() {
            assert_eq!(r.timestep, t);
            assert_eq!(r.time_hr, t as f32 * 6.0);
        }
    }

    #[test]
    fn consecutive_records_chain_soc() {
        let grid = SimConfig::new(8, 1, 0);
        let signals = SignalSet::new(
            TimeSeries::new(vec![50.0, 60.0, 200.0, 210.0, 70.0, 100.0, 180.0, 40.0]),
            TimeSeries::constant(300.0, 8),
            TimeSeries::constant(0.01, 8),
        );
        let settings = RunSettings::new(BatteryConfig::default(), DispatchThresholds::default(), 0.5);
        let run = simulate(&grid, &signals, &settings, Strategy::PriceArbitrage).unwrap();

        for pair in run.schedule.windows(2) {
            assert_eq!(pair[0].soc, pair[1].soc_before);
        }
        assert_eq!(run.schedule[0].soc_before, 0.5);
    }

    #[test]
    fn cost_and_emissions_are_per_mwh_conversions() {
        let grid = SimConfig::new(4, 1, 0);
        let signals = flat_signals(4, 50.0, 300.0);
        let settings = RunSettings::new(lossless_battery(), DispatchThresholds::default(), 0.5);
        let run = simulate(&grid, &signals, &settings, Strategy::PriceArbitrage).unwrap();

        let r = &run.schedule[0];
        assert_eq!(r.action, Action::Charge);
        assert!((r.grid_energy_kwh - 1.0).abs() < 1e-5);
        assert!((r.cost - 0.05).abs() < 1e-6);
        assert!((r.emissions_kg - 0.3).abs() < 1e-6);
    }

    #[test]
    fn invalid_settings_are_rejected_before_running() {
        let grid = SimConfig::new(4, 1, 0);
        let signals = flat_signals(4, 50.0, 300.0);
        let settings = RunSettings::new(
            BatteryConfig {
                capacity_kwh: 0.0,
                ..BatteryConfig::default()
            },
            DispatchThresholds::default(),
            1.5,
        );
        match simulate(&grid, &signals, &settings, Strategy::Blended) {
            Err(SimError::Config(errors)) => {
                let fields: Vec<&str> = errors.iter().map(|e| e.field.as_str()).collect();
                assert!(fields.contains(&"battery.capacity_kwh"));
                assert!(fields.contains(&"simulation.initial_soc"));
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn horizon_mismatch_is_a_shape_error() {
        let grid = SimConfig::new(96, 1, 0);
        let signals = flat_signals(4, 50.0, 300.0);
        let settings = RunSettings::new(lossless_battery(), DispatchThresholds::default(), 0.5);
        assert!(matches!(
            simulate(&grid, &signals, &settings, Strategy::Blended),
            Err(SimError::LengthMismatch { series: "price", .. })
        ));
    }

    #[test]
    fn regulation_without_price_series_is_rejected() {
        let grid = SimConfig::new(4, 1, 0);
        let signals = flat_signals(4, 100.0, 300.0);
        let settings = RunSettings::new(lossless_battery(), DispatchThresholds::default(), 0.5)
            .with_regulation(0.1);
        assert!(matches!(
            simulate(&grid, &signals, &settings, Strategy::PriceArbitrage),
            Err(SimError::MissingSeries {
                series: "regulation_price"
            })
        ));
    }

    #[test]
    fn regulation_revenue_only_on_idle_intervals() {
        let grid = SimConfig::new(4, 1, 0);
        let signals = SignalSet::new(
            TimeSeries::new(vec![100.0, 50.0, 100.0, 200.0]),
            TimeSeries::constant(300.0, 4),
            TimeSeries::constant(0.0, 4),
        )
        .with_regulation_price(TimeSeries::constant(0.5, 4));
        let settings = RunSettings::new(lossless_battery(), DispatchThresholds::default(), 0.5)
            .with_regulation(0.1);
        let run = simulate(&grid, &signals, &settings, Strategy::PriceArbitrage).unwrap();

        let actions: Vec<Action> = run.schedule.iter().map(|r| r.action).collect();
        assert_eq!(
            actions,
            vec![Action::Idle, Action::Charge, Action::Idle, Action::Discharge]
        );
        // 10 kWh * 0.1 * 0.5 * 6 h
        assert!((run.schedule[0].reg_revenue - 3.0).abs() < 1e-5);
        assert_eq!(run.schedule[1].reg_revenue, 0.0);
        assert_eq!(run.schedule[3].reg_revenue, 0.0);
        assert!((run.summary.total_reg_revenue - 6.0).abs() < 1e-5);
    }

    #[test]
    fn discharge_records_carbon_offset() {
        let grid = SimConfig::new(4, 1, 0);
        let signals = flat_signals(4, 300.0, 450.0);
        let settings = RunSettings::new(lossless_battery(), DispatchThresholds::default(), 0.9);
        let run = simulate(&grid, &signals, &settings, Strategy::CarbonMinimizer).unwrap();

        let first = &run.schedule[0];
        assert_eq!(first.action, Action::Discharge);
        assert!((first.carbon_offset_kg - 450.0 * first.grid_energy_kwh / 1000.0).abs() < 1e-6);
        assert!(run.summary.total_carbon_offset_kg > 0.0);
    }
}
