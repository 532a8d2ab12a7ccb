use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::sim::types::Action;

/// Immutable battery parameters.
///
/// Deserialized directly from the `[battery]` scenario section. All fields
/// default to the reference residential battery.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BatteryConfig {
    /// Usable energy capacity in kWh (must be > 0).
    pub capacity_kwh: f32,
    /// Rated charge/discharge power in kW.
    pub power_kw: f32,
    /// Fraction of drawn energy that ends up stored, in (0, 1].
    pub charge_efficiency: f32,
    /// Fraction of stored energy that is delivered, in (0, 1].
    pub discharge_efficiency: f32,
    /// SOC fraction lost to self-discharge every interval, in [0, 1).
    pub passive_discharge: f32,
    /// Price above which grid draw counts as high tariff (currency/MWh).
    pub tariff_threshold: f32,
    /// Divisor turning rated power into a per-interval SOC step.
    pub step_divisor: f32,
}

impl Default for BatteryConfig {
    fn default() -> Self {
        Self {
            capacity_kwh: 20.0,
            power_kw: 5.0,
            charge_efficiency: 0.95,
            discharge_efficiency: 0.9,
            passive_discharge: 0.002,
            tariff_threshold: 200.0,
            step_divisor: 2.0,
        }
    }
}

impl BatteryConfig {
    /// SOC fraction moved per interval at rated power.
    pub fn step_size(&self) -> f32 {
        self.power_kw / self.capacity_kwh / self.step_divisor
    }

    /// Checks every field and returns all violations.
    pub fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();

        if !(self.capacity_kwh > 0.0 && self.capacity_kwh.is_finite()) {
            errors.push(ConfigError::new("battery.capacity_kwh", "must be > 0"));
        }
        if !(self.power_kw >= 0.0 && self.power_kw.is_finite()) {
            errors.push(ConfigError::new("battery.power_kw", "must be >= 0"));
        }
        if !(self.charge_efficiency > 0.0 && self.charge_efficiency <= 1.0) {
            errors.push(ConfigError::new(
                "battery.charge_efficiency",
                "must be in (0.0, 1.0]",
            ));
        }
        if !(self.discharge_efficiency > 0.0 && self.discharge_efficiency <= 1.0) {
            errors.push(ConfigError::new(
                "battery.discharge_efficiency",
                "must be in (0.0, 1.0]",
            ));
        }
        if !(0.0..1.0).contains(&self.passive_discharge) {
            errors.push(ConfigError::new(
                "battery.passive_discharge",
                "must be in [0.0, 1.0)",
            ));
        }
        if !(self.tariff_threshold >= 0.0 && self.tariff_threshold.is_finite()) {
            errors.push(ConfigError::new(
                "battery.tariff_threshold",
                "must be a finite value >= 0",
            ));
        }
        if !(self.step_divisor > 0.0 && self.step_divisor.is_finite()) {
            errors.push(ConfigError::new("battery.step_divisor", "must be > 0"));
        }

        errors
    }
}

/// SOC change produced by one interval.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepOutcome {
    /// SOC at the start of the interval.
    pub soc_before: f32,
    /// SOC after passive loss and demand, before the action delta.
    pub soc_after_draw: f32,
    /// SOC at the end of the interval.
    pub soc_after: f32,
    /// `|soc_after - soc_before| × capacity` (kWh).
    pub grid_energy_kwh: f32,
}

/// Battery state-of-charge integrator.
///
/// Owns the only mutable state of a simulation run: the SOC scalar. Each
/// call to [`Battery::apply`] advances it by one interval in a fixed order:
///
/// 1. subtract passive discharge
/// 2. subtract the user demand draw
/// 3. floor at 0.0
/// 4. add `step × η_c` (charge) or subtract `step / η_d` (discharge)
/// 5. clamp to `[0.0, 1.0]`
#[derive(Debug, Clone)]
pub struct Battery {
    config: BatteryConfig,
    /// State of charge as a fraction (0.0 to 1.0).
    pub soc: f32,
    step_size: f32,
}

impl Battery {
    /// Creates a battery with a validated configuration and starting SOC.
    ///
    /// # Panics
    ///
    /// Panics if capacity or efficiencies are out of range, or SOC is outside
    /// `[0.0, 1.0]`. The simulation entry points validate both first.
    pub fn new(config: BatteryConfig, soc: f32) -> Self {
        assert!(config.capacity_kwh > 0.0);
        assert!((0.0..=1.0).contains(&soc));
        assert!(config.charge_efficiency > 0.0 && config.charge_efficiency <= 1.0);
        assert!(config.discharge_efficiency > 0.0 && config.discharge_efficiency <= 1.0);

        Self {
            step_size: config.step_size(),
            config,
            soc,
        }
    }

    pub fn capacity_kwh(&self) -> f32 {
        self.config.capacity_kwh
    }

    /// Advances the SOC by one interval.
    ///
    /// # Arguments
    ///
    /// * `action` - Action chosen by the dispatch policy
    /// * `demand` - User demand draw as a fraction of capacity
    pub fn apply(&mut self, action: Action, demand: f32) -> StepOutcome {
        let soc_before = self.soc;

        let soc_after_draw = (soc_before - self.config.passive_discharge - demand).max(0.0);

        let soc_after = match action {
            Action::Charge => soc_after_draw + self.step_size * self.config.charge_efficiency,
            Action::Discharge => soc_after_draw - self.step_size / self.config.discharge_efficiency,
            Action::Idle => soc_after_draw,
        }
        .clamp(0.0, 1.0);

        self.soc = soc_after;

        StepOutcome {
            soc_before,
            soc_after_draw,
            soc_after,
            grid_energy_kwh: (soc_after - soc_before).abs() * self.config.capacity_kwh,
        }
    }
}
