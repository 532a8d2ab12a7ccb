//! Threshold-based dispatch strategies.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::sim::types::{Action, StepInput, TimeSeries};

/// Score assigned to a series with zero variance.
pub const NEUTRAL_SCORE: f32 = 0.5;

/// Dispatch strategy selector.
///
/// A closed set; names are parsed once at the configuration boundary and an
/// unknown name is an error, never a silent fallback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    TariffAvoidance,
    PriceArbitrage,
    CarbonMinimizer,
    Blended,
}

impl Strategy {
    /// Every strategy in comparison order.
    pub const ALL: [Self; 4] = [
        Self::TariffAvoidance,
        Self::PriceArbitrage,
        Self::CarbonMinimizer,
        Self::Blended,
    ];

    /// Configuration name (`snake_case`).
    pub fn name(self) -> &'static str {
        match self {
            Self::TariffAvoidance => "tariff_avoidance",
            Self::PriceArbitrage => "price_arbitrage",
            Self::CarbonMinimizer => "carbon_minimizer",
            Self::Blended => "blended",
        }
    }

    /// Human-readable label.
    pub fn label(self) -> &'static str {
        match self {
            Self::TariffAvoidance => "Tariff Avoidance",
            Self::PriceArbitrage => "Price Arbitrage",
            Self::CarbonMinimizer => "Carbon Minimizer",
            Self::Blended => "Blended (Price + Carbon)",
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Strategy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().to_ascii_lowercase().replace(['-', ' '], "_");
        Self::ALL
            .into_iter()
            .find(|strategy| strategy.name() == key)
            .ok_or_else(|| {
                ConfigError::new(
                    "strategy",
                    format!(
                        "unknown strategy \"{s}\", available: {}",
                        Self::ALL.map(Strategy::name).join(", ")
                    ),
                )
            })
    }
}

/// Threshold set shared by all strategies.
///
/// The default is the standard set; [`DispatchThresholds::grid_support`]
/// is the alternate set used by the regulation preset.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DispatchThresholds {
    /// Price below which arbitrage charges (currency/MWh).
    pub low_price: f32,
    /// Price above which arbitrage discharges (currency/MWh).
    pub high_price: f32,
    /// Carbon intensity below which the carbon strategy charges (gCO2/kWh).
    pub low_carbon: f32,
    /// Carbon intensity above which the carbon strategy discharges (gCO2/kWh).
    pub high_carbon: f32,
    /// Blended score above which the blended strategy charges.
    pub charge_cutoff: f32,
    /// Blended score below which the blended strategy discharges.
    pub discharge_cutoff: f32,
    /// SOC at or below which discharge is not allowed.
    pub reserve_floor: f32,
}

impl Default for DispatchThresholds {
    fn default() -> Self {
        Self {
            low_price: 80.0,
            high_price: 150.0,
            low_carbon: 200.0,
            high_carbon: 400.0,
            charge_cutoff: 0.7,
            discharge_cutoff: 0.3,
            reserve_floor: 0.2,
        }
    }
}

impl DispatchThresholds {
    /// Tighter price band used with frequency-regulation participation.
    pub fn grid_support() -> Self {
        Self {
            low_price: 90.0,
            high_price: 130.0,
            ..Self::default()
        }
    }

    /// Checks ordering and ranges; returns all violations.
    pub fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();

        if !(self.low_price.is_finite() && self.high_price.is_finite())
            || self.low_price > self.high_price
        {
            errors.push(ConfigError::new(
                "thresholds.low_price",
                "must be finite and <= thresholds.high_price",
            ));
        }
        if !(self.low_carbon.is_finite() && self.high_carbon.is_finite())
            || self.low_carbon > self.high_carbon
        {
            errors.push(ConfigError::new(
                "thresholds.low_carbon",
                "must be finite and <= thresholds.high_carbon",
            ));
        }
        if !(0.0..=1.0).contains(&self.charge_cutoff) {
            errors.push(ConfigError::new(
                "thresholds.charge_cutoff",
                "must be in [0.0, 1.0]",
            ));
        }
        if !(0.0..=1.0).contains(&self.discharge_cutoff) {
            errors.push(ConfigError::new(
                "thresholds.discharge_cutoff",
                "must be in [0.0, 1.0]",
            ));
        }
        if self.discharge_cutoff > self.charge_cutoff {
            errors.push(ConfigError::new(
                "thresholds.discharge_cutoff",
                "must be <= thresholds.charge_cutoff",
            ));
        }
        if !(0.0..1.0).contains(&self.reserve_floor) {
            errors.push(ConfigError::new(
                "thresholds.reserve_floor",
                "must be in [0.0, 1.0)",
            ));
        }

        errors
    }
}

/// Min/max of the whole price and carbon series, fixed for one run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NormalizationBounds {
    pub price_min: f32,
    pub price_max: f32,
    pub carbon_min: f32,
    pub carbon_max: f32,
}

impl NormalizationBounds {
    /// Computes bounds over the entire horizon. Empty series yield zero bounds.
    pub fn from_series(price: &TimeSeries, carbon: &TimeSeries) -> Self {
        Self {
            price_min: price.min().unwrap_or(0.0),
            price_max: price.max().unwrap_or(0.0),
            carbon_min: carbon.min().unwrap_or(0.0),
            carbon_max: carbon.max().unwrap_or(0.0),
        }
    }

    /// `1 - (price - min) / (max - min)`; cheap intervals score high.
    pub fn price_score(&self, price: f32) -> f32 {
        inverted_score(price, self.price_min, self.price_max)
    }

    /// `1 - (carbon - min) / (max - min)`; clean intervals score high.
    pub fn carbon_score(&self, carbon: f32) -> f32 {
        inverted_score(carbon, self.carbon_min, self.carbon_max)
    }

    /// Equal-weight blend of price and carbon scores.
    pub fn blended_score(&self, price: f32, carbon: f32) -> f32 {
        0.5 * self.price_score(price) + 0.5 * self.carbon_score(carbon)
    }
}

fn inverted_score(value: f32, min: f32, max: f32) -> f32 {
    let range = max - min;
    if range > 0.0 {
        1.0 - (value - min) / range
    } else {
        NEUTRAL_SCORE
    }
}

/// Chooses the battery action for each interval.
pub trait Controller {
    fn dispatch(&self, input: &StepInput) -> Action;
}

/// Greedy, myopic threshold policy for one strategy.
#[derive(Debug, Clone, Copy)]
pub struct DispatchPolicy {
    pub strategy: Strategy,
    pub thresholds: DispatchThresholds,
    pub tariff_threshold: f32,
    pub bounds: NormalizationBounds,
}

impl DispatchPolicy {
    pub fn new(
        strategy: Strategy,
        thresholds: DispatchThresholds,
        tariff_threshold: f32,
        bounds: NormalizationBounds,
    ) -> Self {
        Self {
            strategy,
            thresholds,
            tariff_threshold,
            bounds,
        }
    }

    fn can_charge(soc: f32) -> bool {
        soc < 1.0
    }

    fn can_discharge(&self, soc: f32) -> bool {
        soc > self.thresholds.reserve_floor
    }

    /// Charge below `low`, discharge above `high`, otherwise idle.
    fn band(&self, value: f32, low: f32, high: f32, soc: f32) -> Action {
        if value < low && Self::can_charge(soc) {
            Action::Charge
        } else if value > high && self.can_discharge(soc) {
            Action::Discharge
        } else {
            Action::Idle
        }
    }
}

impl Controller for DispatchPolicy {
    fn dispatch(&self, input: &StepInput) -> Action {
        let t = &self.thresholds;
        let soc = input.soc;

        match self.strategy {
            Strategy::TariffAvoidance => {
                if input.price < self.tariff_threshold && Self::can_charge(soc) {
                    Action::Charge
                } else {
                    Action::Idle
                }
            }
            Strategy::PriceArbitrage => self.band(input.price, t.low_price, t.high_price, soc),
            Strategy::CarbonMinimizer => self.band(input.carbon, t.low_carbon, t.high_carbon, soc),
            Strategy::Blended => {
                let score = self.bounds.blended_score(input.price, input.carbon);
                if score > t.charge_cutoff && Self::can_charge(soc) {
                    Action::Charge
                } else if score < t.discharge_cutoff && self.can_discharge(soc) {
                    Action::Discharge
                } else {
                    Action::Idle
                }
            }
        }
    }
}
