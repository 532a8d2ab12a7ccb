//! TOML-based scenario configuration and preset definitions.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::signals::{DemandProfile, DiurnalProfile, Region};
use crate::sim::{BatteryConfig, DispatchThresholds, RunSettings, SimConfig, Strategy};

/// Phase shift that turns the diurnal sine into a cosine peaking at midnight.
const REGULATION_PHASE_SHIFT_HR: f32 = -6.0;

/// Upper bound on `steps_per_day × days`; every strategy holds a full
/// schedule of this length in memory.
pub const MAX_HORIZON_STEPS: usize = 1_000_000;

/// Top-level scenario configuration parsed from TOML.
///
/// All fields have defaults matching the baseline scenario. Load from
/// TOML with [`ScenarioConfig::from_toml_file`] or use
/// [`ScenarioConfig::baseline`] for the built-in default.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ScenarioConfig {
    /// Time grid, seed, starting SOC, and selected strategy.
    #[serde(default)]
    pub simulation: SimulationConfig,
    /// Price and carbon sources.
    #[serde(default)]
    pub signals: SignalsConfig,
    /// Battery parameters.
    #[serde(default)]
    pub battery: BatteryConfig,
    /// Dispatch threshold set.
    #[serde(default)]
    pub thresholds: DispatchThresholds,
    /// Household demand buckets.
    #[serde(default)]
    pub demand: DemandProfile,
    /// Frequency-regulation participation.
    #[serde(default)]
    pub regulation: RegulationConfig,
}

/// Simulation timing and global parameters.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct SimulationConfig {
    /// Number of intervals per simulated day (must be > 0).
    pub steps_per_day: usize,
    /// Number of days to simulate (must be > 0).
    pub days: usize,
    /// Master random seed.
    pub seed: u64,
    /// Starting state of charge (0.0–1.0).
    pub initial_soc: f32,
    /// Strategy reported as the primary run.
    pub strategy: Strategy,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            steps_per_day: 96,
            days: 1,
            seed: 42,
            initial_soc: 0.5,
            strategy: Strategy::Blended,
        }
    }
}

/// Price and carbon sources.
///
/// Both default to the synthetic region profile; a CSV file overrides one
/// series and falls back to the synthetic one if unusable.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct SignalsConfig {
    pub region: Region,
    pub price_csv: Option<PathBuf>,
    pub price_column: String,
    pub carbon_csv: Option<PathBuf>,
    pub carbon_column: String,
}

impl Default for SignalsConfig {
    fn default() -> Self {
        Self {
            region: Region::Uk,
            price_csv: None,
            price_column: "price".to_string(),
            carbon_csv: None,
            carbon_column: "carbon".to_string(),
        }
    }
}

/// Frequency-regulation participation and its price profile.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct RegulationConfig {
    pub enabled: bool,
    /// Fraction of capacity offered while idle (0.0–1.0).
    pub max_share: f32,
    /// Mean regulation price (currency/kW·h).
    pub base: f32,
    pub amplitude: f32,
    pub noise_std: f32,
}

impl Default for RegulationConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            max_share: 0.1,
            base: 0.3,
            amplitude: 0.2,
            noise_std: 0.05,
        }
    }
}

impl RegulationConfig {
    /// Diurnal profile of the regulation price, floored at zero.
    pub fn price_profile(&self) -> DiurnalProfile {
        DiurnalProfile::new(
            self.base,
            self.amplitude,
            self.noise_std,
            REGULATION_PHASE_SHIFT_HR,
        )
    }
}

impl ScenarioConfig {
    /// Returns the baseline scenario: UK profile with default battery.
    pub fn baseline() -> Self {
        Self {
            simulation: SimulationConfig::default(),
            signals: SignalsConfig::default(),
            battery: BatteryConfig::default(),
            thresholds: DispatchThresholds::default(),
            demand: DemandProfile::default(),
            regulation: RegulationConfig::default(),
        }
    }

    /// Baseline with the market profile of `region`.
    pub fn for_region(region: Region) -> Self {
        Self {
            signals: SignalsConfig {
                region,
                ..SignalsConfig::default()
            },
            ..Self::baseline()
        }
    }

    /// Returns the grid-support preset: a larger lossless battery that
    /// earns regulation revenue while idle, with a tighter price band and
    /// no household demand.
    pub fn grid_support() -> Self {
        Self {
            battery: BatteryConfig {
                capacity_kwh: 30.0,
                power_kw: 5.0,
                charge_efficiency: 1.0,
                discharge_efficiency: 1.0,
                passive_discharge: 0.0,
                step_divisor: 4.0,
                ..BatteryConfig::default()
            },
            thresholds: DispatchThresholds::grid_support(),
            demand: DemandProfile::none(),
            regulation: RegulationConfig {
                enabled: true,
                ..RegulationConfig::default()
            },
            simulation: SimulationConfig {
                strategy: Strategy::PriceArbitrage,
                ..SimulationConfig::default()
            },
            ..Self::baseline()
        }
    }

    /// Available preset names.
    pub const PRESETS: &[&str] = &[
        "baseline",
        "uk",
        "germany",
        "texas",
        "california",
        "france",
        "grid_support",
    ];

    /// Loads a scenario from a named preset.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the preset name is unknown.
    pub fn from_preset(name: &str) -> Result<Self, ConfigError> {
        match name {
            "baseline" => Ok(Self::baseline()),
            "grid_support" => Ok(Self::grid_support()),
            _ => name
                .parse::<Region>()
                .map(Self::for_region)
                .map_err(|_| {
                    ConfigError::new(
                        "preset",
                        format!(
                            "unknown preset \"{name}\", available: {}",
                            Self::PRESETS.join(", ")
                        ),
                    )
                }),
        }
    }

    /// Parses a scenario from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the file cannot be read or the TOML is invalid.
    pub fn from_toml_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| {
            ConfigError::new("scenario", format!("cannot read \"{}\": {e}", path.display()))
        })?;
        Self::from_toml_str(&content)
    }

    /// Parses a scenario from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the TOML is invalid, contains unknown
    /// fields, or names an unknown strategy or region.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        toml::from_str(s).map_err(|e| ConfigError::new("toml", e.to_string()))
    }

    /// Time grid described by `[simulation]`.
    ///
    /// Only call on a configuration that passed [`ScenarioConfig::validate`].
    pub fn sim_config(&self) -> SimConfig {
        let s = &self.simulation;
        SimConfig::new(s.steps_per_day, s.days, s.seed)
    }

    /// Battery, thresholds, starting SOC, and regulation share for a run.
    pub fn run_settings(&self) -> RunSettings {
        let settings = RunSettings::new(self.battery, self.thresholds, self.simulation.initial_soc);
        if self.regulation.enabled {
            settings.with_regulation(self.regulation.max_share)
        } else {
            settings
        }
    }

    /// Validates all fields and returns a list of errors.
    ///
    /// Returns an empty vector if configuration is valid.
    pub fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();
        let s = &self.simulation;

        if s.steps_per_day == 0 {
            errors.push(ConfigError::new("simulation.steps_per_day", "must be > 0"));
        }
        if s.days == 0 {
            errors.push(ConfigError::new("simulation.days", "must be > 0"));
        }
        if s.steps_per_day > 0 && s.days > 0 {
            let within = s
                .steps_per_day
                .checked_mul(s.days)
                .is_some_and(|total| total <= MAX_HORIZON_STEPS);
            if !within {
                errors.push(ConfigError::new(
                    "simulation.days",
                    format!("steps_per_day × days must not exceed {MAX_HORIZON_STEPS}"),
                ));
            }
        }
        if !(0.0..=1.0).contains(&s.initial_soc) {
            errors.push(ConfigError::new(
                "simulation.initial_soc",
                "must be in [0.0, 1.0]",
            ));
        }

        let sig = &self.signals;
        if sig.price_csv.is_some() && sig.price_column.trim().is_empty() {
            errors.push(ConfigError::new("signals.price_column", "must not be empty"));
        }
        if sig.carbon_csv.is_some() && sig.carbon_column.trim().is_empty() {
            errors.push(ConfigError::new("signals.carbon_column", "must not be empty"));
        }

        errors.extend(self.battery.validate());
        errors.extend(self.thresholds.validate());
        errors.extend(self.demand.validate());

        let reg = &self.regulation;
        if !(0.0..=1.0).contains(&reg.max_share) {
            errors.push(ConfigError::new(
                "regulation.max_share",
                "must be in [0.0, 1.0]",
            ));
        }
        if !(reg.noise_std >= 0.0 && reg.noise_std.is_finite()) {
            errors.push(ConfigError::new("regulation.noise_std", "must be >= 0"));
        }
        if !reg.base.is_finite() {
            errors.push(ConfigError::new("regulation.base", "must be finite"));
        }
        if !reg.amplitude.is_finite() {
            errors.push(ConfigError::new("regulation.amplitude", "must be finite"));
        }

        errors
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn baseline_preset_valid() {
        let cfg = ScenarioConfig::baseline();
        let errors = cfg.validate();
        assert!(errors.is_empty(), "baseline should be valid: {errors:?}");
    }

    #[test]
    fn baseline_uses_reference_horizon() {
        let cfg = ScenarioConfig::baseline();
        let grid = cfg.sim_config();
        assert_eq!(grid.total_steps(), 96);
        assert_eq!(grid.dt_hours, 0.25);
        assert_eq!(cfg.signals.region, Region::Uk);
    }

    #[test]
    fn from_preset_unknown() {
        let err = ScenarioConfig::from_preset("nonexistent");
        assert!(err.is_err());
        let e = err.unwrap_err();
        assert!(e.message.contains("unknown preset"));
        assert_eq!(e.field, "preset");
    }

    #[test]
    fn region_presets_select_region() {
        let cfg = ScenarioConfig::from_preset("texas").unwrap();
        assert_eq!(cfg.signals.region, Region::Texas);
        assert_eq!(cfg.battery, BatteryConfig::default());
    }

    #[test]
    fn valid_toml_parses() {
        let toml = r#"
[simulation]
steps_per_day = 48
days = 2
seed = 99
initial_soc = 0.3
strategy = "carbon_minimizer"

[signals]
region = "germany"

[battery]
capacity_kwh = 15.0
power_kw = 4.0
charge_efficiency = 0.92
discharge_efficiency = 0.92
passive_discharge = 0.001
tariff_threshold = 180.0
step_divisor = 2.0

[thresholds]
low_price = 70.0
high_price = 160.0

[demand]
evening_kw = 4.0

[regulation]
enabled = true
max_share = 0.2
"#;
        let cfg = ScenarioConfig::from_toml_str(toml);
        assert!(cfg.is_ok(), "valid TOML should parse: {:?}", cfg.err());
        let cfg = cfg.unwrap();
        assert_eq!(cfg.simulation.steps_per_day, 48);
        assert_eq!(cfg.simulation.strategy, Strategy::CarbonMinimizer);
        assert_eq!(cfg.signals.region, Region::Germany);
        assert_eq!(cfg.thresholds.low_price, 70.0);
        // untouched threshold keeps its default
        assert_eq!(cfg.thresholds.reserve_floor, 0.2);
        assert_eq!(cfg.demand.night_kw, 1.0);
        assert_eq!(cfg.run_settings().regulation_share, Some(0.2));
        assert!(cfg.validate().is_empty());
    }

    #[test]
    fn invalid_toml_unknown_field() {
        let toml = r#"
[battery]
capacity_kwh = 10.0
bogus_field = true
"#;
        assert!(ScenarioConfig::from_toml_str(toml).is_err());
    }

    #[test]
    fn unknown_strategy_is_rejected_at_parse_time() {
        let toml = r#"
[simulation]
strategy = "moon_phase"
"#;
        let err = ScenarioConfig::from_toml_str(toml).unwrap_err();
        assert_eq!(err.field, "toml");
    }

    #[test]
    fn validation_catches_zero_steps_and_bad_soc() {
        let mut cfg = ScenarioConfig::baseline();
        cfg.simulation.steps_per_day = 0;
        cfg.simulation.initial_soc = 1.5;
        let errors = cfg.validate();
        assert!(errors.iter().any(|e| e.field == "simulation.steps_per_day"));
        assert!(errors.iter().any(|e| e.field == "simulation.initial_soc"));
    }

    #[test]
    fn validation_rejects_overflowing_horizon() {
        let mut cfg = ScenarioConfig::baseline();
        cfg.simulation.steps_per_day = usize::MAX / 2 + 1;
        cfg.simulation.days = 2;
        let errors = cfg.validate();
        assert!(errors.iter().any(|e| e.field == "simulation.days"));
    }

    #[test]
    fn validation_rejects_oversized_horizon() {
        let mut cfg = ScenarioConfig::baseline();
        cfg.simulation.steps_per_day = 96;
        cfg.simulation.days = MAX_HORIZON_STEPS / 96 + 1;
        assert!(cfg.validate().iter().any(|e| e.field == "simulation.days"));

        cfg.simulation.days = MAX_HORIZON_STEPS / 96;
        assert!(cfg.validate().is_empty());
    }

    #[test]
    fn validation_rejects_non_finite_regulation_profile() {
        let mut cfg = ScenarioConfig::grid_support();
        cfg.regulation.base = f32::NAN;
        cfg.regulation.amplitude = f32::INFINITY;
        let fields: Vec<String> = cfg.validate().into_iter().map(|e| e.field).collect();
        assert!(fields.contains(&"regulation.base".to_string()));
        assert!(fields.contains(&"regulation.amplitude".to_string()));
    }

    #[test]
    fn validation_collects_nested_section_errors() {
        let mut cfg = ScenarioConfig::baseline();
        cfg.battery.capacity_kwh = 0.0;
        cfg.thresholds.low_carbon = 900.0;
        cfg.regulation.max_share = 2.0;
        let fields: Vec<String> = cfg.validate().into_iter().map(|e| e.field).collect();
        assert!(fields.contains(&"battery.capacity_kwh".to_string()));
        assert!(fields.contains(&"thresholds.low_carbon".to_string()));
        assert!(fields.contains(&"regulation.max_share".to_string()));
    }

    #[test]
    fn all_presets_are_valid() {
        for name in ScenarioConfig::PRESETS {
            let cfg = ScenarioConfig::from_preset(name);
            assert!(cfg.is_ok(), "preset \"{name}\" should load");
            let errors = cfg.as_ref().map(|c| c.validate()).unwrap_or_default();
            assert!(
                errors.is_empty(),
                "preset \"{name}\" should be valid: {errors:?}"
            );
        }
    }

    #[test]
    fn grid_support_enables_regulation() {
        let cfg = ScenarioConfig::grid_support();
        let settings = cfg.run_settings();
        assert_eq!(settings.regulation_share, Some(0.1));
        assert_eq!(settings.thresholds.high_price, 130.0);
        // 5 kW / 30 kWh / 4
        assert!((cfg.battery.step_size() - 5.0 / 120.0).abs() < 1e-6);
        assert_eq!(cfg.demand, DemandProfile::none());
    }

    #[test]
    fn partial_toml_uses_defaults() {
        let toml = r#"
[simulation]
seed = 99
"#;
        let cfg = ScenarioConfig::from_toml_str(toml).unwrap();
        assert_eq!(cfg.simulation.seed, 99);
        assert_eq!(cfg.simulation.steps_per_day, 96);
        assert_eq!(cfg.battery.capacity_kwh, 20.0);
        assert!(!cfg.regulation.enabled);
    }

    #[test]
    fn regulation_profile_peaks_at_midnight() {
        let p = RegulationConfig::default().price_profile();
        assert!((p.level_at(0.0) - 0.5).abs() < 1e-5);
        assert!((p.level_at(12.0) - 0.1).abs() < 1e-5);
    }
}
