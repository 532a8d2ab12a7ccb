//! Scenario-level orchestration: config → signals → runs → comparison.

use tracing::info;

use crate::config::ScenarioConfig;
use crate::error::SimError;
use crate::signals::feed::resolve_series;
use crate::signals::{CsvSeriesFeed, FeedWarning, SignalFeed, SignalGenerator, SignalSet};
use crate::sim::{Comparison, SimConfig, SimulationRun, Strategy, compare_strategies, simulate};

/// Clip range applied to externally supplied carbon intensity (gCO2/kWh).
pub const CARBON_FEED_RANGE: (f32, f32) = (100.0, 500.0);
/// Clip range applied to externally supplied prices.
pub const PRICE_FEED_RANGE: (f32, f32) = (0.0, f32::MAX);

/// Everything produced by one scenario execution.
#[derive(Debug, Clone)]
pub struct ScenarioRun {
    pub sim_config: SimConfig,
    /// Strategy selected in `[simulation]`.
    pub strategy: Strategy,
    pub tariff_threshold: f32,
    pub signals: SignalSet,
    /// Feeds that fell back to synthetic data.
    pub warnings: Vec<FeedWarning>,
    /// Run of the selected strategy.
    pub run: SimulationRun,
    pub comparison: Comparison,
}

/// Runs a scenario with a fresh signal generator.
///
/// # Errors
///
/// Returns [`SimError::Config`] for an invalid scenario, or the first
/// shape/series error raised by a run.
pub fn run_scenario(config: &ScenarioConfig) -> Result<ScenarioRun, SimError> {
    let mut generator = SignalGenerator::new(config.simulation.seed);
    run_scenario_with(config, &mut generator)
}

/// Runs a scenario reusing `generator`, so an unchanged region and horizon
/// skip market regeneration.
pub fn run_scenario_with(
    config: &ScenarioConfig,
    generator: &mut SignalGenerator,
) -> Result<ScenarioRun, SimError> {
    let errors = config.validate();
    if !errors.is_empty() {
        return Err(SimError::Config(errors));
    }

    let sim_config = config.sim_config();
    generator.set_seed(config.simulation.seed);
    let (signals, warnings) = build_signals(config, &sim_config, generator);

    let settings = config.run_settings();
    let strategy = config.simulation.strategy;
    let run = simulate(&sim_config, &signals, &settings, strategy)?;
    let comparison = compare_strategies(&sim_config, &signals, &settings)?;

    info!(
        region = %config.signals.region,
        strategy = strategy.name(),
        intervals = sim_config.total_steps(),
        fallbacks = warnings.len(),
        "scenario complete"
    );

    Ok(ScenarioRun {
        sim_config,
        strategy,
        tariff_threshold: config.battery.tariff_threshold,
        signals,
        warnings,
        run,
        comparison,
    })
}

/// Assembles every input series for `config` over `grid`.
///
/// External feeds that fail are replaced by the synthetic region series and
/// reported in the returned warnings.
pub fn build_signals(
    config: &ScenarioConfig,
    grid: &SimConfig,
    generator: &mut SignalGenerator,
) -> (SignalSet, Vec<FeedWarning>) {
    let horizon = grid.total_steps();
    let profile = config.signals.region.profile();
    let market = generator.market(&profile, grid).clone();

    let price_feed = config
        .signals
        .price_csv
        .as_ref()
        .map(|path| CsvSeriesFeed::new(path, &config.signals.price_column));
    let carbon_feed = config
        .signals
        .carbon_csv
        .as_ref()
        .map(|path| CsvSeriesFeed::new(path, &config.signals.carbon_column));

    let mut warnings = Vec::new();
    let (price, warning) = resolve_series(
        "price",
        price_feed.as_ref().map(|f| f as &dyn SignalFeed),
        horizon,
        PRICE_FEED_RANGE,
        || market.price.clone(),
    );
    warnings.extend(warning);
    let (carbon, warning) = resolve_series(
        "carbon",
        carbon_feed.as_ref().map(|f| f as &dyn SignalFeed),
        horizon,
        CARBON_FEED_RANGE,
        || market.carbon.clone(),
    );
    warnings.extend(warning);

    let demand = config
        .demand
        .soc_fractions(grid, config.battery.capacity_kwh);
    let mut signals = SignalSet::new(price, carbon, demand);
    if config.regulation.enabled {
        signals = signals.with_regulation_price(
            generator.regulation_price(&config.regulation.price_profile(), grid),
        );
    }

    (signals, warnings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signals::Region;

    #[test]
    fn baseline_runs_end_to_end() {
        let run = run_scenario(&ScenarioConfig::baseline()).unwrap();
        assert_eq!(run.run.schedule.len(), 96);
        assert_eq!(run.strategy, Strategy::Blended);
        assert_eq!(run.comparison.rows.len(), 4);
        assert!(run.warnings.is_empty());
        assert!(run.signals.regulation_price.is_none());
    }

    #[test]
    fn selected_run_matches_its_comparison_row() {
        let run = run_scenario(&ScenarioConfig::baseline()).unwrap();
        let twin = run.comparison.run(run.strategy).unwrap();
        assert_eq!(&run.run, twin);
    }

    #[test]
    fn invalid_scenario_is_rejected() {
        let mut cfg = ScenarioConfig::baseline();
        cfg.battery.capacity_kwh = -1.0;
        assert!(matches!(run_scenario(&cfg), Err(SimError::Config(_))));
    }

    #[test]
    fn overflowing_horizon_is_rejected_before_building_the_grid() {
        let mut cfg = ScenarioConfig::baseline();
        cfg.simulation.steps_per_day = usize::MAX / 2 + 1;
        cfg.simulation.days = 2;
        assert!(matches!(run_scenario(&cfg), Err(SimError::Config(_))));
    }

    #[test]
    fn grid_support_builds_regulation_series() {
        let run = run_scenario(&ScenarioConfig::grid_support()).unwrap();
        let reg = run.signals.regulation_price.as_ref().unwrap();
        assert_eq!(reg.len(), 96);
        assert!(run.run.summary.total_reg_revenue > 0.0);
        assert!(run.signals.demand.iter().all(|&d| d == 0.0));
    }

    #[test]
    fn missing_csv_feed_falls_back_with_warning() {
        let mut cfg = ScenarioConfig::baseline();
        cfg.signals.carbon_csv = Some("/nonexistent/flexkit/carbon.csv".into());
        let run = run_scenario(&cfg).unwrap();
        assert_eq!(run.warnings.len(), 1);
        assert_eq!(run.warnings[0].series, "carbon");

        let synthetic = run_scenario(&ScenarioConfig::baseline()).unwrap();
        assert_eq!(run.signals.carbon, synthetic.signals.carbon);
    }

    #[test]
    fn reused_generator_skips_regeneration() {
        let mut generator = SignalGenerator::new(42);
        let cfg = ScenarioConfig::baseline();
        run_scenario_with(&cfg, &mut generator).unwrap();
        run_scenario_with(&cfg, &mut generator).unwrap();
        assert_eq!(generator.generations(), 1);

        let texas = ScenarioConfig::for_region(Region::Texas);
        run_scenario_with(&texas, &mut generator).unwrap();
        assert_eq!(generator.generations(), 2);
    }
}
