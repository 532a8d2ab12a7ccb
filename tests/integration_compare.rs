//! Integration tests for the strategy comparator and scenario runner.

mod common;

use std::path::Path;
use std::thread;

use flexkit_sim::config::ScenarioConfig;
use flexkit_sim::runner::run_scenario;
use flexkit_sim::signals::Region;
use flexkit_sim::sim::{SimConfig, Strategy, compare_strategies, simulate};

#[test]
fn comparison_runs_every_strategy_on_the_same_signals() {
    let grid = SimConfig::new(96, 1, 42);
    let signals = common::swinging_signals(96);
    let settings = common::settings(Default::default(), 0.5);

    let comparison = compare_strategies(&grid, &signals, &settings).unwrap();

    let order: Vec<Strategy> = comparison.rows.iter().map(|r| r.strategy).collect();
    assert_eq!(order, Strategy::ALL.to_vec());
    for strategy in Strategy::ALL {
        let standalone = simulate(&grid, &signals, &settings, strategy).unwrap();
        assert_eq!(comparison.run(strategy), Some(&standalone));
    }
}

#[test]
fn exactly_one_winner_per_metric() {
    let run = run_scenario(&ScenarioConfig::baseline()).unwrap();
    let rows = &run.comparison.rows;
    assert_eq!(rows.iter().filter(|r| r.best_cost).count(), 1);
    assert_eq!(rows.iter().filter(|r| r.best_carbon).count(), 1);

    let min_cost = rows.iter().map(|r| r.total_cost).fold(f32::INFINITY, f32::min);
    let best = rows.iter().find(|r| r.best_cost).unwrap();
    assert_eq!(best.total_cost, min_cost);
}

#[test]
fn repeated_comparisons_pick_the_same_winners() {
    let first = run_scenario(&ScenarioConfig::baseline()).unwrap().comparison;
    for _ in 0..3 {
        let again = run_scenario(&ScenarioConfig::baseline()).unwrap().comparison;
        assert_eq!(again.best_cost(), first.best_cost());
        assert_eq!(again.best_carbon(), first.best_carbon());
    }
}

#[test]
fn scenarios_on_separate_threads_match_sequential_runs() {
    let sequential: Vec<_> = Region::ALL
        .iter()
        .map(|&r| run_scenario(&ScenarioConfig::for_region(r)).unwrap().comparison)
        .collect();

    let handles: Vec<_> = Region::ALL
        .iter()
        .map(|&r| thread::spawn(move || run_scenario(&ScenarioConfig::for_region(r)).unwrap().comparison))
        .collect();
    let parallel: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();

    assert_eq!(sequential, parallel);
}

#[test]
fn every_preset_runs() {
    for name in ScenarioConfig::PRESETS {
        let cfg = ScenarioConfig::from_preset(name).unwrap();
        let run = run_scenario(&cfg).unwrap();
        assert_eq!(run.run.schedule.len(), cfg.sim_config().total_steps(), "{name}");
        assert!(run.warnings.is_empty(), "{name}");
    }
}

#[test]
fn regions_produce_distinct_markets() {
    let uk = run_scenario(&ScenarioConfig::for_region(Region::Uk)).unwrap();
    let texas = run_scenario(&ScenarioConfig::for_region(Region::Texas)).unwrap();
    assert_ne!(uk.signals.price, texas.signals.price);
    assert_ne!(uk.comparison.rows, texas.comparison.rows);
}

#[test]
fn only_grid_support_earns_regulation_revenue() {
    let baseline = run_scenario(&ScenarioConfig::baseline()).unwrap();
    assert!(baseline.comparison.rows.iter().all(|r| r.total_reg_revenue == 0.0));

    let grid_support = run_scenario(&ScenarioConfig::grid_support()).unwrap();
    assert!(grid_support.comparison.rows.iter().any(|r| r.total_reg_revenue > 0.0));
}

#[test]
fn scenario_files_load_and_match_presets() {
    let baseline = ScenarioConfig::from_toml_file(Path::new("scenarios/baseline.toml")).unwrap();
    assert_eq!(baseline, ScenarioConfig::baseline());

    let grid_support =
        ScenarioConfig::from_toml_file(Path::new("scenarios/grid_support.toml")).unwrap();
    assert_eq!(grid_support, ScenarioConfig::grid_support());

    let texas = ScenarioConfig::from_toml_file(Path::new("scenarios/texas_two_day.toml")).unwrap();
    let run = run_scenario(&texas).unwrap();
    assert_eq!(run.run.schedule.len(), 48);
    assert_eq!(run.strategy, Strategy::PriceArbitrage);
}
