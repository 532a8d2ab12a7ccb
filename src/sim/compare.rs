//! Side-by-side comparison of every dispatch strategy.

use std::fmt;

use serde::Serialize;
use tracing::info;

use crate::error::SimError;
use crate::signals::SignalSet;

use super::engine::{RunSettings, SimulationRun, simulate};
use super::policy::Strategy;
use super::types::SimConfig;

/// Aggregate results of one strategy within a comparison.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComparisonRow {
    pub strategy: Strategy,
    pub total_energy_kwh: f32,
    pub total_cost: f32,
    pub total_emissions_kg: f32,
    pub high_tariff_intervals: usize,
    pub tariff_hours_avoided: f32,
    pub total_reg_revenue: f32,
    /// Lowest total cost of the comparison.
    pub best_cost: bool,
    /// Lowest total emissions of the comparison.
    pub best_carbon: bool,
}

impl ComparisonRow {
    fn from_run(run: &SimulationRun) -> Self {
        let s = &run.summary;
        Self {
            strategy: run.strategy,
            total_energy_kwh: s.total_energy_kwh,
            total_cost: s.total_cost,
            total_emissions_kg: s.total_emissions_kg,
            high_tariff_intervals: s.high_tariff_intervals,
            tariff_hours_avoided: s.tariff_hours_avoided,
            total_reg_revenue: s.total_reg_revenue,
            best_cost: false,
            best_carbon: false,
        }
    }
}

/// Result of running every strategy over identical inputs.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Comparison {
    /// One row per strategy, in [`Strategy::ALL`] order.
    pub rows: Vec<ComparisonRow>,
    /// The full run behind each row, same order.
    #[serde(skip)]
    pub runs: Vec<SimulationRun>,
}

impl Comparison {
    pub fn best_cost(&self) -> Option<Strategy> {
        self.rows.iter().find(|r| r.best_cost).map(|r| r.strategy)
    }

    pub fn best_carbon(&self) -> Option<Strategy> {
        self.rows.iter().find(|r| r.best_carbon).map(|r| r.strategy)
    }

    pub fn run(&self, strategy: Strategy) -> Option<&SimulationRun> {
        self.runs.iter().find(|r| r.strategy == strategy)
    }
}

/// Flags the first row with the lowest value of `key` as the winner.
fn argmin_first(rows: &[ComparisonRow], key: impl Fn(&ComparisonRow) -> f32) -> Option<usize> {
    let mut best: Option<(usize, f32)> = None;
    for (i, row) in rows.iter().enumerate() {
        let value = key(row);
        let better = match best {
            None => true,
            Some((_, current)) => value < current || (current.is_nan() && !value.is_nan()),
        };
        if better {
            best = Some((i, value));
        }
    }
    best.map(|(i, _)| i)
}

/// Sets `best_cost` and `best_carbon` on exactly one row each.
///
/// Ties go to the earliest row.
pub fn rank_rows(rows: &mut [ComparisonRow]) {
    for row in rows.iter_mut() {
        row.best_cost = false;
        row.best_carbon = false;
    }
    if let Some(i) = argmin_first(rows, |r| r.total_cost) {
        rows[i].best_cost = true;
    }
    if let Some(i) = argmin_first(rows, |r| r.total_emissions_kg) {
        rows[i].best_carbon = true;
    }
}

/// Runs every strategy in [`Strategy::ALL`] order over the same signals,
/// settings, and starting SOC, then ranks the results.
pub fn compare_strategies(
    grid: &SimConfig,
    signals: &SignalSet,
    settings: &RunSettings,
) -> Result<Comparison, SimError> {
    let runs = Strategy::ALL
        .into_iter()
        .map(|strategy| simulate(grid, signals, settings, strategy))
        .collect::<Result<Vec<_>, _>>()?;

    let mut rows: Vec<ComparisonRow> = runs.iter().map(ComparisonRow::from_run).collect();
    rank_rows(&mut rows);

    let comparison = Comparison { rows, runs };
    info!(
        best_cost = comparison.best_cost().map(Strategy::name),
        best_carbon = comparison.best_carbon().map(Strategy::name),
        "strategy comparison complete"
    );
    Ok(comparison)
}

impl fmt::Display for Comparison {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "--- Strategy Comparison ---")?;
        writeln!(
            f,
            "{:<26} {:>12} {:>10} {:>14} {:>12}  best",
            "strategy", "energy_kwh", "cost", "emissions_kg", "tariff_h_ok"
        )?;
        for (i, row) in self.rows.iter().enumerate() {
            let mut flags = Vec::new();
            if row.best_cost {
                flags.push("cost");
            }
            if row.best_carbon {
                flags.push("carbon");
            }
            write!(
                f,
                "{:<26} {:>12.2} {:>10.2} {:>14.2} {:>12.2}  {}",
                row.strategy.label(),
                row.total_energy_kwh,
                row.total_cost,
                row.total_emissions_kg,
                row.tariff_hours_avoided,
                flags.join(",")
            )?;
            if i + 1 < self.rows.len() {
                writeln!(f)?;
            }
        }
        Ok(())
    }
}
