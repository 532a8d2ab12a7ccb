//! Playback state for the TUI.
//!
//! Every strategy's schedule is computed up front; the app only moves a
//! cursor through the finished records.

use std::time::Instant;

use crate::config::ScenarioConfig;
use crate::error::SimError;
use crate::runner::{ScenarioRun, run_scenario_with};
use crate::signals::{Region, SignalGenerator};
use crate::sim::policy::{NormalizationBounds, Strategy};
use crate::sim::types::{Action, ScheduleRecord};

/// Tick interval options in milliseconds (slowest → fastest).
const SPEED_LEVELS_MS: [u64; 6] = [500, 250, 100, 50, 20, 5];

/// Default speed index (100 ms).
const DEFAULT_SPEED_IDX: usize = 2;

/// TUI application state.
pub struct App {
    scenario: ScenarioConfig,
    generator: SignalGenerator,
    run: ScenarioRun,
    bounds: NormalizationBounds,
    /// Number of intervals revealed so far.
    pub frame: usize,
    pub total_steps: usize,
    pub paused: bool,
    /// Current index into `SPEED_LEVELS_MS`.
    pub speed_idx: usize,
    pub quit: bool,
    /// When the playback cursor last advanced.
    pub last_tick: Instant,
    /// Scenario label shown in the header.
    pub label: String,
    /// Index into [`Strategy::ALL`] of the highlighted strategy.
    pub focus: usize,
    /// Last region-switch failure, shown in the status panel.
    pub error: Option<String>,
}

impl App {
    /// Runs `scenario` once and starts playback at the first interval.
    ///
    /// # Errors
    ///
    /// Returns the scenario's validation or run error.
    pub fn new(scenario: ScenarioConfig, label: impl Into<String>) -> Result<Self, SimError> {
        let mut generator = SignalGenerator::new(scenario.simulation.seed);
        let run = run_scenario_with(&scenario, &mut generator)?;
        let focus = Strategy::ALL
            .iter()
            .position(|&s| s == run.strategy)
            .unwrap_or(0);

        Ok(Self {
            bounds: NormalizationBounds::from_series(&run.signals.price, &run.signals.carbon),
            total_steps: run.sim_config.total_steps(),
            scenario,
            generator,
            run,
            frame: 0,
            paused: false,
            speed_idx: DEFAULT_SPEED_IDX,
            quit: false,
            last_tick: Instant::now(),
            label: label.into(),
            focus,
            error: None,
        })
    }

    /// Reveals one more interval if not finished.
    pub fn tick(&mut self) {
        if self.frame < self.total_steps {
            self.frame += 1;
        }
    }

    pub fn toggle_pause(&mut self) {
        self.paused = !self.paused;
    }

    /// Increases playback speed (shorter tick interval).
    pub fn speed_up(&mut self) {
        if self.speed_idx + 1 < SPEED_LEVELS_MS.len() {
            self.speed_idx += 1;
        }
    }

    /// Decreases playback speed (longer tick interval).
    pub fn speed_down(&mut self) {
        if self.speed_idx > 0 {
            self.speed_idx -= 1;
        }
    }

    pub fn tick_interval_ms(&self) -> u64 {
        SPEED_LEVELS_MS[self.speed_idx]
    }

    /// Moves the highlight to the next strategy.
    pub fn cycle_focus(&mut self) {
        self.focus = (self.focus + 1) % Strategy::ALL.len();
    }

    pub fn focused_strategy(&self) -> Strategy {
        Strategy::ALL[self.focus]
    }

    /// Re-runs the scenario with the market profile of `region`.
    ///
    /// On failure the current run stays in place and the error is kept for
    /// display.
    pub fn switch_region(&mut self, region: Region) {
        let mut scenario = self.scenario.clone();
        scenario.signals.region = region;
        match run_scenario_with(&scenario, &mut self.generator) {
            Ok(run) => {
                self.bounds = NormalizationBounds::from_series(&run.signals.price, &run.signals.carbon);
                self.total_steps = run.sim_config.total_steps();
                self.run = run;
                self.scenario = scenario;
                self.label = region.name().to_string();
                self.error = None;
                self.restart();
            }
            Err(e) => self.error = Some(e.to_string()),
        }
    }

    /// Rewinds playback to the first interval.
    pub fn restart(&mut self) {
        self.frame = 0;
        self.paused = false;
        self.last_tick = Instant::now();
    }

    pub fn is_finished(&self) -> bool {
        self.frame >= self.total_steps
    }

    pub fn run(&self) -> &ScenarioRun {
        &self.run
    }

    pub fn region(&self) -> Region {
        self.scenario.signals.region
    }

    /// Records of `strategy` revealed so far.
    pub fn visible(&self, strategy: Strategy) -> &[ScheduleRecord] {
        self.run
            .comparison
            .run(strategy)
            .map_or(&[], |r| &r.schedule[..self.frame.min(r.schedule.len())])
    }

    /// Most recent revealed record of the focused strategy.
    pub fn current_record(&self) -> Option<&ScheduleRecord> {
        self.visible(self.focused_strategy()).last()
    }

    /// SOC of the focused strategy at the cursor.
    pub fn focused_soc(&self) -> f32 {
        self.current_record()
            .map_or(self.scenario.simulation.initial_soc, |r| r.soc)
    }

    /// Cost and emissions accumulated by `strategy` up to the cursor.
    pub fn running_totals(&self, strategy: Strategy) -> (f32, f32) {
        self.visible(strategy)
            .iter()
            .fold((0.0, 0.0), |(cost, co2), r| (cost + r.cost, co2 + r.emissions_kg))
    }

    /// One-line reason for the focused strategy's current action.
    pub fn explanation(&self) -> String {
        match self.current_record() {
            Some(r) => explain(self, self.focused_strategy(), r),
            None => "Waiting for first interval...".to_string(),
        }
    }
}

fn explain(app: &App, strategy: Strategy, r: &ScheduleRecord) -> String {
    let t = &app.scenario.thresholds;
    let tariff = app.scenario.battery.tariff_threshold;
    let at_floor = r.soc_before <= t.reserve_floor;
    let full = r.soc_before >= 1.0;

    match (strategy, r.action) {
        (Strategy::TariffAvoidance, Action::Charge) => {
            format!("Charging: price {:.1} is below the tariff threshold {tariff:.0}", r.price)
        }
        (Strategy::TariffAvoidance, _) if full => "Holding: battery is full".to_string(),
        (Strategy::TariffAvoidance, _) => {
            format!("Holding: price {:.1} is at or above the tariff threshold {tariff:.0}", r.price)
        }
        (Strategy::PriceArbitrage, Action::Charge) => {
            format!("Charging: price {:.1} < {:.0}", r.price, t.low_price)
        }
        (Strategy::PriceArbitrage, Action::Discharge) => {
            format!("Discharging: price {:.1} > {:.0}", r.price, t.high_price)
        }
        (Strategy::CarbonMinimizer, Action::Charge) => {
            format!("Charging: carbon {:.0} < {:.0} gCO2/kWh", r.carbon, t.low_carbon)
        }
        (Strategy::CarbonMinimizer, Action::Discharge) => {
            format!("Discharging: carbon {:.0} > {:.0} gCO2/kWh", r.carbon, t.high_carbon)
        }
        (Strategy::Blended, action) => {
            let score = app.bounds.blended_score(r.price, r.carbon);
            let verb = match action {
                Action::Charge => "Charging",
                Action::Discharge => "Discharging",
                Action::Idle => "Holding",
            };
            format!(
                "{verb}: blended score {score:.2} (charge > {:.2}, discharge < {:.2})",
                t.charge_cutoff, t.discharge_cutoff
            )
        }
        (_, Action::Idle) if full => "Holding: battery is full".to_string(),
        (_, Action::Idle) if at_floor => "Holding: at or below the reserve floor".to_string(),
        (_, _) => "Holding: signal inside the dead band".to_string(),
    }
}
