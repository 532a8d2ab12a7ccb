/// SOC integrator and battery parameters.
pub mod battery;
pub mod compare;
pub mod engine;
pub mod kpi;
/// Dispatch strategies and the controller seam.
pub mod policy;
pub mod types;

pub use battery::{Battery, BatteryConfig};
pub use compare::{Comparison, ComparisonRow, compare_strategies};
pub use engine::{Engine, RunSettings, SimulationRun, simulate};
pub use kpi::Summary;
pub use policy::{Controller, DispatchPolicy, DispatchThresholds, Strategy};
pub use types::{Action, ScheduleRecord, SimConfig, TimeSeries};
