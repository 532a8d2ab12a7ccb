//! API response and query types.
//!
//! Schedule records are served with the same field names as the CSV export.

use serde::{Deserialize, Serialize};

use crate::sim::compare::ComparisonRow;
use crate::sim::kpi::Summary;
use crate::sim::policy::Strategy;
use crate::sim::types::{ScheduleRecord, SimConfig};

/// Combined state response: time grid, summary, and latest record.
#[derive(Debug, Serialize)]
pub struct StateResponse {
    pub config: SimConfig,
    /// Strategy of the served schedule.
    pub strategy: Strategy,
    pub summary: Summary,
    /// Last interval of the schedule, `None` if the schedule is empty.
    pub latest_step: Option<ScheduleRecord>,
    pub warnings: Vec<String>,
}

/// Strategy comparison with the winning strategies pulled out.
#[derive(Debug, Serialize)]
pub struct ComparisonResponse {
    pub best_cost: Option<Strategy>,
    pub best_carbon: Option<Strategy>,
    pub rows: Vec<ComparisonRow>,
}

/// Optional range query parameters for the schedule endpoint.
#[derive(Debug, Deserialize)]
pub struct ScheduleQuery {
    /// Start timestep (inclusive).
    pub from: Option<usize>,
    /// End timestep (inclusive).
    pub to: Option<usize>,
}

/// Error response body for 400-class errors.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Human-readable error message.
    pub error: String,
}
