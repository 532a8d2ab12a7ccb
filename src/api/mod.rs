//! REST API over a completed scenario run.
//!
//! Provides three GET endpoints:
//! - `/state`: time grid, selected strategy, summary, and latest record
//! - `/schedule`: the selected strategy's records with optional range filtering
//! - `/comparison`: every strategy's aggregate row and the winners

mod handlers;
mod types;

use std::io;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use axum::routing::get;
use tracing::info;

use crate::runner::ScenarioRun;
use crate::sim::compare::Comparison;
use crate::sim::kpi::Summary;
use crate::sim::policy::Strategy;
use crate::sim::types::{ScheduleRecord, SimConfig};

pub use types::{ComparisonResponse, ErrorResponse, ScheduleQuery, StateResponse};

/// Immutable application state shared across all request handlers.
///
/// Constructed once after the scenario completes and wrapped in `Arc`;
/// all data is read-only.
pub struct AppState {
    pub config: SimConfig,
    pub strategy: Strategy,
    pub summary: Summary,
    pub schedule: Vec<ScheduleRecord>,
    pub comparison: Comparison,
    /// Feed fallback notices, already formatted.
    pub warnings: Vec<String>,
}

impl AppState {
    pub fn new(run: ScenarioRun) -> Self {
        Self {
            config: run.sim_config,
            strategy: run.strategy,
            summary: run.run.summary,
            schedule: run.run.schedule,
            comparison: run.comparison,
            warnings: run.warnings.iter().map(ToString::to_string).collect(),
        }
    }
}

/// Builds the axum router with all API routes.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/state", get(handlers::get_state))
        .route("/schedule", get(handlers::get_schedule))
        .route("/comparison", get(handlers::get_comparison))
        .with_state(state)
}

/// Binds to the given address and serves the API until the server stops.
///
/// # Errors
///
/// Returns an `io::Error` if the listener cannot bind or the server fails.
pub async fn serve(state: Arc<AppState>, addr: SocketAddr) -> io::Result<()> {
    let app = router(state);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "API server listening");
    axum::serve(listener, app).await
}
