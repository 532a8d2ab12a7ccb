//! Request handlers for the API endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;

use super::AppState;
use super::types::{ComparisonResponse, ErrorResponse, ScheduleQuery, StateResponse};
use crate::sim::types::ScheduleRecord;

/// `GET /state` → 200 + `StateResponse` JSON
pub async fn get_state(State(state): State<Arc<AppState>>) -> Json<StateResponse> {
    Json(StateResponse {
        config: state.config.clone(),
        strategy: state.strategy,
        summary: state.summary.clone(),
        latest_step: state.schedule.last().cloned(),
        warnings: state.warnings.clone(),
    })
}

/// Returns schedule records, optionally filtered by timestep range.
///
/// `GET /schedule` → 200 + `Vec<ScheduleRecord>` JSON
/// `GET /schedule?from=N&to=M` → filtered range (inclusive)
/// `GET /schedule?from=10&to=5` → 400 + `ErrorResponse`
pub async fn get_schedule(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ScheduleQuery>,
) -> impl IntoResponse {
    let from = query.from.unwrap_or(0);
    let to = query.to.unwrap_or(usize::MAX);

    if from > to {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                error: format!("`from` ({from}) must be <= `to` ({to})"),
            }),
        ));
    }

    let records: Vec<ScheduleRecord> = state
        .schedule
        .iter()
        .filter(|r| r.timestep >= from && r.timestep <= to)
        .cloned()
        .collect();

    Ok(Json(records))
}

/// `GET /comparison` → 200 + `ComparisonResponse` JSON
pub async fn get_comparison(State(state): State<Arc<AppState>>) -> Json<ComparisonResponse> {
    Json(ComparisonResponse {
        best_cost: state.comparison.best_cost(),
        best_carbon: state.comparison.best_carbon(),
        rows: state.comparison.rows.clone(),
    })
}
