use axum::{extract::State, Json};
use chrono::Utc;
use std::sync::Arc;

use crate::core::shared::error::ApiError;
use crate::core::shared::state::AppState;
use crate::core::shared::utils::run_blocking;

use super::storage::{load_dashboard_inputs, load_lead_points};
use super::types::{build_stats, conversion_chart, DashboardStats};

pub async fn handle_dashboard_stats(
    State(state): State<Arc<AppState>>,
) -> Result<Json<DashboardStats>, ApiError> {
    let inputs = run_blocking(&state.conn, |conn| Ok(load_dashboard_inputs(conn)?)).await?;
    Ok(Json(build_stats(
        &inputs.employees,
        &inputs.tallies,
        &inputs.leads,
    )))
}

pub async fn handle_dashboard_chart(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<i64>>, ApiError> {
    let points = run_blocking(&state.conn, |conn| Ok(load_lead_points(conn)?)).await?;
    Ok(Json(conversion_chart(&points, Utc::now().date_naive())))
}
