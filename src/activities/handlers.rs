use axum::{
    extract::{Path, State},
    Json,
};
use std::sync::Arc;
use uuid::Uuid;

use crate::core::shared::error::ApiError;
use crate::core::shared::state::AppState;
use crate::core::shared::utils::run_blocking;

use super::storage::{list_activities, recent_for_employee};
use super::types::ActivityEntry;

pub async fn handle_list_activities(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<ActivityEntry>>, ApiError> {
    let entries = run_blocking(&state.conn, |conn| Ok(list_activities(conn)?)).await?;
    Ok(Json(entries))
}

pub async fn handle_employee_activities(
    State(state): State<Arc<AppState>>,
    Path(employee_id): Path<Uuid>,
) -> Result<Json<Vec<ActivityEntry>>, ApiError> {
    let entries =
        run_blocking(&state.conn, move |conn| Ok(recent_for_employee(conn, employee_id)?)).await?;
    Ok(Json(entries))
}
