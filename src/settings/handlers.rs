use axum::{extract::State, http::StatusCode, Json};
use log::info;
use std::sync::Arc;

use crate::core::shared::error::ApiError;
use crate::core::shared::state::AppState;
use crate::core::shared::utils::run_blocking;

use super::storage::{get_admin, upsert_admin};
use super::types::{AdminProfile, UpdateAdminRequest, Upsert};

pub async fn handle_get_admin(
    State(state): State<Arc<AppState>>,
) -> Result<Json<AdminProfile>, ApiError> {
    let admin = run_blocking(&state.conn, |conn| {
        get_admin(conn)?.ok_or_else(|| ApiError::not_found("Admin not found"))
    })
    .await?;
    Ok(Json(admin))
}

pub async fn handle_update_admin(
    State(state): State<Arc<AppState>>,
    Json(request): Json<UpdateAdminRequest>,
) -> Result<(StatusCode, Json<AdminProfile>), ApiError> {
    let fields = request.validate().map_err(ApiError::Validation)?;
    let (admin, outcome) = run_blocking(&state.conn, move |conn| upsert_admin(conn, fields)).await?;
    let status = match outcome {
        Upsert::Updated => StatusCode::OK,
        Upsert::Created => {
            info!("Created admin profile for {}", admin.email);
            StatusCode::CREATED
        }
    };
    Ok((status, Json(admin)))
}
