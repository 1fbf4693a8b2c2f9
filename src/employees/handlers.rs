use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use log::info;
use std::sync::Arc;
use uuid::Uuid;

use crate::core::shared::error::ApiError;
use crate::core::shared::state::AppState;
use crate::core::shared::utils::run_blocking;

use super::storage::{
    delete_employee, get_employee, insert_employee, lead_tallies, list_employees,
    resolve_employee_id, set_status, set_status_by_email, update_employee, with_live_counts,
    EmployeeChanges,
};
use super::types::{
    CreateEmployeeRequest, Employee, EmployeeEnvelope, EmployeeStatus, EmployeeStatusRequest,
    LoginRequest, MessageResponse, UpdateEmployeeRequest,
};

pub async fn handle_list_employees(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<Employee>>, ApiError> {
    let employees = run_blocking(&state.conn, |conn| Ok(list_employees(conn)?)).await?;
    Ok(Json(employees))
}

pub async fn handle_employee_stats(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<Employee>>, ApiError> {
    let employees = run_blocking(&state.conn, |conn| {
        let employees = list_employees(conn)?;
        let tallies = lead_tallies(conn)?;
        Ok(with_live_counts(employees, &tallies))
    })
    .await?;
    Ok(Json(employees))
}

pub async fn handle_get_employee(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<Employee>, ApiError> {
    let employee = run_blocking(&state.conn, move |conn| get_employee(conn, id)).await?;
    Ok(Json(employee))
}

pub async fn handle_create_employee(
    State(state): State<Arc<AppState>>,
    Json(request): Json<CreateEmployeeRequest>,
) -> Result<(StatusCode, Json<Employee>), ApiError> {
    let fields = request.validate().map_err(ApiError::Validation)?;
    let employee = run_blocking(&state.conn, move |conn| insert_employee(conn, fields)).await?;
    info!(
        "Created employee {} ({})",
        employee.employee_id, employee.email
    );
    Ok((StatusCode::CREATED, Json(employee)))
}

pub async fn handle_update_employee(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateEmployeeRequest>,
) -> Result<Json<Employee>, ApiError> {
    if request.is_empty() {
        return Err(ApiError::validation("No valid fields to update."));
    }
    let changes = EmployeeChanges::from(request);
    let employee = run_blocking(&state.conn, move |conn| update_employee(conn, id, changes)).await?;
    Ok(Json(employee))
}

pub async fn handle_delete_employee(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<MessageResponse>, ApiError> {
    let released = run_blocking(&state.conn, move |conn| delete_employee(conn, id)).await?;
    info!("Deleted employee {id}; {released} lead(s) returned to the unassigned pool");
    Ok(Json(MessageResponse {
        message: "Employee deleted".to_string(),
    }))
}

pub async fn handle_login(
    State(state): State<Arc<AppState>>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<EmployeeEnvelope>, ApiError> {
    let employee = run_blocking(&state.conn, move |conn| {
        set_status_by_email(conn, &request.email, EmployeeStatus::Active)
    })
    .await?;
    Ok(Json(EmployeeEnvelope {
        message: "Logged in".to_string(),
        employee,
    }))
}

pub async fn handle_logout(
    State(state): State<Arc<AppState>>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<EmployeeEnvelope>, ApiError> {
    let employee = run_blocking(&state.conn, move |conn| {
        set_status_by_email(conn, &request.email, EmployeeStatus::Inactive)
    })
    .await?;
    Ok(Json(EmployeeEnvelope {
        message: "Logged out".to_string(),
        employee,
    }))
}

pub async fn handle_update_status(
    State(state): State<Arc<AppState>>,
    Json(request): Json<EmployeeStatusRequest>,
) -> Result<Json<EmployeeEnvelope>, ApiError> {
    let identifier = request
        .employee_id
        .filter(|id| !id.trim().is_empty())
        .ok_or_else(|| ApiError::validation("Missing employeeId"))?;
    let status = request
        .status
        .ok_or_else(|| ApiError::validation("Missing status"))?;

    let employee = run_blocking(&state.conn, move |conn| {
        let id = resolve_employee_id(conn, &identifier)?;
        set_status(conn, id, status)
    })
    .await?;
    Ok(Json(EmployeeEnvelope {
        message: "Status updated".to_string(),
        employee,
    }))
}

pub async fn handle_set_inactive(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<EmployeeEnvelope>, ApiError> {
    let employee = run_blocking(&state.conn, move |conn| {
        set_status(conn, id, EmployeeStatus::Inactive)
    })
    .await?;
    Ok(Json(EmployeeEnvelope {
        message: "Status set to Inactive".to_string(),
        employee,
    }))
}
