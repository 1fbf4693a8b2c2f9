use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use diesel::prelude::*;
use log::info;
use std::sync::Arc;

use crate::core::shared::error::ApiError;
use crate::core::shared::state::AppState;
use crate::core::shared::utils::{now_hhmm, run_blocking};
use crate::employees::storage::resolve_employee_id;

use super::storage::{
    end_break, find_attendance, list_breaks, open_break, record_check_in, record_check_out,
    start_break,
};
use super::types::{
    date_or_today, required_identifier, resolve_break_action, time_or_now, AttendanceQuery,
    AttendanceRecord, BreakAction, BreakRecord, BreakStatus, ClockRequest, ToggleBreakRequest,
    ToggleBreakResponse,
};

pub async fn handle_today_attendance(
    State(state): State<Arc<AppState>>,
    Query(query): Query<AttendanceQuery>,
) -> Result<Json<AttendanceRecord>, ApiError> {
    let identifier = required_identifier(query.employee_id).map_err(ApiError::Validation)?;
    let date = date_or_today(query.date).map_err(ApiError::Validation)?;

    let record = run_blocking(&state.conn, move |conn| {
        let employee_id = resolve_employee_id(conn, &identifier)?;
        find_attendance(conn, employee_id, &date)?
            .ok_or_else(|| ApiError::not_found("No attendance found"))
    })
    .await?;
    Ok(Json(record))
}

pub async fn handle_check_in(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ClockRequest>,
) -> Result<Json<AttendanceRecord>, ApiError> {
    let identifier = required_identifier(request.employee_id).map_err(ApiError::Validation)?;
    let date = date_or_today(request.date).map_err(ApiError::Validation)?;
    let time = time_or_now(request.time).map_err(ApiError::Validation)?;

    let record = run_blocking(&state.conn, move |conn| {
        let employee_id = resolve_employee_id(conn, &identifier)?;
        Ok(record_check_in(conn, employee_id, &date, &time)?)
    })
    .await?;
    info!(
        "Employee {} checked in on {} at {}",
        record.employee_id,
        record.date,
        record.check_in.as_deref().unwrap_or("-")
    );
    Ok(Json(record))
}

pub async fn handle_check_out(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ClockRequest>,
) -> Result<Json<AttendanceRecord>, ApiError> {
    let identifier = required_identifier(request.employee_id).map_err(ApiError::Validation)?;
    let date = date_or_today(request.date).map_err(ApiError::Validation)?;
    let time = time_or_now(request.time).map_err(ApiError::Validation)?;

    let record = run_blocking(&state.conn, move |conn| {
        let employee_id = resolve_employee_id(conn, &identifier)?;
        record_check_out(conn, employee_id, &date, &time)?
            .ok_or_else(|| ApiError::not_found("Attendance not found"))
    })
    .await?;
    Ok(Json(record))
}

fn toggle_status_code(status: BreakStatus) -> StatusCode {
    match status {
        BreakStatus::BreakStarted | BreakStatus::BreakEnded => StatusCode::OK,
        BreakStatus::AlreadyActive => StatusCode::BAD_REQUEST,
        BreakStatus::NoActiveBreak => StatusCode::NOT_FOUND,
    }
}

pub async fn handle_toggle_break(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ToggleBreakRequest>,
) -> Result<(StatusCode, Json<ToggleBreakResponse>), ApiError> {
    let identifier = required_identifier(request.employee_id).map_err(ApiError::Validation)?;
    let date = date_or_today(request.date).map_err(ApiError::Validation)?;
    let is_starting = request.is_starting;

    let response = run_blocking(&state.conn, move |conn| {
        let employee_id = resolve_employee_id(conn, &identifier)?;
        conn.transaction::<_, ApiError, _>(|conn| {
            if find_attendance(conn, employee_id, &date)?.is_none() {
                return Err(ApiError::validation("Check-in required first"));
            }
            let current = open_break(conn, employee_id, &date)?;
            let response = match (resolve_break_action(is_starting, current.is_some()), current)
            {
                (BreakAction::Start, _) => ToggleBreakResponse::new(
                    BreakStatus::BreakStarted,
                    Some(start_break(conn, employee_id, &date, &now_hhmm())?),
                ),
                (BreakAction::End, Some(open)) => ToggleBreakResponse::new(
                    BreakStatus::BreakEnded,
                    Some(end_break(conn, open.id, &now_hhmm())?),
                ),
                (BreakAction::Reject(status), current) => {
                    ToggleBreakResponse::new(status, current)
                }
                (BreakAction::End, None) => {
                    ToggleBreakResponse::new(BreakStatus::NoActiveBreak, None)
                }
            };
            Ok(response)
        })
    })
    .await?;

    Ok((toggle_status_code(response.status), Json(response)))
}

pub async fn handle_list_breaks(
    State(state): State<Arc<AppState>>,
    Query(query): Query<AttendanceQuery>,
) -> Result<Json<Vec<BreakRecord>>, ApiError> {
    let identifier = required_identifier(query.employee_id).map_err(ApiError::Validation)?;
    let date = query
        .date
        .filter(|d| !d.trim().is_empty())
        .map(|d| date_or_today(Some(d)))
        .transpose()
        .map_err(ApiError::Validation)?;

    let breaks = run_blocking(&state.conn, move |conn| {
        let employee_id = resolve_employee_id(conn, &identifier)?;
        Ok(list_breaks(conn, employee_id, date.as_deref())?)
    })
    .await?;
    Ok(Json(breaks))
}
