use axum::{
    extract::{Multipart, Path, Query, State},
    Json,
};
use diesel::prelude::*;
use log::{error, info};
use std::sync::Arc;
use uuid::Uuid;

use crate::activities::storage::insert_activity;
use crate::activities::types::{ActivityType, NewActivity};
use crate::core::shared::error::ApiError;
use crate::core::shared::state::AppState;
use crate::core::shared::utils::{parse_hhmm, parse_ymd, run_blocking};
use crate::employees::storage::resolve_employee_id;

use super::distributor::{distribute_unassigned, DistributionReport};
use super::import::parse_leads_csv;
use super::storage::{
    insert_leads, leads_for_employee, list_leads_with_assignees, lock_lead, scheduled_leads,
    update_lead, LeadChanges,
};
use super::types::{
    Lead, LeadWithAssignee, ScheduleLeadRequest, ScheduledLeadsQuery, UpdateLeadInfoRequest,
    UpdateLeadStatusRequest, UpdateLeadTypeRequest, UploadResponse,
};

/// The employee an edit is attributed to: the caller if named, otherwise
/// whoever holds the lead.
fn resolve_actor(
    conn: &mut PgConnection,
    employee_id: Option<&str>,
    lead: &Lead,
) -> Result<Option<Uuid>, ApiError> {
    match employee_id.map(str::trim).filter(|id| !id.is_empty()) {
        Some(identifier) => resolve_employee_id(conn, identifier).map(Some),
        None => Ok(lead.assigned_to),
    }
}

/// Locks the lead, lets `plan` derive the changes and activity details from
/// its current state, then writes both in one transaction.
fn edit_lead<F>(
    conn: &mut PgConnection,
    id: Uuid,
    employee_id: Option<String>,
    activity_type: ActivityType,
    plan: F,
) -> Result<Lead, ApiError>
where
    F: FnOnce(&Lead) -> Result<(LeadChanges, String), ApiError>,
{
    conn.transaction::<_, ApiError, _>(|conn| {
        let lead = lock_lead(conn, id)?;
        let (changes, details) = plan(&lead)?;
        let actor = resolve_actor(conn, employee_id.as_deref(), &lead)?;
        let updated = update_lead(conn, lead.id, &changes)?;
        insert_activity(conn, NewActivity::new(activity_type, actor, lead.id, details))?;
        Ok(updated)
    })
}

pub async fn handle_list_leads(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<LeadWithAssignee>>, ApiError> {
    let leads = run_blocking(&state.conn, |conn| Ok(list_leads_with_assignees(conn)?)).await?;
    Ok(Json(leads))
}

pub async fn handle_upload_leads(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, ApiError> {
    let mut file_bytes: Option<Vec<u8>> = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::validation(format!("Invalid upload: {e}")))?
    {
        if field.name() == Some("file") {
            let bytes = field
                .bytes()
                .await
                .map_err(|e| ApiError::validation(format!("Invalid upload: {e}")))?;
            file_bytes = Some(bytes.to_vec());
        }
    }

    let bytes = file_bytes.ok_or_else(|| ApiError::validation("No file uploaded."))?;
    let rows = parse_leads_csv(bytes.as_slice())
        .map_err(|e| ApiError::validation(format!("Invalid CSV: {e}")))?;

    let (leads, distribution) = run_blocking(&state.conn, move |conn| {
        let leads = insert_leads(conn, rows).map_err(|e| {
            error!("Bulk lead insert failed: {e}");
            ApiError::failed("Error saving leads", e)
        })?;
        let distribution = distribute_unassigned(conn)?;
        Ok((leads, distribution))
    })
    .await?;

    info!(
        "Imported {} lead(s); {} assigned in the follow-up distribution",
        leads.len(),
        distribution.assigned.len()
    );
    Ok(Json(UploadResponse {
        message: "Leads uploaded and distributed.".to_string(),
        leads,
        distribution,
    }))
}

pub async fn handle_distribute_leads(
    State(state): State<Arc<AppState>>,
) -> Result<Json<DistributionReport>, ApiError> {
    let report = run_blocking(&state.conn, |conn| Ok(distribute_unassigned(conn)?)).await?;
    Ok(Json(report))
}

pub async fn handle_employee_leads(
    State(state): State<Arc<AppState>>,
    Path(employee_id): Path<Uuid>,
) -> Result<Json<Vec<Lead>>, ApiError> {
    let leads =
        run_blocking(&state.conn, move |conn| Ok(leads_for_employee(conn, employee_id)?)).await?;
    Ok(Json(leads))
}

pub async fn handle_scheduled_leads(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ScheduledLeadsQuery>,
) -> Result<Json<Vec<Lead>>, ApiError> {
    let identifier = query
        .employee_id
        .filter(|id| !id.trim().is_empty())
        .ok_or_else(|| ApiError::validation("Missing employeeId"))?;

    let leads = run_blocking(&state.conn, move |conn| {
        let employee_id = resolve_employee_id(conn, &identifier)?;
        Ok(scheduled_leads(conn, employee_id)?)
    })
    .await?;
    Ok(Json(leads))
}

pub async fn handle_update_lead_type(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateLeadTypeRequest>,
) -> Result<Json<Lead>, ApiError> {
    let lead_type = request.lead_type;
    let lead = run_blocking(&state.conn, move |conn| {
        edit_lead(conn, id, request.employee_id, ActivityType::TypeChanged, |_| {
            Ok((
                LeadChanges::new().lead_type(lead_type),
                format!("Changed type to {lead_type}"),
            ))
        })
    })
    .await?;
    Ok(Json(lead))
}

pub async fn handle_update_lead_status(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateLeadStatusRequest>,
) -> Result<Json<Lead>, ApiError> {
    let status = request.status;
    let lead = run_blocking(&state.conn, move |conn| {
        edit_lead(conn, id, request.employee_id, ActivityType::StatusChanged, |lead| {
            lead.status
                .check_employee_transition(status)
                .map_err(ApiError::Validation)?;
            Ok((
                LeadChanges::new().status(status),
                format!("Changed status to {status}"),
            ))
        })
    })
    .await?;
    Ok(Json(lead))
}

pub async fn handle_schedule_lead(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(request): Json<ScheduleLeadRequest>,
) -> Result<Json<Lead>, ApiError> {
    if request.date.trim().is_empty() || request.time.trim().is_empty() {
        return Err(ApiError::validation("Date and time are required."));
    }
    let date = parse_ymd(&request.date).map_err(ApiError::Validation)?;
    let time = parse_hhmm(&request.time).map_err(ApiError::Validation)?;

    let lead = run_blocking(&state.conn, move |conn| {
        edit_lead(conn, id, request.employee_id, ActivityType::Scheduled, |_| {
            let details = format!("Scheduled call on {date} at {time}");
            Ok((
                LeadChanges::new().scheduled_date(date).scheduled_time(time),
                details,
            ))
        })
    })
    .await?;
    Ok(Json(lead))
}

pub async fn handle_update_lead_info(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateLeadInfoRequest>,
) -> Result<Json<Lead>, ApiError> {
    let fields = request.updated_fields();
    if fields.is_empty() {
        return Err(ApiError::validation("No valid fields to update."));
    }
    let date = non_blank(request.date.as_deref())
        .map(parse_ymd)
        .transpose()
        .map_err(ApiError::Validation)?;
    let time = non_blank(request.time.as_deref())
        .map(parse_hhmm)
        .transpose()
        .map_err(ApiError::Validation)?;
    let (lead_type, status) = (request.lead_type, request.status);

    let lead = run_blocking(&state.conn, move |conn| {
        edit_lead(conn, id, request.employee_id, ActivityType::LeadUpdated, |lead| {
            let mut changes = LeadChanges::new();
            if let Some(lead_type) = lead_type {
                changes = changes.lead_type(lead_type);
            }
            if let Some(status) = status {
                lead.status
                    .check_employee_transition(status)
                    .map_err(ApiError::Validation)?;
                changes = changes.status(status);
            }
            if let Some(date) = date {
                changes = changes.scheduled_date(date);
            }
            if let Some(time) = time {
                changes = changes.scheduled_time(time);
            }
            Ok((changes, format!("Updated fields: {}", fields.join(", "))))
        })
    })
    .await?;
    Ok(Json(lead))
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}
