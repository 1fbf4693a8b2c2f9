use chrono::{DateTime, Utc};
use diesel::dsl::count_star;
use diesel::prelude::*;
use std::collections::HashMap;
use uuid::Uuid;

use crate::core::shared::error::ApiError;
use crate::core::shared::schema::leads;
use crate::employees::storage::get_employees_by_ids;
use crate::employees::EmployeeSummary;

use super::types::{ImportedLead, Lead, LeadStatus, LeadType, LeadWithAssignee};

pub const IMPORT_UPLOADER: &str = "admin";

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = leads)]
pub struct DbLead {
    pub id: Uuid,
    pub seq: i64,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub lead_date: String,
    pub language: String,
    pub location: String,
    pub lead_type: String,
    pub status: String,
    pub assigned_to: Option<Uuid>,
    pub scheduled_date: Option<String>,
    pub scheduled_time: Option<String>,
    pub uploaded_by: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = leads)]
pub struct NewDbLead {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub lead_date: String,
    pub language: String,
    pub location: String,
    pub lead_type: String,
    pub status: String,
    pub uploaded_by: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl NewDbLead {
    pub fn from_import(row: ImportedLead, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: row.name,
            email: row.email,
            phone: row.phone,
            lead_date: row.date,
            language: row.language,
            location: row.location,
            lead_type: row.lead_type.as_str().to_string(),
            status: LeadStatus::Unassigned.as_str().to_string(),
            uploaded_by: IMPORT_UPLOADER.to_string(),
            created_at: now,
            updated_at: now,
        }
    }
}

#[derive(Debug, Clone, Default, AsChangeset)]
#[diesel(table_name = leads)]
pub struct LeadChanges {
    pub lead_type: Option<String>,
    pub status: Option<String>,
    pub scheduled_date: Option<Option<String>>,
    pub scheduled_time: Option<Option<String>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl LeadChanges {
    pub fn new() -> Self {
        Self {
            updated_at: Some(Utc::now()),
            ..Default::default()
        }
    }

    pub fn lead_type(mut self, lead_type: LeadType) -> Self {
        self.lead_type = Some(lead_type.as_str().to_string());
        self
    }

    pub fn status(mut self, status: LeadStatus) -> Self {
        self.status = Some(status.as_str().to_string());
        self
    }

    pub fn scheduled_date(mut self, date: String) -> Self {
        self.scheduled_date = Some(Some(date));
        self
    }

    pub fn scheduled_time(mut self, time: String) -> Self {
        self.scheduled_time = Some(Some(time));
        self
    }
}

pub fn db_lead_to_lead(db: DbLead) -> Lead {
    Lead {
        id: db.id,
        name: db.name,
        email: db.email,
        phone: db.phone,
        date: db.lead_date,
        language: db.language,
        location: db.location,
        lead_type: LeadType::from_import(&db.lead_type),
        status: db.status.parse().unwrap_or_default(),
        assigned_to: db.assigned_to,
        scheduled_date: db.scheduled_date,
        scheduled_time: db.scheduled_time,
        uploaded_by: db.uploaded_by,
        created_at: db.created_at,
        updated_at: db.updated_at,
    }
}

fn lead_not_found() -> ApiError {
    ApiError::not_found("Lead not found")
}

/// Inserts all rows in one statement. Returned leads follow input order.
pub fn insert_leads(conn: &mut PgConnection, rows: Vec<ImportedLead>) -> QueryResult<Vec<Lead>> {
    if rows.is_empty() {
        return Ok(Vec::new());
    }
    let now = Utc::now();
    let new_rows: Vec<NewDbLead> = rows
        .into_iter()
        .map(|row| NewDbLead::from_import(row, now))
        .collect();

    let mut inserted: Vec<Lead> = diesel::insert_into(leads::table)
        .values(&new_rows)
        .returning(DbLead::as_returning())
        .get_results::<DbLead>(conn)?
        .into_iter()
        .map(db_lead_to_lead)
        .collect();

    let order: HashMap<Uuid, usize> = new_rows
        .iter()
        .enumerate()
        .map(|(position, row)| (row.id, position))
        .collect();
    inserted.sort_by_key(|lead| order.get(&lead.id).copied().unwrap_or(usize::MAX));
    Ok(inserted)
}

pub fn get_lead(conn: &mut PgConnection, id: Uuid) -> Result<Lead, ApiError> {
    leads::table
        .find(id)
        .select(DbLead::as_select())
        .first(conn)
        .optional()?
        .map(db_lead_to_lead)
        .ok_or_else(lead_not_found)
}

/// Reads a lead with a row lock held until the surrounding transaction ends.
pub fn lock_lead(conn: &mut PgConnection, id: Uuid) -> Result<Lead, ApiError> {
    leads::table
        .find(id)
        .select(DbLead::as_select())
        .for_update()
        .get_result::<DbLead>(conn)
        .optional()?
        .map(db_lead_to_lead)
        .ok_or_else(lead_not_found)
}

pub fn get_leads_by_ids(conn: &mut PgConnection, ids: &[Uuid]) -> QueryResult<HashMap<Uuid, Lead>> {
    if ids.is_empty() {
        return Ok(HashMap::new());
    }
    let rows: Vec<DbLead> = leads::table
        .filter(leads::id.eq_any(ids))
        .select(DbLead::as_select())
        .load(conn)?;
    Ok(rows
        .into_iter()
        .map(|row| (row.id, db_lead_to_lead(row)))
        .collect())
}

pub fn list_leads(conn: &mut PgConnection) -> QueryResult<Vec<Lead>> {
    let rows: Vec<DbLead> = leads::table
        .select(DbLead::as_select())
        .order((leads::created_at.desc(), leads::seq.desc()))
        .load(conn)?;
    Ok(rows.into_iter().map(db_lead_to_lead).collect())
}

pub fn list_leads_with_assignees(conn: &mut PgConnection) -> QueryResult<Vec<LeadWithAssignee>> {
    let leads = list_leads(conn)?;
    let mut assignee_ids: Vec<Uuid> = leads.iter().filter_map(|l| l.assigned_to).collect();
    assignee_ids.sort_unstable();
    assignee_ids.dedup();
    let employees = get_employees_by_ids(conn, &assignee_ids)?;

    Ok(leads
        .into_iter()
        .map(|lead| {
            let assignee = lead
                .assigned_to
                .and_then(|id| employees.get(&id))
                .map(EmployeeSummary::from);
            LeadWithAssignee { lead, assignee }
        })
        .collect())
}

pub fn leads_for_employee(conn: &mut PgConnection, employee_id: Uuid) -> QueryResult<Vec<Lead>> {
    let rows: Vec<DbLead> = leads::table
        .filter(leads::assigned_to.eq(employee_id))
        .select(DbLead::as_select())
        .order((leads::created_at.desc(), leads::seq.desc()))
        .load(conn)?;
    Ok(rows.into_iter().map(db_lead_to_lead).collect())
}

/// Leads an employee should follow up on: anything with a scheduled date,
/// plus every Hot lead.
pub fn scheduled_leads(conn: &mut PgConnection, employee_id: Uuid) -> QueryResult<Vec<Lead>> {
    let rows: Vec<DbLead> = leads::table
        .filter(leads::assigned_to.eq(employee_id))
        .filter(
            leads::scheduled_date
                .is_not_null()
                .or(leads::lead_type.eq(LeadType::Hot.as_str())),
        )
        .select(DbLead::as_select())
        .order((
            leads::scheduled_date.asc().nulls_last(),
            leads::created_at.desc(),
        ))
        .load(conn)?;
    Ok(rows.into_iter().map(db_lead_to_lead).collect())
}

/// Leads with no assignee, in insertion order.
pub fn unassigned_leads(conn: &mut PgConnection) -> QueryResult<Vec<Lead>> {
    let rows: Vec<DbLead> = leads::table
        .filter(leads::assigned_to.is_null())
        .select(DbLead::as_select())
        .order(leads::seq.asc())
        .load(conn)?;
    Ok(rows.into_iter().map(db_lead_to_lead).collect())
}

pub fn count_unassigned(conn: &mut PgConnection) -> QueryResult<i64> {
    leads::table
        .filter(leads::assigned_to.is_null())
        .count()
        .get_result(conn)
}

/// Count of leads per assignee across the whole table.
pub fn assignment_counts(conn: &mut PgConnection) -> QueryResult<HashMap<Uuid, i64>> {
    let rows: Vec<(Option<Uuid>, i64)> = leads::table
        .filter(leads::assigned_to.is_not_null())
        .group_by(leads::assigned_to)
        .select((leads::assigned_to, count_star()))
        .load(conn)?;
    Ok(rows
        .into_iter()
        .filter_map(|(assignee, count)| assignee.map(|id| (id, count)))
        .collect())
}

/// Binds a lead to an employee if it is still unassigned. Returns whether
/// the row changed.
pub fn assign_lead(conn: &mut PgConnection, lead_id: Uuid, employee_id: Uuid) -> QueryResult<bool> {
    let updated = diesel::update(
        leads::table
            .find(lead_id)
            .filter(leads::assigned_to.is_null()),
    )
    .set((
        leads::assigned_to.eq(Some(employee_id)),
        leads::status.eq(LeadStatus::Assigned.as_str()),
        leads::updated_at.eq(Utc::now()),
    ))
    .execute(conn)?;
    Ok(updated > 0)
}

pub fn update_lead(
    conn: &mut PgConnection,
    id: Uuid,
    changes: &LeadChanges,
) -> Result<Lead, ApiError> {
    diesel::update(leads::table.find(id))
        .set(changes)
        .returning(DbLead::as_returning())
        .get_result(conn)
        .optional()?
        .map(db_lead_to_lead)
        .ok_or_else(lead_not_found)
}

/// `(status, created_at)` for every lead, used by dashboard aggregation.
pub fn lead_status_rows(conn: &mut PgConnection) -> QueryResult<Vec<(String, DateTime<Utc>)>> {
    leads::table
        .select((leads::status, leads::created_at))
        .load(conn)
}
