use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel::sql_types::BigInt;
use std::collections::HashMap;
use uuid::Uuid;

use crate::core::shared::error::ApiError;
use crate::core::shared::schema::{employees, leads};
use crate::leads::types::LeadStatus;

use super::types::{
    format_employee_code, Employee, EmployeeStatus, NewEmployeeFields, UpdateEmployeeRequest,
};

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = employees)]
pub struct DbEmployee {
    pub id: Uuid,
    pub seq: i64,
    pub employee_code: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub location: String,
    pub language: String,
    pub status: String,
    pub avatar: String,
    pub assigned_leads: i32,
    pub closed_leads: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = employees)]
pub struct NewDbEmployee {
    pub id: Uuid,
    pub employee_code: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub location: String,
    pub language: String,
    pub status: String,
    pub avatar: String,
    pub assigned_leads: i32,
    pub closed_leads: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, AsChangeset)]
#[diesel(table_name = employees)]
pub struct EmployeeChanges {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub location: Option<String>,
    pub language: Option<String>,
    pub status: Option<String>,
    pub avatar: Option<String>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl From<UpdateEmployeeRequest> for EmployeeChanges {
    fn from(req: UpdateEmployeeRequest) -> Self {
        Self {
            first_name: req.first_name,
            last_name: req.last_name,
            email: req.email,
            location: req.location,
            language: req.language,
            status: req.status.map(|s| s.to_string()),
            avatar: req.avatar,
            updated_at: Some(Utc::now()),
        }
    }
}

#[derive(QueryableByName)]
struct SequenceValue {
    #[diesel(sql_type = BigInt)]
    value: i64,
}

/// Live per-employee lead counts derived from the leads table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LeadTally {
    pub assigned: i64,
    pub closed: i64,
}

pub fn db_employee_to_employee(db: DbEmployee) -> Employee {
    Employee {
        id: db.id,
        employee_id: db.employee_code,
        first_name: db.first_name,
        last_name: db.last_name,
        email: db.email,
        location: db.location,
        language: db.language,
        status: db.status.parse().unwrap_or_default(),
        avatar: db.avatar,
        assigned_leads: i64::from(db.assigned_leads),
        closed_leads: i64::from(db.closed_leads),
        created_at: db.created_at,
        updated_at: db.updated_at,
    }
}

fn employee_not_found() -> ApiError {
    ApiError::not_found("Employee not found")
}

pub fn list_employees(conn: &mut PgConnection) -> QueryResult<Vec<Employee>> {
    let rows: Vec<DbEmployee> = employees::table
        .select(DbEmployee::as_select())
        .order((employees::created_at.desc(), employees::seq.desc()))
        .load(conn)?;
    Ok(rows.into_iter().map(db_employee_to_employee).collect())
}

/// Every employee in creation order. Status is deliberately not filtered.
pub fn load_roster(conn: &mut PgConnection) -> QueryResult<Vec<Employee>> {
    let rows: Vec<DbEmployee> = employees::table
        .select(DbEmployee::as_select())
        .order(employees::seq.asc())
        .load(conn)?;
    Ok(rows.into_iter().map(db_employee_to_employee).collect())
}

pub fn get_employee(conn: &mut PgConnection, id: Uuid) -> Result<Employee, ApiError> {
    employees::table
        .find(id)
        .select(DbEmployee::as_select())
        .first(conn)
        .optional()?
        .map(db_employee_to_employee)
        .ok_or_else(employee_not_found)
}

pub fn get_employees_by_ids(
    conn: &mut PgConnection,
    ids: &[Uuid],
) -> QueryResult<HashMap<Uuid, Employee>> {
    if ids.is_empty() {
        return Ok(HashMap::new());
    }
    let rows: Vec<DbEmployee> = employees::table
        .filter(employees::id.eq_any(ids))
        .select(DbEmployee::as_select())
        .load(conn)?;
    Ok(rows
        .into_iter()
        .map(|row| (row.id, db_employee_to_employee(row)))
        .collect())
}

pub fn find_by_email(conn: &mut PgConnection, email: &str) -> QueryResult<Option<Employee>> {
    Ok(employees::table
        .filter(employees::email.eq(email.trim()))
        .select(DbEmployee::as_select())
        .first(conn)
        .optional()?
        .map(db_employee_to_employee))
}

/// Accepts either the internal UUID or the external `CON…` code.
pub fn resolve_employee_id(conn: &mut PgConnection, identifier: &str) -> Result<Uuid, ApiError> {
    let identifier = identifier.trim();
    let found = match Uuid::parse_str(identifier) {
        Ok(id) => employees::table
            .find(id)
            .select(employees::id)
            .first::<Uuid>(conn)
            .optional()?,
        Err(_) => employees::table
            .filter(employees::employee_code.eq(identifier))
            .select(employees::id)
            .first::<Uuid>(conn)
            .optional()?,
    };
    found.ok_or_else(|| {
        ApiError::not_found(format!("Employee not found for identifier: {identifier}"))
    })
}

pub fn next_employee_code(conn: &mut PgConnection) -> QueryResult<String> {
    let row: SequenceValue =
        diesel::sql_query("SELECT nextval('employee_code_seq') AS value").get_result(conn)?;
    Ok(format_employee_code(row.value))
}

pub fn insert_employee(
    conn: &mut PgConnection,
    fields: NewEmployeeFields,
) -> Result<Employee, ApiError> {
    let now = Utc::now();
    let new_employee = NewDbEmployee {
        id: Uuid::new_v4(),
        employee_code: next_employee_code(conn)?,
        first_name: fields.first_name,
        last_name: fields.last_name,
        email: fields.email,
        location: fields.location,
        language: fields.language,
        status: EmployeeStatus::Active.to_string(),
        avatar: String::new(),
        assigned_leads: 0,
        closed_leads: 0,
        created_at: now,
        updated_at: now,
    };

    let row: DbEmployee = diesel::insert_into(employees::table)
        .values(&new_employee)
        .returning(DbEmployee::as_returning())
        .get_result(conn)?;
    Ok(db_employee_to_employee(row))
}

pub fn update_employee(
    conn: &mut PgConnection,
    id: Uuid,
    changes: EmployeeChanges,
) -> Result<Employee, ApiError> {
    diesel::update(employees::table.find(id))
        .set(&changes)
        .returning(DbEmployee::as_returning())
        .get_result(conn)
        .optional()?
        .map(db_employee_to_employee)
        .ok_or_else(employee_not_found)
}

pub fn set_status(
    conn: &mut PgConnection,
    id: Uuid,
    status: EmployeeStatus,
) -> Result<Employee, ApiError> {
    update_employee(
        conn,
        id,
        EmployeeChanges {
            status: Some(status.to_string()),
            updated_at: Some(Utc::now()),
            ..Default::default()
        },
    )
}

pub fn set_status_by_email(
    conn: &mut PgConnection,
    email: &str,
    status: EmployeeStatus,
) -> Result<Employee, ApiError> {
    let employee = find_by_email(conn, email)?.ok_or_else(employee_not_found)?;
    set_status(conn, employee.id, status)
}

/// Deletes an employee and returns their leads to the unassigned pool so a
/// lead never keeps an `assigned` status without an assignee.
pub fn delete_employee(conn: &mut PgConnection, id: Uuid) -> Result<usize, ApiError> {
    conn.transaction::<_, ApiError, _>(|conn| {
        let released = diesel::update(leads::table.filter(leads::assigned_to.eq(id)))
            .set((
                leads::assigned_to.eq(None::<Uuid>),
                leads::status.eq(LeadStatus::Unassigned.as_str()),
                leads::updated_at.eq(Utc::now()),
            ))
            .execute(conn)?;
        let deleted = diesel::delete(employees::table.find(id)).execute(conn)?;
        if deleted == 0 {
            return Err(employee_not_found());
        }
        Ok(released)
    })
}

pub fn tally_leads<I>(rows: I) -> HashMap<Uuid, LeadTally>
where
    I: IntoIterator<Item = (Uuid, String)>,
{
    let mut tallies: HashMap<Uuid, LeadTally> = HashMap::new();
    for (employee_id, status) in rows {
        let tally = tallies.entry(employee_id).or_default();
        tally.assigned += 1;
        if status.eq_ignore_ascii_case(LeadStatus::Closed.as_str()) {
            tally.closed += 1;
        }
    }
    tallies
}

pub fn lead_tallies(conn: &mut PgConnection) -> QueryResult<HashMap<Uuid, LeadTally>> {
    let rows: Vec<(Option<Uuid>, String)> = leads::table
        .filter(leads::assigned_to.is_not_null())
        .select((leads::assigned_to, leads::status))
        .load(conn)?;
    Ok(tally_leads(
        rows.into_iter()
            .filter_map(|(assignee, status)| assignee.map(|id| (id, status))),
    ))
}

/// Replaces the stored informational counters with live aggregated counts.
pub fn with_live_counts(
    employees: Vec<Employee>,
    tallies: &HashMap<Uuid, LeadTally>,
) -> Vec<Employee> {
    employees
        .into_iter()
        .map(|mut employee| {
            let tally = tallies.get(&employee.id).copied().unwrap_or_default();
            employee.assigned_leads = tally.assigned;
            employee.closed_leads = tally.closed;
            employee
        })
        .collect()
}
