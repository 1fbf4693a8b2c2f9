use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::core::shared::schema::{attendance, breaks};

use super::types::{AttendanceRecord, BreakRecord};

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = attendance)]
pub struct DbAttendance {
    pub id: Uuid,
    pub employee_id: Uuid,
    pub work_date: String,
    pub check_in: Option<String>,
    pub check_out: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = attendance)]
pub struct NewDbAttendance {
    pub id: Uuid,
    pub employee_id: Uuid,
    pub work_date: String,
    pub check_in: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = breaks)]
pub struct DbBreak {
    pub id: Uuid,
    pub employee_id: Uuid,
    pub work_date: String,
    pub start_time: String,
    pub end_time: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = breaks)]
pub struct NewDbBreak {
    pub id: Uuid,
    pub employee_id: Uuid,
    pub work_date: String,
    pub start_time: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

fn db_attendance_to_record(db: DbAttendance) -> AttendanceRecord {
    AttendanceRecord {
        id: db.id,
        employee_id: db.employee_id,
        date: db.work_date,
        check_in: db.check_in,
        check_out: db.check_out,
        created_at: db.created_at,
        updated_at: db.updated_at,
    }
}

fn db_break_to_record(db: DbBreak) -> BreakRecord {
    BreakRecord {
        id: db.id,
        employee_id: db.employee_id,
        date: db.work_date,
        start: db.start_time,
        end: db.end_time,
        created_at: db.created_at,
        updated_at: db.updated_at,
    }
}

pub fn find_attendance(
    conn: &mut PgConnection,
    employee_id: Uuid,
    date: &str,
) -> QueryResult<Option<AttendanceRecord>> {
    Ok(attendance::table
        .filter(attendance::employee_id.eq(employee_id))
        .filter(attendance::work_date.eq(date))
        .select(DbAttendance::as_select())
        .first(conn)
        .optional()?
        .map(db_attendance_to_record))
}

/// Creates the day's row or overwrites its check-in time.
pub fn record_check_in(
    conn: &mut PgConnection,
    employee_id: Uuid,
    date: &str,
    time: &str,
) -> QueryResult<AttendanceRecord> {
    let now = Utc::now();
    let row = NewDbAttendance {
        id: Uuid::new_v4(),
        employee_id,
        work_date: date.to_string(),
        check_in: Some(time.to_string()),
        created_at: now,
        updated_at: now,
    };
    diesel::insert_into(attendance::table)
        .values(&row)
        .on_conflict((attendance::employee_id, attendance::work_date))
        .do_update()
        .set((
            attendance::check_in.eq(Some(time)),
            attendance::updated_at.eq(now),
        ))
        .returning(DbAttendance::as_returning())
        .get_result::<DbAttendance>(conn)
        .map(db_attendance_to_record)
}

/// Returns `None` when there is no row for that day.
pub fn record_check_out(
    conn: &mut PgConnection,
    employee_id: Uuid,
    date: &str,
    time: &str,
) -> QueryResult<Option<AttendanceRecord>> {
    Ok(diesel::update(
        attendance::table
            .filter(attendance::employee_id.eq(employee_id))
            .filter(attendance::work_date.eq(date)),
    )
    .set((
        attendance::check_out.eq(Some(time)),
        attendance::updated_at.eq(Utc::now()),
    ))
    .returning(DbAttendance::as_returning())
    .get_result::<DbAttendance>(conn)
    .optional()?
    .map(db_attendance_to_record))
}

/// The most recently opened break that has not ended.
pub fn open_break(
    conn: &mut PgConnection,
    employee_id: Uuid,
    date: &str,
) -> QueryResult<Option<BreakRecord>> {
    Ok(breaks::table
        .filter(breaks::employee_id.eq(employee_id))
        .filter(breaks::work_date.eq(date))
        .filter(breaks::end_time.is_null())
        .order(breaks::created_at.desc())
        .select(DbBreak::as_select())
        .first(conn)
        .optional()?
        .map(db_break_to_record))
}

pub fn start_break(
    conn: &mut PgConnection,
    employee_id: Uuid,
    date: &str,
    time: &str,
) -> QueryResult<BreakRecord> {
    let now = Utc::now();
    diesel::insert_into(breaks::table)
        .values(NewDbBreak {
            id: Uuid::new_v4(),
            employee_id,
            work_date: date.to_string(),
            start_time: time.to_string(),
            created_at: now,
            updated_at: now,
        })
        .returning(DbBreak::as_returning())
        .get_result::<DbBreak>(conn)
        .map(db_break_to_record)
}

pub fn end_break(conn: &mut PgConnection, break_id: Uuid, time: &str) -> QueryResult<BreakRecord> {
    diesel::update(breaks::table.find(break_id))
        .set((
            breaks::end_time.eq(Some(time)),
            breaks::updated_at.eq(Utc::now()),
        ))
        .returning(DbBreak::as_returning())
        .get_result::<DbBreak>(conn)
        .map(db_break_to_record)
}

pub fn list_breaks(
    conn: &mut PgConnection,
    employee_id: Uuid,
    date: Option<&str>,
) -> QueryResult<Vec<BreakRecord>> {
    let mut query = breaks::table
        .filter(breaks::employee_id.eq(employee_id))
        .select(DbBreak::as_select())
        .order(breaks::created_at.desc())
        .into_boxed();
    if let Some(date) = date {
        query = query.filter(breaks::work_date.eq(date.to_string()));
    }
    Ok(query
        .load::<DbBreak>(conn)?
        .into_iter()
        .map(db_break_to_record)
        .collect())
}
