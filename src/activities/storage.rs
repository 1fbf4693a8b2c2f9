use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::core::shared::schema::activities;
use crate::employees::storage::get_employees_by_ids;
use crate::employees::EmployeeSummary;
use crate::leads::storage::get_leads_by_ids;

use super::types::{Activity, ActivityEntry, ActivityType, LeadSummary, NewActivity};

pub const RECENT_ACTIVITY_LIMIT: i64 = 20;

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = activities)]
pub struct DbActivity {
    pub id: Uuid,
    pub employee_id: Option<Uuid>,
    pub lead_id: Option<Uuid>,
    pub activity_type: String,
    pub details: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = activities)]
pub struct NewDbActivity {
    pub id: Uuid,
    pub employee_id: Option<Uuid>,
    pub lead_id: Option<Uuid>,
    pub activity_type: String,
    pub details: String,
    pub created_at: DateTime<Utc>,
}

impl From<NewActivity> for NewDbActivity {
    fn from(activity: NewActivity) -> Self {
        Self {
            id: Uuid::new_v4(),
            employee_id: activity.employee_id,
            lead_id: activity.lead_id,
            activity_type: activity.activity_type.as_str().to_string(),
            details: activity.details,
            created_at: Utc::now(),
        }
    }
}

/// Rows with an unrecognised type tag are dropped rather than failing the
/// whole listing.
fn db_activity_to_activity(db: DbActivity) -> Option<Activity> {
    let activity_type: ActivityType = match db.activity_type.parse() {
        Ok(t) => t,
        Err(e) => {
            log::warn!("Skipping activity {}: {e}", db.id);
            return None;
        }
    };
    Some(Activity {
        id: db.id,
        employee_id: db.employee_id,
        lead_id: db.lead_id,
        activity_type,
        details: db.details,
        created_at: db.created_at,
    })
}

pub fn insert_activity(conn: &mut PgConnection, activity: NewActivity) -> QueryResult<()> {
    diesel::insert_into(activities::table)
        .values(NewDbActivity::from(activity))
        .execute(conn)?;
    Ok(())
}

fn attach_references(
    conn: &mut PgConnection,
    rows: Vec<DbActivity>,
) -> QueryResult<Vec<ActivityEntry>> {
    let activities: Vec<Activity> = rows.into_iter().filter_map(db_activity_to_activity).collect();

    let mut employee_ids: Vec<Uuid> = activities.iter().filter_map(|a| a.employee_id).collect();
    employee_ids.sort_unstable();
    employee_ids.dedup();
    let mut lead_ids: Vec<Uuid> = activities.iter().filter_map(|a| a.lead_id).collect();
    lead_ids.sort_unstable();
    lead_ids.dedup();

    let employees = get_employees_by_ids(conn, &employee_ids)?;
    let leads = get_leads_by_ids(conn, &lead_ids)?;

    Ok(activities
        .into_iter()
        .map(|activity| {
            let employee = activity
                .employee_id
                .and_then(|id| employees.get(&id))
                .map(EmployeeSummary::from);
            let lead = activity
                .lead_id
                .and_then(|id| leads.get(&id))
                .map(LeadSummary::from);
            ActivityEntry {
                activity,
                employee,
                lead,
            }
        })
        .collect())
}

pub fn list_activities(conn: &mut PgConnection) -> QueryResult<Vec<ActivityEntry>> {
    let rows: Vec<DbActivity> = activities::table
        .select(DbActivity::as_select())
        .order(activities::created_at.desc())
        .load(conn)?;
    attach_references(conn, rows)
}

pub fn recent_for_employee(
    conn: &mut PgConnection,
    employee_id: Uuid,
) -> QueryResult<Vec<ActivityEntry>> {
    let rows: Vec<DbActivity> = activities::table
        .filter(activities::employee_id.eq(employee_id))
        .select(DbActivity::as_select())
        .order(activities::created_at.desc())
        .limit(RECENT_ACTIVITY_LIMIT)
        .load(conn)?;
    attach_references(conn, rows)
}

/// Number of `assigned` activities recorded for a lead.
pub fn count_assignment_activities(conn: &mut PgConnection, lead_id: Uuid) -> QueryResult<i64> {
    activities::table
        .filter(activities::lead_id.eq(lead_id))
        .filter(activities::activity_type.eq(ActivityType::Assigned.as_str()))
        .count()
        .get_result(conn)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(activity_type: &str) -> DbActivity {
        DbActivity {
            id: Uuid::new_v4(),
            employee_id: Some(Uuid::new_v4()),
            lead_id: Some(Uuid::new_v4()),
            activity_type: activity_type.to_string(),
            details: "Lead assigned based on full match".to_string(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_known_type_converts() {
        let activity = db_activity_to_activity(row("assigned")).unwrap();
        assert_eq!(activity.activity_type, ActivityType::Assigned);
    }

    #[test]
    fn test_unknown_type_is_skipped() {
        assert!(db_activity_to_activity(row("teleported")).is_none());
    }

    #[test]
    fn test_new_activity_stores_wire_tag() {
        let lead_id = Uuid::new_v4();
        let db = NewDbActivity::from(NewActivity::new(
            ActivityType::StatusChanged,
            None,
            lead_id,
            "Changed status to closed",
        ));
        assert_eq!(db.activity_type, "statusChanged");
        assert_eq!(db.lead_id, Some(lead_id));
        assert!(db.employee_id.is_none());
    }
}
