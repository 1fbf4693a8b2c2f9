use diesel::prelude::*;
use std::collections::HashMap;
use uuid::Uuid;

use crate::employees::storage::{lead_tallies, list_employees, LeadTally};
use crate::employees::Employee;
use crate::leads::storage::lead_status_rows;

use super::types::LeadPoint;

pub struct DashboardInputs {
    pub employees: Vec<Employee>,
    pub tallies: HashMap<Uuid, LeadTally>,
    pub leads: Vec<LeadPoint>,
}

pub fn load_lead_points(conn: &mut PgConnection) -> QueryResult<Vec<LeadPoint>> {
    Ok(lead_status_rows(conn)?
        .into_iter()
        .map(|(status, created_at)| LeadPoint {
            status: status.parse().unwrap_or_default(),
            created_at,
        })
        .collect())
}

pub fn load_dashboard_inputs(conn: &mut PgConnection) -> QueryResult<DashboardInputs> {
    let employees = list_employees(conn)?;
    let tallies = lead_tallies(conn)?;
    let leads = load_lead_points(conn)?;
    Ok(DashboardInputs {
        employees,
        tallies,
        leads,
    })
}
