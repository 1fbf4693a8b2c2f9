//! Lead distribution.
//!
//! Every unassigned lead is bound to exactly one employee using a three-tier
//! policy, evaluated against the full roster in roster order:
//!
//! 1. full match: same language and same location
//! 2. partial match: same language or same location
//! 3. equal distribution: the employee holding the fewest leads right now
//!
//! Matching is case-insensitive. Tier 3 reads live counts through an explicit
//! accessor each time it is reached, so leads assigned earlier in the same
//! batch are taken into account.

use diesel::{Connection, PgConnection};
use log::{error, info, warn};
use serde::Serialize;
use std::collections::HashMap;
use uuid::Uuid;

use crate::activities::storage::insert_activity;
use crate::activities::types::{ActivityType, NewActivity};
use crate::core::shared::error::ApiError;
use crate::employees::storage::load_roster;
use crate::employees::Employee;

use super::storage::{assign_lead, assignment_counts, unassigned_leads};
use super::types::Lead;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum MatchTier {
    FullMatch,
    PartialMatch,
    EqualDistribution,
}

impl MatchTier {
    pub fn reason(&self) -> &'static str {
        match self {
            Self::FullMatch => "full match",
            Self::PartialMatch => "partial match",
            Self::EqualDistribution => "equal distribution",
        }
    }

    /// Text stored on the `assigned` activity.
    pub fn details(&self) -> &'static str {
        match self {
            Self::FullMatch => "Lead assigned based on full match",
            Self::PartialMatch => "Lead assigned based on partial match",
            Self::EqualDistribution => "Lead assigned via equal distribution",
        }
    }
}

impl std::fmt::Display for MatchTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.reason())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Assignment {
    pub lead_id: Uuid,
    pub employee_id: Uuid,
    pub tier: MatchTier,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DistributionReport {
    /// Unassigned leads seen at the start of the run.
    pub considered: usize,
    pub assigned: Vec<Assignment>,
    /// Leads another run assigned between our read and our write.
    pub skipped: usize,
    /// Leads still unassigned when the run ended.
    pub remaining: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl DistributionReport {
    pub fn count(&self, tier: MatchTier) -> usize {
        self.assigned.iter().filter(|a| a.tier == tier).count()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum DistributionError {
    #[error("failed to load employee roster: {0}")]
    Roster(String),
    #[error("failed to load unassigned leads: {0}")]
    Leads(String),
}

impl From<DistributionError> for ApiError {
    fn from(err: DistributionError) -> Self {
        error!("Lead distribution could not start: {err}");
        ApiError::Database(err.to_string())
    }
}

/// Persistence seam for the batch driver.
pub trait AssignmentStore {
    type Error: std::fmt::Display;

    /// Full roster in creation order, regardless of status.
    fn roster(&mut self) -> Result<Vec<Employee>, Self::Error>;

    /// Leads without an assignee, in insertion order.
    fn unassigned_leads(&mut self) -> Result<Vec<Lead>, Self::Error>;

    /// Current number of leads held by each employee. Employees holding none
    /// may be absent.
    fn assignment_counts(&mut self) -> Result<HashMap<Uuid, i64>, Self::Error>;

    /// Writes the lead update and its `assigned` activity as one unit: on
    /// error neither is kept. Returns `false` without writing anything if the
    /// lead was no longer unassigned.
    fn record_assignment(&mut self, assignment: &Assignment) -> Result<bool, Self::Error>;
}

fn same_value(a: &str, b: &str) -> bool {
    !a.is_empty() && a.to_lowercase() == b.to_lowercase()
}

pub fn full_match<'a>(lead: &Lead, roster: &'a [Employee]) -> Option<&'a Employee> {
    roster.iter().find(|employee| {
        same_value(&lead.language, &employee.language)
            && same_value(&lead.location, &employee.location)
    })
}

pub fn partial_match<'a>(lead: &Lead, roster: &'a [Employee]) -> Option<&'a Employee> {
    roster.iter().find(|employee| {
        same_value(&lead.language, &employee.language)
            || same_value(&lead.location, &employee.location)
    })
}

/// Employee with the lowest count. Ties resolve to the earliest roster entry.
pub fn least_loaded<'a>(
    roster: &'a [Employee],
    counts: &HashMap<Uuid, i64>,
) -> Option<&'a Employee> {
    let mut ranked: Vec<(&Employee, i64)> = roster
        .iter()
        .map(|employee| (employee, counts.get(&employee.id).copied().unwrap_or(0)))
        .collect();
    ranked.sort_by_key(|(_, count)| *count);
    ranked.first().map(|(employee, _)| *employee)
}

/// Picks the employee for one lead. `load` is only invoked when neither
/// match tier applies.
pub fn select_assignee<'a, F, E>(
    lead: &Lead,
    roster: &'a [Employee],
    load: F,
) -> Result<Option<(&'a Employee, MatchTier)>, E>
where
    F: FnOnce() -> Result<HashMap<Uuid, i64>, E>,
{
    if roster.is_empty() {
        return Ok(None);
    }
    if let Some(employee) = full_match(lead, roster) {
        return Ok(Some((employee, MatchTier::FullMatch)));
    }
    if let Some(employee) = partial_match(lead, roster) {
        return Ok(Some((employee, MatchTier::PartialMatch)));
    }
    let counts = load()?;
    Ok(least_loaded(roster, &counts).map(|employee| (employee, MatchTier::EqualDistribution)))
}

/// Runs one distribution pass over every currently unassigned lead.
///
/// Assignments are persisted one by one. The first write failure ends the
/// pass: earlier assignments stay, the failing lead and everything after it
/// remain unassigned for the next run, and the report carries the error.
pub fn distribute<S: AssignmentStore>(store: &mut S) -> Result<DistributionReport, DistributionError> {
    let roster = store
        .roster()
        .map_err(|e| DistributionError::Roster(e.to_string()))?;
    let leads = store
        .unassigned_leads()
        .map_err(|e| DistributionError::Leads(e.to_string()))?;

    let mut report = DistributionReport {
        considered: leads.len(),
        ..Default::default()
    };

    if roster.is_empty() {
        if !leads.is_empty() {
            warn!(
                "No employees on the roster; {} lead(s) left unassigned",
                leads.len()
            );
        }
        report.remaining = leads.len();
        return Ok(report);
    }

    for lead in &leads {
        let outcome = select_assignee(lead, &roster, || store.assignment_counts()).and_then(
            |choice| match choice {
                Some((employee, tier)) => {
                    let assignment = Assignment {
                        lead_id: lead.id,
                        employee_id: employee.id,
                        tier,
                    };
                    store
                        .record_assignment(&assignment)
                        .map(|written| Some((assignment, written)))
                }
                None => Ok(None),
            },
        );

        match outcome {
            Ok(Some((assignment, true))) => report.assigned.push(assignment),
            Ok(Some((_, false))) => {
                warn!("Lead {} was assigned concurrently; skipping", lead.id);
                report.skipped += 1;
            }
            Ok(None) => {}
            Err(e) => {
                error!("Lead distribution stopped at lead {}: {e}", lead.id);
                report.error = Some(format!("Failed to assign lead {}: {e}", lead.id));
                break;
            }
        }
    }

    report.remaining = report.considered - report.assigned.len() - report.skipped;
    info!(
        "Distributed {} of {} lead(s): {} full match, {} partial match, {} equal distribution",
        report.assigned.len(),
        report.considered,
        report.count(MatchTier::FullMatch),
        report.count(MatchTier::PartialMatch),
        report.count(MatchTier::EqualDistribution),
    );
    Ok(report)
}

/// Diesel-backed store. The lead update and its activity commit together,
/// one assignment per transaction.
pub struct PgAssignmentStore<'c> {
    conn: &'c mut PgConnection,
}

impl<'c> PgAssignmentStore<'c> {
    pub fn new(conn: &'c mut PgConnection) -> Self {
        Self { conn }
    }
}

impl AssignmentStore for PgAssignmentStore<'_> {
    type Error = diesel::result::Error;

    fn roster(&mut self) -> Result<Vec<Employee>, Self::Error> {
        load_roster(self.conn)
    }

    fn unassigned_leads(&mut self) -> Result<Vec<Lead>, Self::Error> {
        unassigned_leads(self.conn)
    }

    fn assignment_counts(&mut self) -> Result<HashMap<Uuid, i64>, Self::Error> {
        assignment_counts(self.conn)
    }

    fn record_assignment(&mut self, assignment: &Assignment) -> Result<bool, Self::Error> {
        self.conn.transaction(|conn| {
            if !assign_lead(conn, assignment.lead_id, assignment.employee_id)? {
                return Ok(false);
            }
            insert_activity(
                conn,
                NewActivity::new(
                    ActivityType::Assigned,
                    Some(assignment.employee_id),
                    assignment.lead_id,
                    assignment.tier.details(),
                ),
            )?;
            Ok(true)
        })
    }
}

pub fn distribute_unassigned(conn: &mut PgConnection) -> Result<DistributionReport, DistributionError> {
    distribute(&mut PgAssignmentStore::new(conn))
}
