use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::employees::EmployeeSummary;
use crate::leads::types::{Lead, LeadStatus};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ActivityType {
    Assigned,
    TypeChanged,
    StatusChanged,
    Scheduled,
    LeadUpdated,
}

impl ActivityType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Assigned => "assigned",
            Self::TypeChanged => "typeChanged",
            Self::StatusChanged => "statusChanged",
            Self::Scheduled => "scheduled",
            Self::LeadUpdated => "leadUpdated",
        }
    }
}

impl std::fmt::Display for ActivityType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ActivityType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "assigned" => Ok(Self::Assigned),
            "typeChanged" => Ok(Self::TypeChanged),
            "statusChanged" => Ok(Self::StatusChanged),
            "scheduled" => Ok(Self::Scheduled),
            "leadUpdated" => Ok(Self::LeadUpdated),
            other => Err(format!("Unknown activity type: {other}")),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Activity {
    pub id: Uuid,
    pub employee_id: Option<Uuid>,
    pub lead_id: Option<Uuid>,
    #[serde(rename = "type")]
    pub activity_type: ActivityType,
    pub details: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewActivity {
    pub employee_id: Option<Uuid>,
    pub lead_id: Option<Uuid>,
    pub activity_type: ActivityType,
    pub details: String,
}

impl NewActivity {
    pub fn new(
        activity_type: ActivityType,
        employee_id: Option<Uuid>,
        lead_id: Uuid,
        details: impl Into<String>,
    ) -> Self {
        Self {
            employee_id,
            lead_id: Some(lead_id),
            activity_type,
            details: details.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LeadSummary {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub status: LeadStatus,
}

impl From<&Lead> for LeadSummary {
    fn from(lead: &Lead) -> Self {
        Self {
            id: lead.id,
            name: lead.name.clone(),
            email: lead.email.clone(),
            status: lead.status,
        }
    }
}

/// An activity joined with the employee and lead it refers to.
#[derive(Debug, Clone, Serialize)]
pub struct ActivityEntry {
    #[serde(flatten)]
    pub activity: Activity,
    pub employee: Option<EmployeeSummary>,
    pub lead: Option<LeadSummary>,
}
