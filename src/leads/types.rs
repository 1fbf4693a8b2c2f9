use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::employees::EmployeeSummary;

use super::distributor::DistributionReport;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum LeadStatus {
    #[default]
    #[serde(rename = "unassigned", alias = "Unassigned")]
    Unassigned,
    #[serde(rename = "assigned", alias = "Assigned")]
    Assigned,
    #[serde(rename = "Ongoing", alias = "ongoing")]
    Ongoing,
    #[serde(rename = "closed", alias = "Closed")]
    Closed,
}

impl LeadStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unassigned => "unassigned",
            Self::Assigned => "assigned",
            Self::Ongoing => "Ongoing",
            Self::Closed => "closed",
        }
    }

    /// Transitions an employee may make from the app. Assignment itself is
    /// reserved to the distributor and a closed lead stays closed.
    pub fn check_employee_transition(self, target: LeadStatus) -> Result<(), String> {
        match (self, target) {
            (_, Self::Unassigned | Self::Assigned) => Err(format!(
                "Status '{}' can only be set by lead distribution",
                target.as_str()
            )),
            (Self::Unassigned, _) => {
                Err("Lead must be assigned before its status can change".to_string())
            }
            (Self::Closed, Self::Closed) => Ok(()),
            (Self::Closed, _) => Err("Closed leads cannot be reopened".to_string()),
            (Self::Assigned | Self::Ongoing, Self::Ongoing | Self::Closed) => Ok(()),
        }
    }
}

impl std::fmt::Display for LeadStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for LeadStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "unassigned" => Ok(Self::Unassigned),
            "assigned" => Ok(Self::Assigned),
            "ongoing" => Ok(Self::Ongoing),
            "closed" => Ok(Self::Closed),
            other => Err(format!("Unknown lead status: {other}")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum LeadType {
    #[serde(alias = "hot")]
    Hot,
    #[default]
    #[serde(alias = "warm")]
    Warm,
    #[serde(alias = "cold")]
    Cold,
}

impl LeadType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Hot => "Hot",
            Self::Warm => "Warm",
            Self::Cold => "Cold",
        }
    }

    /// Lenient parse used for imported rows: anything unrecognised is Warm.
    pub fn from_import(value: &str) -> Self {
        value.parse().unwrap_or_default()
    }
}

impl std::fmt::Display for LeadType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for LeadType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "hot" => Ok(Self::Hot),
            "warm" => Ok(Self::Warm),
            "cold" => Ok(Self::Cold),
            other => Err(format!("Unknown lead type: {other}")),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Lead {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub date: String,
    pub language: String,
    pub location: String,
    #[serde(rename = "type")]
    pub lead_type: LeadType,
    pub status: LeadStatus,
    pub assigned_to: Option<Uuid>,
    pub scheduled_date: Option<String>,
    pub scheduled_time: Option<String>,
    pub uploaded_by: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Lead {
    pub fn is_unassigned(&self) -> bool {
        self.assigned_to.is_none()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct LeadWithAssignee {
    #[serde(flatten)]
    pub lead: Lead,
    pub assignee: Option<EmployeeSummary>,
}

/// One parsed CSV row, not yet persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportedLead {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub date: String,
    pub language: String,
    pub location: String,
    pub lead_type: LeadType,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateLeadTypeRequest {
    #[serde(rename = "type")]
    pub lead_type: LeadType,
    pub employee_id: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateLeadStatusRequest {
    pub status: LeadStatus,
    pub employee_id: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleLeadRequest {
    pub date: String,
    pub time: String,
    pub employee_id: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateLeadInfoRequest {
    #[serde(rename = "type")]
    pub lead_type: Option<LeadType>,
    pub status: Option<LeadStatus>,
    pub date: Option<String>,
    pub time: Option<String>,
    pub employee_id: Option<String>,
}

impl UpdateLeadInfoRequest {
    /// Names of the fields this request would change, in a stable order.
    pub fn updated_fields(&self) -> Vec<&'static str> {
        let mut fields = Vec::new();
        if self.lead_type.is_some() {
            fields.push("type");
        }
        if self.status.is_some() {
            fields.push("status");
        }
        if self.date.as_deref().is_some_and(|d| !d.trim().is_empty()) {
            fields.push("date");
        }
        if self.time.as_deref().is_some_and(|t| !t.trim().is_empty()) {
            fields.push("time");
        }
        fields
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduledLeadsQuery {
    pub employee_id: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct UploadResponse {
    pub message: String,
    pub leads: Vec<Lead>,
    pub distribution: DistributionReport,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_wire_names() {
        assert_eq!(
            serde_json::to_string(&LeadStatus::Unassigned).unwrap(),
            "\"unassigned\""
        );
        assert_eq!(
            serde_json::to_string(&LeadStatus::Ongoing).unwrap(),
            "\"Ongoing\""
        );
        let closed: LeadStatus = serde_json::from_str("\"Closed\"").unwrap();
        assert_eq!(closed, LeadStatus::Closed);
    }

    #[test]
    fn test_employee_transitions() {
        use LeadStatus::*;
        assert!(Assigned.check_employee_transition(Ongoing).is_ok());
        assert!(Assigned.check_employee_transition(Closed).is_ok());
        assert!(Ongoing.check_employee_transition(Closed).is_ok());
        assert!(Ongoing.check_employee_transition(Ongoing).is_ok());
        assert!(Closed.check_employee_transition(Ongoing).is_err());
        assert!(Unassigned.check_employee_transition(Ongoing).is_err());
        assert!(Ongoing.check_employee_transition(Unassigned).is_err());
        assert!(Ongoing.check_employee_transition(Assigned).is_err());
    }

    #[test]
    fn test_lead_type_import_defaults_to_warm() {
        assert_eq!(LeadType::from_import("hot"), LeadType::Hot);
        assert_eq!(LeadType::from_import(" COLD "), LeadType::Cold);
        assert_eq!(LeadType::from_import(""), LeadType::Warm);
        assert_eq!(LeadType::from_import("lukewarm"), LeadType::Warm);
    }

    #[test]
    fn test_updated_fields_order() {
        let req = UpdateLeadInfoRequest {
            time: Some("10:30".into()),
            status: Some(LeadStatus::Ongoing),
            date: Some(String::new()),
            ..Default::default()
        };
        assert_eq!(req.updated_fields(), vec!["status", "time"]);
        assert!(UpdateLeadInfoRequest::default().updated_fields().is_empty());
    }

    #[test]
    fn test_lead_type_field_is_named_type() {
        let req: UpdateLeadTypeRequest =
            serde_json::from_str(r#"{"type":"hot","employeeId":"CON1001"}"#).unwrap();
        assert_eq!(req.lead_type, LeadType::Hot);
        assert_eq!(req.employee_id.as_deref(), Some("CON1001"));
    }
}
