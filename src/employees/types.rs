use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const EMPLOYEE_CODE_PREFIX: &str = "CON";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum EmployeeStatus {
    #[default]
    #[serde(alias = "active")]
    Active,
    #[serde(alias = "inactive")]
    Inactive,
}

impl std::fmt::Display for EmployeeStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Active => write!(f, "Active"),
            Self::Inactive => write!(f, "Inactive"),
        }
    }
}

impl std::str::FromStr for EmployeeStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "active" => Ok(Self::Active),
            "inactive" => Ok(Self::Inactive),
            other => Err(format!("Unknown employee status: {other}")),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Employee {
    pub id: Uuid,
    /// External code such as `CON1001`.
    pub employee_id: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub location: String,
    pub language: String,
    pub status: EmployeeStatus,
    pub avatar: String,
    pub assigned_leads: i64,
    pub closed_leads: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Employee {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }
}

/// Compact view embedded in lead and activity listings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeSummary {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub employee_id: String,
    pub avatar: String,
}

impl From<&Employee> for EmployeeSummary {
    fn from(e: &Employee) -> Self {
        Self {
            id: e.id,
            first_name: e.first_name.clone(),
            last_name: e.last_name.clone(),
            email: e.email.clone(),
            employee_id: e.employee_id.clone(),
            avatar: e.avatar.clone(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateEmployeeRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub location: Option<String>,
    pub language: Option<String>,
}

/// Validated form of [`CreateEmployeeRequest`].
#[derive(Debug, Clone, PartialEq)]
pub struct NewEmployeeFields {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub location: String,
    pub language: String,
}

impl CreateEmployeeRequest {
    pub fn validate(self) -> Result<NewEmployeeFields, String> {
        fn required(v: Option<String>) -> Option<String> {
            v.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
        }
        match (
            required(self.first_name),
            required(self.last_name),
            required(self.email),
            required(self.location),
            required(self.language),
        ) {
            (Some(first_name), Some(last_name), Some(email), Some(location), Some(language)) => {
                Ok(NewEmployeeFields {
                    first_name,
                    last_name,
                    email,
                    location,
                    language,
                })
            }
            _ => Err("All fields are required.".to_string()),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateEmployeeRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub location: Option<String>,
    pub language: Option<String>,
    pub status: Option<EmployeeStatus>,
    pub avatar: Option<String>,
}

impl UpdateEmployeeRequest {
    pub fn is_empty(&self) -> bool {
        self.first_name.is_none()
            && self.last_name.is_none()
            && self.email.is_none()
            && self.location.is_none()
            && self.language.is_none()
            && self.status.is_none()
            && self.avatar.is_none()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    pub email: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeStatusRequest {
    pub employee_id: Option<String>,
    pub status: Option<EmployeeStatus>,
}

#[derive(Debug, Clone, Serialize)]
pub struct EmployeeEnvelope {
    pub message: String,
    pub employee: Employee,
}

#[derive(Debug, Clone, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

pub fn format_employee_code(n: i64) -> String {
    format!("{EMPLOYEE_CODE_PREFIX}{n}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_display_and_parse() {
        assert_eq!(EmployeeStatus::Active.to_string(), "Active");
        assert_eq!("inactive".parse::<EmployeeStatus>(), Ok(EmployeeStatus::Inactive));
        assert_eq!(" ACTIVE ".parse::<EmployeeStatus>(), Ok(EmployeeStatus::Active));
        assert!("away".parse::<EmployeeStatus>().is_err());
    }

    #[test]
    fn test_status_deserialize_accepts_lowercase() {
        let s: EmployeeStatus = serde_json::from_str("\"inactive\"").unwrap();
        assert_eq!(s, EmployeeStatus::Inactive);
        let s: EmployeeStatus = serde_json::from_str("\"Active\"").unwrap();
        assert_eq!(s, EmployeeStatus::Active);
    }

    #[test]
    fn test_create_request_requires_all_fields() {
        let req = CreateEmployeeRequest {
            first_name: Some("Asha".into()),
            last_name: Some("Rao".into()),
            email: Some("asha@example.com".into()),
            location: Some("  ".into()),
            language: Some("Hindi".into()),
        };
        assert_eq!(req.validate().unwrap_err(), "All fields are required.");
    }

    #[test]
    fn test_create_request_trims() {
        let req = CreateEmployeeRequest {
            first_name: Some(" Asha ".into()),
            last_name: Some("Rao".into()),
            email: Some("asha@example.com".into()),
            location: Some("Delhi".into()),
            language: Some("Hindi".into()),
        };
        let fields = req.validate().unwrap();
        assert_eq!(fields.first_name, "Asha");
        assert_eq!(fields.location, "Delhi");
    }

    #[test]
    fn test_employee_code_format() {
        assert_eq!(format_employee_code(1001), "CON1001");
    }

    #[test]
    fn test_employee_serializes_camel_case() {
        let now = Utc::now();
        let employee = Employee {
            id: Uuid::nil(),
            employee_id: "CON1001".into(),
            first_name: "Asha".into(),
            last_name: "Rao".into(),
            email: "asha@example.com".into(),
            location: "Delhi".into(),
            language: "Hindi".into(),
            status: EmployeeStatus::Active,
            avatar: String::new(),
            assigned_leads: 0,
            closed_leads: 0,
            created_at: now,
            updated_at: now,
        };
        let json = serde_json::to_value(&employee).unwrap();
        assert_eq!(json["employeeId"], "CON1001");
        assert_eq!(json["firstName"], "Asha");
        assert_eq!(json["status"], "Active");
        assert_eq!(employee.full_name(), "Asha Rao");
    }
}
