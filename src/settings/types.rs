use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AdminProfile {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAdminRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdminFields {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
}

impl UpdateAdminRequest {
    pub fn validate(self) -> Result<AdminFields, String> {
        let field = |v: Option<String>| v.map(|s| s.trim().to_string()).filter(|s| !s.is_empty());
        match (field(self.first_name), field(self.last_name), field(self.email)) {
            (Some(first_name), Some(last_name), Some(email)) => Ok(AdminFields {
                first_name,
                last_name,
                email,
            }),
            _ => Err("firstName, lastName and email are required".to_string()),
        }
    }
}

/// Whether an upsert touched the existing row or created the first one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Upsert {
    Updated,
    Created,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_fields_required() {
        let req = UpdateAdminRequest {
            first_name: Some("Neha".into()),
            last_name: None,
            email: Some("neha@example.com".into()),
        };
        assert_eq!(
            req.validate().unwrap_err(),
            "firstName, lastName and email are required"
        );
    }

    #[test]
    fn test_fields_are_trimmed() {
        let req: UpdateAdminRequest = serde_json::from_str(
            r#"{"firstName":" Neha ","lastName":"Shah","email":"neha@example.com"}"#,
        )
        .unwrap();
        let fields = req.validate().unwrap();
        assert_eq!(fields.first_name, "Neha");
        assert_eq!(fields.email, "neha@example.com");
    }
}
