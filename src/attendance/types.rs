use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::core::shared::utils::{now_hhmm, parse_hhmm, parse_ymd, today_ymd};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceRecord {
    pub id: Uuid,
    pub employee_id: Uuid,
    pub date: String,
    pub check_in: Option<String>,
    pub check_out: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BreakRecord {
    pub id: Uuid,
    pub employee_id: Uuid,
    pub date: String,
    pub start: String,
    pub end: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceQuery {
    pub employee_id: Option<String>,
    pub date: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClockRequest {
    pub employee_id: Option<String>,
    pub date: Option<String>,
    pub time: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToggleBreakRequest {
    pub employee_id: Option<String>,
    pub date: Option<String>,
    pub is_starting: Option<bool>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BreakStatus {
    BreakStarted,
    BreakEnded,
    AlreadyActive,
    NoActiveBreak,
}

impl BreakStatus {
    pub fn message(&self) -> &'static str {
        match self {
            Self::BreakStarted => "Break started",
            Self::BreakEnded => "Break ended",
            Self::AlreadyActive => "Break already active",
            Self::NoActiveBreak => "No active break found",
        }
    }
}

/// What a toggle request turns into once the open break is known.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BreakAction {
    Start,
    End,
    Reject(BreakStatus),
}

/// An explicit `is_starting` must agree with the current state; without it
/// the request flips whatever state the employee is in.
pub fn resolve_break_action(is_starting: Option<bool>, has_open_break: bool) -> BreakAction {
    match (is_starting, has_open_break) {
        (Some(true), true) => BreakAction::Reject(BreakStatus::AlreadyActive),
        (Some(false), false) => BreakAction::Reject(BreakStatus::NoActiveBreak),
        (Some(true), false) | (None, false) => BreakAction::Start,
        (Some(false), true) | (None, true) => BreakAction::End,
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ToggleBreakResponse {
    pub message: String,
    pub status: BreakStatus,
    #[serde(rename = "break", skip_serializing_if = "Option::is_none")]
    pub record: Option<BreakRecord>,
}

impl ToggleBreakResponse {
    pub fn new(status: BreakStatus, record: Option<BreakRecord>) -> Self {
        Self {
            message: status.message().to_string(),
            status,
            record,
        }
    }
}

pub fn required_identifier(employee_id: Option<String>) -> Result<String, String> {
    employee_id
        .map(|id| id.trim().to_string())
        .filter(|id| !id.is_empty())
        .ok_or_else(|| "employeeId required".to_string())
}

/// `YYYY-MM-DD`, defaulting to today.
pub fn date_or_today(date: Option<String>) -> Result<String, String> {
    match date.map(|d| d.trim().to_string()).filter(|d| !d.is_empty()) {
        None => Ok(today_ymd()),
        Some(d) => parse_ymd(&d),
    }
}

/// `HH:MM`, defaulting to now.
pub fn time_or_now(time: Option<String>) -> Result<String, String> {
    match time.map(|t| t.trim().to_string()).filter(|t| !t.is_empty()) {
        None => Ok(now_hhmm()),
        Some(t) => parse_hhmm(&t),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explicit_start_with_open_break_is_rejected() {
        assert_eq!(
            resolve_break_action(Some(true), true),
            BreakAction::Reject(BreakStatus::AlreadyActive)
        );
    }

    #[test]
    fn test_explicit_end_without_open_break_is_rejected() {
        assert_eq!(
            resolve_break_action(Some(false), false),
            BreakAction::Reject(BreakStatus::NoActiveBreak)
        );
    }

    #[test]
    fn test_explicit_requests_that_agree_with_state() {
        assert_eq!(resolve_break_action(Some(true), false), BreakAction::Start);
        assert_eq!(resolve_break_action(Some(false), true), BreakAction::End);
    }

    #[test]
    fn test_omitted_flag_toggles() {
        assert_eq!(resolve_break_action(None, false), BreakAction::Start);
        assert_eq!(resolve_break_action(None, true), BreakAction::End);
    }

    #[test]
    fn test_status_wire_names() {
        let json = serde_json::to_value(ToggleBreakResponse::new(BreakStatus::NoActiveBreak, None))
            .unwrap();
        assert_eq!(json["status"], "no_active_break");
        assert_eq!(json["message"], "No active break found");
        assert!(json.get("break").is_none());
    }

    #[test]
    fn test_identifier_is_required() {
        assert_eq!(required_identifier(None).unwrap_err(), "employeeId required");
        assert!(required_identifier(Some("  ".into())).is_err());
        assert_eq!(required_identifier(Some(" CON1001 ".into())).unwrap(), "CON1001");
    }

    #[test]
    fn test_date_defaults_and_validation() {
        assert_eq!(date_or_today(None).unwrap(), today_ymd());
        assert_eq!(date_or_today(Some("2024-02-29".into())).unwrap(), "2024-02-29");
        assert!(date_or_today(Some("29/02/2024".into())).is_err());
    }

    #[test]
    fn test_time_is_normalised() {
        assert_eq!(time_or_now(Some("9:05".into())).unwrap(), "09:05");
        assert!(time_or_now(Some("25:00".into())).is_err());
        assert_eq!(time_or_now(Some(String::new())).unwrap().len(), 5);
    }
}
