pub mod distributor;
pub mod handlers;
pub mod import;
pub mod storage;
pub mod types;

use axum::{
    routing::{get, post, put},
    Router,
};
use std::sync::Arc;

use crate::core::shared::state::AppState;

pub use distributor::{distribute, AssignmentStore, DistributionReport, MatchTier};
pub use handlers::*;
pub use types::*;

pub fn configure_lead_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/leads", get(handle_list_leads))
        .route("/api/leads/upload", post(handle_upload_leads))
        .route("/api/leads/distribute", post(handle_distribute_leads))
        .route("/api/leads/scheduled", get(handle_scheduled_leads))
        .route("/api/leads/employee/:id", get(handle_employee_leads))
        .route("/api/leads/update/:id", put(handle_update_lead_info))
        .route("/api/leads/:id/type", put(handle_update_lead_type))
        .route("/api/leads/:id/status", put(handle_update_lead_status))
        .route("/api/leads/:id/schedule", put(handle_schedule_lead))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::shared::test_utils::{
        create_lazy_app_state, empty_request, json_request, read_json,
    };
    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use tower::ServiceExt;

    const BOUNDARY: &str = "crm-test-boundary";

    fn app() -> Router {
        configure_lead_routes().with_state(create_lazy_app_state())
    }

    fn multipart_request(field: &str, content: &[u8]) -> Request<Body> {
        let mut body = format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{field}\"; filename=\"leads.csv\"\r\nContent-Type: text/csv\r\n\r\n"
        )
        .into_bytes();
        body.extend_from_slice(content);
        body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());

        Request::builder()
            .method("POST")
            .uri("/api/leads/upload")
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(body))
            .unwrap()
    }

    #[tokio::test]
    async fn test_upload_without_file_field_is_rejected() {
        let response = app()
            .oneshot(multipart_request("attachment", b"name\nA\n"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = read_json(response).await;
        assert_eq!(body["message"], "No file uploaded.");
    }

    #[tokio::test]
    async fn test_upload_with_unreadable_csv_is_rejected() {
        let response = app()
            .oneshot(multipart_request("file", b"name\n\xff\xfe\n"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = read_json(response).await;
        assert!(body["message"].as_str().unwrap().starts_with("Invalid CSV"));
    }

    #[tokio::test]
    async fn test_scheduled_requires_employee_id() {
        let response = app()
            .oneshot(empty_request("GET", "/api/leads/scheduled"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = read_json(response).await;
        assert_eq!(body["message"], "Missing employeeId");
    }

    #[tokio::test]
    async fn test_update_without_fields_is_rejected() {
        let response = app()
            .oneshot(json_request(
                "PUT",
                "/api/leads/update/00000000-0000-0000-0000-000000000000",
                serde_json::json!({ "employeeId": "CON1001" }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = read_json(response).await;
        assert_eq!(body["message"], "No valid fields to update.");
    }

    #[tokio::test]
    async fn test_schedule_requires_date_and_time() {
        let response = app()
            .oneshot(json_request(
                "PUT",
                "/api/leads/00000000-0000-0000-0000-000000000000/schedule",
                serde_json::json!({ "date": "2024-06-01", "time": " " }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_schedule_rejects_malformed_date() {
        let response = app()
            .oneshot(json_request(
                "PUT",
                "/api/leads/00000000-0000-0000-0000-000000000000/schedule",
                serde_json::json!({ "date": "7/1/2024", "time": "10:30" }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = read_json(response).await;
        assert_eq!(body["message"], "Invalid date '7/1/2024', expected YYYY-MM-DD");
    }

    #[tokio::test]
    async fn test_schedule_rejects_malformed_time() {
        let response = app()
            .oneshot(json_request(
                "PUT",
                "/api/leads/00000000-0000-0000-0000-000000000000/schedule",
                serde_json::json!({ "date": "2024-07-01", "time": "half past ten" }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_update_rejects_malformed_date() {
        let response = app()
            .oneshot(json_request(
                "PUT",
                "/api/leads/update/00000000-0000-0000-0000-000000000000",
                serde_json::json!({ "date": "2024-13-01", "employeeId": "CON1001" }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = read_json(response).await;
        assert!(body["message"].as_str().unwrap().starts_with("Invalid date"));
    }
}
