pub mod handlers;
pub mod storage;
pub mod types;

use axum::{routing::get, Router};
use std::sync::Arc;

use crate::core::shared::state::AppState;

pub use handlers::*;
pub use types::*;

pub fn configure_activity_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/activities", get(handle_list_activities))
        .route(
            "/api/activities/:employee_id",
            get(handle_employee_activities),
        )
        .route("/api/activity/:employee_id", get(handle_employee_activities))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::shared::test_utils::{create_lazy_app_state, empty_request};
    use axum::http::StatusCode;
    use tower::ServiceExt;

    #[tokio::test]
    async fn test_malformed_employee_id_is_rejected() {
        let response = configure_activity_routes()
            .with_state(create_lazy_app_state())
            .oneshot(empty_request("GET", "/api/activity/not-a-uuid"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
