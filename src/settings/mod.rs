pub mod handlers;
pub mod storage;
pub mod types;

use axum::{
    routing::{get, put},
    Router,
};
use std::sync::Arc;

use crate::core::shared::state::AppState;

pub use handlers::*;
pub use types::*;

pub fn configure_settings_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/admin", get(handle_get_admin))
        .route("/api/admin/update", put(handle_update_admin))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::shared::test_utils::{create_lazy_app_state, json_request, read_json};
    use axum::http::StatusCode;
    use tower::ServiceExt;

    #[tokio::test]
    async fn test_update_requires_every_field() {
        let response = configure_settings_routes()
            .with_state(create_lazy_app_state())
            .oneshot(json_request(
                "PUT",
                "/api/admin/update",
                serde_json::json!({ "firstName": "Neha", "email": "neha@example.com" }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = read_json(response).await;
        assert_eq!(body["message"], "firstName, lastName and email are required");
    }
}
