pub mod handlers;
pub mod storage;
pub mod types;

use axum::{
    routing::{get, post, put},
    Router,
};
use std::sync::Arc;

use crate::core::shared::state::AppState;

pub use handlers::*;
pub use types::*;

pub fn configure_employee_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            "/api/employees",
            get(handle_list_employees).post(handle_create_employee),
        )
        .route("/api/employees/stats", get(handle_employee_stats))
        .route("/api/employees/login", post(handle_login))
        .route("/api/employees/logout", post(handle_logout))
        .route("/api/employees/status", post(handle_update_status))
        .route("/api/employees/inactive/:id", put(handle_set_inactive))
        .route(
            "/api/employees/:id",
            get(handle_get_employee)
                .put(handle_update_employee)
                .delete(handle_delete_employee),
        )
}
