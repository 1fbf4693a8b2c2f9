pub mod handlers;
pub mod storage;
pub mod types;

use axum::{routing::get, Router};
use std::sync::Arc;

use crate::core::shared::state::AppState;

pub use handlers::*;
pub use types::*;

pub fn configure_dashboard_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/dashboard/stats", get(handle_dashboard_stats))
        .route("/api/dashboard/chart", get(handle_dashboard_chart))
}
