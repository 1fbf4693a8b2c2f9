//! API Router
//!
//! Combines the REST endpoints of every module into a single router.

use axum::Router;
use std::sync::Arc;

use crate::core::shared::state::AppState;

pub fn configure_api_routes() -> Router<Arc<AppState>> {
    Router::new()
        .merge(crate::leads::configure_lead_routes())
        .merge(crate::employees::configure_employee_routes())
        .merge(crate::activities::configure_activity_routes())
        .merge(crate::attendance::configure_attendance_routes())
        .merge(crate::dashboards::configure_dashboard_routes())
        .merge(crate::settings::configure_settings_routes())
}
