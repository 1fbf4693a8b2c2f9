//! Attendance tracking.
//!
//! One attendance row per employee and day holds the check-in and check-out
//! times. Breaks are separate rows; the newest break without an end time is
//! the open one. Employees are addressed by UUID or by their `CON…` code.

pub mod handlers;
pub mod storage;
pub mod types;

use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use crate::core::shared::state::AppState;

pub use handlers::*;
pub use types::*;

pub fn configure_attendance_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/attendance/today", get(handle_today_attendance))
        .route("/api/attendance/checkin", post(handle_check_in))
        .route("/api/attendance/checkout", post(handle_check_out))
        .route("/api/attendance/toggle-break", post(handle_toggle_break))
        .route("/api/attendance/breaks", get(handle_list_breaks))
}
