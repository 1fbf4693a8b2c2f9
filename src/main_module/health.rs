//! Health endpoints. The detailed check also reports the lead backlog and
//! any schema migrations the running binary has not applied yet.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use log::warn;
use serde::Serialize;
use std::sync::Arc;

use crate::core::shared::state::AppState;
use crate::core::shared::utils::{pending_migration_count, DbPool};
use crate::leads::storage::count_unassigned;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthReport {
    pub status: &'static str,
    pub service: &'static str,
    pub version: &'static str,
    pub database: bool,
    pub unassigned_leads: Option<i64>,
    pub pending_migrations: Option<usize>,
}

impl HealthReport {
    fn new(database: bool) -> Self {
        Self {
            status: if database { "healthy" } else { "degraded" },
            service: env!("CARGO_PKG_NAME"),
            version: env!("CARGO_PKG_VERSION"),
            database,
            ..Default::default()
        }
    }

    pub fn status_code(&self) -> StatusCode {
        if self.database {
            StatusCode::OK
        } else {
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}

fn probe(pool: &DbPool) -> HealthReport {
    let mut conn = match pool.get() {
        Ok(conn) => conn,
        Err(e) => {
            warn!("Health check could not reach the database: {e}");
            return HealthReport::new(false);
        }
    };
    let mut report = HealthReport::new(true);
    report.unassigned_leads = count_unassigned(&mut conn)
        .map_err(|e| warn!("Health check could not count unassigned leads: {e}"))
        .ok();
    report.pending_migrations = pending_migration_count(&mut conn)
        .map_err(|e| warn!("Health check could not list pending migrations: {e}"))
        .ok();
    report
}

pub async fn health_check(State(state): State<Arc<AppState>>) -> (StatusCode, Json<HealthReport>) {
    let pool = state.conn.clone();
    let report = tokio::task::spawn_blocking(move || probe(&pool))
        .await
        .unwrap_or_else(|_| HealthReport::new(false));
    (report.status_code(), Json(report))
}

pub async fn health_check_simple() -> (StatusCode, Json<serde_json::Value>) {
    (
        StatusCode::OK,
        Json(serde_json::json!({
            "status": "ok",
            "service": env!("CARGO_PKG_NAME"),
        })),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_degraded_report_omits_backlog() {
        let report = HealthReport::new(false);
        assert_eq!(report.status_code(), StatusCode::SERVICE_UNAVAILABLE);
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["status"], "degraded");
        assert!(json["unassignedLeads"].is_null());
        assert!(json["pendingMigrations"].is_null());
    }

    #[test]
    fn test_healthy_report_carries_backlog() {
        let report = HealthReport {
            unassigned_leads: Some(4),
            pending_migrations: Some(0),
            ..HealthReport::new(true)
        };
        assert_eq!(report.status_code(), StatusCode::OK);
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["unassignedLeads"], 4);
        assert_eq!(json["pendingMigrations"], 0);
        assert_eq!(json["service"], "crmserver");
    }
}
