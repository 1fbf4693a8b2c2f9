//! HTTP server initialization and routing

use axum::extract::DefaultBodyLimit;
use axum::http::{HeaderValue, Method};
use axum::{routing::get, Router};
use log::{error, info, warn};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::api_router::configure_api_routes;
use crate::core::shared::state::AppState;

use super::{health_check, health_check_simple, shutdown_signal};

/// CORS for the admin dashboard and mobile app origins. An empty list
/// allows any origin.
pub fn create_cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!("Ignoring invalid CORS origin: {origin}");
                None
            }
        })
        .collect();

    let cors = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers(Any);

    if origins.is_empty() {
        info!("Creating CORS layer allowing any origin");
        cors.allow_origin(Any)
    } else {
        info!("Creating CORS layer with {} configured origin(s)", origins.len());
        cors.allow_origin(origins)
    }
}

pub fn build_router(app_state: Arc<AppState>) -> Router {
    let upload_limit = app_state.config.uploads.upload_limit_bytes;
    let cors = create_cors_layer(&app_state.config.cors_allowed_origins);

    Router::new()
        .route("/health", get(health_check_simple))
        .route("/api/health", get(health_check))
        .merge(configure_api_routes())
        .with_state(app_state)
        .layer(DefaultBodyLimit::max(upload_limit))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

pub async fn run_axum_server(app_state: Arc<AppState>) -> std::io::Result<()> {
    let addr = app_state.config.bind_address();
    let app = build_router(app_state);

    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(l) => l,
        Err(e) => {
            error!("Failed to bind to {addr}: {e} - is another instance running?");
            return Err(e);
        }
    };
    info!("HTTP server listening on {addr}");
    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(std::io::Error::other)
}
