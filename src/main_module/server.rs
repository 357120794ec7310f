//! HTTP server initialization and routing

use axum::{http::HeaderValue, http::Method, routing::get, Router};
use log::{error, info, warn};
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::core::config::AppConfig;
use crate::core::shared::state::AppState;
use crate::core::urls::ApiUrls;
use crate::dashboards::{
    configure_dashboards_routes, configure_events_routes, configure_people_routes,
};

use super::{health_check, index, shutdown_signal};

/// Read-only API: only GET (and preflight) is ever allowed cross-origin.
pub fn create_cors_layer(config: &AppConfig) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::OPTIONS])
        .allow_headers(Any);

    if config.cors_allowed_origins.is_empty() {
        info!("Creating CORS layer allowing any origin (no origins configured)");
        return cors.allow_origin(Any);
    }

    let origins: Vec<HeaderValue> = config
        .cors_allowed_origins
        .iter()
        .filter_map(|o| match o.parse() {
            Ok(v) => Some(v),
            Err(_) => {
                warn!("Ignoring invalid CORS origin: {o}");
                None
            }
        })
        .collect();

    if origins.is_empty() {
        warn!("No valid CORS origins configured, allowing any origin");
        cors.allow_origin(Any)
    } else {
        info!("Creating CORS layer with {} configured origins", origins.len());
        cors.allow_origin(AllowOrigin::list(origins))
    }
}

pub fn build_router(app_state: Arc<AppState>) -> Router {
    let cors = create_cors_layer(&app_state.config);

    Router::new()
        .route(ApiUrls::INDEX, get(index))
        .route(ApiUrls::HEALTH, get(health_check))
        .merge(configure_events_routes())
        .merge(configure_people_routes())
        .merge(configure_dashboards_routes())
        .with_state(app_state)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

pub async fn run_axum_server(app_state: Arc<AppState>) -> std::io::Result<()> {
    let addr = app_state.config.bind_address();
    let app = build_router(app_state);

    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(l) => l,
        Err(e) => {
            error!(
                "Failed to bind to {}: {} - is another instance running?",
                addr, e
            );
            return Err(e);
        }
    };

    info!("HTTP server listening on {}", addr);
    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(std::io::Error::other)
}
