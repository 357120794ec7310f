//! Health check and service index handlers

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use std::sync::Arc;

use crate::core::shared::state::AppState;
use crate::core::urls::ApiUrls;

pub const SERVICE_NAME: &str = "touchpoint-dashboard";

pub async fn health_check(
    State(state): State<Arc<AppState>>,
) -> (StatusCode, Json<serde_json::Value>) {
    let db_ok = match state.store.ping().await {
        Ok(()) => true,
        Err(e) => {
            log::warn!("Health check could not reach the database: {e}");
            false
        }
    };

    let status = if db_ok { "healthy" } else { "degraded" };
    let code = if db_ok {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (
        code,
        Json(serde_json::json!({
            "status": status,
            "service": SERVICE_NAME,
            "version": env!("CARGO_PKG_VERSION"),
            "database": db_ok
        })),
    )
}

pub async fn index() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "message": "Dashboard API",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "events": ApiUrls::EVENTS,
            "events_random": ApiUrls::EVENTS_RANDOM,
            "events_chart": ApiUrls::EVENTS_CHART,
            "events_latest": ApiUrls::EVENTS_LATEST,
            "people": ApiUrls::PEOPLE,
            "people_random": ApiUrls::PEOPLE_RANDOM,
            "dashboard_stats": ApiUrls::DASHBOARD_STATS,
            "activity_timeline": ApiUrls::DASHBOARD_TIMELINE,
            "channel_breakdown": ApiUrls::DASHBOARD_CHANNEL_BREAKDOWN,
            "monthly_chart": ApiUrls::DASHBOARD_MONTHLY_CHART,
            "health": ApiUrls::HEALTH
        }
    }))
}
