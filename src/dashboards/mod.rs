pub mod error;
pub mod handlers;
pub mod types;

use axum::{routing::get, Router};
use std::sync::Arc;

use crate::core::shared::state::AppState;
use crate::core::urls::ApiUrls;

pub use error::ApiError;
pub use handlers::*;
pub use types::*;

pub fn configure_events_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route(ApiUrls::EVENTS, get(handle_list_events))
        .route(ApiUrls::EVENTS_RANDOM, get(handle_random_events))
        .route(ApiUrls::EVENTS_CHART, get(handle_chart_events))
        .route(ApiUrls::EVENTS_LATEST, get(handle_latest_events))
}

pub fn configure_people_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route(ApiUrls::PEOPLE, get(handle_list_people))
        .route(ApiUrls::PEOPLE_RANDOM, get(handle_random_people))
}

pub fn configure_dashboards_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route(ApiUrls::DASHBOARD_STATS, get(handle_dashboard_stats))
        .route(ApiUrls::DASHBOARD_TIMELINE, get(handle_activity_timeline))
        .route(
            ApiUrls::DASHBOARD_CHANNEL_BREAKDOWN,
            get(handle_channel_breakdown),
        )
        .route(ApiUrls::DASHBOARD_MONTHLY_CHART, get(handle_monthly_chart))
}
