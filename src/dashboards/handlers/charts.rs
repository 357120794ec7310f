use axum::{extract::State, Json};
use std::sync::Arc;

use crate::analytics::{
    chart_data, daily_counts, daily_counts_from_groups, monthly_series, CHART_LOOKBACK_DAYS,
};
use crate::core::shared::state::AppState;
use crate::dashboards::error::ApiError;
use crate::dashboards::types::{
    ChartEventsResponse, DashboardQuery, DateRange, MonthlyChartResponse,
};
use crate::enrichment::enrich_events;
use crate::store::{DateWindow, GroupField, SortField, SortOrder};

/// GET /api/events/chart/
///
/// Every matching event, oldest first, with per-day counts.
pub async fn handle_chart_events(
    State(state): State<Arc<AppState>>,
    query: DashboardQuery,
) -> Result<Json<ChartEventsResponse>, ApiError> {
    let filter = query.scoped_filter()?;
    let store = state.store.as_ref();

    let slice = store
        .find_events_by_org(&filter, SortOrder::ascending(SortField::Timestamp), None)
        .await?;

    let daily = daily_counts(&slice.events);
    let date_range = DateRange::spanning(slice.events.iter().map(|e| e.timestamp));
    let events = enrich_events(store, &filter.org_id, slice.events).await?;

    Ok(Json(ChartEventsResponse {
        events,
        daily_counts: daily,
        total_count: slice.total_count,
        date_range,
    }))
}

/// GET /api/dashboard/monthly-chart/
pub async fn handle_monthly_chart(
    State(state): State<Arc<AppState>>,
    query: DashboardQuery,
) -> Result<Json<MonthlyChartResponse>, ApiError> {
    let filter = query.scoped_filter()?;
    let now = state.clock.now();
    let window = DateWindow::trailing_days(now, CHART_LOOKBACK_DAYS);

    let rows = state
        .store
        .aggregate_events_by(&filter.within(window), &[GroupField::Day])
        .await?;
    let points = monthly_series(now, &daily_counts_from_groups(&rows));

    Ok(Json(MonthlyChartResponse {
        chart_data: chart_data(&points),
    }))
}
