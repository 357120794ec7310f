use axum::{extract::State, Json};
use chrono::Duration;
use std::sync::Arc;

use crate::analytics::{daily_counts_from_groups, TimelinePoint};
use crate::core::shared::state::AppState;
use crate::dashboards::error::ApiError;
use crate::dashboards::types::{
    ChannelBreakdownResponse, ChannelCount, ChannelStatusCount, DashboardQuery, DashboardStats,
    StatusCount, TimelineResponse, WindowRange, RECENT_DAYS,
};
use crate::store::{DateWindow, EventFilter, GroupCount, GroupField};

fn total(rows: &[GroupCount]) -> i64 {
    rows.iter().map(|r| r.count).sum()
}

/// Org/account filter restricted to the trailing `days` window ending now.
fn windowed(
    state: &AppState,
    query: &DashboardQuery,
) -> Result<(EventFilter, DateWindow, i64), ApiError> {
    let filter = query.scoped_filter()?;
    let days = query.days();
    let window = DateWindow::trailing_days(state.clock.now(), days);
    Ok((filter.within(window), window, days))
}

/// GET /api/dashboard/stats/
pub async fn handle_dashboard_stats(
    State(state): State<Arc<AppState>>,
    query: DashboardQuery,
) -> Result<Json<DashboardStats>, ApiError> {
    let (filter, window, days) = windowed(&state, &query)?;
    let store = state.store.as_ref();

    let status_rows = store
        .aggregate_events_by(&filter, &[GroupField::Status])
        .await?;
    let channel_rows = store
        .aggregate_events_by(&filter, &[GroupField::Channel])
        .await?;

    let recent = DateWindow {
        start: window.start.max(window.end - Duration::days(RECENT_DAYS)),
        end: window.end,
    };
    let recent_rows = store
        .aggregate_events_by(&filter.clone().within(recent), &[])
        .await?;

    let total_people = store.count_persons(&filter.org_id).await?;

    Ok(Json(DashboardStats {
        total_events: total(&status_rows),
        total_people,
        recent_events: total(&recent_rows),
        status_breakdown: status_rows
            .into_iter()
            .map(|r| StatusCount {
                status: r.status,
                count: r.count,
            })
            .collect(),
        channel_breakdown: channel_rows
            .into_iter()
            .map(|r| ChannelCount {
                channel: r.channel,
                count: r.count,
            })
            .collect(),
        date_range: WindowRange::new(window, days),
    }))
}

/// GET /api/dashboard/activity-timeline/
pub async fn handle_activity_timeline(
    State(state): State<Arc<AppState>>,
    query: DashboardQuery,
) -> Result<Json<TimelineResponse>, ApiError> {
    let (filter, window, days) = windowed(&state, &query)?;
    let rows = state
        .store
        .aggregate_events_by(&filter, &[GroupField::Day])
        .await?;

    Ok(Json(TimelineResponse {
        timeline: daily_counts_from_groups(&rows)
            .into_iter()
            .map(TimelinePoint::from)
            .collect(),
        date_range: WindowRange::new(window, days),
    }))
}

/// GET /api/dashboard/channel-breakdown/
pub async fn handle_channel_breakdown(
    State(state): State<Arc<AppState>>,
    query: DashboardQuery,
) -> Result<Json<ChannelBreakdownResponse>, ApiError> {
    let (filter, window, days) = windowed(&state, &query)?;
    let rows = state
        .store
        .aggregate_events_by(&filter, &[GroupField::Channel, GroupField::Status])
        .await?;

    Ok(Json(ChannelBreakdownResponse {
        breakdown: rows
            .into_iter()
            .map(|r| ChannelStatusCount {
                channel: r.channel,
                status: r.status,
                count: r.count,
            })
            .collect(),
        date_range: WindowRange::new(window, days),
    }))
}
