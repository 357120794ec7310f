use axum::{extract::State, Json};
use std::sync::Arc;

use crate::core::shared::state::AppState;
use crate::dashboards::error::ApiError;
use crate::dashboards::types::{
    DashboardQuery, DateRange, EventsDateRange, PaginatedEventsResponse, RANDOM_EVENTS_LIMIT,
};
use crate::enrichment::{
    collect_primary_person_ids, enrich_events, primary_contact, EnrichedEvent, PersonDirectory,
};
use crate::presentation::{table_row, TableRow};
use crate::store::{EventFilter, PageRequest, Pagination, SortOrder};

/// GET /api/events/random/
pub async fn handle_random_events(
    State(state): State<Arc<AppState>>,
    query: DashboardQuery,
) -> Result<Json<Vec<EnrichedEvent>>, ApiError> {
    let (org_id, account_id) = query.require_org_and_account()?;
    let filter = EventFilter::for_org(org_id.as_str()).with_account(Some(account_id));

    let events = state.store.sample_events(&filter, RANDOM_EVENTS_LIMIT).await?;
    let enriched = enrich_events(state.store.as_ref(), &org_id, events).await?;
    Ok(Json(enriched))
}

/// GET /api/events/
pub async fn handle_list_events(
    State(state): State<Arc<AppState>>,
    query: DashboardQuery,
) -> Result<Json<PaginatedEventsResponse>, ApiError> {
    let filter = query.scoped_filter()?;
    let page = query.page_request();
    let sort = query.sort_order();
    let store = state.store.as_ref();

    let slice = store.find_events_by_org(&filter, sort, Some(page)).await?;
    let overall = DateRange::from_bounds(store.event_time_bounds(&filter).await?);
    let current_page = DateRange::spanning(slice.events.iter().map(|e| e.timestamp));
    let pagination = Pagination::compute(slice.total_count, page);

    log::debug!(
        "Listing events for org {} page {}/{} sorted by {}",
        filter.org_id,
        pagination.page,
        pagination.total_pages,
        sort
    );

    let results = enrich_events(store, &filter.org_id, slice.events).await?;

    Ok(Json(PaginatedEventsResponse {
        results,
        pagination,
        date_range: EventsDateRange {
            overall,
            current_page,
        },
    }))
}

/// GET /api/events/latest/
///
/// Newest touchpoints shaped as table rows. Row ids are 1-based positions.
pub async fn handle_latest_events(
    State(state): State<Arc<AppState>>,
    query: DashboardQuery,
) -> Result<Json<Vec<TableRow>>, ApiError> {
    let (org_id, account_id) = query.require_org_and_account()?;
    let limit = query.latest_limit();
    let filter = EventFilter::for_org(org_id.as_str()).with_account(Some(account_id));
    let store = state.store.as_ref();

    let slice = store
        .find_events_by_org(&filter, SortOrder::default(), Some(PageRequest::new(1, limit)))
        .await?;

    let directory =
        PersonDirectory::resolve(store, &org_id, collect_primary_person_ids(&slice.events)).await?;

    let rows = slice
        .events
        .iter()
        .enumerate()
        .map(|(index, event)| {
            let contact = primary_contact(event, &directory);
            table_row(index + 1, event, contact.name, contact.additional_people)
        })
        .collect();

    Ok(Json(rows))
}
