use axum::{extract::State, Json};
use std::sync::Arc;

use crate::core::shared::state::AppState;
use crate::dashboards::error::ApiError;
use crate::dashboards::types::{DashboardQuery, PeopleResponse, RANDOM_PEOPLE_LIMIT};
use crate::store::Person;

/// GET /api/people/random/
pub async fn handle_random_people(
    State(state): State<Arc<AppState>>,
    query: DashboardQuery,
) -> Result<Json<Vec<Person>>, ApiError> {
    let org_id = query.require_org()?;
    let people = state
        .store
        .sample_persons(&org_id, RANDOM_PEOPLE_LIMIT)
        .await?;
    Ok(Json(people))
}

/// GET /api/people/
pub async fn handle_list_people(
    State(state): State<Arc<AppState>>,
    query: DashboardQuery,
) -> Result<Json<PeopleResponse>, ApiError> {
    let org_id = query.require_org()?;
    let results = state.store.find_persons_by_org(&org_id).await?;
    Ok(Json(PeopleResponse {
        count: results.len(),
        results,
    }))
}
