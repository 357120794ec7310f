use chrono::{DateTime, NaiveDate, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};

use crate::core::shared::schema::{activity_events, persons};

#[derive(Debug, Clone, PartialEq, Queryable, Selectable, Serialize, Deserialize)]
#[diesel(table_name = activity_events)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct ActivityEvent {
    pub id: i64,
    pub touchpoint_id: String,
    pub customer_org_id: String,
    pub account_id: Option<String>,
    pub timestamp: DateTime<Utc>,
    pub channel: Option<String>,
    pub status: Option<String>,
    pub direction: Option<String>,
    pub activity: Option<String>,
    pub people: serde_json::Value,
    pub involved_team_ids: serde_json::Value,
}

#[derive(Debug, Clone, PartialEq, Queryable, Selectable, Serialize, Deserialize)]
#[diesel(table_name = persons)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Person {
    pub id: String,
    pub customer_org_id: String,
    pub first_name: String,
    pub last_name: String,
    pub email: Option<String>,
    pub title: Option<String>,
    pub company: Option<String>,
}

/// One row of a grouped count. Keys that were not grouped on are `None`.
#[derive(Debug, Clone, PartialEq, Eq, QueryableByName, Serialize)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct GroupCount {
    #[diesel(sql_type = diesel::sql_types::Nullable<diesel::sql_types::Varchar>)]
    pub channel: Option<String>,
    #[diesel(sql_type = diesel::sql_types::Nullable<diesel::sql_types::Varchar>)]
    pub status: Option<String>,
    #[diesel(sql_type = diesel::sql_types::Nullable<diesel::sql_types::Date>)]
    pub day: Option<NaiveDate>,
    #[diesel(sql_type = diesel::sql_types::BigInt)]
    pub count: i64,
}

