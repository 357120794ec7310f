use axum::{
    async_trait,
    extract::{FromRequestParts, Query},
    http::request::Parts,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::analytics::{ChartData, DailyCount, TimelinePoint};
use crate::enrichment::EnrichedEvent;
use crate::store::{
    DateWindow, EventFilter, PageRequest, Pagination, Person, SortOrder, DEFAULT_PAGE_SIZE,
};

use super::error::ApiError;

pub const DEFAULT_DAYS: i64 = 30;
pub const MAX_DAYS: i64 = 3650;
pub const DEFAULT_LATEST_LIMIT: i64 = 5;
pub const MAX_LATEST_LIMIT: i64 = 50;
pub const RANDOM_EVENTS_LIMIT: i64 = 10;
pub const RANDOM_PEOPLE_LIMIT: i64 = 5;
pub const RECENT_DAYS: i64 = 7;

const ORG_REQUIRED: &str = "'customer_org_id' query parameter is required.";
const ORG_AND_ACCOUNT_REQUIRED: &str =
    "Both 'customer_org_id' and 'account_id' query parameters are required.";

/// Query string shared by every endpoint.
///
/// Numeric fields are kept as text so that malformed values fall back to defaults
/// instead of failing extraction.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DashboardQuery {
    pub customer_org_id: Option<String>,
    pub account_id: Option<String>,
    pub days: Option<String>,
    pub page: Option<String>,
    pub page_size: Option<String>,
    pub sort_by: Option<String>,
    pub limit: Option<String>,
}

/// Query-string rejections surface as `ApiError::Validation`.
#[async_trait]
impl<S> FromRequestParts<S> for DashboardQuery
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(query) = Query::<Self>::from_request_parts(parts, state)
            .await
            .map_err(|e| ApiError::Validation(e.body_text()))?;
        Ok(query)
    }
}

fn non_blank(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

fn parse_int(value: &Option<String>) -> Option<i64> {
    value.as_deref().and_then(|v| v.trim().parse::<i64>().ok())
}

impl DashboardQuery {
    pub fn require_org(&self) -> Result<String, ApiError> {
        non_blank(&self.customer_org_id).ok_or_else(|| ApiError::Validation(ORG_REQUIRED.into()))
    }

    pub fn require_org_and_account(&self) -> Result<(String, String), ApiError> {
        match (non_blank(&self.customer_org_id), non_blank(&self.account_id)) {
            (Some(org), Some(account)) => Ok((org, account)),
            _ => Err(ApiError::Validation(ORG_AND_ACCOUNT_REQUIRED.into())),
        }
    }

    pub fn account(&self) -> Option<String> {
        non_blank(&self.account_id)
    }

    /// Org filter with the optional account applied.
    pub fn scoped_filter(&self) -> Result<EventFilter, ApiError> {
        Ok(EventFilter::for_org(self.require_org()?).with_account(self.account()))
    }

    pub fn days(&self) -> i64 {
        match parse_int(&self.days) {
            Some(d) if d > 0 => d.min(MAX_DAYS),
            _ => DEFAULT_DAYS,
        }
    }

    pub fn page_request(&self) -> PageRequest {
        PageRequest::new(
            parse_int(&self.page).unwrap_or(1),
            parse_int(&self.page_size).unwrap_or(DEFAULT_PAGE_SIZE),
        )
    }

    pub fn sort_order(&self) -> SortOrder {
        self.sort_by
            .as_deref()
            .map(SortOrder::parse)
            .unwrap_or_default()
    }

    pub fn latest_limit(&self) -> i64 {
        parse_int(&self.limit)
            .unwrap_or(DEFAULT_LATEST_LIMIT)
            .clamp(1, MAX_LATEST_LIMIT)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DateRange {
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
}

impl DateRange {
    pub fn empty() -> Self {
        Self {
            start: None,
            end: None,
        }
    }

    pub fn from_bounds(bounds: Option<(DateTime<Utc>, DateTime<Utc>)>) -> Self {
        match bounds {
            Some((start, end)) => Self {
                start: Some(start),
                end: Some(end),
            },
            None => Self::empty(),
        }
    }

    /// Earliest and latest timestamp among `timestamps`.
    pub fn spanning(timestamps: impl IntoIterator<Item = DateTime<Utc>>) -> Self {
        timestamps.into_iter().fold(Self::empty(), |range, ts| Self {
            start: Some(range.start.map_or(ts, |s| s.min(ts))),
            end: Some(range.end.map_or(ts, |e| e.max(ts))),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct WindowRange {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub days: i64,
}

impl WindowRange {
    pub fn new(window: DateWindow, days: i64) -> Self {
        Self {
            start: window.start,
            end: window.end,
            days,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct EventsDateRange {
    pub overall: DateRange,
    pub current_page: DateRange,
}

#[derive(Debug, Clone, Serialize)]
pub struct PaginatedEventsResponse {
    pub results: Vec<EnrichedEvent>,
    pub pagination: Pagination,
    pub date_range: EventsDateRange,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChartEventsResponse {
    pub events: Vec<EnrichedEvent>,
    pub daily_counts: Vec<DailyCount>,
    pub total_count: i64,
    pub date_range: DateRange,
}

#[derive(Debug, Clone, Serialize)]
pub struct PeopleResponse {
    pub results: Vec<Person>,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusCount {
    pub status: Option<String>,
    pub count: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChannelCount {
    pub channel: Option<String>,
    pub count: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChannelStatusCount {
    pub channel: Option<String>,
    pub status: Option<String>,
    pub count: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct DashboardStats {
    pub total_events: i64,
    pub total_people: i64,
    pub recent_events: i64,
    pub status_breakdown: Vec<StatusCount>,
    pub channel_breakdown: Vec<ChannelCount>,
    pub date_range: WindowRange,
}

#[derive(Debug, Clone, Serialize)]
pub struct TimelineResponse {
    pub timeline: Vec<TimelinePoint>,
    pub date_range: WindowRange,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChannelBreakdownResponse {
    pub breakdown: Vec<ChannelStatusCount>,
    pub date_range: WindowRange,
}

#[derive(Debug, Clone, Serialize)]
pub struct MonthlyChartResponse {
    pub chart_data: ChartData,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::SortField;
    use chrono::TimeZone;

    fn query(pairs: &[(&str, &str)]) -> DashboardQuery {
        let mut q = DashboardQuery::default();
        for (k, v) in pairs {
            let v = Some(v.to_string());
            match *k {
                "customer_org_id" => q.customer_org_id = v,
                "account_id" => q.account_id = v,
                "days" => q.days = v,
                "page" => q.page = v,
                "page_size" => q.page_size = v,
                "sort_by" => q.sort_by = v,
                "limit" => q.limit = v,
                _ => unreachable!(),
            }
        }
        q
    }

    #[test]
    fn test_required_params() {
        assert!(query(&[]).require_org().is_err());
        assert!(query(&[("customer_org_id", "   ")]).require_org().is_err());
        assert_eq!(query(&[("customer_org_id", " org ")]).require_org().unwrap(), "org");

        let err = query(&[("customer_org_id", "org")])
            .require_org_and_account()
            .unwrap_err();
        assert!(err.to_string().contains("account_id"));
        assert_eq!(
            query(&[("customer_org_id", "org"), ("account_id", "acct")])
                .require_org_and_account()
                .unwrap(),
            ("org".to_string(), "acct".to_string())
        );
    }

    #[test]
    fn test_blank_account_is_absent() {
        let filter = query(&[("customer_org_id", "org"), ("account_id", "")])
            .scoped_filter()
            .unwrap();
        assert_eq!(filter.account_id, None);
    }

    #[test]
    fn test_days_fallbacks() {
        assert_eq!(query(&[]).days(), 30);
        assert_eq!(query(&[("days", "7")]).days(), 7);
        assert_eq!(query(&[("days", "0")]).days(), 30);
        assert_eq!(query(&[("days", "-3")]).days(), 30);
        assert_eq!(query(&[("days", "a week")]).days(), 30);
        assert_eq!(query(&[("days", "99999")]).days(), MAX_DAYS);
    }

    #[test]
    fn test_paging_and_sort_defaults() {
        let page = query(&[("page", "x"), ("page_size", "500")]).page_request();
        assert_eq!(page.page(), 1);
        assert_eq!(page.page_size(), 100);

        assert_eq!(query(&[]).sort_order(), SortOrder::default());
        assert_eq!(
            query(&[("sort_by", "activity")]).sort_order(),
            SortOrder::ascending(SortField::Activity)
        );
    }

    #[test]
    fn test_latest_limit_clamped() {
        assert_eq!(query(&[]).latest_limit(), 5);
        assert_eq!(query(&[("limit", "0")]).latest_limit(), 1);
        assert_eq!(query(&[("limit", "75")]).latest_limit(), 50);
        assert_eq!(query(&[("limit", "five")]).latest_limit(), 5);
    }

    #[test]
    fn test_date_range_spanning() {
        let a = Utc.with_ymd_and_hms(2024, 1, 3, 0, 0, 0).unwrap();
        let b = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let range = DateRange::spanning([a, b]);
        assert_eq!(range.start, Some(b));
        assert_eq!(range.end, Some(a));
        assert_eq!(DateRange::spanning(Vec::new()), DateRange::empty());
    }
}
