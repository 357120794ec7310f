//! Read-only access to the touchpoint and people tables, always scoped by organization.

pub mod memory;
pub mod models;
pub mod pagination;
pub mod postgres;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};

pub use memory::MemoryStore;
pub use models::{ActivityEvent, GroupCount, Person};
pub use pagination::{PageRequest, Pagination, DEFAULT_PAGE_SIZE};
pub use postgres::PgActivityStore;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Connection error: {0}")]
    Connection(String),
    #[error("Query error: {0}")]
    Query(#[from] diesel::result::Error),
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Inclusive time range `[start, end]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl DateWindow {
    pub fn trailing_days(now: DateTime<Utc>, days: i64) -> Self {
        Self {
            start: now - Duration::days(days),
            end: now,
        }
    }

    pub fn contains(&self, ts: DateTime<Utc>) -> bool {
        ts >= self.start && ts <= self.end
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventFilter {
    pub org_id: String,
    pub account_id: Option<String>,
    pub window: Option<DateWindow>,
}

impl EventFilter {
    pub fn for_org(org_id: impl Into<String>) -> Self {
        Self {
            org_id: org_id.into(),
            account_id: None,
            window: None,
        }
    }

    pub fn with_account(mut self, account_id: Option<String>) -> Self {
        self.account_id = account_id;
        self
    }

    pub fn within(mut self, window: DateWindow) -> Self {
        self.window = Some(window);
        self
    }

    pub fn matches(&self, event: &ActivityEvent) -> bool {
        if event.customer_org_id != self.org_id {
            return false;
        }
        if let Some(ref account) = self.account_id {
            if event.account_id.as_deref() != Some(account.as_str()) {
                return false;
            }
        }
        self.window.map_or(true, |w| w.contains(event.timestamp))
    }
}

/// Columns a client may sort the event list by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortField {
    Timestamp,
    Channel,
    Status,
    Direction,
    Activity,
    TouchpointId,
}

impl SortField {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Timestamp => "timestamp",
            Self::Channel => "channel",
            Self::Status => "status",
            Self::Direction => "direction",
            Self::Activity => "activity",
            Self::TouchpointId => "touchpoint_id",
        }
    }
}

impl std::str::FromStr for SortField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "timestamp" => Ok(Self::Timestamp),
            "channel" => Ok(Self::Channel),
            "status" => Ok(Self::Status),
            "direction" => Ok(Self::Direction),
            "activity" => Ok(Self::Activity),
            "touchpoint_id" => Ok(Self::TouchpointId),
            _ => Err(format!("Unsupported sort field: {s}")),
        }
    }
}

/// Sort key plus direction. Ties are always broken by row id in the same direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortOrder {
    pub field: SortField,
    pub descending: bool,
}

impl SortOrder {
    pub const fn ascending(field: SortField) -> Self {
        Self {
            field,
            descending: false,
        }
    }

    pub const fn descending(field: SortField) -> Self {
        Self {
            field,
            descending: true,
        }
    }

    /// Parses `sort_by` values such as `-timestamp` or `channel`, falling back to the default.
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim();
        let (descending, name) = match raw.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, raw),
        };
        match name.parse::<SortField>() {
            Ok(field) => Self { field, descending },
            Err(e) => {
                log::debug!("{e}, using default order");
                Self::default()
            }
        }
    }
}

impl Default for SortOrder {
    fn default() -> Self {
        Self::descending(SortField::Timestamp)
    }
}

impl std::fmt::Display for SortOrder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.descending {
            write!(f, "-{}", self.field.as_str())
        } else {
            write!(f, "{}", self.field.as_str())
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupField {
    Channel,
    Status,
    Day,
}

/// A sorted slice of events plus the size of the full filtered set.
#[derive(Debug, Clone, Default)]
pub struct EventSlice {
    pub events: Vec<ActivityEvent>,
    pub total_count: i64,
}

#[async_trait]
pub trait ActivityStore: Send + Sync {
    /// Events matching `filter` in `sort` order. `None` for `page` returns the whole set.
    async fn find_events_by_org(
        &self,
        filter: &EventFilter,
        sort: SortOrder,
        page: Option<PageRequest>,
    ) -> Result<EventSlice, StoreError>;

    async fn find_persons_by_org(&self, org_id: &str) -> Result<Vec<Person>, StoreError>;

    /// Grouped counts ordered by the group keys. Empty groups are not returned.
    async fn aggregate_events_by(
        &self,
        filter: &EventFilter,
        group_by: &[GroupField],
    ) -> Result<Vec<GroupCount>, StoreError>;

    async fn find_persons_by_ids(
        &self,
        org_id: &str,
        ids: &[String],
    ) -> Result<Vec<Person>, StoreError>;

    async fn count_persons(&self, org_id: &str) -> Result<i64, StoreError>;

    async fn event_time_bounds(
        &self,
        filter: &EventFilter,
    ) -> Result<Option<(DateTime<Utc>, DateTime<Utc>)>, StoreError>;

    async fn sample_events(
        &self,
        filter: &EventFilter,
        limit: i64,
    ) -> Result<Vec<ActivityEvent>, StoreError>;

    async fn sample_persons(&self, org_id: &str, limit: i64) -> Result<Vec<Person>, StoreError>;

    /// Cheap round trip used by the health endpoint.
    async fn ping(&self) -> Result<(), StoreError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn event(org: &str, account: Option<&str>, ts: DateTime<Utc>) -> ActivityEvent {
        ActivityEvent {
            id: 1,
            touchpoint_id: "tp_1".to_string(),
            customer_org_id: org.to_string(),
            account_id: account.map(str::to_string),
            timestamp: ts,
            channel: None,
            status: None,
            direction: None,
            activity: None,
            people: serde_json::Value::Null,
            involved_team_ids: serde_json::Value::Null,
        }
    }

    #[test]
    fn test_sort_order_parse() {
        assert_eq!(SortOrder::parse("-timestamp"), SortOrder::default());
        assert_eq!(
            SortOrder::parse("channel"),
            SortOrder::ascending(SortField::Channel)
        );
        assert_eq!(
            SortOrder::parse("-status"),
            SortOrder::descending(SortField::Status)
        );
        assert_eq!(SortOrder::parse("password"), SortOrder::default());
        assert_eq!(SortOrder::parse("-"), SortOrder::default());
        assert_eq!(SortOrder::parse(""), SortOrder::default());
    }

    #[test]
    fn test_sort_order_display() {
        assert_eq!(SortOrder::default().to_string(), "-timestamp");
        assert_eq!(
            SortOrder::ascending(SortField::TouchpointId).to_string(),
            "touchpoint_id"
        );
    }

    #[test]
    fn test_trailing_window_is_inclusive() {
        let now = Utc.with_ymd_and_hms(2024, 3, 31, 12, 0, 0).unwrap();
        let window = DateWindow::trailing_days(now, 30);
        assert_eq!(
            window.start,
            Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap()
        );
        assert!(window.contains(window.start));
        assert!(window.contains(now));
        assert!(!window.contains(now + Duration::seconds(1)));
    }

    #[test]
    fn test_filter_matches_org_account_and_window() {
        let now = Utc.with_ymd_and_hms(2024, 3, 31, 12, 0, 0).unwrap();
        let filter = EventFilter::for_org("org_a")
            .with_account(Some("acct_1".to_string()))
            .within(DateWindow::trailing_days(now, 7));

        assert!(filter.matches(&event("org_a", Some("acct_1"), now)));
        assert!(!filter.matches(&event("org_b", Some("acct_1"), now)));
        assert!(!filter.matches(&event("org_a", Some("acct_2"), now)));
        assert!(!filter.matches(&event("org_a", None, now)));
        assert!(!filter.matches(&event(
            "org_a",
            Some("acct_1"),
            now - Duration::days(8)
        )));
    }
}
