use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::dsl::{max, min};
use diesel::pg::Pg;
use diesel::prelude::*;
use diesel::sql_types::{Text, Timestamptz};

use crate::core::shared::schema::{activity_events, persons};
use crate::core::shared::utils::DbPool;

use super::{
    ActivityEvent, ActivityStore, EventFilter, EventSlice, GroupCount, GroupField, PageRequest,
    Person, SortField, SortOrder, StoreError,
};

diesel::define_sql_function! {
    fn random() -> diesel::sql_types::Double;
}

type BoxedEvents = activity_events::BoxedQuery<'static, Pg>;

/// Diesel-backed store. Every call checks out a pooled connection on the blocking pool.
#[derive(Clone)]
pub struct PgActivityStore {
    pool: DbPool,
}

impl PgActivityStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &DbPool {
        &self.pool
    }

    async fn run<T, F>(&self, f: F) -> Result<T, StoreError>
    where
        F: FnOnce(&mut PgConnection) -> Result<T, StoreError> + Send + 'static,
        T: Send + 'static,
    {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let mut conn = pool
                .get()
                .map_err(|e| StoreError::Connection(e.to_string()))?;
            f(&mut conn)
        })
        .await
        .map_err(|e: tokio::task::JoinError| StoreError::Internal(e.to_string()))?
    }
}

fn filtered_events(filter: &EventFilter) -> BoxedEvents {
    let mut query = activity_events::table
        .filter(activity_events::customer_org_id.eq(filter.org_id.clone()))
        .into_boxed();

    if let Some(ref account) = filter.account_id {
        query = query.filter(activity_events::account_id.eq(account.clone()));
    }

    if let Some(window) = filter.window {
        query = query
            .filter(activity_events::timestamp.ge(window.start))
            .filter(activity_events::timestamp.le(window.end));
    }

    query
}

fn ordered(query: BoxedEvents, sort: SortOrder) -> BoxedEvents {
    use activity_events::dsl as ev;

    match (sort.field, sort.descending) {
        (SortField::Timestamp, true) => query.order((ev::timestamp.desc(), ev::id.desc())),
        (SortField::Timestamp, false) => query.order((ev::timestamp.asc(), ev::id.asc())),
        (SortField::Channel, true) => query.order((ev::channel.desc(), ev::id.desc())),
        (SortField::Channel, false) => query.order((ev::channel.asc(), ev::id.asc())),
        (SortField::Status, true) => query.order((ev::status.desc(), ev::id.desc())),
        (SortField::Status, false) => query.order((ev::status.asc(), ev::id.asc())),
        (SortField::Direction, true) => query.order((ev::direction.desc(), ev::id.desc())),
        (SortField::Direction, false) => query.order((ev::direction.asc(), ev::id.asc())),
        (SortField::Activity, true) => query.order((ev::activity.desc(), ev::id.desc())),
        (SortField::Activity, false) => query.order((ev::activity.asc(), ev::id.asc())),
        (SortField::TouchpointId, true) => {
            query.order((ev::touchpoint_id.desc(), ev::id.desc()))
        }
        (SortField::TouchpointId, false) => query.order((ev::touchpoint_id.asc(), ev::id.asc())),
    }
}

fn aggregate_sql(filter: &EventFilter, group_by: &[GroupField]) -> String {
    let mut keys: Vec<&str> = Vec::new();
    for field in group_by {
        let key = match field {
            GroupField::Channel => "channel",
            GroupField::Status => "status",
            GroupField::Day => "day",
        };
        if !keys.contains(&key) {
            keys.push(key);
        }
    }

    let channel = if keys.contains(&"channel") {
        "channel"
    } else {
        "NULL::varchar"
    };
    let status = if keys.contains(&"status") {
        "status"
    } else {
        "NULL::varchar"
    };
    let day = if keys.contains(&"day") {
        "(\"timestamp\" AT TIME ZONE 'UTC')::date"
    } else {
        "NULL::date"
    };

    let mut sql = format!(
        "SELECT {channel} AS channel, {status} AS status, {day} AS day, COUNT(*) AS count \
         FROM activity_events WHERE customer_org_id = $1"
    );

    let mut param = 2;
    if filter.account_id.is_some() {
        sql.push_str(&format!(" AND account_id = ${param}"));
        param += 1;
    }
    if filter.window.is_some() {
        sql.push_str(&format!(
            " AND \"timestamp\" >= ${} AND \"timestamp\" <= ${}",
            param,
            param + 1
        ));
    }

    if !keys.is_empty() {
        let list = keys.join(", ");
        sql.push_str(&format!(" GROUP BY {list} ORDER BY {list}"));
    }

    sql
}

#[async_trait]
impl ActivityStore for PgActivityStore {
    async fn find_events_by_org(
        &self,
        filter: &EventFilter,
        sort: SortOrder,
        page: Option<PageRequest>,
    ) -> Result<EventSlice, StoreError> {
        let filter = filter.clone();
        self.run(move |conn| {
            let total_count: i64 = filtered_events(&filter).count().get_result(conn)?;

            let mut query = ordered(filtered_events(&filter), sort);
            if let Some(page) = page {
                query = query.offset(page.offset()).limit(page.page_size());
            }

            let events = query
                .select(ActivityEvent::as_select())
                .load::<ActivityEvent>(conn)?;

            Ok(EventSlice {
                events,
                total_count,
            })
        })
        .await
    }

    async fn find_persons_by_org(&self, org_id: &str) -> Result<Vec<Person>, StoreError> {
        let org_id = org_id.to_string();
        self.run(move |conn| {
            let people = persons::table
                .filter(persons::customer_org_id.eq(org_id))
                .order((
                    persons::last_name.asc(),
                    persons::first_name.asc(),
                    persons::id.asc(),
                ))
                .select(Person::as_select())
                .load::<Person>(conn)?;
            Ok(people)
        })
        .await
    }

    async fn aggregate_events_by(
        &self,
        filter: &EventFilter,
        group_by: &[GroupField],
    ) -> Result<Vec<GroupCount>, StoreError> {
        let sql = aggregate_sql(filter, group_by);
        let filter = filter.clone();
        self.run(move |conn| {
            let mut query = diesel::sql_query(sql)
                .into_boxed::<Pg>()
                .bind::<Text, _>(filter.org_id);
            if let Some(account) = filter.account_id {
                query = query.bind::<Text, _>(account);
            }
            if let Some(window) = filter.window {
                query = query
                    .bind::<Timestamptz, _>(window.start)
                    .bind::<Timestamptz, _>(window.end);
            }
            let rows = query.load::<GroupCount>(conn)?;
            Ok(rows)
        })
        .await
    }

    async fn find_persons_by_ids(
        &self,
        org_id: &str,
        ids: &[String],
    ) -> Result<Vec<Person>, StoreError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let org_id = org_id.to_string();
        let ids = ids.to_vec();
        self.run(move |conn| {
            let people = persons::table
                .filter(persons::customer_org_id.eq(org_id))
                .filter(persons::id.eq_any(ids))
                .select(Person::as_select())
                .load::<Person>(conn)?;
            Ok(people)
        })
        .await
    }

    async fn count_persons(&self, org_id: &str) -> Result<i64, StoreError> {
        let org_id = org_id.to_string();
        self.run(move |conn| {
            let count = persons::table
                .filter(persons::customer_org_id.eq(org_id))
                .count()
                .get_result::<i64>(conn)?;
            Ok(count)
        })
        .await
    }

    async fn event_time_bounds(
        &self,
        filter: &EventFilter,
    ) -> Result<Option<(DateTime<Utc>, DateTime<Utc>)>, StoreError> {
        let filter = filter.clone();
        self.run(move |conn| {
            let (first, last): (Option<DateTime<Utc>>, Option<DateTime<Utc>>) =
                filtered_events(&filter)
                    .select((
                        min(activity_events::timestamp),
                        max(activity_events::timestamp),
                    ))
                    .first(conn)?;
            Ok(first.zip(last))
        })
        .await
    }

    async fn sample_events(
        &self,
        filter: &EventFilter,
        limit: i64,
    ) -> Result<Vec<ActivityEvent>, StoreError> {
        let filter = filter.clone();
        self.run(move |conn| {
            let events = filtered_events(&filter)
                .order(random())
                .limit(limit)
                .select(ActivityEvent::as_select())
                .load::<ActivityEvent>(conn)?;
            Ok(events)
        })
        .await
    }

    async fn sample_persons(&self, org_id: &str, limit: i64) -> Result<Vec<Person>, StoreError> {
        let org_id = org_id.to_string();
        self.run(move |conn| {
            let people = persons::table
                .filter(persons::customer_org_id.eq(org_id))
                .order(random())
                .limit(limit)
                .select(Person::as_select())
                .load::<Person>(conn)?;
            Ok(people)
        })
        .await
    }

    async fn ping(&self) -> Result<(), StoreError> {
        self.run(|conn| {
            diesel::sql_query("SELECT 1").execute(conn)?;
            Ok(())
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::DateWindow;
    use chrono::TimeZone;

    #[test]
    fn test_aggregate_sql_channel_status() {
        let sql = aggregate_sql(
            &EventFilter::for_org("org_1"),
            &[GroupField::Channel, GroupField::Status],
        );
        assert!(sql.contains("SELECT channel AS channel, status AS status, NULL::date AS day"));
        assert!(sql.ends_with("GROUP BY channel, status ORDER BY channel, status"));
        assert!(!sql.contains("$2"));
    }

    #[test]
    fn test_aggregate_sql_numbers_binds_in_order() {
        let now = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();
        let filter = EventFilter::for_org("org_1")
            .with_account(Some("acct".to_string()))
            .within(DateWindow::trailing_days(now, 30));
        let sql = aggregate_sql(&filter, &[GroupField::Day]);

        assert!(sql.contains("account_id = $2"));
        assert!(sql.contains("\"timestamp\" >= $3 AND \"timestamp\" <= $4"));
        assert!(sql.contains("NULL::varchar AS channel"));
        assert!(sql.ends_with("GROUP BY day ORDER BY day"));
    }

    #[test]
    fn test_aggregate_sql_window_without_account() {
        let now = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();
        let filter = EventFilter::for_org("org_1").within(DateWindow::trailing_days(now, 7));
        let sql = aggregate_sql(&filter, &[GroupField::Status, GroupField::Status]);

        assert!(sql.contains("\"timestamp\" >= $2 AND \"timestamp\" <= $3"));
        assert!(sql.ends_with("GROUP BY status ORDER BY status"));
    }
}
