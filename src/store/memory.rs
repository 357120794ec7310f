use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering as AtomicOrdering};

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use rand::seq::SliceRandom;

use super::{
    ActivityEvent, ActivityStore, EventFilter, EventSlice, GroupCount, GroupField, PageRequest,
    Person, SortField, SortOrder, StoreError,
};

/// In-process store over fixed rows. Mirrors the Postgres ordering rules, including
/// NULLs sorting after every value in ascending order.
#[derive(Debug, Default)]
pub struct MemoryStore {
    events: Vec<ActivityEvent>,
    persons: Vec<Person>,
    calls: AtomicUsize,
    unavailable: AtomicBool,
}

impl MemoryStore {
    pub fn new(events: Vec<ActivityEvent>, persons: Vec<Person>) -> Self {
        Self {
            events,
            persons,
            calls: AtomicUsize::new(0),
            unavailable: AtomicBool::new(false),
        }
    }

    /// Number of store operations issued so far.
    pub fn call_count(&self) -> usize {
        self.calls.load(AtomicOrdering::SeqCst)
    }

    /// Makes every subsequent call fail as if the database were down.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, AtomicOrdering::SeqCst);
    }

    fn begin(&self) -> Result<(), StoreError> {
        self.calls.fetch_add(1, AtomicOrdering::SeqCst);
        if self.unavailable.load(AtomicOrdering::SeqCst) {
            return Err(StoreError::Connection(
                "memory store marked unavailable".to_string(),
            ));
        }
        Ok(())
    }

    fn matching(&self, filter: &EventFilter) -> Vec<&ActivityEvent> {
        self.events.iter().filter(|e| filter.matches(e)).collect()
    }

    fn org_persons(&self, org_id: &str) -> impl Iterator<Item = &Person> {
        let org_id = org_id.to_string();
        self.persons
            .iter()
            .filter(move |p| p.customer_org_id == org_id)
    }
}

fn nulls_last<T: Ord>(a: &Option<T>, b: &Option<T>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.cmp(b),
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Greater,
        (Some(_), None) => Ordering::Less,
    }
}

fn compare_events(a: &ActivityEvent, b: &ActivityEvent, field: SortField) -> Ordering {
    let primary = match field {
        SortField::Timestamp => a.timestamp.cmp(&b.timestamp),
        SortField::Channel => nulls_last(&a.channel, &b.channel),
        SortField::Status => nulls_last(&a.status, &b.status),
        SortField::Direction => nulls_last(&a.direction, &b.direction),
        SortField::Activity => nulls_last(&a.activity, &b.activity),
        SortField::TouchpointId => a.touchpoint_id.cmp(&b.touchpoint_id),
    };
    primary.then_with(|| a.id.cmp(&b.id))
}

type GroupKey = (Option<String>, Option<String>, Option<NaiveDate>);

#[async_trait]
impl ActivityStore for MemoryStore {
    async fn find_events_by_org(
        &self,
        filter: &EventFilter,
        sort: SortOrder,
        page: Option<PageRequest>,
    ) -> Result<EventSlice, StoreError> {
        self.begin()?;
        let mut events: Vec<ActivityEvent> =
            self.matching(filter).into_iter().cloned().collect();
        events.sort_by(|a, b| {
            let ord = compare_events(a, b, sort.field);
            if sort.descending {
                ord.reverse()
            } else {
                ord
            }
        });

        let total_count = events.len() as i64;
        let events = match page {
            Some(page) => events
                .into_iter()
                .skip(usize::try_from(page.offset()).unwrap_or(usize::MAX))
                .take(usize::try_from(page.page_size()).unwrap_or(0))
                .collect(),
            None => events,
        };

        Ok(EventSlice {
            events,
            total_count,
        })
    }

    async fn find_persons_by_org(&self, org_id: &str) -> Result<Vec<Person>, StoreError> {
        self.begin()?;
        let mut people: Vec<Person> = self.org_persons(org_id).cloned().collect();
        people.sort_by(|a, b| {
            a.last_name
                .cmp(&b.last_name)
                .then_with(|| a.first_name.cmp(&b.first_name))
                .then_with(|| a.id.cmp(&b.id))
        });
        Ok(people)
    }

    async fn aggregate_events_by(
        &self,
        filter: &EventFilter,
        group_by: &[GroupField],
    ) -> Result<Vec<GroupCount>, StoreError> {
        self.begin()?;
        let by_channel = group_by.contains(&GroupField::Channel);
        let by_status = group_by.contains(&GroupField::Status);
        let by_day = group_by.contains(&GroupField::Day);

        let mut counts: HashMap<GroupKey, i64> = HashMap::new();
        for event in self.matching(filter) {
            let key = (
                event.channel.clone().filter(|_| by_channel),
                event.status.clone().filter(|_| by_status),
                by_day.then(|| event.timestamp.date_naive()),
            );
            *counts.entry(key).or_insert(0) += 1;
        }

        let mut rows: Vec<GroupCount> = counts
            .into_iter()
            .map(|((channel, status, day), count)| GroupCount {
                channel,
                status,
                day,
                count,
            })
            .collect();

        rows.sort_by(|a, b| {
            let mut ord = Ordering::Equal;
            for field in group_by {
                ord = ord.then_with(|| match field {
                    GroupField::Channel => nulls_last(&a.channel, &b.channel),
                    GroupField::Status => nulls_last(&a.status, &b.status),
                    GroupField::Day => nulls_last(&a.day, &b.day),
                });
            }
            ord
        });

        Ok(rows)
    }

    async fn find_persons_by_ids(
        &self,
        org_id: &str,
        ids: &[String],
    ) -> Result<Vec<Person>, StoreError> {
        self.begin()?;
        Ok(self
            .org_persons(org_id)
            .filter(|p| ids.contains(&p.id))
            .cloned()
            .collect())
    }

    async fn count_persons(&self, org_id: &str) -> Result<i64, StoreError> {
        self.begin()?;
        Ok(self.org_persons(org_id).count() as i64)
    }

    async fn event_time_bounds(
        &self,
        filter: &EventFilter,
    ) -> Result<Option<(DateTime<Utc>, DateTime<Utc>)>, StoreError> {
        self.begin()?;
        let matching = self.matching(filter);
        let first = matching.iter().map(|e| e.timestamp).min();
        let last = matching.iter().map(|e| e.timestamp).max();
        Ok(first.zip(last))
    }

    async fn sample_events(
        &self,
        filter: &EventFilter,
        limit: i64,
    ) -> Result<Vec<ActivityEvent>, StoreError> {
        self.begin()?;
        let matching = self.matching(filter);
        let amount = usize::try_from(limit).unwrap_or(0);
        let mut rng = rand::thread_rng();
        Ok(matching
            .choose_multiple(&mut rng, amount)
            .map(|e| (*e).clone())
            .collect())
    }

    async fn sample_persons(&self, org_id: &str, limit: i64) -> Result<Vec<Person>, StoreError> {
        self.begin()?;
        let people: Vec<&Person> = self.org_persons(org_id).collect();
        let amount = usize::try_from(limit).unwrap_or(0);
        let mut rng = rand::thread_rng();
        Ok(people
            .choose_multiple(&mut rng, amount)
            .map(|p| (*p).clone())
            .collect())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        self.begin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::shared::test_utils::{sample_event, sample_person};
    use crate::store::{DateWindow, DEFAULT_PAGE_SIZE};
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 15, 12, 0, 0).unwrap()
    }

    fn store() -> MemoryStore {
        let mut events = Vec::new();
        for i in 0..25 {
            let mut e = sample_event(i + 1, "org_a", "acct_1", now() - Duration::hours(i * 20));
            e.channel = Some(if i % 2 == 0 { "Email" } else { "Meeting" }.to_string());
            e.status = Some(if i % 3 == 0 { "Booked" } else { "Sent" }.to_string());
            events.push(e);
        }
        events.push(sample_event(100, "org_b", "acct_9", now()));
        events.push(sample_event(101, "org_a", "acct_2", now() - Duration::hours(1)));

        let persons = vec![
            sample_person("p1", "org_a", "Ada", "Lovelace"),
            sample_person("p2", "org_a", "Alan", "Turing"),
            sample_person("p3", "org_b", "Grace", "Hopper"),
        ];
        MemoryStore::new(events, persons)
    }

    #[tokio::test]
    async fn test_find_events_scoped_to_org() {
        let store = store();
        let slice = store
            .find_events_by_org(&EventFilter::for_org("org_a"), SortOrder::default(), None)
            .await
            .unwrap();
        assert_eq!(slice.total_count, 26);
        assert!(slice.events.iter().all(|e| e.customer_org_id == "org_a"));
    }

    #[tokio::test]
    async fn test_pages_concatenate_to_full_set() {
        let store = store();
        let filter = EventFilter::for_org("org_a").with_account(Some("acct_1".to_string()));
        let full = store
            .find_events_by_org(&filter, SortOrder::default(), None)
            .await
            .unwrap();

        let mut collected = Vec::new();
        for page in 1..=3 {
            let slice = store
                .find_events_by_org(
                    &filter,
                    SortOrder::default(),
                    Some(PageRequest::new(page, DEFAULT_PAGE_SIZE)),
                )
                .await
                .unwrap();
            assert_eq!(slice.total_count, 25);
            collected.extend(slice.events);
        }

        assert_eq!(collected, full.events);
        assert!(full
            .events
            .windows(2)
            .all(|w| w[0].timestamp >= w[1].timestamp));
    }

    #[tokio::test]
    async fn test_ascending_sort_breaks_ties_by_id() {
        let store = store();
        let slice = store
            .find_events_by_org(
                &EventFilter::for_org("org_a").with_account(Some("acct_1".to_string())),
                SortOrder::ascending(SortField::Channel),
                None,
            )
            .await
            .unwrap();
        let emails: Vec<i64> = slice
            .events
            .iter()
            .take_while(|e| e.channel.as_deref() == Some("Email"))
            .map(|e| e.id)
            .collect();
        assert_eq!(emails.len(), 13);
        assert!(emails.windows(2).all(|w| w[0] < w[1]));
    }

    #[tokio::test]
    async fn test_aggregate_by_channel_and_status() {
        let store = store();
        let filter = EventFilter::for_org("org_a")
            .with_account(Some("acct_1".to_string()))
            .within(DateWindow::trailing_days(now(), 30));
        let rows = store
            .aggregate_events_by(&filter, &[GroupField::Channel, GroupField::Status])
            .await
            .unwrap();

        let total: i64 = rows.iter().map(|r| r.count).sum();
        assert_eq!(total, 25);
        assert_eq!(rows[0].channel.as_deref(), Some("Email"));
        assert_eq!(rows[0].status.as_deref(), Some("Booked"));
        assert!(rows.iter().all(|r| r.day.is_none()));
    }

    #[tokio::test]
    async fn test_persons_by_ids_respects_org() {
        let store = store();
        let found = store
            .find_persons_by_ids("org_a", &["p1".to_string(), "p3".to_string()])
            .await
            .unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, "p1");
    }

    #[tokio::test]
    async fn test_sampling_is_bounded_and_scoped() {
        let store = store();
        let events = store
            .sample_events(&EventFilter::for_org("org_a"), 10)
            .await
            .unwrap();
        assert_eq!(events.len(), 10);
        assert!(events.iter().all(|e| e.customer_org_id == "org_a"));

        let people = store.sample_persons("org_b", 5).await.unwrap();
        assert_eq!(people.len(), 1);
    }

    #[tokio::test]
    async fn test_unavailable_store_fails_and_counts_calls() {
        let store = store();
        store.set_unavailable(true);
        let result = store.count_persons("org_a").await;
        assert!(matches!(result, Err(StoreError::Connection(_))));
        assert_eq!(store.call_count(), 1);
    }
}
