use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::Serialize;

use crate::store::{ActivityEvent, GroupCount};

/// Events on one UTC calendar date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DailyCount {
    pub date: NaiveDate,
    pub count: i64,
}

/// Same bucket as [`DailyCount`], keyed as `day` for the activity-timeline payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TimelinePoint {
    pub day: NaiveDate,
    pub count: i64,
}

impl From<DailyCount> for TimelinePoint {
    fn from(d: DailyCount) -> Self {
        Self {
            day: d.date,
            count: d.count,
        }
    }
}

/// Ascending by date. Dates without events are absent.
pub fn daily_counts(events: &[ActivityEvent]) -> Vec<DailyCount> {
    let mut buckets: BTreeMap<NaiveDate, i64> = BTreeMap::new();
    for event in events {
        *buckets.entry(event.timestamp.date_naive()).or_default() += 1;
    }
    buckets
        .into_iter()
        .map(|(date, count)| DailyCount { date, count })
        .collect()
}

/// Converts rows grouped by day in the store. Rows without a day are skipped.
pub fn daily_counts_from_groups(rows: &[GroupCount]) -> Vec<DailyCount> {
    let mut buckets: BTreeMap<NaiveDate, i64> = BTreeMap::new();
    for row in rows {
        if let Some(date) = row.day {
            *buckets.entry(date).or_default() += row.count;
        }
    }
    buckets
        .into_iter()
        .map(|(date, count)| DailyCount { date, count })
        .collect()
}
