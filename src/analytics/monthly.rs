use std::collections::BTreeMap;

use chrono::{DateTime, Datelike, Months, NaiveDate, Utc};
use serde::Serialize;

use super::timeline::DailyCount;

pub const CHART_MONTHS: u32 = 12;
pub const CHART_LOOKBACK_DAYS: i64 = 365;

const DATASET_LABEL: &str = "Activity";
const LINE_COLOR: &str = "#3b82f6";
const FILL_COLOR: &str = "rgba(59, 130, 246, 0.1)";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct YearMonth {
    pub year: i32,
    pub month: u32,
}

impl YearMonth {
    pub fn of(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    /// `Mar 2024`
    pub fn label(&self) -> String {
        match NaiveDate::from_ymd_opt(self.year, self.month, 1) {
            Some(first) => first.format("%b %Y").to_string(),
            None => format!("{:02}/{}", self.month, self.year),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonthlyPoint {
    pub month: YearMonth,
    pub count: i64,
}

/// The 12 calendar months ending with the month of `now`, oldest first.
pub fn trailing_months(now: DateTime<Utc>) -> Vec<YearMonth> {
    let today = now.date_naive();
    (0..CHART_MONTHS)
        .rev()
        .filter_map(|back| today.checked_sub_months(Months::new(back)))
        .map(YearMonth::of)
        .collect()
}

/// Folds daily counts into months and zero-fills the trailing span. Counts outside it are dropped.
pub fn monthly_series(now: DateTime<Utc>, daily: &[DailyCount]) -> Vec<MonthlyPoint> {
    let mut buckets: BTreeMap<YearMonth, i64> = BTreeMap::new();
    for d in daily {
        *buckets.entry(YearMonth::of(d.date)).or_default() += d.count;
    }

    trailing_months(now)
        .into_iter()
        .map(|month| MonthlyPoint {
            month,
            count: buckets.get(&month).copied().unwrap_or(0),
        })
        .collect()
}

pub fn marker_label(count: i64) -> String {
    if count >= 10 {
        format!("+{}", count / 10)
    } else {
        count.to_string()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartDataset {
    pub label: String,
    pub data: Vec<i64>,
    pub border_color: String,
    pub background_color: String,
    pub point_background_color: String,
    pub point_border_color: String,
    pub point_radius: u32,
    pub point_hover_radius: u32,
    pub tension: f64,
    pub fill: bool,
}

impl ChartDataset {
    fn activity(data: Vec<i64>) -> Self {
        Self {
            label: DATASET_LABEL.to_string(),
            data,
            border_color: LINE_COLOR.to_string(),
            background_color: FILL_COLOR.to_string(),
            point_background_color: LINE_COLOR.to_string(),
            point_border_color: LINE_COLOR.to_string(),
            point_radius: 4,
            point_hover_radius: 6,
            tension: 0.4,
            fill: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChartMarker {
    pub month: String,
    pub label: String,
    pub position: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartData {
    pub labels: Vec<String>,
    pub datasets: Vec<ChartDataset>,
    pub markers: Vec<ChartMarker>,
}

pub fn chart_data(points: &[MonthlyPoint]) -> ChartData {
    let labels: Vec<String> = points.iter().map(|p| p.month.label()).collect();
    let markers = points
        .iter()
        .zip(&labels)
        .map(|(p, month)| ChartMarker {
            month: month.clone(),
            label: marker_label(p.count),
            position: p.count,
        })
        .collect();

    ChartData {
        datasets: vec![ChartDataset::activity(
            points.iter().map(|p| p.count).collect(),
        )],
        labels,
        markers,
    }
}
