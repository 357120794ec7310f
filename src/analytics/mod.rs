//! Calendar bucketing for the timeline and chart widgets.

pub mod monthly;
pub mod timeline;

pub use monthly::{
    chart_data, marker_label, monthly_series, trailing_months, ChartData, ChartDataset,
    ChartMarker, MonthlyPoint, YearMonth, CHART_LOOKBACK_DAYS, CHART_MONTHS,
};
pub use timeline::{daily_counts, daily_counts_from_groups, DailyCount, TimelinePoint};
