//! Aggregations behind the dashboard views.
//!
//! Every service here is a pure function of the records it is handed. Services
//! never fail: empty or fully unparseable input yields zero-filled output.

pub mod distributions;
pub mod insights;
pub mod report;
pub mod schedule;
pub mod trends;

#[cfg(test)]
mod trends_tests;

pub use distributions::{age_bucket_counts, category_share, category_share_seeded, DurationStats};
pub use insights::{yard_summary, AgedRecord, YardSummary};
pub use report::DashboardReport;
pub use schedule::{monthly_counts, MonthBucket, MonthlySchedule};
pub use trends::{level_series, weekly_levels, TimeBucketAggregator};
