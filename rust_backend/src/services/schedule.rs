//! Production schedule month views.

use serde::{Deserialize, Serialize};

use crate::core::domain::TimestampedRecord;
use crate::services::trends::TimeBucketAggregator;
use crate::time::{add_months, month_start, CalendarDate};

/// Records scheduled in one calendar month.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthBucket {
    /// First day of the month.
    pub start: CalendarDate,
    /// `YYYY-MM`
    pub label: String,
    pub count: usize,
}

/// Counts per month over a fixed horizon starting at the anchor month.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MonthlySchedule {
    pub months: Vec<MonthBucket>,
    pub undated: usize,
    /// Dated records before the anchor month or past the last month.
    pub outside_horizon: usize,
}

impl MonthlySchedule {
    pub fn total_scheduled(&self) -> usize {
        self.months.iter().map(|m| m.count).sum()
    }
}

impl TimeBucketAggregator {
    /// Count records per calendar month for `months` months starting with the
    /// month containing `anchor`.
    pub fn monthly_counts(
        &self,
        records: &[TimestampedRecord],
        anchor: CalendarDate,
        months: usize,
    ) -> MonthlySchedule {
        let first = month_start(anchor);
        let mut buckets: Vec<MonthBucket> = (0..months)
            .map(|offset| {
                let start = add_months(first, offset as i32);
                MonthBucket {
                    start,
                    label: format!("{:04}-{:02}", start.year(), start.month()),
                    count: 0,
                }
            })
            .collect();

        let mut schedule = MonthlySchedule::default();

        for record in records {
            let Some(date) = self.normalizer().parse_opt(record.raw_date()) else {
                schedule.undated += 1;
                continue;
            };

            let start = month_start(date);
            match buckets.iter_mut().find(|b| b.start == start) {
                Some(bucket) => bucket.count += 1,
                None => schedule.outside_horizon += 1,
            }
        }

        if schedule.undated > 0 {
            log::debug!("Monthly schedule: {} records without a usable date", schedule.undated);
        }

        schedule.months = buckets;
        schedule
    }
}

/// [`TimeBucketAggregator::monthly_counts`] with the default normalizer.
pub fn monthly_counts(
    records: &[TimestampedRecord],
    anchor: CalendarDate,
    months: usize,
) -> MonthlySchedule {
    TimeBucketAggregator::new().monthly_counts(records, anchor, months)
}
