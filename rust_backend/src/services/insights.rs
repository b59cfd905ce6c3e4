use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::core::domain::{AgeBucketCount, AgeRange, CategoryShare, TimestampedRecord};
use crate::services::distributions::{category_share, count_ages};
use crate::services::trends::TimeBucketAggregator;
use crate::time::{days_between, CalendarDate};

/// Summary-card figures for the yard.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct YardSummary {
    pub reference: Option<CalendarDate>,
    pub total: usize,
    pub dated: usize,
    pub undated: usize,
    pub mean_age_days: f64,
    pub median_age_days: f64,
    pub max_age_days: i64,
    pub age_buckets: Vec<AgeBucketCount>,
    pub categories: BTreeMap<String, CategoryShare>,
}

/// A record together with its age at the reference date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgedRecord {
    pub id: Option<String>,
    pub category: Option<String>,
    pub date: CalendarDate,
    pub age_days: i64,
}

impl TimeBucketAggregator {
    /// Compute the summary cards for a set of yard records.
    pub fn yard_summary<F>(
        &self,
        records: &[TimestampedRecord],
        reference: CalendarDate,
        ranges: &[AgeRange],
        category_of: F,
    ) -> YardSummary
    where
        F: Fn(&TimestampedRecord) -> String,
    {
        let (mut ages, undated) = self.ages(records, reference);
        let age_buckets = count_ages(&ages, ranges);
        let categories = category_share(records, category_of);

        let dated = ages.len();
        let (mean_age_days, median_age_days, max_age_days) = if ages.is_empty() {
            (0.0, 0.0, 0)
        } else {
            ages.sort_unstable();
            let mean = ages.iter().sum::<i64>() as f64 / dated as f64;
            let median = if dated % 2 == 0 {
                (ages[dated / 2 - 1] + ages[dated / 2]) as f64 / 2.0
            } else {
                ages[dated / 2] as f64
            };
            (mean, median, ages[dated - 1])
        };

        YardSummary {
            reference: Some(reference),
            total: records.len(),
            dated,
            undated,
            mean_age_days,
            median_age_days,
            max_age_days,
            age_buckets,
            categories,
        }
    }

    /// The `limit` oldest dated records, oldest first. Ties keep input order.
    pub fn oldest(
        &self,
        records: &[TimestampedRecord],
        reference: CalendarDate,
        limit: usize,
    ) -> Vec<AgedRecord> {
        let mut aged: Vec<AgedRecord> = records
            .iter()
            .filter_map(|record| {
                let date = self.normalizer().parse_opt(record.raw_date())?;
                Some(AgedRecord {
                    id: record.id.clone(),
                    category: record.category.clone(),
                    date,
                    age_days: days_between(date, reference).max(0),
                })
            })
            .collect();

        aged.sort_by(|a, b| b.age_days.cmp(&a.age_days));
        aged.truncate(limit);
        aged
    }
}

/// [`TimeBucketAggregator::yard_summary`] with the default normalizer.
pub fn yard_summary<F>(
    records: &[TimestampedRecord],
    reference: CalendarDate,
    ranges: &[AgeRange],
    category_of: F,
) -> YardSummary
where
    F: Fn(&TimestampedRecord) -> String,
{
    TimeBucketAggregator::new().yard_summary(records, reference, ranges, category_of)
}

/// Category of a record, or `"Unassigned"` when it has none.
pub fn category_or_unassigned(record: &TimestampedRecord) -> String {
    record
        .category
        .clone()
        .unwrap_or_else(|| "Unassigned".to_string())
}
