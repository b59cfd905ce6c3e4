#![allow(clippy::manual_is_multiple_of)]

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::core::domain::{AgeBucketCount, AgeRange, CategoryShare, DateField, TimestampedRecord};
use crate::services::trends::TimeBucketAggregator;
use crate::time::{days_between, CalendarDate};

/// Descriptive statistics over a set of day counts.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DurationStats {
    pub count: usize,
    pub mean: f64,
    pub median: f64,
    pub std_dev: f64,
    pub min: f64,
    pub max: f64,
    pub sum: f64,
    /// Rows where either date was missing or the end preceded the start.
    pub skipped: usize,
}

/// Summary statistics over day counts. An empty slice gives all zeros.
fn summarize_days(days: &[f64]) -> DurationStats {
    let mut sorted = days.to_vec();
    sorted.sort_by(f64::total_cmp);

    let (Some(&min), Some(&max)) = (sorted.first(), sorted.last()) else {
        return DurationStats::default();
    };

    let count = sorted.len();
    let sum: f64 = sorted.iter().sum();
    let mean = sum / count as f64;
    let mid = count / 2;
    let median = if count % 2 == 1 {
        sorted[mid]
    } else {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    };
    let variance = sorted.iter().map(|d| (d - mean).powi(2)).sum::<f64>() / count as f64;

    DurationStats {
        count,
        mean,
        median,
        std_dev: variance.sqrt(),
        min,
        max,
        sum,
        skipped: 0,
    }
}

/// Whole-number percentage of `count` in `total`, rounded half up.
/// A zero total gives zero.
pub fn percent_of(count: usize, total: usize) -> u32 {
    if total == 0 {
        return 0;
    }
    let (count, total) = (count as u64, total as u64);
    ((count * 200 + total) / (total * 2)) as u32
}

impl TimeBucketAggregator {
    /// Age in days of each dated record at `reference`, plus how many records
    /// had no usable date. Future dates count as age 0.
    pub fn ages(&self, records: &[TimestampedRecord], reference: CalendarDate) -> (Vec<i64>, usize) {
        let mut ages = Vec::with_capacity(records.len());
        let mut undated = 0;

        for record in records {
            match self.normalizer().parse(record.raw_date()) {
                Ok(date) => ages.push(days_between(date, reference).max(0)),
                Err(_) => undated += 1,
            }
        }

        (ages, undated)
    }

    /// Count records per age range, in the order the ranges were given.
    ///
    /// Ranges are inclusive at both ends. Records without a usable date, or
    /// older than every bounded range, are not counted anywhere.
    pub fn age_bucket_counts(
        &self,
        records: &[TimestampedRecord],
        ranges: &[AgeRange],
        reference: CalendarDate,
    ) -> Vec<AgeBucketCount> {
        let (ages, _) = self.ages(records, reference);
        count_ages(&ages, ranges)
    }

    /// Statistics of `end_field - start_field` in days across rows.
    ///
    /// Rows where either side is missing, unparseable, or where the end falls
    /// before the start are skipped and reported in `skipped`.
    pub fn duration_stats(
        &self,
        records: &[TimestampedRecord],
        start_field: &DateField,
        end_field: &DateField,
    ) -> DurationStats {
        let mut values = Vec::with_capacity(records.len());
        let mut skipped = 0;

        for record in records {
            match self
                .normalizer()
                .duration_days(record.date_of(start_field), record.date_of(end_field))
            {
                Some(days) => values.push(days as f64),
                None => skipped += 1,
            }
        }

        DurationStats {
            skipped,
            ..summarize_days(&values)
        }
    }
}

pub(crate) fn count_ages(ages: &[i64], ranges: &[AgeRange]) -> Vec<AgeBucketCount> {
    let mut counts: Vec<AgeBucketCount> = ranges
        .iter()
        .cloned()
        .map(|range| AgeBucketCount { range, count: 0 })
        .collect();

    for &age in ages {
        if let Some(bucket) = counts.iter_mut().find(|b| b.range.contains(age)) {
            bucket.count += 1;
        }
    }

    counts
}

/// [`TimeBucketAggregator::age_bucket_counts`] with the default normalizer.
pub fn age_bucket_counts(
    records: &[TimestampedRecord],
    ranges: &[AgeRange],
    reference: CalendarDate,
) -> Vec<AgeBucketCount> {
    TimeBucketAggregator::new().age_bucket_counts(records, ranges, reference)
}

/// Group records by `category_of` and report each group's size and share.
///
/// # Examples
///
/// ```
/// use dealer_ops::core::TimestampedRecord;
/// use dealer_ops::services::distributions::category_share;
///
/// let records = vec![
///     TimestampedRecord::new("2025-01-01").with_category("Stock"),
///     TimestampedRecord::new("2025-01-02").with_category("Customer"),
///     TimestampedRecord::new("2025-01-03").with_category("Stock"),
/// ];
/// let shares = category_share(&records, |r| r.category.clone().unwrap_or_default());
/// assert_eq!(shares["Stock"].count, 2);
/// assert_eq!(shares["Stock"].percent, 67);
/// assert_eq!(shares["Customer"].percent, 33);
/// ```
pub fn category_share<R, K, F>(records: &[R], category_of: F) -> BTreeMap<K, CategoryShare>
where
    K: Ord,
    F: Fn(&R) -> K,
{
    category_share_seeded(records, std::iter::empty(), category_of)
}

/// Like [`category_share`], but every `known` category is present in the
/// result even when no record falls into it.
pub fn category_share_seeded<R, K, F>(
    records: &[R],
    known: impl IntoIterator<Item = K>,
    category_of: F,
) -> BTreeMap<K, CategoryShare>
where
    K: Ord,
    F: Fn(&R) -> K,
{
    let mut shares: BTreeMap<K, CategoryShare> = known
        .into_iter()
        .map(|k| (k, CategoryShare::default()))
        .collect();

    for record in records {
        shares.entry(category_of(record)).or_default().count += 1;
    }

    let total = records.len();
    for share in shares.values_mut() {
        share.percent = percent_of(share.count, total);
    }

    shares
}
