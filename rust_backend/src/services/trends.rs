//! Inventory trend reconstruction.
//!
//! The yard only knows its live vehicle count. Historical levels are inferred
//! by walking backwards from that count and undoing the arrivals and
//! departures recorded after each bucket.
//!
//! ## Edge cases
//! - Events whose date cannot be parsed are excluded and counted, never guessed
//! - Dated events outside the window are counted separately
//! - Levels are clamped at zero when the event log and live count disagree
//! - A zero-length window yields an empty series

use crate::core::domain::{BucketSpan, LevelSeries, TimeBucket, TimestampedRecord, WeekBucket};
use crate::parsing::DateNormalizer;
use crate::time::{add_days, add_months, days_between, half_month_start, week_start, CalendarDate};

impl BucketSpan {
    /// Start of the bucket containing `date`.
    pub fn start_of(&self, date: CalendarDate) -> CalendarDate {
        match self {
            BucketSpan::Week => week_start(date),
            BucketSpan::HalfMonth => half_month_start(date),
        }
    }

    /// Start of the bucket after the one beginning at `start`.
    pub fn next_start(&self, start: CalendarDate) -> CalendarDate {
        match self {
            BucketSpan::Week => add_days(start, 7),
            BucketSpan::HalfMonth if start.day() >= 16 => add_months(start, 1),
            BucketSpan::HalfMonth => add_days(add_months(start, 0), 15),
        }
    }

    /// Start of the bucket before the one beginning at `start`.
    pub fn previous_start(&self, start: CalendarDate) -> CalendarDate {
        match self {
            BucketSpan::Week => add_days(start, -7),
            BucketSpan::HalfMonth if start.day() >= 16 => add_months(start, 0),
            BucketSpan::HalfMonth => add_days(add_months(start, -1), 15),
        }
    }

    /// `count` contiguous bucket starts ending with the bucket containing
    /// `anchor`, oldest first.
    ///
    /// The window never reaches past [`CalendarDate::MIN`]; a longer request
    /// is shortened to the buckets that fit.
    pub fn starts_ending_at(&self, anchor: CalendarDate, count: usize) -> Vec<CalendarDate> {
        let first = self.start_of(anchor);
        let fits = self.buckets_since(CalendarDate::MIN, first);
        if count > fits {
            log::warn!(
                "Window of {} buckets before {} reaches the earliest date; using {}",
                count,
                first,
                fits
            );
        }

        let count = count.min(fits);
        let mut starts = Vec::with_capacity(count);
        let mut current = first;
        for _ in 0..count {
            starts.push(current);
            current = self.previous_start(current);
        }
        starts.reverse();
        starts
    }

    /// Lower bound on how many bucket starts from `start` back to `floor` stay
    /// on or after `floor`.
    fn buckets_since(&self, floor: CalendarDate, start: CalendarDate) -> usize {
        let longest = match self {
            BucketSpan::Week => 7,
            BucketSpan::HalfMonth => 16,
        };
        let days = days_between(floor, start).max(0);
        usize::try_from(days / longest).map_or(usize::MAX, |n| n.saturating_add(1))
    }
}

/// Aggregates timestamped records into buckets and ranges.
///
/// Holds only a [`DateNormalizer`]; every call is a pure function of its
/// arguments, so one aggregator can serve many callers concurrently.
#[derive(Debug, Clone, Default)]
pub struct TimeBucketAggregator {
    normalizer: DateNormalizer,
}

impl TimeBucketAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a normalizer with extra placeholder tokens.
    pub fn with_normalizer(normalizer: DateNormalizer) -> Self {
        Self { normalizer }
    }

    pub fn normalizer(&self) -> &DateNormalizer {
        &self.normalizer
    }

    /// Reconstruct `window_weeks` Monday-anchored weekly levels ending with the
    /// week containing `anchor`, oldest first.
    ///
    /// `level[i] = max(0, current_total - sum(net[i+1..]))`
    pub fn weekly_levels(
        &self,
        arrivals: &[TimestampedRecord],
        departures: &[TimestampedRecord],
        current_total: i64,
        window_weeks: usize,
        anchor: CalendarDate,
    ) -> Vec<WeekBucket> {
        self.level_series(
            BucketSpan::Week,
            arrivals,
            departures,
            current_total,
            window_weeks,
            anchor,
        )
        .buckets
    }

    /// Same reconstruction for any bucket span, also reporting which events
    /// were left out.
    pub fn level_series(
        &self,
        span: BucketSpan,
        arrivals: &[TimestampedRecord],
        departures: &[TimestampedRecord],
        current_total: i64,
        window: usize,
        anchor: CalendarDate,
    ) -> LevelSeries {
        let starts = span.starts_ending_at(anchor, window);
        let mut buckets: Vec<TimeBucket> = starts
            .iter()
            .map(|&start| TimeBucket {
                start,
                end: span.next_start(start),
                arrivals: 0,
                departures: 0,
                net_change: 0,
                level: 0,
            })
            .collect();

        let mut series = LevelSeries {
            span,
            ..Default::default()
        };

        for record in arrivals {
            match self.locate(&buckets, record) {
                Placement::Bucket(i) => buckets[i].arrivals += 1,
                Placement::Outside => series.outside_window += 1,
                Placement::Undated => series.undated_arrivals += 1,
            }
        }

        for record in departures {
            match self.locate(&buckets, record) {
                Placement::Bucket(i) => buckets[i].departures += 1,
                Placement::Outside => series.outside_window += 1,
                Placement::Undated => series.undated_departures += 1,
            }
        }

        let mut net_after = 0i64;
        for bucket in buckets.iter_mut().rev() {
            bucket.net_change = bucket.arrivals as i64 - bucket.departures as i64;
            bucket.level = current_total.saturating_sub(net_after).max(0);
            net_after = net_after.saturating_add(bucket.net_change);
        }

        if series.excluded() > 0 {
            log::debug!(
                "Level series: excluded {} undated arrivals and {} undated departures",
                series.undated_arrivals,
                series.undated_departures
            );
        }

        series.buckets = buckets;
        series
    }

    fn locate(&self, buckets: &[TimeBucket], record: &TimestampedRecord) -> Placement {
        let date = match self.normalizer.parse(record.raw_date()) {
            Ok(date) => date,
            Err(e) => {
                log::debug!("Skipping record {:?}: {}", record.id, e);
                return Placement::Undated;
            }
        };

        let (Some(first), Some(last)) = (buckets.first(), buckets.last()) else {
            return Placement::Outside;
        };
        if date < first.start || date >= last.end {
            return Placement::Outside;
        }

        // Buckets are contiguous, so the last start on or before the date wins
        let index = buckets.partition_point(|b| b.start <= date);
        Placement::Bucket(index - 1)
    }
}

enum Placement {
    Bucket(usize),
    Outside,
    Undated,
}

/// [`TimeBucketAggregator::weekly_levels`] with the default normalizer.
pub fn weekly_levels(
    arrivals: &[TimestampedRecord],
    departures: &[TimestampedRecord],
    current_total: i64,
    window_weeks: usize,
    anchor: CalendarDate,
) -> Vec<WeekBucket> {
    TimeBucketAggregator::new().weekly_levels(
        arrivals,
        departures,
        current_total,
        window_weeks,
        anchor,
    )
}

/// [`TimeBucketAggregator::level_series`] with the default normalizer.
pub fn level_series(
    span: BucketSpan,
    arrivals: &[TimestampedRecord],
    departures: &[TimestampedRecord],
    current_total: i64,
    window: usize,
    anchor: CalendarDate,
) -> LevelSeries {
    TimeBucketAggregator::new().level_series(
        span,
        arrivals,
        departures,
        current_total,
        window,
        anchor,
    )
}
