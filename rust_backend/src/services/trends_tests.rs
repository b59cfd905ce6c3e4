#[cfg(test)]
mod tests {
    use crate::core::domain::{BucketSpan, TimestampedRecord};
    use crate::parsing::DateNormalizer;
    use crate::services::trends::{level_series, weekly_levels, TimeBucketAggregator};
    use crate::time::CalendarDate;
    use serde_json::{json, Value};

    fn d(y: i32, m: u32, day: u32) -> CalendarDate {
        CalendarDate::new(y, m, day).unwrap()
    }

    fn records(dates: &[Value]) -> Vec<TimestampedRecord> {
        dates.iter().cloned().map(TimestampedRecord::new).collect()
    }

    #[test]
    fn test_output_length_matches_window() {
        for window in [1, 3, 10, 52] {
            let buckets = weekly_levels(&[], &[], 7, window, d(2025, 1, 20));
            assert_eq!(buckets.len(), window);
        }
    }

    #[test]
    fn test_no_events_keeps_current_total() {
        let buckets = weekly_levels(&[], &[], 12, 10, d(2025, 6, 4));
        assert!(buckets.iter().all(|b| b.level == 12));
        assert!(buckets.iter().all(|b| b.net_change == 0));
    }

    #[test]
    fn test_buckets_are_contiguous_and_chronological() {
        let buckets = weekly_levels(&[], &[], 0, 10, d(2025, 3, 13));
        for pair in buckets.windows(2) {
            assert_eq!(pair[0].end, pair[1].start);
            assert!(pair[0].start < pair[1].start);
        }
        let last = buckets.last().unwrap();
        assert_eq!(last.start, d(2025, 3, 10));
        assert_eq!(last.end, d(2025, 3, 17));
    }

    #[test]
    fn test_monday_anchored_scenario() {
        let arrivals = records(&[json!("2025-01-01"), json!("2025-01-10")]);
        let departures = records(&[json!("2025-01-08")]);

        let series = level_series(BucketSpan::Week, &arrivals, &departures, 5, 3, d(2025, 1, 20));
        let starts: Vec<_> = series.buckets.iter().map(|b| b.start).collect();
        assert_eq!(starts, vec![d(2025, 1, 6), d(2025, 1, 13), d(2025, 1, 20)]);

        // 01-10 arrival and 01-08 departure cancel out in the first week
        assert_eq!(series.buckets[0].arrivals, 1);
        assert_eq!(series.buckets[0].departures, 1);
        assert_eq!(series.levels(), vec![5, 5, 5]);
        // 01-01 falls before the window
        assert_eq!(series.outside_window, 1);
        assert_eq!(series.excluded(), 0);

        // Walking forward, each level differs from the previous by that bucket's net change
        for pair in series.buckets.windows(2) {
            assert_eq!(pair[1].level - pair[0].level, pair[1].net_change);
        }
    }

    #[test]
    fn test_levels_walk_back_from_current_total() {
        let arrivals = records(&[json!("2025-01-14"), json!("2025-01-21"), json!("22/01/2025")]);
        let departures = records(&[json!("2025-01-15"), json!("2025-01-07")]);

        let buckets = weekly_levels(&arrivals, &departures, 4, 3, d(2025, 1, 22));
        let nets: Vec<_> = buckets.iter().map(|b| b.net_change).collect();
        let levels: Vec<_> = buckets.iter().map(|b| b.level).collect();

        assert_eq!(nets, vec![-1, 0, 2]);
        assert_eq!(levels, vec![2, 2, 4]);
    }

    #[test]
    fn test_levels_clamp_at_zero() {
        let arrivals = records(&[
            json!("2025-01-20"),
            json!("2025-01-21"),
            json!("2025-01-22"),
            json!("2025-01-23"),
            json!("2025-01-24"),
        ]);

        let buckets = weekly_levels(&arrivals, &[], 1, 3, d(2025, 1, 20));
        assert_eq!(buckets[2].level, 1);
        assert_eq!(buckets[1].level, 0);
        assert_eq!(buckets[0].level, 0);
    }

    #[test]
    fn test_negative_total_clamps_every_level() {
        let buckets = weekly_levels(&[], &[], -3, 4, d(2025, 1, 20));
        assert!(buckets.iter().all(|b| b.level == 0));
    }

    #[test]
    fn test_unparseable_dates_are_excluded_and_counted() {
        let arrivals = records(&[
            json!("DD/MM/YYYY"),
            json!(""),
            Value::Null,
            json!("2025-01-14"),
            json!("2025-02-30"),
        ]);
        let departures = records(&[json!("garbage"), json!("2025-01-15")]);

        let series = level_series(BucketSpan::Week, &arrivals, &departures, 10, 3, d(2025, 1, 20));

        assert_eq!(series.undated_arrivals, 4);
        assert_eq!(series.undated_departures, 1);
        assert_eq!(series.excluded(), 5);
        let counted: usize = series.buckets.iter().map(|b| b.arrivals + b.departures).sum();
        assert_eq!(counted, 2);
        assert_eq!(series.buckets[1].arrivals, 1);
        assert_eq!(series.buckets[1].departures, 1);
    }

    #[test]
    fn test_events_after_anchor_week_are_outside() {
        let arrivals = records(&[json!("2025-01-27"), json!("2025-01-26")]);
        let series = level_series(BucketSpan::Week, &arrivals, &[], 3, 2, d(2025, 1, 20));
        assert_eq!(series.outside_window, 1);
        assert_eq!(series.buckets[1].arrivals, 1);
    }

    #[test]
    fn test_half_month_series() {
        let arrivals = records(&[json!("2025-02-03"), json!("2025-02-20"), json!("2025-03-02")]);
        let departures = records(&[json!("2025-02-16")]);

        let series =
            level_series(BucketSpan::HalfMonth, &arrivals, &departures, 6, 3, d(2025, 3, 10));
        let starts: Vec<_> = series.buckets.iter().map(|b| b.start).collect();
        assert_eq!(starts, vec![d(2025, 2, 1), d(2025, 2, 16), d(2025, 3, 1)]);
        assert_eq!(series.buckets[2].end, d(2025, 3, 16));

        let nets: Vec<_> = series.buckets.iter().map(|b| b.net_change).collect();
        assert_eq!(nets, vec![1, 0, 1]);
        assert_eq!(series.levels(), vec![5, 5, 6]);
    }

    #[test]
    fn test_custom_placeholders_are_excluded() {
        let aggregator = TimeBucketAggregator::with_normalizer(
            DateNormalizer::new().with_placeholders(["awaiting transport"]),
        );
        let arrivals = records(&[json!("Awaiting transport"), json!("2025-01-20")]);
        let series =
            aggregator.level_series(BucketSpan::Week, &arrivals, &[], 2, 1, d(2025, 1, 20));
        assert_eq!(series.undated_arrivals, 1);
        assert_eq!(series.buckets[0].arrivals, 1);
    }

    #[test]
    fn test_mixed_input_shapes_land_in_same_week() {
        let arrivals = records(&[
            json!("2025-01-14"),
            json!("14/01/2025"),
            json!(20250114),
            json!(45671),
            json!({"seconds": 1736812800, "nanoseconds": 0}),
        ]);
        let buckets = weekly_levels(&arrivals, &[], 5, 2, d(2025, 1, 20));
        assert_eq!(buckets[0].arrivals, 5);
        assert_eq!(buckets[0].level, 5);
    }
}
