//! Dashboard report assembly.
//!
//! Combines every view the dashboard shows into one serializable structure:
//! the inventory trend, the yard summary cards, lead-time statistics and the
//! production month view. Presentation code only formats what is here.

use serde::{Deserialize, Serialize};

use crate::config::DashboardConfig;
use crate::core::domain::{LevelSeries, TimestampedRecord};
use crate::io::Snapshot;
use crate::services::distributions::DurationStats;
use crate::services::insights::{category_or_unassigned, AgedRecord, YardSummary};
use crate::services::schedule::MonthlySchedule;
use crate::time::{format, CalendarDate};

/// Everything the dashboard renders for one snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardReport {
    pub anchor: CalendarDate,
    /// `anchor` in the configured display style.
    pub anchor_display: String,
    pub rows: usize,
    /// Rows received but not yet handed over.
    pub in_yard: usize,
    pub inventory: LevelSeries,
    pub yard: YardSummary,
    pub oldest: Vec<AgedRecord>,
    pub receipt_to_handover: DurationStats,
    pub order_to_handover: DurationStats,
    pub production: MonthlySchedule,
}

impl DashboardReport {
    /// Build the report for `snapshot` as seen on `anchor`.
    ///
    /// A row is in the yard when its received date parses and it has no
    /// usable handover date. Rows never received (production-only, or a
    /// placeholder received date) are not stock. The live yard count seeds the
    /// backward inventory reconstruction.
    pub fn build(snapshot: &Snapshot, config: &DashboardConfig, anchor: CalendarDate) -> Self {
        let aggregator = config.aggregator();
        let fields = &config.fields;
        let category_key = Some(fields.category.as_str()).filter(|k| !k.is_empty());

        let everything = snapshot.records(&fields.received, category_key);
        let normalizer = aggregator.normalizer();
        let in_yard: Vec<TimestampedRecord> = everything
            .iter()
            .filter(|record| {
                normalizer.parse_opt(record.raw_date()).is_some()
                    && normalizer.parse_opt(record.date_of(&fields.handover)).is_none()
            })
            .cloned()
            .collect();

        let arrivals = snapshot.records_with(&fields.received, category_key);
        let departures = snapshot.records_with(&fields.handover, category_key);

        let inventory = aggregator.level_series(
            config.trends.span,
            &arrivals,
            &departures,
            in_yard.len() as i64,
            config.trends.window_weeks,
            anchor,
        );

        let yard = aggregator.yard_summary(
            &in_yard,
            anchor,
            &config.ageing.ranges,
            category_or_unassigned,
        );
        let oldest = aggregator.oldest(&in_yard, anchor, config.ageing.oldest_limit);

        let receipt_to_handover =
            aggregator.duration_stats(&everything, &fields.received, &fields.handover);
        let order_to_handover =
            aggregator.duration_stats(&everything, &fields.signed_order, &fields.handover);

        let production = aggregator.monthly_counts(
            &snapshot.records_with(&fields.production, category_key),
            anchor,
            config.trends.schedule_months,
        );

        log::info!(
            "Built dashboard report for {}: {} rows, {} in yard, {} undated arrivals",
            anchor,
            snapshot.len(),
            in_yard.len(),
            inventory.undated_arrivals
        );

        Self {
            anchor,
            anchor_display: format(anchor, config.dates.display_style),
            rows: snapshot.len(),
            in_yard: in_yard.len(),
            inventory,
            yard,
            oldest,
            receipt_to_handover,
            order_to_handover,
            production,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::SnapshotLoader;

    fn d(y: i32, m: u32, day: u32) -> CalendarDate {
        CalendarDate::new(y, m, day).unwrap()
    }

    fn snapshot() -> Snapshot {
        SnapshotLoader::load_from_str(
            r#"[
                {"id": "A", "receivedAt": "2025-01-07", "handoverAt": "2025-01-15",
                 "signedOrderReceived": "2024-12-26", "type": "Customer"},
                {"id": "B", "receivedAt": "2025-01-14", "type": "Stock",
                 "productionDate": "2025-02-10"},
                {"id": "C", "receivedAt": "20/01/2025", "handoverAt": "DD/MM/YYYY",
                 "type": "Stock"},
                {"id": "D", "receivedAt": "TBC", "productionDate": "2025-01-20"}
            ]"#,
        )
        .unwrap()
    }

    #[test]
    fn test_build_report() {
        let report = DashboardReport::build(&snapshot(), &DashboardConfig::default(), d(2025, 1, 22));

        assert_eq!(report.rows, 4);
        // B and C were received and have no usable handover date; D was never received
        assert_eq!(report.in_yard, 2);
        assert_eq!(report.anchor_display, "22/01/2025");

        let levels = report.inventory.levels();
        assert_eq!(levels.len(), 12);
        assert_eq!(*levels.last().unwrap(), 2);
        // week of 01-13: B arrived, A left
        assert_eq!(levels[levels.len() - 2], 1);
        // week of 01-06: A arrived
        assert_eq!(levels[levels.len() - 3], 1);
        assert_eq!(levels[levels.len() - 4], 0);
        assert_eq!(report.inventory.undated_arrivals, 1);
        assert_eq!(report.inventory.undated_departures, 1);

        assert_eq!(report.yard.total, 2);
        assert_eq!(report.yard.undated, 0);
        assert_eq!(report.yard.categories["Stock"].count, 2);
        assert_eq!(report.yard.categories["Stock"].percent, 100);
        assert_eq!(report.oldest[0].id.as_deref(), Some("B"));

        assert_eq!(report.receipt_to_handover.count, 1);
        assert_eq!(report.receipt_to_handover.mean, 8.0);
        assert_eq!(report.order_to_handover.max, 20.0);

        let production: Vec<_> = report.production.months.iter().map(|m| m.count).collect();
        assert_eq!(production, vec![1, 1, 0, 0, 0, 0]);
    }

    #[test]
    fn test_unreceived_rows_are_not_stock() {
        let snapshot = SnapshotLoader::load_from_str(
            r#"[
                {"id": "P1", "productionDate": "2025-02-03"},
                {"id": "P2", "productionDate": "2025-03-10"},
                {"id": "P3", "receivedAt": "TBC", "productionDate": "2025-03-11"}
            ]"#,
        )
        .unwrap();
        let report = DashboardReport::build(&snapshot, &DashboardConfig::default(), d(2025, 1, 22));

        assert_eq!(report.rows, 3);
        assert_eq!(report.in_yard, 0);
        assert_eq!(report.yard.total, 0);
        assert!(report.oldest.is_empty());
        assert_eq!(report.inventory.levels().last(), Some(&0));
        assert_eq!(report.production.total_scheduled(), 3);
    }

    #[test]
    fn test_empty_snapshot_report() {
        let empty = SnapshotLoader::load_from_str("[]").unwrap();
        let report = DashboardReport::build(&empty, &DashboardConfig::default(), d(2025, 1, 22));

        assert_eq!(report.in_yard, 0);
        assert!(report.inventory.levels().iter().all(|&l| l == 0));
        assert_eq!(report.yard.age_buckets.len(), 4);
        assert_eq!(report.receipt_to_handover.count, 0);
        assert_eq!(report.production.total_scheduled(), 0);
    }
}
