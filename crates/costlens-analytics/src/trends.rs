//! Daily trend aggregation.
//!
//! Groups cost records into one [`TrendPoint`] per calendar date present in
//! the input, with per-service and per-project breakdowns of net cost.
//!
//! ## Usage
//!
//! ```
//! use chrono::NaiveDate;
//! use costlens_analytics::{CostRecord, aggregate_trends};
//!
//! let day = NaiveDate::from_ymd_opt(2026, 3, 1).unwrap();
//! let records = vec![
//!     CostRecord::new("proj-a", "Compute Engine", day, 10.0),
//!     CostRecord::new("proj-b", "Compute Engine", day, 5.0).with_credits(-1.0),
//! ];
//!
//! let trends = aggregate_trends(&records);
//! assert_eq!(trends.len(), 1);
//! assert_eq!(trends[0].total_cost, 14.0);
//! ```

use crate::models::{CostRecord, TrendPoint};
use chrono::NaiveDate;
use std::collections::BTreeMap;
use tracing::debug;

/// Aggregate records into daily trend points, ascending by date.
///
/// Dates without records are not zero-filled.
pub fn aggregate_trends(records: &[CostRecord]) -> Vec<TrendPoint> {
    let mut by_date: BTreeMap<NaiveDate, TrendPoint> = BTreeMap::new();

    for record in records {
        let net = record.net_cost();
        let point = by_date
            .entry(record.usage_date)
            .or_insert_with(|| TrendPoint::with_total(record.usage_date, 0.0));

        point.total_cost += net;
        *point
            .cost_by_service
            .entry(record.service_name.clone())
            .or_insert(0.0) += net;
        *point
            .cost_by_project
            .entry(record.project_id.clone())
            .or_insert(0.0) += net;
    }

    debug!(
        records = records.len(),
        days = by_date.len(),
        "aggregated daily trends"
    );

    by_date.into_values().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, d).unwrap()
    }

    fn assert_close(a: f64, b: f64) {
        assert!((a - b).abs() < 1e-9, "{} != {}", a, b);
    }

    #[test]
    fn test_empty_input() {
        assert!(aggregate_trends(&[]).is_empty());
    }

    #[test]
    fn test_groups_by_date_ascending() {
        let records = vec![
            CostRecord::new("p1", "Compute", date(3), 1.0),
            CostRecord::new("p1", "Compute", date(1), 2.0),
            CostRecord::new("p1", "Compute", date(2), 3.0),
            CostRecord::new("p1", "Compute", date(1), 4.0),
        ];

        let trends = aggregate_trends(&records);
        let dates: Vec<_> = trends.iter().map(|t| t.date).collect();
        assert_eq!(dates, vec![date(1), date(2), date(3)]);
        assert_close(trends[0].total_cost, 6.0);
    }

    #[test]
    fn test_gaps_are_not_filled() {
        let records = vec![
            CostRecord::new("p1", "Compute", date(1), 1.0),
            CostRecord::new("p1", "Compute", date(5), 1.0),
        ];

        let trends = aggregate_trends(&records);
        assert_eq!(trends.len(), 2);
        assert_eq!(trends[1].date, date(5));
    }

    #[test]
    fn test_duplicate_keys_are_summed() {
        let records = vec![
            CostRecord::new("p1", "Compute", date(1), 2.0),
            CostRecord::new("p1", "Compute", date(1), 3.0).with_credits(-0.5),
        ];

        let trends = aggregate_trends(&records);
        assert_close(trends[0].cost_by_service["Compute"], 4.5);
        assert_close(trends[0].cost_by_project["p1"], 4.5);
    }

    #[test]
    fn test_breakdowns_partition_total() {
        let records = vec![
            CostRecord::new("p1", "Compute", date(1), 10.0).with_credits(-1.0),
            CostRecord::new("p2", "Compute", date(1), 5.0),
            CostRecord::new("p1", "Storage", date(1), 2.25),
            CostRecord::new("p3", "BigQuery", date(1), 7.5).with_credits(-7.5),
            CostRecord::new("p2", "Storage", date(2), 1.0),
        ];

        for point in aggregate_trends(&records) {
            let by_service: f64 = point.cost_by_service.values().sum();
            let by_project: f64 = point.cost_by_project.values().sum();
            assert_close(by_service, point.total_cost);
            assert_close(by_project, point.total_cost);
        }
    }

    #[test]
    fn test_deterministic_for_reordered_input() {
        let mut records = vec![
            CostRecord::new("p1", "Compute", date(2), 1.0),
            CostRecord::new("p2", "Storage", date(1), 2.0),
            CostRecord::new("p1", "Storage", date(2), 3.0),
        ];
        let first = aggregate_trends(&records);
        records.reverse();
        let second = aggregate_trends(&records);
        assert_eq!(first, second);
    }
}
