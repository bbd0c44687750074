//! Statistical cost anomaly detection.
//!
//! Every (project, service) pair gets a baseline from its historical daily
//! net costs. An evaluation-day observation is flagged when its distance from
//! the baseline mean, measured in baseline standard deviations, exceeds the
//! caller's threshold.
//!
//! Degenerate groups never fail the batch:
//! - pairs with fewer than [`MIN_BASELINE_SAMPLES`] daily samples get no baseline
//! - pairs whose history has zero variance cannot be scored and are skipped
//! - a zero baseline mean leaves `deviation_pct` unset
//!
//! ## Usage
//!
//! ```
//! use chrono::{Days, NaiveDate};
//! use costlens_analytics::{CostRecord, Severity, detect_anomalies};
//!
//! let start = NaiveDate::from_ymd_opt(2026, 3, 1).unwrap();
//! let history: Vec<_> = [10.0, 12.0, 9.0, 11.0, 10.0, 13.0, 8.0]
//!     .iter()
//!     .enumerate()
//!     .map(|(i, &cost)| {
//!         CostRecord::new("proj-a", "BigQuery", start + Days::new(i as u64), cost)
//!     })
//!     .collect();
//! let today = vec![CostRecord::new("proj-a", "BigQuery", start + Days::new(7), 40.0)];
//!
//! let findings = detect_anomalies(&history, &today, 2.0).unwrap();
//! assert_eq!(findings.len(), 1);
//! assert_eq!(findings[0].severity, Severity::High);
//! ```

use crate::error::{CostError, Result};
use crate::models::{AnomalyFinding, BaselineStats, CostRecord, Severity};
use chrono::{Days, NaiveDate};
use std::collections::{BTreeMap, HashMap};
use tracing::{debug, trace};

/// Minimum number of historical daily samples for a baseline.
pub const MIN_BASELINE_SAMPLES: usize = 7;

/// (project_id, service_name)
pub type PairKey = (String, String);

fn pair_key(record: &CostRecord) -> PairKey {
    (record.project_id.clone(), record.service_name.clone())
}

/// Build baselines for every pair with enough daily history.
///
/// Records sharing a (project, service, date) are summed into one daily
/// sample before statistics are taken.
pub fn build_baselines(historical: &[CostRecord]) -> HashMap<PairKey, BaselineStats> {
    let mut daily: HashMap<PairKey, BTreeMap<NaiveDate, f64>> = HashMap::new();
    for record in historical {
        *daily
            .entry(pair_key(record))
            .or_default()
            .entry(record.usage_date)
            .or_insert(0.0) += record.net_cost();
    }

    let pairs = daily.len();
    let baselines: HashMap<PairKey, BaselineStats> = daily
        .into_iter()
        .filter_map(|(key, samples)| {
            if samples.len() < MIN_BASELINE_SAMPLES {
                trace!(
                    project_id = %key.0,
                    service_name = %key.1,
                    samples = samples.len(),
                    "not enough history for baseline"
                );
                return None;
            }
            let values: Vec<f64> = samples.into_values().collect();
            Some((key, baseline_from_samples(&values)))
        })
        .collect();

    debug!(pairs, baselines = baselines.len(), "built anomaly baselines");
    baselines
}

/// Mean and sample standard deviation (n - 1 denominator).
fn baseline_from_samples(samples: &[f64]) -> BaselineStats {
    let n = samples.len();
    let mean = samples.iter().sum::<f64>() / n as f64;
    let variance = if n > 1 {
        samples.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1) as f64
    } else {
        0.0
    };

    BaselineStats {
        mean,
        stddev: variance.sqrt(),
        sample_count: n,
    }
}

/// Score evaluation-day costs against historical baselines.
///
/// `threshold` gates inclusion only; severity uses the fixed tiers of
/// [`Severity::from_z_score`]. Findings come back sorted by descending
/// z-score, though callers should treat them as a set.
pub fn detect_anomalies(
    historical: &[CostRecord],
    evaluation: &[CostRecord],
    threshold: f64,
) -> Result<Vec<AnomalyFinding>> {
    if !threshold.is_finite() || threshold <= 0.0 {
        return Err(CostError::InvalidParameter(format!(
            "z-score threshold must be a positive number, got {}",
            threshold
        )));
    }

    let baselines = build_baselines(historical);

    let mut observed: BTreeMap<(PairKey, NaiveDate), f64> = BTreeMap::new();
    for record in evaluation {
        *observed
            .entry((pair_key(record), record.usage_date))
            .or_insert(0.0) += record.net_cost();
    }

    let mut findings = Vec::new();
    for ((key, date), actual_cost) in observed {
        let Some(baseline) = baselines.get(&key) else {
            continue;
        };

        if baseline.stddev == 0.0 {
            trace!(
                project_id = %key.0,
                service_name = %key.1,
                "zero variance baseline, skipping"
            );
            continue;
        }

        let z_score = (actual_cost - baseline.mean).abs() / baseline.stddev;
        if z_score <= threshold {
            continue;
        }

        let deviation_pct = (baseline.mean != 0.0)
            .then(|| (actual_cost - baseline.mean) / baseline.mean * 100.0);

        let (project_id, service_name) = key;
        findings.push(AnomalyFinding {
            date,
            project_id,
            service_name,
            actual_cost,
            expected_cost: baseline.mean,
            deviation_pct,
            severity: Severity::from_z_score(z_score),
            z_score,
        });
    }

    findings.sort_by(|a, b| {
        b.z_score
            .total_cmp(&a.z_score)
            .then_with(|| a.project_id.cmp(&b.project_id))
            .then_with(|| a.service_name.cmp(&b.service_name))
            .then_with(|| a.date.cmp(&b.date))
    });

    debug!(
        evaluated = evaluation.len(),
        findings = findings.len(),
        threshold,
        "anomaly detection complete"
    );

    Ok(findings)
}

/// Split records into the lookback window before `evaluation_date` and the
/// evaluation day itself.
///
/// History covers `[evaluation_date - lookback_days, evaluation_date)`.
/// Records outside both are dropped.
pub fn split_window(
    records: &[CostRecord],
    evaluation_date: NaiveDate,
    lookback_days: u32,
) -> (Vec<CostRecord>, Vec<CostRecord>) {
    let window_start = evaluation_date
        .checked_sub_days(Days::new(u64::from(lookback_days)))
        .unwrap_or(NaiveDate::MIN);

    let mut historical = Vec::new();
    let mut evaluation = Vec::new();
    for record in records {
        if record.usage_date == evaluation_date {
            evaluation.push(record.clone());
        } else if record.usage_date >= window_start && record.usage_date < evaluation_date {
            historical.push(record.clone());
        }
    }

    (historical, evaluation)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn start() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, 1).unwrap()
    }

    fn day(offset: u64) -> NaiveDate {
        start() + Days::new(offset)
    }

    fn history(project: &str, service: &str, costs: &[f64]) -> Vec<CostRecord> {
        costs
            .iter()
            .enumerate()
            .map(|(i, &cost)| CostRecord::new(project, service, day(i as u64), cost))
            .collect()
    }

    fn eval(project: &str, service: &str, offset: u64, cost: f64) -> CostRecord {
        CostRecord::new(project, service, day(offset), cost)
    }

    #[test]
    fn test_scenario_high_severity_spike() {
        let historical = history("P", "S", &[10.0, 12.0, 9.0, 11.0, 10.0, 13.0, 8.0]);
        let evaluation = vec![eval("P", "S", 7, 40.0)];

        let findings = detect_anomalies(&historical, &evaluation, 2.0).unwrap();
        assert_eq!(findings.len(), 1);

        let finding = &findings[0];
        assert_eq!(finding.date, day(7));
        assert_eq!(finding.severity, Severity::High);
        assert!((finding.expected_cost - 10.428_571).abs() < 1e-3);
        assert!((finding.z_score - 17.21).abs() < 0.01);
        let deviation = finding.deviation_pct.unwrap();
        assert!((deviation - 283.56).abs() < 0.01);
    }

    #[test]
    fn test_baseline_uses_sample_stddev() {
        let baselines = build_baselines(&history("P", "S", &[10.0, 12.0, 9.0, 11.0, 10.0, 13.0, 8.0]));
        let stats = baselines[&("P".to_string(), "S".to_string())];
        assert_eq!(stats.sample_count, 7);
        assert!((stats.stddev - 1.7183).abs() < 1e-3);
    }

    #[test]
    fn test_scenario_zero_variance_excluded() {
        let historical = history("P", "S", &[10.0; 7]);
        let evaluation = vec![eval("P", "S", 7, 50.0)];

        let findings = detect_anomalies(&historical, &evaluation, 2.0).unwrap();
        assert!(findings.is_empty());
    }

    #[test]
    fn test_six_samples_never_flagged() {
        let historical = history("P", "S", &[10.0, 12.0, 9.0, 11.0, 10.0, 13.0]);
        let evaluation = vec![eval("P", "S", 6, 1000.0)];

        assert!(build_baselines(&historical).is_empty());
        assert!(detect_anomalies(&historical, &evaluation, 0.5).unwrap().is_empty());
    }

    #[test]
    fn test_seven_samples_eligible() {
        let historical = history("P", "S", &[10.0, 12.0, 9.0, 11.0, 10.0, 13.0, 8.0]);
        let evaluation = vec![eval("P", "S", 7, 1000.0)];

        assert_eq!(build_baselines(&historical).len(), 1);
        assert_eq!(detect_anomalies(&historical, &evaluation, 0.5).unwrap().len(), 1);
    }

    #[test]
    fn test_samples_are_daily_sums() {
        // 14 records over 7 days is still 7 samples
        let mut historical = history("P", "S", &[5.0, 6.0, 4.5, 5.5, 5.0, 6.5, 4.0]);
        historical.extend(history("P", "S", &[5.0, 6.0, 4.5, 5.5, 5.0, 6.5, 4.0]));

        let stats = build_baselines(&historical)[&("P".to_string(), "S".to_string())];
        assert_eq!(stats.sample_count, 7);
        assert!((stats.mean - 10.428_571).abs() < 1e-3);
    }

    #[test]
    fn test_threshold_gates_inclusion() {
        // mean 10.43, stddev 1.72 -> z of 13.0 is ~1.50
        let historical = history("P", "S", &[10.0, 12.0, 9.0, 11.0, 10.0, 13.0, 8.0]);
        let evaluation = vec![eval("P", "S", 7, 13.0)];

        assert!(detect_anomalies(&historical, &evaluation, 2.0).unwrap().is_empty());

        let findings = detect_anomalies(&historical, &evaluation, 1.0).unwrap();
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].severity, Severity::Low);
    }

    #[test]
    fn test_drop_below_baseline_is_flagged() {
        let historical = history("P", "S", &[10.0, 12.0, 9.0, 11.0, 10.0, 13.0, 8.0]);
        let evaluation = vec![eval("P", "S", 7, 0.0)];

        let findings = detect_anomalies(&historical, &evaluation, 2.0).unwrap();
        assert_eq!(findings.len(), 1);
        assert!(findings[0].deviation_pct.unwrap() < 0.0);
    }

    #[test]
    fn test_zero_mean_leaves_deviation_unset() {
        let historical = history("P", "S", &[-3.0, 3.0, -3.0, 3.0, -3.0, 3.0, 0.0]);
        let evaluation = vec![eval("P", "S", 7, 50.0)];

        let findings = detect_anomalies(&historical, &evaluation, 2.0).unwrap();
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].expected_cost, 0.0);
        assert!(findings[0].deviation_pct.is_none());
        assert_eq!(findings[0].severity, Severity::High);
    }

    #[test]
    fn test_pairs_are_independent() {
        let mut historical = history("P", "S", &[10.0, 12.0, 9.0, 11.0, 10.0, 13.0, 8.0]);
        historical.extend(history("P", "Flat", &[10.0; 7]));
        historical.extend(history("Q", "S", &[1.0, 2.0, 3.0]));

        let evaluation = vec![
            eval("P", "S", 7, 40.0),
            eval("P", "Flat", 7, 99.0),
            eval("Q", "S", 7, 99.0),
            eval("R", "Unknown", 7, 99.0),
        ];

        let findings = detect_anomalies(&historical, &evaluation, 2.0).unwrap();
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].project_id, "P");
        assert_eq!(findings[0].service_name, "S");
    }

    #[test]
    fn test_findings_sorted_by_z_score() {
        let mut historical = history("A", "S", &[10.0, 12.0, 9.0, 11.0, 10.0, 13.0, 8.0]);
        historical.extend(history("B", "S", &[10.0, 12.0, 9.0, 11.0, 10.0, 13.0, 8.0]));
        let evaluation = vec![eval("A", "S", 7, 20.0), eval("B", "S", 7, 40.0)];

        let findings = detect_anomalies(&historical, &evaluation, 2.0).unwrap();
        assert_eq!(findings.len(), 2);
        assert_eq!(findings[0].project_id, "B");
        assert!(findings[0].z_score > findings[1].z_score);
    }

    #[test]
    fn test_rejects_non_positive_threshold() {
        assert!(matches!(
            detect_anomalies(&[], &[], 0.0),
            Err(CostError::InvalidParameter(_))
        ));
        assert!(detect_anomalies(&[], &[], f64::NAN).is_err());
    }

    #[test]
    fn test_split_window() {
        let records: Vec<_> = (0..12)
            .map(|i| CostRecord::new("P", "S", day(i), 1.0))
            .collect();

        let (historical, evaluation) = split_window(&records, day(10), 7);
        assert_eq!(evaluation.len(), 1);
        assert_eq!(evaluation[0].usage_date, day(10));
        assert_eq!(historical.len(), 7);
        assert!(historical.iter().all(|r| r.usage_date >= day(3) && r.usage_date < day(10)));
    }
}
