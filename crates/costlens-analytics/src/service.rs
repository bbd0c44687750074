//! Request-level analytics over a [`RecordSource`].
//!
//! Maps "days back", "threshold" and "horizon" style requests onto the three
//! core operations, filling unset parameters from [`AnalyticsConfig`].

use crate::anomaly::{MIN_BASELINE_SAMPLES, detect_anomalies, split_window};
use crate::config::AnalyticsConfig;
use crate::error::{CostError, Result};
use crate::forecast::forecast;
use crate::models::{AnomalyFinding, DateRange, ForecastPoint, TrendPoint};
use crate::report::CostReport;
use crate::source::RecordSource;
use crate::trends::aggregate_trends;
use chrono::{Days, NaiveDate};
use costlens_core::log_analytics_event;
use tracing::warn;

/// Analytics service bound to a record source.
pub struct CostAnalytics<'a, S: RecordSource> {
    source: &'a S,
    config: AnalyticsConfig,
}

impl<'a, S: RecordSource> CostAnalytics<'a, S> {
    /// Create a service with the given defaults.
    pub fn new(source: &'a S, config: AnalyticsConfig) -> Self {
        Self { source, config }
    }

    /// Active configuration.
    pub fn config(&self) -> &AnalyticsConfig {
        &self.config
    }

    /// Daily trends for the last `days_back` days up to and including `today`.
    pub fn trends(&self, days_back: Option<u32>, today: NaiveDate) -> Result<Vec<TrendPoint>> {
        let days_back = days_back.unwrap_or(self.config.days_back);
        let records = self.source.fetch(DateRange::last_days(today, days_back))?;
        let trends = aggregate_trends(&records);

        log_analytics_event!(operation = "trends", days_back, points = trends.len());
        Ok(trends)
    }

    /// Score yesterday's costs against the `lookback_days` before it.
    pub fn anomalies(
        &self,
        lookback_days: Option<u32>,
        threshold: Option<f64>,
        today: NaiveDate,
    ) -> Result<Vec<AnomalyFinding>> {
        let evaluation_date = today.checked_sub_days(Days::new(1)).ok_or_else(|| {
            CostError::InvalidParameter(format!("no day before {}", today))
        })?;
        self.anomalies_on(evaluation_date, lookback_days, threshold)
    }

    /// Score the costs of `evaluation_date` against the days before it.
    ///
    /// A lookback shorter than [`MIN_BASELINE_SAMPLES`] days could never
    /// produce a baseline and is rejected.
    pub fn anomalies_on(
        &self,
        evaluation_date: NaiveDate,
        lookback_days: Option<u32>,
        threshold: Option<f64>,
    ) -> Result<Vec<AnomalyFinding>> {
        let threshold = threshold.unwrap_or(self.config.anomaly_threshold);
        let lookback_days = lookback_days.unwrap_or(self.config.lookback_days);
        if (lookback_days as usize) < MIN_BASELINE_SAMPLES {
            return Err(CostError::InvalidParameter(format!(
                "lookback must be at least {} days, got {}",
                MIN_BASELINE_SAMPLES, lookback_days
            )));
        }

        let records = self
            .source
            .fetch(DateRange::last_days(evaluation_date, lookback_days))?;
        let (historical, evaluation) = split_window(&records, evaluation_date, lookback_days);
        let findings = detect_anomalies(&historical, &evaluation, threshold)?;

        log_analytics_event!(
            operation = "anomalies",
            %evaluation_date,
            lookback_days,
            threshold,
            findings = findings.len()
        );
        Ok(findings)
    }

    /// Forecast `horizon` days past the most recent trend point.
    pub fn forecast(&self, horizon: Option<u32>, today: NaiveDate) -> Result<Vec<ForecastPoint>> {
        let horizon = horizon.unwrap_or(self.config.forecast_horizon);
        let trends = self.trends(Some(self.config.forecast_history_days), today)?;
        let points = forecast(&trends, horizon)?;

        log_analytics_event!(operation = "forecast", horizon, points = points.len());
        Ok(points)
    }

    /// Build a full report using configured defaults.
    ///
    /// A forecast refused for lack of history is recorded in the report
    /// instead of failing it.
    pub fn report(&self, today: NaiveDate) -> Result<CostReport> {
        let trends = self.trends(None, today)?;
        let anomalies = self.anomalies(None, None, today)?;
        let forecast = match self.forecast(None, today) {
            Err(e) if e.is_insufficient_data() => {
                warn!(error = %e, "Forecast unavailable");
                Err(e)
            }
            Err(e) => return Err(e),
            Ok(points) => Ok(points),
        };

        Ok(CostReport::new(today, trends, anomalies, forecast))
    }
}
