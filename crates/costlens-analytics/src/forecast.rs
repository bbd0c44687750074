//! Short-horizon cost forecasting with linear regression.
//!
//! Fits `total_cost = slope * index + intercept` by ordinary least squares,
//! where `index` is the zero-based position of each trend point. Using the
//! position instead of the calendar date assumes uniform daily spacing.

use crate::error::{CostError, Result};
use crate::models::{ForecastPoint, TrendFit, TrendPoint};
use chrono::Days;
use tracing::debug;

/// Minimum number of trend points needed to fit a trend.
pub const MIN_FORECAST_POINTS: usize = 7;

/// Share of the last observed total used when the regression goes negative.
pub const NEGATIVE_FALLBACK_FACTOR: f64 = 0.9;

/// Fit a least-squares line through the daily totals.
///
/// Returns [`CostError::InsufficientData`] with fewer than
/// [`MIN_FORECAST_POINTS`] points.
pub fn fit_trend(points: &[TrendPoint]) -> Result<TrendFit> {
    if points.len() < MIN_FORECAST_POINTS {
        return Err(CostError::InsufficientData {
            operation: "forecast",
            required: MIN_FORECAST_POINTS,
            actual: points.len(),
        });
    }

    let n = points.len() as f64;
    let (mut sum_x, mut sum_y, mut sum_xy, mut sum_x2) = (0.0, 0.0, 0.0, 0.0);
    for (i, point) in points.iter().enumerate() {
        let x = i as f64;
        let y = point.total_cost;
        sum_x += x;
        sum_y += y;
        sum_xy += x * y;
        sum_x2 += x * x;
    }

    let slope = (n * sum_xy - sum_x * sum_y) / (n * sum_x2 - sum_x * sum_x);
    let intercept = (sum_y - slope * sum_x) / n;

    let mean_y = sum_y / n;
    let (ss_tot, ss_res) = points
        .iter()
        .enumerate()
        .fold((0.0, 0.0), |(tot, res), (i, point)| {
            let predicted = slope * i as f64 + intercept;
            (
                tot + (point.total_cost - mean_y).powi(2),
                res + (point.total_cost - predicted).powi(2),
            )
        });
    let r_squared = if ss_tot > 0.0 { 1.0 - ss_res / ss_tot } else { 0.0 };

    Ok(TrendFit {
        slope,
        intercept,
        r_squared,
        sample_count: points.len(),
    })
}

/// Forecast `horizon_days` daily totals after the last trend point.
///
/// `points` must be ascending by date. Negative predictions are replaced by
/// 90% of the last observed total, or zero when that total is itself negative.
pub fn forecast(points: &[TrendPoint], horizon_days: u32) -> Result<Vec<ForecastPoint>> {
    if horizon_days == 0 {
        return Err(CostError::InvalidParameter(
            "forecast horizon must be at least one day".to_string(),
        ));
    }

    let fit = fit_trend(points)?;
    let last = &points[points.len() - 1];

    let final_date = last
        .date
        .checked_add_days(Days::new(u64::from(horizon_days)))
        .ok_or_else(|| {
            CostError::InvalidParameter(format!(
                "forecast date {} + {} days is out of range",
                last.date, horizon_days
            ))
        })?;

    // A negative last total (credits exceeding cost) must not leak through
    let fallback = (last.total_cost * NEGATIVE_FALLBACK_FACTOR).max(0.0);
    let mut forecasts = Vec::new();
    for (step, date) in (1..=horizon_days).zip(last.date.iter_days().skip(1)) {
        let index = points.len() + step as usize - 1;
        let mut total_cost = fit.predict(index);
        if total_cost < 0.0 {
            total_cost = fallback;
        }

        forecasts.push(ForecastPoint { date, total_cost });
    }

    debug!(
        history = points.len(),
        %final_date,
        horizon_days,
        slope = fit.slope,
        r_squared = fit.r_squared,
        "forecast generated"
    );

    Ok(forecasts)
}
