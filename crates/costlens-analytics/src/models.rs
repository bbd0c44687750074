//! Data models for cost analytics.

use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::error::{CostError, Result};

/// One cost-usage observation from a billing export.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostRecord {
    /// Billing project identifier
    pub project_id: String,

    /// Service description (e.g., "Compute Engine")
    pub service_name: String,

    /// Day the usage was incurred
    pub usage_date: NaiveDate,

    /// Gross cost
    pub cost: f64,

    /// Credits applied to this line item (usually non-positive)
    #[serde(default)]
    pub credits: f64,

    /// SKU description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sku_name: Option<String>,

    /// Billing currency code
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,

    /// Resource location
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}

impl CostRecord {
    /// Create a new CostRecord with required fields and no credits.
    pub fn new(
        project_id: impl Into<String>,
        service_name: impl Into<String>,
        usage_date: NaiveDate,
        cost: f64,
    ) -> Self {
        Self {
            project_id: project_id.into(),
            service_name: service_name.into(),
            usage_date,
            cost,
            credits: 0.0,
            sku_name: None,
            currency: None,
            location: None,
        }
    }

    /// Set credits.
    pub fn with_credits(mut self, credits: f64) -> Self {
        self.credits = credits;
        self
    }

    /// Set SKU name.
    pub fn with_sku(mut self, sku_name: impl Into<String>) -> Self {
        self.sku_name = Some(sku_name.into());
        self
    }

    /// Set currency code.
    pub fn with_currency(mut self, currency: impl Into<String>) -> Self {
        self.currency = Some(currency.into());
        self
    }

    /// Net cost (cost + credits).
    pub fn net_cost(&self) -> f64 {
        self.cost + self.credits
    }
}

/// Daily cost totals with service and project breakdowns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendPoint {
    /// Calendar date
    pub date: NaiveDate,

    /// Net cost across all records on this date
    pub total_cost: f64,

    /// Net cost per service, summed across projects
    pub cost_by_service: BTreeMap<String, f64>,

    /// Net cost per project, summed across services
    pub cost_by_project: BTreeMap<String, f64>,
}

impl TrendPoint {
    /// Create a point with only a total (no breakdowns).
    pub fn with_total(date: NaiveDate, total_cost: f64) -> Self {
        Self {
            date,
            total_cost,
            cost_by_service: BTreeMap::new(),
            cost_by_project: BTreeMap::new(),
        }
    }

    /// Service with the largest net cost on this date.
    ///
    /// Ties go to the lexicographically smallest service name.
    pub fn top_service(&self) -> Option<(&str, f64)> {
        self.cost_by_service
            .iter()
            .fold(None::<(&str, f64)>, |best, (name, &cost)| match best {
                Some((_, best_cost)) if cost <= best_cost => best,
                _ => Some((name.as_str(), cost)),
            })
    }
}

/// Historical baseline for one (project, service) pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BaselineStats {
    /// Mean daily net cost
    pub mean: f64,

    /// Sample standard deviation of daily net cost
    pub stddev: f64,

    /// Number of daily samples
    pub sample_count: usize,
}

/// Anomaly severity, ordered Low < Medium < High.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Severity {
    Low,
    Medium,
    High,
}

impl Severity {
    /// z-score above which a finding is High.
    pub const HIGH_Z: f64 = 3.0;

    /// z-score above which a finding is Medium.
    pub const MEDIUM_Z: f64 = 2.0;

    /// Map a z-score onto the fixed severity tiers.
    pub fn from_z_score(z_score: f64) -> Self {
        if z_score > Self::HIGH_Z {
            Severity::High
        } else if z_score > Self::MEDIUM_Z {
            Severity::Medium
        } else {
            Severity::Low
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Low => write!(f, "Low"),
            Severity::Medium => write!(f, "Medium"),
            Severity::High => write!(f, "High"),
        }
    }
}

/// One flagged (project, service) observation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnomalyFinding {
    /// Evaluation date
    pub date: NaiveDate,

    /// Billing project identifier
    pub project_id: String,

    /// Service description
    pub service_name: String,

    /// Net cost observed on the evaluation date
    pub actual_cost: f64,

    /// Baseline mean
    pub expected_cost: f64,

    /// Percentage deviation from the baseline; None when the baseline mean is zero
    pub deviation_pct: Option<f64>,

    /// Severity tier
    pub severity: Severity,

    /// |actual - expected| / stddev
    pub z_score: f64,
}

impl AnomalyFinding {
    /// Human-readable summary for reports.
    pub fn description(&self) -> String {
        format!(
            "Cost spike detected for {} in project {}. Expected: ${:.2}, Actual: ${:.2}",
            self.service_name, self.project_id, self.expected_cost, self.actual_cost
        )
    }
}

/// Predicted daily total.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ForecastPoint {
    /// Forecast date
    pub date: NaiveDate,

    /// Predicted net cost, never negative
    pub total_cost: f64,
}

/// Fitted linear trend over daily totals.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrendFit {
    /// Cost change per day
    pub slope: f64,

    /// Predicted total at index 0
    pub intercept: f64,

    /// Coefficient of determination (0-1 for a least-squares fit)
    pub r_squared: f64,

    /// Number of points fitted
    pub sample_count: usize,
}

impl TrendFit {
    /// Raw regression value at a zero-based index.
    pub fn predict(&self, index: usize) -> f64 {
        self.slope * index as f64 + self.intercept
    }
}

/// Inclusive range of calendar dates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    /// Create a range; `start` must not be after `end`.
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self> {
        if start > end {
            return Err(CostError::InvalidParameter(format!(
                "date range start {} is after end {}",
                start, end
            )));
        }
        Ok(Self { start, end })
    }

    /// The `days` days before `today`, plus `today` itself.
    pub fn last_days(today: NaiveDate, days: u32) -> Self {
        let start = today
            .checked_sub_days(Days::new(u64::from(days)))
            .unwrap_or(NaiveDate::MIN);
        Self { start, end: today }
    }

    /// Check whether a date falls inside the range.
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}
