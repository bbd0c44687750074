//! # costlens-analytics
//!
//! Time-series analytics over daily cloud billing records.
//!
//! This crate provides:
//! - [`aggregate_trends`] - Daily totals with service and project breakdowns
//! - [`detect_anomalies`] - z-score anomaly detection against per-pair baselines
//! - [`forecast`] - Linear-trend forecast of daily totals
//! - [`RecordSource`] / [`ReportSink`] - Pluggable input and output
//! - [`CostAnalytics`] - Request-level service combining the above
//!
//! ## Example
//!
//! ```no_run
//! use chrono::Utc;
//! use costlens_analytics::{AnalyticsConfig, CostAnalytics, JsonlRecordSource};
//!
//! fn main() -> costlens_analytics::Result<()> {
//!     let source = JsonlRecordSource::new("billing-export.jsonl");
//!     let analytics = CostAnalytics::new(&source, AnalyticsConfig::load_default()?);
//!
//!     let today = Utc::now().date_naive();
//!     for finding in analytics.anomalies(None, None, today)? {
//!         println!("{}", finding.description());
//!     }
//!
//!     Ok(())
//! }
//! ```

pub mod anomaly;
pub mod config;
pub mod error;
pub mod forecast;
pub mod models;
pub mod report;
pub mod service;
pub mod source;
pub mod trends;

// Re-export main types
pub use anomaly::{build_baselines, detect_anomalies, split_window};
pub use config::AnalyticsConfig;
pub use error::{CostError, Result};
pub use forecast::{fit_trend, forecast};
pub use models::{
    AnomalyFinding, BaselineStats, CostRecord, DateRange, ForecastPoint, Severity, TrendFit,
    TrendPoint,
};
pub use report::{CostReport, JsonReportSink, ReportSink};
pub use service::CostAnalytics;
pub use source::{JsonlRecordSource, MemoryRecordSource, RecordSource};
pub use trends::aggregate_trends;
