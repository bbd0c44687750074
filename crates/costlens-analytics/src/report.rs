//! Cost reports and the sinks that deliver them.

use crate::error::Result;
use crate::models::{AnomalyFinding, ForecastPoint, TrendPoint};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use tracing::debug;

/// One row of the daily summary table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendSummaryRow {
    pub date: NaiveDate,
    pub total_cost: f64,
    pub top_service: Option<String>,
    pub top_service_cost: f64,
}

impl From<&TrendPoint> for TrendSummaryRow {
    fn from(point: &TrendPoint) -> Self {
        let (top_service, top_service_cost) = match point.top_service() {
            Some((name, cost)) => (Some(name.to_string()), cost),
            None => (None, 0.0),
        };
        Self {
            date: point.date,
            total_cost: point.total_cost,
            top_service,
            top_service_cost,
        }
    }
}

/// Anomaly finding with its rendered description.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnomalyReportRow {
    #[serde(flatten)]
    pub finding: AnomalyFinding,
    pub description: String,
}

impl From<AnomalyFinding> for AnomalyReportRow {
    fn from(finding: AnomalyFinding) -> Self {
        let description = finding.description();
        Self {
            finding,
            description,
        }
    }
}

/// Everything a dashboard needs in one document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostReport {
    /// Day the report was produced for
    pub generated_on: NaiveDate,

    /// Daily totals with breakdowns
    pub trends: Vec<TrendPoint>,

    /// Per-day total and top service
    pub summary: Vec<TrendSummaryRow>,

    /// Flagged observations
    pub anomalies: Vec<AnomalyReportRow>,

    /// Forecast, when there was enough history
    pub forecast: Vec<ForecastPoint>,

    /// Why the forecast is empty, if it is
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub forecast_unavailable: Option<String>,
}

impl CostReport {
    /// Assemble a report from the three analytics outputs.
    pub fn new(
        generated_on: NaiveDate,
        trends: Vec<TrendPoint>,
        anomalies: Vec<AnomalyFinding>,
        forecast: Result<Vec<ForecastPoint>>,
    ) -> Self {
        let summary = trends.iter().map(TrendSummaryRow::from).collect();
        let (forecast, forecast_unavailable) = match forecast {
            Ok(points) => (points, None),
            Err(e) => (Vec::new(), Some(e.friendly_message())),
        };

        Self {
            generated_on,
            trends,
            summary,
            anomalies: anomalies.into_iter().map(AnomalyReportRow::from).collect(),
            forecast,
            forecast_unavailable,
        }
    }
}

/// Destination for finished reports.
pub trait ReportSink {
    /// Deliver a report.
    fn deliver(&mut self, report: &CostReport) -> Result<()>;
}

/// Writes reports as pretty-printed JSON.
pub struct JsonReportSink<W: Write> {
    writer: W,
}

impl<W: Write> JsonReportSink<W> {
    /// Write to any writer (e.g., stdout).
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    /// Recover the underlying writer.
    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl JsonReportSink<BufWriter<File>> {
    /// Create (or truncate) a file at `path`.
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::create(path.as_ref())?;
        debug!(path = %path.as_ref().display(), "opened report file");
        Ok(Self::new(BufWriter::new(file)))
    }
}

impl<W: Write> ReportSink for JsonReportSink<W> {
    fn deliver(&mut self, report: &CostReport) -> Result<()> {
        serde_json::to_writer_pretty(&mut self.writer, report)?;
        writeln!(self.writer)?;
        self.writer.flush()?;
        debug!(
            days = report.trends.len(),
            anomalies = report.anomalies.len(),
            forecast = report.forecast.len(),
            "report delivered"
        );
        Ok(())
    }
}
