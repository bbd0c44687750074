//! Record sources that supply cost records for a date range.
//!
//! The engine never talks to a billing warehouse itself; a [`RecordSource`]
//! hands it materialized records. Two sources ship here:
//! - [`JsonlRecordSource`] - one JSON [`CostRecord`] per line in a file
//! - [`MemoryRecordSource`] - records already held in memory

use crate::error::{CostError, Result};
use crate::models::{CostRecord, DateRange};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use tracing::{debug, trace, warn};

/// Supplies cost records for an inclusive date range.
pub trait RecordSource {
    /// Fetch every record whose usage date falls inside `range`.
    fn fetch(&self, range: DateRange) -> Result<Vec<CostRecord>>;
}

/// Records held in memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryRecordSource {
    records: Vec<CostRecord>,
}

impl MemoryRecordSource {
    /// Wrap a set of records.
    pub fn new(records: Vec<CostRecord>) -> Self {
        Self { records }
    }

    /// Number of records held.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// True when no records are held.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl RecordSource for MemoryRecordSource {
    fn fetch(&self, range: DateRange) -> Result<Vec<CostRecord>> {
        Ok(self
            .records
            .iter()
            .filter(|r| range.contains(r.usage_date))
            .cloned()
            .collect())
    }
}

/// Billing export in JSON lines format.
///
/// Non-JSON lines (headers, comments) and malformed lines are skipped rather
/// than failing the whole file. JSON has no NaN or infinity, so a non-finite
/// amount can only appear as a number too large for `f64`; those records are
/// dropped with a warning.
#[derive(Debug, Clone)]
pub struct JsonlRecordSource {
    path: PathBuf,
}

impl JsonlRecordSource {
    /// Create a source reading from `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Parse every valid record in the file, regardless of date.
    pub fn read_all(&self) -> Result<Vec<CostRecord>> {
        if !self.path.is_file() {
            return Err(CostError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("Record file not found: {}", self.path.display()),
            )));
        }

        let reader = BufReader::new(File::open(&self.path)?);
        let mut records = Vec::new();
        let mut skipped = 0usize;

        for (index, line) in reader.lines().enumerate() {
            let line_number = index + 1;
            let line = match line {
                Ok(l) => l,
                Err(e) => {
                    trace!(line = line_number, error = %e, "Failed to read line");
                    skipped += 1;
                    continue;
                }
            };

            let trimmed = line.trim();
            if !trimmed.starts_with('{') {
                continue;
            }

            match parse_line(trimmed) {
                Ok(record) => records.push(record),
                Err(CostError::Json(e)) if is_out_of_range(&e) => {
                    warn!(line = line_number, error = %e, "Dropping record with non-finite amount");
                    skipped += 1;
                }
                Err(e) => {
                    trace!(line = line_number, error = %e, "Failed to parse line");
                    skipped += 1;
                }
            }
        }

        debug!(
            file = %self.path.display(),
            count = records.len(),
            skipped,
            "Parsed record file"
        );

        Ok(records)
    }
}

impl RecordSource for JsonlRecordSource {
    fn fetch(&self, range: DateRange) -> Result<Vec<CostRecord>> {
        let mut records = self.read_all()?;
        records.retain(|r| range.contains(r.usage_date));
        Ok(records)
    }
}

/// Parse one JSON line into a record.
pub fn parse_line(line: &str) -> Result<CostRecord> {
    Ok(serde_json::from_str(line)?)
}

/// True when serde_json refused a number that overflows `f64`.
fn is_out_of_range(error: &serde_json::Error) -> bool {
    error.to_string().starts_with("number out of range")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use std::io::Write;

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, d).unwrap()
    }

    #[test]
    fn test_memory_source_filters_range() {
        let source = MemoryRecordSource::new(vec![
            CostRecord::new("p", "s", date(1), 1.0),
            CostRecord::new("p", "s", date(5), 1.0),
            CostRecord::new("p", "s", date(9), 1.0),
        ]);
        assert_eq!(source.len(), 3);

        let range = DateRange::new(date(2), date(9)).unwrap();
        let records = source.fetch(range).unwrap();
        assert_eq!(records.len(), 2);
    }

    #[test]
    fn test_parse_line_with_credits() {
        let record = parse_line(
            r#"{"project_id":"p","service_name":"s","usage_date":"2026-03-01","cost":2.0,"credits":-0.5,"currency":"USD"}"#,
        )
        .unwrap();
        assert_eq!(record.net_cost(), 1.5);
        assert_eq!(record.currency.as_deref(), Some("USD"));
    }

    #[test]
    fn test_parse_line_rejects_missing_fields() {
        assert!(matches!(
            parse_line(r#"{"project_id":"p"}"#),
            Err(CostError::Json(_))
        ));
    }

    #[test]
    fn test_jsonl_skips_noise() {
        let mut file = tempfile::NamedTempFile::with_suffix(".jsonl").unwrap();
        writeln!(file, "# exported 2026-03-10").unwrap();
        writeln!(
            file,
            r#"{{"project_id":"p","service_name":"s","usage_date":"2026-03-01","cost":1.0}}"#
        )
        .unwrap();
        writeln!(file, r#"{{"project_id":"p","service_name":CORRUPTED}}"#).unwrap();
        writeln!(file).unwrap();
        writeln!(
            file,
            r#"{{"project_id":"p","service_name":"s","usage_date":"2026-03-02","cost":2.0}}"#
        )
        .unwrap();
        file.flush().unwrap();

        let records = JsonlRecordSource::new(file.path()).read_all().unwrap();
        assert_eq!(records.len(), 2);
    }

    #[test]
    fn test_overflowing_amount_is_out_of_range() {
        let err = parse_line(
            r#"{"project_id":"p","service_name":"s","usage_date":"2026-03-01","cost":1e400}"#,
        )
        .unwrap_err();
        match err {
            CostError::Json(e) => assert!(is_out_of_range(&e)),
            other => panic!("unexpected error: {:?}", other),
        }

        let err = parse_line(r#"{"project_id":"p","service_name":CORRUPTED}"#).unwrap_err();
        assert!(matches!(err, CostError::Json(ref e) if !is_out_of_range(e)));
    }

    #[test]
    fn test_jsonl_drops_overflowing_amounts() {
        let mut file = tempfile::NamedTempFile::with_suffix(".jsonl").unwrap();
        writeln!(
            file,
            r#"{{"project_id":"p","service_name":"s","usage_date":"2026-03-01","cost":1e400}}"#
        )
        .unwrap();
        writeln!(
            file,
            r#"{{"project_id":"p","service_name":"s","usage_date":"2026-03-02","cost":2.0,"credits":-1e999}}"#
        )
        .unwrap();
        writeln!(
            file,
            r#"{{"project_id":"p","service_name":"s","usage_date":"2026-03-03","cost":3.0}}"#
        )
        .unwrap();
        file.flush().unwrap();

        let source = JsonlRecordSource::new(file.path());
        assert_eq!(source.path(), file.path());

        let records = source.read_all().unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].usage_date, date(3));
        assert!(records[0].net_cost().is_finite());
    }

    #[test]
    fn test_missing_file() {
        let source = JsonlRecordSource::new("/definitely/not/here.jsonl");
        assert!(matches!(source.read_all(), Err(CostError::Io(_))));
    }
}
