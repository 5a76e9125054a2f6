//! Output formatting and persistence for load results.
//!
//! Supports pretty-printing, JSON logging, appending cost summaries to a CSV
//! and dumping skipped-line diagnostics.

use std::fmt::Debug;
use std::fs::OpenOptions;
use std::path::Path;

use anyhow::Result;
use chrono::{DateTime, Utc};
use csv::WriterBuilder;
use serde::Serialize;
use tracing::{debug, info};

use crate::policy::Diagnostic;
use crate::portfolio::CostReport;

/// One row of the cost summary CSV.
#[derive(Debug, Serialize)]
pub struct CostSummary {
    pub timestamp: DateTime<Utc>,
    pub source: String,
    pub total: f64,
    pub holdings: usize,
    pub skipped: usize,
}

impl CostSummary {
    pub fn from_report(source: &str, report: &CostReport) -> Self {
        CostSummary {
            timestamp: Utc::now(),
            source: source.to_string(),
            total: report.total,
            holdings: report.holdings,
            skipped: report.skipped.len(),
        }
    }
}

/// Logs a value using Rust's debug pretty-print format.
pub fn print_pretty<T: Debug>(value: &T) {
    debug!("{:#?}", value);
}

/// Logs a value as pretty-printed JSON.
pub fn print_json<T: Serialize>(value: &T) -> Result<()> {
    info!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Appends a [`CostSummary`] as a row to a CSV file.
///
/// Creates the file with headers if it does not already exist.
pub fn append_record(path: &str, summary: &CostSummary) -> Result<()> {
    let file_exists = Path::new(path).exists();
    debug!(path, file_exists, "Appending CSV record");

    let file = OpenOptions::new().append(true).create(true).open(path)?;

    let mut writer = WriterBuilder::new()
        .has_headers(!file_exists)
        .from_writer(file);

    writer.serialize(summary)?;
    writer.flush()?;

    Ok(())
}

/// Writes skipped-line diagnostics to `path`, replacing any existing file.
pub fn write_diagnostics(path: &str, diagnostics: &[Diagnostic]) -> Result<()> {
    debug!(path, count = diagnostics.len(), "Writing diagnostics");

    let mut writer = csv::Writer::from_path(path)?;
    for diagnostic in diagnostics {
        writer.serialize(diagnostic)?;
    }
    writer.flush()?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::fs;

    fn temp_path(name: &str) -> String {
        format!("{}/{}", env::temp_dir().display(), name)
    }

    fn summary() -> CostSummary {
        let report = CostReport {
            total: 53565.0,
            holdings: 2,
            skipped: vec![Diagnostic {
                line_number: 2,
                line: "AAPL N/A 125.50".to_string(),
                reason: "invalid quantity".to_string(),
            }],
        };
        CostSummary::from_report("portfolio.dat", &report)
    }

    #[test]
    fn test_summary_from_report() {
        let s = summary();
        assert_eq!(s.source, "portfolio.dat");
        assert_eq!(s.holdings, 2);
        assert_eq!(s.skipped, 1);
    }

    #[test]
    fn test_print_pretty_does_not_panic() {
        print_pretty(&summary());
    }

    #[test]
    fn test_print_json_does_not_panic() {
        print_json(&summary()).unwrap();
    }

    #[test]
    fn test_append_record_writes_header_once() {
        let path = temp_path("transit_tally_test_header.csv");
        let _ = fs::remove_file(&path);

        append_record(&path, &summary()).unwrap();
        append_record(&path, &summary()).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        let header_count = content.lines().filter(|l| l.contains("timestamp")).count();
        assert_eq!(header_count, 1);
        assert_eq!(content.lines().count(), 3);

        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_write_diagnostics_replaces_file() {
        let path = temp_path("transit_tally_test_diagnostics.csv");
        let _ = fs::remove_file(&path);

        let diagnostics = vec![Diagnostic {
            line_number: 7,
            line: "IBM 5x 91.1".to_string(),
            reason: "bad".to_string(),
        }];
        write_diagnostics(&path, &diagnostics).unwrap();
        write_diagnostics(&path, &diagnostics).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        let lines: Vec<_> = content.lines().collect();
        assert_eq!(lines, vec!["line_number,line,reason", "7,IBM 5x 91.1,bad"]);

        fs::remove_file(&path).unwrap();
    }
}
