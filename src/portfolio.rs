//! Portfolio cost accumulation.
//!
//! Each line of the input holds `symbol quantity price` separated by
//! whitespace. There is no header. The result is the sum of
//! `quantity * price` over every line that parses.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use serde::Serialize;
use tracing::{debug, info};

use crate::error::{FieldError, LoadError};
use crate::policy::{Diagnostic, ErrorPolicy};

const PORTFOLIO_FIELDS: usize = 3;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PortfolioEntry {
    pub symbol: String,
    pub quantity: i64,
    pub price: f64,
}

impl PortfolioEntry {
    pub fn cost(&self) -> f64 {
        self.quantity as f64 * self.price
    }
}

/// Outcome of accumulating one portfolio file.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CostReport {
    pub total: f64,
    /// Lines that contributed to `total`.
    pub holdings: usize,
    pub skipped: Vec<Diagnostic>,
}

/// Parses one `symbol quantity price` line. Fields after the third are ignored.
pub fn parse_entry(line: &str) -> Result<PortfolioEntry, FieldError> {
    let fields: Vec<&str> = line.split_whitespace().collect();
    if fields.len() < PORTFOLIO_FIELDS {
        return Err(FieldError::MissingFields {
            expected: PORTFOLIO_FIELDS,
            found: fields.len(),
        });
    }

    let quantity = fields[1]
        .parse::<i64>()
        .map_err(|source| FieldError::InvalidInteger {
            field: "quantity",
            value: fields[1].to_string(),
            source,
        })?;
    let price = fields[2]
        .parse::<f64>()
        .map_err(|source| FieldError::InvalidFloat {
            field: "price",
            value: fields[2].to_string(),
            source,
        })?;

    Ok(PortfolioEntry {
        symbol: fields[0].to_string(),
        quantity,
        price,
    })
}

/// Sums `quantity * price` over the file at `path`.
#[tracing::instrument(skip_all, fields(path = %path.as_ref().display(), ?policy))]
pub fn portfolio_cost<P: AsRef<Path>>(path: P, policy: ErrorPolicy) -> Result<CostReport, LoadError> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|source| LoadError::Open {
        path: path.display().to_string(),
        source,
    })?;

    let report = portfolio_cost_from_reader(BufReader::new(file), policy)?;
    info!(
        total = report.total,
        holdings = report.holdings,
        skipped = report.skipped.len(),
        "Portfolio cost computed"
    );
    Ok(report)
}

/// Same as [`portfolio_cost`] over an already-open reader.
///
/// Lines are read as bytes so that an undecodable line goes through `policy`
/// like any other malformed line. I/O failures are always fatal.
pub fn portfolio_cost_from_reader<R: BufRead>(
    mut reader: R,
    policy: ErrorPolicy,
) -> Result<CostReport, LoadError> {
    let mut report = CostReport::default();
    let mut buf = Vec::new();
    let mut line_number = 0u64;

    loop {
        buf.clear();
        let read = reader
            .read_until(b'\n', &mut buf)
            .map_err(|source| LoadError::Read {
                line: line_number + 1,
                source,
            })?;
        if read == 0 {
            break;
        }
        line_number += 1;

        let bytes = strip_newline(&buf);
        let line = match std::str::from_utf8(bytes) {
            Ok(line) => line,
            Err(e) => {
                let raw = String::from_utf8_lossy(bytes);
                let err = FieldError::InvalidEncoding {
                    valid_up_to: e.valid_up_to(),
                };
                policy.handle(line_number, &raw, err, &mut report.skipped)?;
                continue;
            }
        };

        if line.trim().is_empty() {
            continue;
        }

        match parse_entry(line) {
            Ok(entry) => {
                debug!(line_number, symbol = %entry.symbol, cost = entry.cost(), "Holding");
                report.total += entry.cost();
                report.holdings += 1;
            }
            Err(err) => policy.handle(line_number, line, err, &mut report.skipped)?,
        }
    }

    Ok(report)
}

/// Drops a trailing `\n` or `\r\n`.
fn strip_newline(buf: &[u8]) -> &[u8] {
    match buf.strip_suffix(b"\n") {
        Some(rest) => rest.strip_suffix(b"\r").unwrap_or(rest),
        None => buf,
    }
}
