//! What a loader does when a line fails to parse.

use serde::Serialize;
use tracing::warn;

use crate::error::{FieldError, LoadError};

/// Selects between aborting the whole load and skipping the bad line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum ErrorPolicy {
    /// The first malformed line aborts the load.
    Fatal,
    /// Malformed lines are logged, recorded and excluded.
    #[default]
    Skip,
}

/// A line that was skipped under [`ErrorPolicy::Skip`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Diagnostic {
    pub line_number: u64,
    pub line: String,
    pub reason: String,
}

/// Records produced by a load plus whatever was skipped along the way.
#[derive(Debug, Clone, PartialEq)]
pub struct Loaded<T> {
    pub records: Vec<T>,
    pub skipped: Vec<Diagnostic>,
}

impl<T> Default for Loaded<T> {
    fn default() -> Self {
        Self {
            records: Vec::new(),
            skipped: Vec::new(),
        }
    }
}

impl ErrorPolicy {
    /// Either turns `err` into a fatal [`LoadError`] or logs it and appends a
    /// [`Diagnostic`] to `skipped`.
    pub fn handle(
        self,
        line_number: u64,
        raw: &str,
        err: FieldError,
        skipped: &mut Vec<Diagnostic>,
    ) -> Result<(), LoadError> {
        match self {
            ErrorPolicy::Fatal => Err(LoadError::Malformed {
                line: line_number,
                reason: err,
            }),
            ErrorPolicy::Skip => {
                warn!(line_number, line = ?raw, reason = %err, "Couldn't parse line, skipping");
                skipped.push(Diagnostic {
                    line_number,
                    line: raw.to_string(),
                    reason: err.to_string(),
                });
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn missing() -> FieldError {
        FieldError::MissingFields {
            expected: 3,
            found: 1,
        }
    }

    #[test]
    fn test_default_is_skip() {
        assert_eq!(ErrorPolicy::default(), ErrorPolicy::Skip);
    }

    #[test]
    fn test_fatal_returns_error_and_records_nothing() {
        let mut skipped = Vec::new();
        let result = ErrorPolicy::Fatal.handle(4, "GOOG", missing(), &mut skipped);

        match result {
            Err(LoadError::Malformed { line, reason }) => {
                assert_eq!(line, 4);
                assert_eq!(reason, missing());
            }
            other => panic!("expected Malformed, got {:?}", other),
        }
        assert!(skipped.is_empty());
    }

    #[test]
    fn test_skip_records_diagnostic() {
        let mut skipped = Vec::new();
        ErrorPolicy::Skip
            .handle(4, "GOOG", missing(), &mut skipped)
            .unwrap();

        assert_eq!(skipped.len(), 1);
        assert_eq!(skipped[0].line_number, 4);
        assert_eq!(skipped[0].line, "GOOG");
        assert_eq!(skipped[0].reason, "expected at least 3 fields, found 1");
    }

    #[test]
    fn test_policy_serializes_snake_case() {
        assert_eq!(
            serde_json::to_string(&ErrorPolicy::Fatal).unwrap(),
            "\"fatal\""
        );
        assert_eq!(
            serde_json::to_string(&ErrorPolicy::Skip).unwrap(),
            "\"skip\""
        );
    }
}
