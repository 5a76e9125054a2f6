//! Error types returned by the loaders.

use std::num::{ParseFloatError, ParseIntError};

/// A single line or row that could not be turned into a value.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum FieldError {
    #[error("expected at least {expected} fields, found {found}")]
    MissingFields { expected: usize, found: usize },
    #[error("invalid {field} '{value}': {source}")]
    InvalidInteger {
        field: &'static str,
        value: String,
        source: ParseIntError,
    },
    #[error("invalid {field} '{value}': {source}")]
    InvalidFloat {
        field: &'static str,
        value: String,
        source: ParseFloatError,
    },
    #[error("invalid UTF-8 after byte {valid_up_to}")]
    InvalidEncoding { valid_up_to: usize },
}

#[derive(thiserror::Error, Debug)]
pub enum LoadError {
    #[error("failed opening '{path}': {source}")]
    Open {
        path: String,
        source: std::io::Error,
    },
    #[error("failed reading line {line}: {source}")]
    Read {
        line: u64,
        source: std::io::Error,
    },
    #[error(transparent)]
    Csv(#[from] csv::Error),
    #[error("line {line}: {reason}")]
    Malformed { line: u64, reason: FieldError },
}

impl LoadError {
    /// True when the input file does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            LoadError::Open { source, .. } if source.kind() == std::io::ErrorKind::NotFound
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_only_for_missing_file() {
        let missing = LoadError::Open {
            path: "nope.csv".to_string(),
            source: std::io::Error::from(std::io::ErrorKind::NotFound),
        };
        assert!(missing.is_not_found());

        let denied = LoadError::Open {
            path: "locked.csv".to_string(),
            source: std::io::Error::from(std::io::ErrorKind::PermissionDenied),
        };
        assert!(!denied.is_not_found());
    }

    #[test]
    fn test_malformed_message_names_line_and_value() {
        let source = "N/A".parse::<i64>().unwrap_err();
        let err = LoadError::Malformed {
            line: 2,
            reason: FieldError::InvalidInteger {
                field: "quantity",
                value: "N/A".to_string(),
                source,
            },
        };
        let msg = err.to_string();
        assert!(msg.starts_with("line 2: invalid quantity 'N/A'"));
    }
}
