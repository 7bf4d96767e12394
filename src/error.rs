use thiserror::Error;

/// Main error type for coursegraph
///
/// Row-level failures (unknown instructor, unregistered short id) are not
/// errors: they surface as skipped rows. Everything here aborts the run.
#[derive(Error, Debug)]
pub enum CoursegraphError {
    /// File system I/O errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Input file cannot be read or a row has the wrong shape
    #[error("Malformed input (line {line}): {reason}")]
    MalformedInput { line: usize, reason: String },

    /// Term code too short or with a non-numeric year
    #[error("Invalid term code '{term_code}': {reason}")]
    InvalidTermCode { term_code: String, reason: String },

    /// One or more term period codes missing from the period table
    #[error("Unknown term period code(s): {}", format_unknown_periods(.unknown))]
    UnknownTermPeriod { unknown: Vec<UnknownPeriod> },

    /// Every minting attempt collided with an existing entity
    #[error("Identifier minting exhausted after {attempts} attempts for {context}")]
    IdentifierExhaustion { attempts: usize, context: String },

    /// Registry query or existence endpoint failed
    #[error("Registry error during {operation}: {message}")]
    Registry { operation: &'static str, message: String },

    /// Directory service failure that cannot be attributed to a single id
    #[error("Directory error: {0}")]
    Directory(String),

    /// Statement serialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// JSON side-log errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// A period code missing from the table, with the first row it appeared on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownPeriod {
    pub term_code: String,
    pub period: String,
    pub first_row: Option<usize>,
}

fn format_unknown_periods(unknown: &[UnknownPeriod]) -> String {
    unknown
        .iter()
        .map(|u| match u.first_row {
            Some(row) => format!("'{}' in term {} (row {})", u.period, u.term_code, row),
            None => format!("'{}' in term {}", u.period, u.term_code),
        })
        .collect::<Vec<_>>()
        .join(", ")
}

impl CoursegraphError {
    pub(crate) fn registry(operation: &'static str, message: impl Into<String>) -> Self {
        Self::Registry {
            operation,
            message: message.into(),
        }
    }
}

/// Convenient Result type using CoursegraphError
pub type Result<T> = std::result::Result<T, CoursegraphError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = CoursegraphError::Config("Test error".to_string());
        assert!(err.to_string().contains("Configuration error"));
        assert!(err.to_string().contains("Test error"));
    }

    #[test]
    fn test_malformed_input_names_line() {
        let err = CoursegraphError::MalformedInput {
            line: 7,
            reason: "expected 16 fields, found 3".to_string(),
        };
        assert!(err.to_string().contains("line 7"));
        assert!(err.to_string().contains("found 3"));
    }

    #[test]
    fn test_unknown_period_lists_every_code() {
        let err = CoursegraphError::UnknownTermPeriod {
            unknown: vec![
                UnknownPeriod {
                    term_code: "202044".to_string(),
                    period: "44".to_string(),
                    first_row: Some(2),
                },
                UnknownPeriod {
                    term_code: "201977".to_string(),
                    period: "77".to_string(),
                    first_row: None,
                },
            ],
        };
        let msg = err.to_string();
        assert!(msg.contains("'44' in term 202044 (row 2)"));
        assert!(msg.contains("'77' in term 201977"));
        assert!(!msg.contains("row 9"));
    }

    #[test]
    fn test_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: CoursegraphError = io_err.into();
        assert!(matches!(err, CoursegraphError::Io(_)));
    }
}
